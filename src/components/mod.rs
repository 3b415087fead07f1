//! UI Components
//!
//! Leptos components of the interactive checklist.

mod checklist_form;
mod checklist_item_row;
mod signature_field;

pub use checklist_form::ChecklistForm;
pub use checklist_item_row::ChecklistItemRow;
pub use signature_field::SignatureField;
