//! Checklist Form Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity.

use leptos::prelude::*;
use reactive_stores::Store;

use crate::models::FormState;

/// Reactive form state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct ChecklistState {
    /// One flag per checklist item, by position
    pub checkboxes: Vec<bool>,
    /// ISO date from the date field
    pub date: String,
    /// Signature data URL, empty when blank
    pub signature: String,
    /// Last message shown under the form
    pub status: Option<String>,
}

impl ChecklistState {
    pub fn from_form_state(state: FormState) -> Self {
        Self {
            checkboxes: state.checkboxes,
            date: state.date,
            signature: state.signature,
            status: None,
        }
    }
}

/// Type alias for the store
pub type ChecklistStore = Store<ChecklistState>;

// ========================
// Store Helper Functions
// ========================

/// Set one checkbox by item index; out-of-range indices are ignored
pub fn store_set_checked(store: &ChecklistStore, index: usize, checked: bool) {
    if let Some(flag) = store.checkboxes().write().get_mut(index) {
        *flag = checked;
    }
}

/// Whether item `index` is checked (tracked)
pub fn store_is_checked(store: &ChecklistStore, index: usize) -> bool {
    store.checkboxes().read().get(index).copied().unwrap_or(false)
}

pub fn store_set_date(store: &ChecklistStore, date: String) {
    store.date().set(date);
}

/// Current date field value (tracked)
pub fn store_date(store: &ChecklistStore) -> String {
    store.date().get()
}

pub fn store_set_signature(store: &ChecklistStore, data_url: String) {
    store.signature().set(data_url);
}

pub fn store_set_status(store: &ChecklistStore, message: Option<String>) {
    store.status().set(message);
}

/// Current status message (tracked)
pub fn store_status(store: &ChecklistStore) -> Option<String> {
    store.status().get()
}

/// Persistable snapshot of the store (untracked)
pub fn store_snapshot(store: &ChecklistStore) -> FormState {
    FormState {
        checkboxes: store.checkboxes().get_untracked(),
        date: store.date().get_untracked(),
        signature: store.signature().get_untracked(),
    }
}

/// Number of checked items (tracked)
pub fn store_checked_count(store: &ChecklistStore) -> usize {
    store.checkboxes().read().iter().filter(|c| **c).count()
}
