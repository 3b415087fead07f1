//! Checklist Item Row Component
//!
//! One checkbox with its item label.

use leptos::prelude::*;

use crate::context::use_form_context;
use crate::models::ChecklistItem;
use crate::store::store_is_checked;

/// A single checklist row; checking it marks the row completed and saves
#[component]
pub fn ChecklistItemRow(item: ChecklistItem) -> impl IntoView {
    let ctx = use_form_context();
    let store = ctx.store;
    let index = item.index;
    let input_id = format!("checklist-item-{}", index);
    let checked = move || store_is_checked(&store, index);

    view! {
        <li class=move || if checked() { "checklist-item completed" } else { "checklist-item" }>
            <input
                type="checkbox"
                id=input_id.clone()
                prop:checked=checked
                on:change=move |ev| ctx.set_checked(index, event_target_checked(&ev))
            />
            // Item text may carry inline markup from the document
            <label for=input_id inner_html=item.text></label>
        </li>
    }
}
