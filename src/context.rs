//! Form Context
//!
//! Shared state provided via Leptos Context API.

use std::sync::Arc;

use leptos::prelude::*;

use crate::config::FormConfig;
use crate::models::{ChecklistItem, FormState};
use crate::persistence::{save_state, StateStore};
use crate::store::{
    store_set_checked, store_set_date, store_set_signature, store_set_status, store_snapshot,
    ChecklistStore,
};

/// Form-wide state provided to every component
#[derive(Clone)]
pub struct FormContext {
    pub store: ChecklistStore,
    pub items: Arc<Vec<ChecklistItem>>,
    pub config: Arc<FormConfig>,
    persistence: Arc<dyn StateStore>,
}

impl FormContext {
    pub fn new(
        store: ChecklistStore,
        items: Vec<ChecklistItem>,
        config: Arc<FormConfig>,
        persistence: Arc<dyn StateStore>,
    ) -> Self {
        Self {
            store,
            items: Arc::new(items),
            config,
            persistence,
        }
    }

    /// Checkbox changed
    pub fn set_checked(&self, index: usize, checked: bool) {
        store_set_checked(&self.store, index, checked);
        self.persist();
    }

    /// Date field changed
    pub fn set_date(&self, date: String) {
        store_set_date(&self.store, date);
        self.persist();
    }

    /// Stroke ended or signature cleared
    pub fn set_signature(&self, data_url: String) {
        store_set_signature(&self.store, data_url);
        self.persist();
    }

    pub fn set_status(&self, message: Option<String>) {
        store_set_status(&self.store, message);
    }

    pub fn snapshot(&self) -> FormState {
        store_snapshot(&self.store)
    }

    /// Best-effort write of the current state
    pub fn persist(&self) {
        save_state(self.persistence.as_ref(), &self.snapshot());
    }
}

/// Get the form context
pub fn use_form_context() -> FormContext {
    expect_context::<FormContext>()
}
