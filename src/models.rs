//! Frontend Models
//!
//! Checklist items and the persisted form state.

use serde::{Deserialize, Serialize};

/// One checklist entry recovered from the static document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// Position in the checklist, also the key into `FormState::checkboxes`
    pub index: usize,
    /// Item content, HTML-safe (may carry inline markup)
    pub text: String,
    pub checked: bool,
}

/// Form state kept in local storage
///
/// The JSON shape is `{checkboxes: bool[], date: string, signature: string}`.
/// There is no version field; records that do not match are discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    /// Parallel to the checklist items by position
    pub checkboxes: Vec<bool>,
    /// ISO-8601 date (YYYY-MM-DD), may be empty if the user cleared it
    pub date: String,
    /// PNG data URL of the signature, empty when blank
    pub signature: String,
}

impl FormState {
    /// Default state: nothing checked, given date, no signature
    pub fn blank(item_count: usize, today: &str) -> Self {
        Self {
            checkboxes: vec![false; item_count],
            date: today.to_string(),
            signature: String::new(),
        }
    }

    /// Fit the checkbox array to the current item count.
    /// Missing entries are unchecked, surplus entries dropped.
    pub fn fit_to(mut self, item_count: usize) -> Self {
        self.checkboxes.resize(item_count, false);
        self
    }

    pub fn all_checked(&self) -> bool {
        self.checkboxes.iter().all(|c| *c)
    }

    /// Indices of items that are still unchecked
    pub fn unchecked(&self) -> Vec<usize> {
        self.checkboxes
            .iter()
            .enumerate()
            .filter(|(_, checked)| !**checked)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Today's date in the user's time zone, ISO-8601
pub fn today_iso() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}
