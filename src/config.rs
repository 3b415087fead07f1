//! Enhancer Configuration
//!
//! Defaults cover the lab manual export. A page can override any field with
//! a JSON object in `<script type="application/json" id="checklist-form-config">`.

use serde::Deserialize;

use crate::extract::Strategy;

const PDF_LIBRARY_URL: &str = "https://cdnjs.cloudflare.com/ajax/libs/jspdf/2.5.1/jspdf.umd.min.js";

/// Id of the optional inline config blob
pub const CONFIG_ELEMENT_ID: &str = "checklist-form-config";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Local storage slot holding the form state
    pub storage_key: String,
    /// Id of the interactive container; its presence means "already built"
    pub container_id: String,
    /// Extracted items with less visible text than this are noise
    pub min_item_len: usize,
    pub strategy: Strategy,
    /// Script loaded when `window.jspdf` is missing
    pub pdf_library_url: String,
    /// Recipient of the mail link (may be empty)
    pub mail_to: String,
    pub mail_subject: String,
    /// Delay between the download and opening the mail link
    pub mail_delay_ms: u32,
    pub file_prefix: String,
    pub certificate_title: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            storage_key: "onboarding-checklist-state".to_string(),
            container_id: "interactive-checklist".to_string(),
            min_item_len: 12,
            strategy: Strategy::NodeWalk,
            pdf_library_url: PDF_LIBRARY_URL.to_string(),
            mail_to: String::new(),
            mail_subject: "Onboarding Checklist Completed".to_string(),
            mail_delay_ms: 1000,
            file_prefix: "onboarding-checklist-".to_string(),
            certificate_title: "Lab Onboarding Checklist".to_string(),
        }
    }
}

impl FormConfig {
    /// Parse a config blob; unknown fields are ignored, missing ones defaulted
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Read the inline blob from the page, falling back to defaults
    pub fn from_document(document: &web_sys::Document) -> Self {
        let Some(raw) = document
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|el| el.text_content())
        else {
            return Self::default();
        };
        match Self::from_json(&raw) {
            Ok(config) => {
                log::debug!("using inline config from #{}", CONFIG_ELEMENT_ID);
                config
            }
            Err(err) => {
                log::warn!("ignoring malformed #{}: {}", CONFIG_ELEMENT_ID, err);
                Self::default()
            }
        }
    }
}
