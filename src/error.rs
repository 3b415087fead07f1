//! Error Types
//!
//! Internal failures of the enhancer and the user-facing export checks.

use wasm_bindgen::JsValue;

/// Result type for DOM, storage and library plumbing
pub type FormResult<T> = Result<T, FormError>;

/// Internal errors; none of them is fatal to the host page
#[derive(Debug, Clone, PartialEq)]
pub enum FormError {
    Dom(String),
    Storage(String),
    Serialization(String),
    PdfLibrary(String),
}

impl std::fmt::Display for FormError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormError::Dom(msg) => write!(f, "DOM error: {}", msg),
            FormError::Storage(msg) => write!(f, "Storage error: {}", msg),
            FormError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            FormError::PdfLibrary(msg) => write!(f, "PDF library error: {}", msg),
        }
    }
}

impl std::error::Error for FormError {}

impl From<JsValue> for FormError {
    fn from(value: JsValue) -> Self {
        FormError::Dom(js_error_message(&value))
    }
}

impl From<serde_json::Error> for FormError {
    fn from(err: serde_json::Error) -> Self {
        FormError::Serialization(err.to_string())
    }
}

/// Best-effort text of a thrown JS value
pub fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(value, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", value))
}

/// Why a certificate export was refused
#[derive(Debug, Clone, PartialEq)]
pub enum ExportBlocked {
    /// Zero-based indices of unchecked items
    IncompleteChecklist { unchecked: Vec<usize> },
    MissingSignature,
    MissingDate,
}

impl std::fmt::Display for ExportBlocked {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportBlocked::IncompleteChecklist { unchecked } => {
                let numbers: Vec<String> = unchecked.iter().map(|i| (i + 1).to_string()).collect();
                write!(
                    f,
                    "Please complete all checklist items before downloading the certificate \
                     (still open: {}).",
                    numbers.join(", ")
                )
            }
            ExportBlocked::MissingSignature => {
                write!(f, "Please sign in the signature box before downloading the certificate.")
            }
            ExportBlocked::MissingDate => {
                write!(f, "Please enter the date before downloading the certificate.")
            }
        }
    }
}

impl std::error::Error for ExportBlocked {}
