//! Export Repairs
//!
//! Fix-ups applied to the exported manual before the checklist is built.
//! Each pass is independent; a failing pass is logged and skipped.

mod numbering;
mod personnel;
mod toc;

use web_sys::Document;

use crate::error::FormResult;

/// Run every pass in order
pub fn apply_all(document: &Document) {
    let passes: [(&str, fn(&Document) -> FormResult<usize>); 3] = [
        ("numbering", numbering::apply),
        ("toc", toc::apply),
        ("personnel", personnel::apply),
    ];
    for (name, pass) in passes {
        if let Err(err) = pass(document) {
            log::warn!("{} pass failed: {}", name, err);
        }
    }
}
