//! Lab Manual Enhancer Entry Point
//!
//! Repairs the exported manual and turns its checklist into an interactive
//! form once the document has loaded.

mod builder;
mod certificate;
mod components;
mod config;
mod context;
mod error;
mod export;
mod extract;
mod locate;
mod mail;
mod models;
mod persistence;
mod postprocess;
mod store;

use log::LevelFilter;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Window};

use builder::ChecklistFormBuilder;
use config::FormConfig;

/// Global function returning the recent log lines, for bug reports
const LOG_DUMP_FN: &str = "checklistLog";

/// `document.readyState` before `DOMContentLoaded`
fn is_loading(ready_state: &str) -> bool {
    ready_state == "loading"
}

fn enhance(document: Document) {
    postprocess::apply_all(&document);

    let config = FormConfig::from_document(&document);
    match ChecklistFormBuilder::new(document, config).run() {
        Ok(outcome) => log::info!("{}", outcome),
        Err(err) => log::error!("checklist form not built: {}", err),
    }
}

fn expose_log_dump(window: &Window) {
    let dump = Closure::<dyn Fn() -> JsValue>::new(|| {
        JsValue::from_str(&console_logger::recent_lines().join("\n"))
    });
    if let Err(err) = js_sys::Reflect::set(window, &JsValue::from_str(LOG_DUMP_FN), dump.as_ref()) {
        log::warn!("{} not installed: {}", LOG_DUMP_FN, error::js_error_message(&err));
    }
    dump.forget();
}

fn main() {
    console_error_panic_hook::set_once();
    if let Err(err) = console_logger::init(LevelFilter::Info) {
        web_sys::console::warn_1(&format!("logger already set: {}", err).into());
    }

    let Some(window) = web_sys::window() else {
        return;
    };
    expose_log_dump(&window);
    let Some(document) = window.document() else {
        return;
    };

    if !is_loading(&document.ready_state()) {
        enhance(document);
        return;
    }

    let target = document.clone();
    let on_ready = Closure::once_into_js(move || enhance(target));
    let listening =
        document.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref());
    if let Err(err) = listening {
        log::error!("could not wait for the document: {}", error::js_error_message(&err));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_loading_state_waits() {
        assert!(is_loading("loading"));
        assert!(!is_loading("interactive"));
        assert!(!is_loading("complete"));
    }
}
