//! Signature Field Component
//!
//! Canvas signature pad with a clear button.

use leptos::html::Canvas;
use leptos::prelude::*;
use signature_pad::{bind_canvas_listeners, CanvasSurface, SignaturePad};

use crate::context::use_form_context;
use crate::error::js_error_message;

#[component]
pub fn SignatureField(
    /// Shared with the export button, which samples the pixels
    canvas_ref: NodeRef<Canvas>,
) -> impl IntoView {
    let ctx = use_form_context();
    let saved = ctx.snapshot().signature;

    let on_commit = {
        let ctx = ctx.clone();
        Callback::new(move |data_url: String| ctx.set_signature(data_url))
    };

    // Bind the pad once the canvas is in the DOM
    Effect::new(move |_| {
        let Some(canvas) = canvas_ref.get() else {
            return;
        };
        let surface = match CanvasSurface::new(canvas) {
            Ok(surface) => surface,
            Err(err) => {
                log::warn!("signature pad unavailable: {}", js_error_message(&err));
                return;
            }
        };
        if !saved.is_empty() {
            if let Err(err) = surface.draw_data_url(&saved) {
                log::warn!("saved signature not restored: {}", js_error_message(&err));
            }
        }
        if let Err(err) = bind_canvas_listeners(SignaturePad::shared(surface), on_commit) {
            log::warn!("signature listeners not bound: {}", js_error_message(&err));
        }
    });

    let on_clear = move |_| {
        if let Some(surface) = canvas_ref.get_untracked().and_then(|c| CanvasSurface::new(c).ok()) {
            SignaturePad::new(surface).clear();
        }
        ctx.set_signature(String::new());
    };

    view! {
        <div class="signature-field">
            <span class="signature-label">"Signature"</span>
            <canvas
                node_ref=canvas_ref
                class="signature-pad"
                width="400"
                height="150"
                style="border: 1px solid #999; touch-action: none; max-width: 100%;"
            ></canvas>
            <button type="button" class="signature-clear" on:click=on_clear>
                "Clear signature"
            </button>
        </div>
    }
}
