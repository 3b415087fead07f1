//! Checklist Form Component
//!
//! Interactive replacement for the static checklist: item rows, signature,
//! date and the certificate export button.

use leptos::html::Canvas;
use leptos::prelude::*;
use leptos::task::spawn_local;
use signature_pad::{CanvasSurface, SignaturePad};

use crate::certificate::{plain_text, validate_export};
use crate::components::{ChecklistItemRow, SignatureField};
use crate::context::{use_form_context, FormContext};
use crate::export::{export_certificate, BrowserHost, ExportKind, ExportRequest};
use crate::store::{store_checked_count, store_date, store_status};

#[component]
pub fn ChecklistForm() -> impl IntoView {
    let ctx = use_form_context();
    let store = ctx.store;
    let canvas_ref = NodeRef::<Canvas>::new();
    let total = ctx.items.len();

    let rows = ctx
        .items
        .iter()
        .cloned()
        .map(|item| view! { <ChecklistItemRow item=item /> })
        .collect_view();

    let on_date = {
        let ctx = ctx.clone();
        move |ev| ctx.set_date(event_target_value(&ev))
    };
    let on_export = move |_| start_export(&ctx, canvas_ref);

    view! {
        <section class="checklist-form">
            <p class="checklist-progress">
                {move || format!("{} of {} completed", store_checked_count(&store), total)}
            </p>
            <ul class="checklist-items">{rows}</ul>
            <SignatureField canvas_ref=canvas_ref />
            <div class="checklist-date">
                <label for="checklist-date">"Date"</label>
                <input
                    type="date"
                    id="checklist-date"
                    prop:value=move || store_date(&store)
                    on:change=on_date
                />
            </div>
            <button type="button" class="checklist-export" on:click=on_export>
                "Download certificate and email"
            </button>
            <p class="checklist-status">{move || store_status(&store).unwrap_or_default()}</p>
        </section>
    }
}

/// Validate, then run the export in the background
fn start_export(ctx: &FormContext, canvas_ref: NodeRef<Canvas>) {
    let mut state = ctx.snapshot();
    let pad = canvas_ref
        .get_untracked()
        .and_then(|canvas| CanvasSurface::new(canvas).ok())
        .map(SignaturePad::new);
    let has_signature = pad.as_ref().map(|p| p.has_signature()).unwrap_or(false);

    if let Err(blocked) = validate_export(&state, has_signature) {
        let message = blocked.to_string();
        if let Ok(host) = BrowserHost::new() {
            host.alert(&message);
        }
        ctx.set_status(Some(message));
        return;
    }

    // The canvas is authoritative for the image
    if let Some(pad) = pad {
        state.signature = pad.data_url();
    }
    let items = ctx.items.iter().map(|item| plain_text(&item.text)).collect();
    let request = ExportRequest::new(&ctx.config, items, state);
    let config = ctx.config.clone();
    let ctx = ctx.clone();

    ctx.set_status(Some("Preparing certificate…".to_string()));
    spawn_local(async move {
        match export_certificate(config, request).await {
            Ok(ExportKind::Downloaded { file_name }) => {
                ctx.set_status(Some(format!(
                    "Certificate saved as {}. Opening your mail client…",
                    file_name
                )));
            }
            Ok(ExportKind::Printed) => {
                let hint = "Save the printed page as PDF and attach it to the email.";
                ctx.set_status(Some(hint.to_string()));
            }
            Ok(ExportKind::Cancelled) => ctx.set_status(None),
            Err(err) => {
                log::warn!("certificate export failed: {}", err);
                ctx.set_status(Some(format!("Export failed: {}", err)));
            }
        }
    });
}
