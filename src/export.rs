//! Certificate Export
//!
//! Loads the PDF library (jsPDF) on demand, renders the certificate layout,
//! triggers the download and then opens a prefilled mail link. If the
//! library cannot be loaded the user is offered the print dialog instead.

use std::sync::Arc;

use js_sys::{Array, Function, Promise, Reflect};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlScriptElement;

use crate::certificate::{
    certificate_file_name, layout_certificate, CertificateContent, CertificateDocument, DrawOp,
    TextAlign,
};
use crate::config::FormConfig;
use crate::error::{js_error_message, FormError, FormResult};
use crate::mail::{certificate_mail_body, mailto_link, printed_mail_body};
use crate::models::FormState;

const PRINT_PROMPT: &str = "The PDF generator could not be loaded.\n\n\
Open the print dialog instead? Choose \"Save as PDF\" and attach the saved file \
to the email that opens afterwards.";

/// Result of the dynamic library load
#[derive(Debug)]
pub enum LibraryStatus<L> {
    Ready(L),
    Failed(String),
}

/// Everything an export needs, captured at click time
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub title: String,
    /// Plain-text items
    pub items: Vec<String>,
    pub state: FormState,
    pub file_prefix: String,
    pub mail_to: String,
    pub mail_subject: String,
}

impl ExportRequest {
    pub fn new(config: &FormConfig, items: Vec<String>, state: FormState) -> Self {
        Self {
            title: config.certificate_title.clone(),
            items,
            state,
            file_prefix: config.file_prefix.clone(),
            mail_to: config.mail_to.clone(),
            mail_subject: config.mail_subject.clone(),
        }
    }

    pub fn file_name(&self) -> String {
        certificate_file_name(&self.file_prefix, &self.state.date)
    }

    pub fn certificate(&self) -> CertificateDocument {
        layout_certificate(&CertificateContent {
            title: &self.title,
            items: &self.items,
            checked: &self.state.checkboxes,
            date: &self.state.date,
            signature: &self.state.signature,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportKind {
    Downloaded { file_name: String },
    Printed,
    Cancelled,
}

/// What happened, and the mail link still to be opened
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    pub kind: ExportKind,
    pub mail_link: Option<String>,
}

/// Browser capabilities used by an export
pub trait ExportHost {
    type Library;

    /// Render and download the document
    fn render(
        &self,
        library: &Self::Library,
        doc: &CertificateDocument,
        file_name: &str,
    ) -> FormResult<()>;
    fn confirm(&self, message: &str) -> bool;
    fn print(&self);
}

/// Finish an export once the library load has settled
pub fn complete_export<H: ExportHost>(
    host: &H,
    status: LibraryStatus<H::Library>,
    request: &ExportRequest,
) -> ExportOutcome {
    match status {
        LibraryStatus::Ready(library) => {
            let file_name = request.file_name();
            match host.render(&library, &request.certificate(), &file_name) {
                Ok(()) => {
                    log::info!("certificate downloaded as {}", file_name);
                    let body = certificate_mail_body(
                        &file_name,
                        &request.state.date,
                        request.items.len(),
                    );
                    let link = mailto_link(&request.mail_to, &request.mail_subject, &body);
                    return ExportOutcome {
                        mail_link: Some(link),
                        kind: ExportKind::Downloaded { file_name },
                    };
                }
                Err(err) => log::warn!("certificate rendering failed: {}", err),
            }
        }
        LibraryStatus::Failed(reason) => log::warn!("PDF library unavailable: {}", reason),
    }
    print_fallback(host, request)
}

fn print_fallback<H: ExportHost>(host: &H, request: &ExportRequest) -> ExportOutcome {
    if !host.confirm(PRINT_PROMPT) {
        log::info!("print fallback declined");
        return ExportOutcome { kind: ExportKind::Cancelled, mail_link: None };
    }
    host.print();
    let body = printed_mail_body(&request.state.date, request.items.len());
    ExportOutcome {
        kind: ExportKind::Printed,
        mail_link: Some(mailto_link(&request.mail_to, &request.mail_subject, &body)),
    }
}

// ========================
// Browser side
// ========================

/// `window.jspdf.jsPDF`, if the UMD bundle is present
fn find_constructor(window: &web_sys::Window) -> Option<Function> {
    let namespace = Reflect::get(window, &JsValue::from_str("jspdf")).ok()?;
    if namespace.is_undefined() || namespace.is_null() {
        return None;
    }
    Reflect::get(&namespace, &JsValue::from_str("jsPDF"))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

/// Append a `<script>` and wait for its load or error event
async fn inject_script(document: &web_sys::Document, url: &str) -> FormResult<()> {
    let script = document
        .create_element("script")?
        .dyn_into::<HtmlScriptElement>()
        .map_err(|_| FormError::Dom("could not create script element".to_string()))?;
    script.set_src(url);
    script.set_async(true);

    let settled = Promise::new(&mut |resolve, reject| {
        script.set_onload(Some(&resolve));
        script.set_onerror(Some(&reject));
    });
    let parent = document
        .body()
        .ok_or_else(|| FormError::Dom("document has no body".to_string()))?;
    parent.append_child(&script)?;

    JsFuture::from(settled)
        .await
        .map(|_| ())
        .map_err(|e| {
            FormError::PdfLibrary(format!("failed to load {}: {}", url, js_error_message(&e)))
        })
}

/// Reuse or fetch the PDF library
pub async fn load_pdf_library(url: &str) -> LibraryStatus<Function> {
    let Some(window) = web_sys::window() else {
        return LibraryStatus::Failed("no window".to_string());
    };
    if let Some(ctor) = find_constructor(&window) {
        return LibraryStatus::Ready(ctor);
    }
    let Some(document) = window.document() else {
        return LibraryStatus::Failed("no document".to_string());
    };

    log::info!("loading PDF library from {}", url);
    if let Err(err) = inject_script(&document, url).await {
        return LibraryStatus::Failed(err.to_string());
    }
    match find_constructor(&window) {
        Some(ctor) => LibraryStatus::Ready(ctor),
        None => {
            LibraryStatus::Failed("script loaded but window.jspdf.jsPDF is missing".to_string())
        }
    }
}

#[derive(Serialize)]
struct JsPdfOptions {
    orientation: &'static str,
    unit: &'static str,
    format: &'static str,
}

#[derive(Serialize)]
struct TextOptions {
    align: &'static str,
}

fn to_js<T: Serialize>(value: &T) -> FormResult<JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| FormError::Serialization(e.to_string()))
}

fn call(target: &JsValue, method: &str, args: &[JsValue]) -> FormResult<JsValue> {
    let function: Function = Reflect::get(target, &JsValue::from_str(method))?.dyn_into()?;
    let args: Array = args.iter().collect();
    Ok(function.apply(target, &args)?)
}

fn num(value: f64) -> JsValue {
    JsValue::from_f64(value)
}

fn draw_op(pdf: &JsValue, op: &DrawOp) -> FormResult<()> {
    match op {
        DrawOp::Text { x, y, text, size, bold, align } => {
            call(pdf, "setFontSize", &[num(*size)])?;
            let style = if *bold { "bold" } else { "normal" };
            call(pdf, "setFont", &["helvetica".into(), style.into()])?;
            let mut args = vec![JsValue::from_str(text), num(*x), num(*y)];
            if *align == TextAlign::Center {
                args.push(to_js(&TextOptions { align: "center" })?);
            }
            call(pdf, "text", &args)?;
        }
        DrawOp::Checkbox { x, y, size, checked } => {
            call(pdf, "rect", &[num(*x), num(*y), num(*size), num(*size)])?;
            if *checked {
                let (mid_x, bottom) = (x + size * 0.4, y + size - 0.8);
                call(pdf, "line", &[num(x + 0.8), num(y + size * 0.55), num(mid_x), num(bottom)])?;
                call(pdf, "line", &[num(mid_x), num(bottom), num(x + size - 0.6), num(y + 0.7)])?;
            }
        }
        DrawOp::Image { data_url, x, y, width, height } => {
            call(
                pdf,
                "addImage",
                &[
                    data_url.as_str().into(),
                    "PNG".into(),
                    num(*x),
                    num(*y),
                    num(*width),
                    num(*height),
                ],
            )?;
        }
        DrawOp::Line { x1, y1, x2, y2 } => {
            call(pdf, "line", &[num(*x1), num(*y1), num(*x2), num(*y2)])?;
        }
    }
    Ok(())
}

/// Drives a jsPDF instance and saves it, which starts the download
pub fn render_with_jspdf(
    ctor: &Function,
    doc: &CertificateDocument,
    file_name: &str,
) -> FormResult<()> {
    let options = to_js(&JsPdfOptions { orientation: "portrait", unit: "mm", format: "a4" })?;
    let pdf = Reflect::construct(ctor, &Array::of1(&options))?;
    for (i, page) in doc.pages.iter().enumerate() {
        if i > 0 {
            call(&pdf, "addPage", &[])?;
        }
        for op in &page.ops {
            draw_op(&pdf, op)?;
        }
    }
    call(&pdf, "save", &[JsValue::from_str(file_name)])?;
    Ok(())
}

/// The real window
pub struct BrowserHost {
    window: web_sys::Window,
}

impl BrowserHost {
    pub fn new() -> FormResult<Self> {
        let window = web_sys::window().ok_or_else(|| FormError::Dom("no window".to_string()))?;
        Ok(Self { window })
    }

    pub fn alert(&self, message: &str) {
        if let Err(err) = self.window.alert_with_message(message) {
            log::warn!("alert failed: {}", js_error_message(&err));
        }
    }

    pub fn open_link(&self, link: &str) {
        if let Err(err) = self.window.location().set_href(link) {
            log::warn!("could not open mail link: {}", js_error_message(&err));
        }
    }
}

impl ExportHost for BrowserHost {
    type Library = Function;

    fn render(
        &self,
        library: &Function,
        doc: &CertificateDocument,
        file_name: &str,
    ) -> FormResult<()> {
        render_with_jspdf(library, doc, file_name)
    }

    fn confirm(&self, message: &str) -> bool {
        self.window.confirm_with_message(message).unwrap_or(false)
    }

    fn print(&self) {
        if let Err(err) = self.window.print() {
            log::warn!("print dialog failed: {}", js_error_message(&err));
        }
    }
}

/// Full export: load, render or print, then open the mail link
pub async fn export_certificate(
    config: Arc<FormConfig>,
    request: ExportRequest,
) -> FormResult<ExportKind> {
    let host = BrowserHost::new()?;
    let status = load_pdf_library(&config.pdf_library_url).await;
    let outcome = complete_export(&host, status, &request);

    if let Some(link) = outcome.mail_link.as_deref() {
        if matches!(outcome.kind, ExportKind::Downloaded { .. }) {
            // Let the download start before the page navigates to the mail client
            gloo_timers::future::TimeoutFuture::new(config.mail_delay_ms).await;
        }
        host.open_link(link);
    }
    Ok(outcome.kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct RecordingHost {
        render_result: FormResult<()>,
        confirm_answer: bool,
        events: RefCell<Vec<String>>,
        rendered: RefCell<Option<CertificateDocument>>,
    }

    impl RecordingHost {
        fn new(render_result: FormResult<()>, confirm_answer: bool) -> Self {
            Self {
                render_result,
                confirm_answer,
                events: RefCell::new(Vec::new()),
                rendered: RefCell::new(None),
            }
        }

        fn events(&self) -> Vec<String> {
            self.events.borrow().clone()
        }
    }

    impl ExportHost for RecordingHost {
        type Library = ();

        fn render(
            &self,
            _library: &(),
            doc: &CertificateDocument,
            file_name: &str,
        ) -> FormResult<()> {
            self.events.borrow_mut().push(format!("render {}", file_name));
            *self.rendered.borrow_mut() = Some(doc.clone());
            self.render_result.clone()
        }

        fn confirm(&self, _message: &str) -> bool {
            self.events.borrow_mut().push("confirm".to_string());
            self.confirm_answer
        }

        fn print(&self) {
            self.events.borrow_mut().push("print".to_string());
        }
    }

    fn request() -> ExportRequest {
        let config = FormConfig {
            mail_to: "lab@example.org".to_string(),
            ..FormConfig::default()
        };
        ExportRequest::new(
            &config,
            vec![
                "Read the handbook.".to_string(),
                "Meet with advisor.".to_string(),
                "Set up environment.".to_string(),
            ],
            FormState {
                checkboxes: vec![true; 3],
                date: "2024-05-01".to_string(),
                signature: "data:image/png;base64,AAAA".to_string(),
            },
        )
    }

    #[test]
    fn test_ready_library_downloads_then_mails() {
        let host = RecordingHost::new(Ok(()), true);
        let outcome = complete_export(&host, LibraryStatus::Ready(()), &request());

        assert_eq!(
            outcome.kind,
            ExportKind::Downloaded { file_name: "onboarding-checklist-2024-05-01.pdf".to_string() }
        );
        assert_eq!(host.events(), vec!["render onboarding-checklist-2024-05-01.pdf"]);
        let link = outcome.mail_link.unwrap();
        let expected = "mailto:lab@example.org?subject=Onboarding%20Checklist%20Completed";
        assert!(link.starts_with(expected));
        assert!(link.contains("onboarding%2Dchecklist%2D2024%2D05%2D01%2Epdf"));

        let doc = host.rendered.borrow().clone().unwrap();
        assert!(doc.contains_text("Meet with advisor."));
        assert!(doc.contains_text("2024-05-01"));
    }

    #[test]
    fn test_failed_library_falls_back_to_print() {
        let host = RecordingHost::new(Ok(()), true);
        let status = LibraryStatus::Failed("network".to_string());
        let outcome = complete_export(&host, status, &request());

        assert_eq!(outcome.kind, ExportKind::Printed);
        assert_eq!(host.events(), vec!["confirm", "print"]);
        assert!(outcome.mail_link.unwrap().contains("printed"));
    }

    #[test]
    fn test_declined_print_does_nothing() {
        let host = RecordingHost::new(Ok(()), false);
        let status = LibraryStatus::Failed("network".to_string());
        let outcome = complete_export(&host, status, &request());

        assert_eq!(outcome, ExportOutcome { kind: ExportKind::Cancelled, mail_link: None });
        assert_eq!(host.events(), vec!["confirm"]);
    }

    #[test]
    fn test_render_error_falls_back_to_print() {
        let failure = FormError::PdfLibrary("addImage failed".to_string());
        let host = RecordingHost::new(Err(failure), true);
        let outcome = complete_export(&host, LibraryStatus::Ready(()), &request());

        assert_eq!(outcome.kind, ExportKind::Printed);
        assert_eq!(
            host.events(),
            vec!["render onboarding-checklist-2024-05-01.pdf", "confirm", "print"]
        );
    }
}
