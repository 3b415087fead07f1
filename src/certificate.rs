//! Certificate Layout
//!
//! Export checks and the page layout of the completion certificate.
//! The layout is a list of drawing operations per page in millimetres
//! (A4 portrait); a renderer turns it into a real document.

use crate::error::ExportBlocked;
use crate::models::FormState;

pub const PAGE_WIDTH_MM: f64 = 210.0;
pub const PAGE_HEIGHT_MM: f64 = 297.0;
pub const MARGIN_MM: f64 = 20.0;

const TITLE_SIZE: f64 = 18.0;
const BODY_SIZE: f64 = 11.0;
const LABEL_SIZE: f64 = 9.0;
const PT_TO_MM: f64 = 0.3528;
const LINE_SPACING: f64 = 1.4;
/// Average Helvetica glyph width in em
const AVG_CHAR_WIDTH_EM: f64 = 0.5;
const CHECKBOX_MM: f64 = 4.0;
const ITEM_INDENT_MM: f64 = 8.0;
const ITEM_GAP_MM: f64 = 2.0;
const SIGNATURE_WIDTH_MM: f64 = 60.0;
const SIGNATURE_HEIGHT_MM: f64 = 22.5;
const FOOTER_OFFSET_MM: f64 = 10.0;
/// Lowest baseline usable by content, clear of the page number
const CONTENT_BOTTOM_MM: f64 = PAGE_HEIGHT_MM - MARGIN_MM;

const INTRO: &str = "I confirm that I have completed each of the following onboarding items:";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextAlign {
    Left,
    Center,
}

/// One drawing instruction; `y` of text is the baseline
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text { x: f64, y: f64, text: String, size: f64, bold: bool, align: TextAlign },
    Checkbox { x: f64, y: f64, size: f64, checked: bool },
    Image { data_url: String, x: f64, y: f64, width: f64, height: f64 },
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CertificateDocument {
    pub pages: Vec<Page>,
}

#[cfg(test)]
impl CertificateDocument {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(|p| p.ops.iter()).filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// True if `needle` occurs in any text line
    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t.contains(needle))
    }

    pub fn images(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|p| p.ops.iter())
            .filter(|op| matches!(op, DrawOp::Image { .. }))
            .count()
    }
}

/// What goes on the certificate
pub struct CertificateContent<'a> {
    pub title: &'a str,
    /// Plain-text items
    pub items: &'a [String],
    pub checked: &'a [bool],
    pub date: &'a str,
    /// Signature data URL
    pub signature: &'a str,
}

/// Export preconditions, checked in this order
pub fn validate_export(state: &FormState, has_signature: bool) -> Result<(), ExportBlocked> {
    if !state.all_checked() {
        return Err(ExportBlocked::IncompleteChecklist { unchecked: state.unchecked() });
    }
    if !has_signature {
        return Err(ExportBlocked::MissingSignature);
    }
    if state.date.trim().is_empty() {
        return Err(ExportBlocked::MissingDate);
    }
    Ok(())
}

pub fn certificate_file_name(prefix: &str, date: &str) -> String {
    format!("{}{}.pdf", prefix, date)
}

fn line_height(size: f64) -> f64 {
    size * PT_TO_MM * LINE_SPACING
}

/// Greedy word wrap using an average character width.
/// Words longer than a whole line are cut.
pub fn wrap_text(text: &str, max_width_mm: f64, size: f64) -> Vec<String> {
    let char_width = size * AVG_CHAR_WIDTH_EM * PT_TO_MM;
    let max_chars = ((max_width_mm / char_width).floor() as usize).max(1);

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Running page with a vertical cursor
struct PageBuilder {
    pages: Vec<Page>,
    current: Page,
    y: f64,
}

impl PageBuilder {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Page::default(),
            y: MARGIN_MM,
        }
    }

    /// Break the page unless `height` more millimetres fit
    fn reserve(&mut self, height: f64) {
        if self.y + height > CONTENT_BOTTOM_MM && !self.current.ops.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
            self.y = MARGIN_MM;
        }
    }

    fn push(&mut self, op: DrawOp) {
        self.current.ops.push(op);
    }

    fn text(&mut self, x: f64, text: &str, size: f64, bold: bool, align: TextAlign) {
        self.push(DrawOp::Text { x, y: self.y, text: text.to_string(), size, bold, align });
    }

    fn paragraph(&mut self, x: f64, width: f64, text: &str, size: f64) {
        for line in wrap_text(text, width, size) {
            self.reserve(line_height(size));
            self.y += line_height(size);
            self.text(x, &line, size, false, TextAlign::Left);
        }
    }

    /// Close the last page and number every page
    fn finish(mut self) -> Vec<Page> {
        self.pages.push(self.current);
        let total = self.pages.len();
        for (i, page) in self.pages.iter_mut().enumerate() {
            page.ops.push(DrawOp::Text {
                x: PAGE_WIDTH_MM / 2.0,
                y: PAGE_HEIGHT_MM - FOOTER_OFFSET_MM,
                text: format!("Page {} of {}", i + 1, total),
                size: LABEL_SIZE,
                bold: false,
                align: TextAlign::Center,
            });
        }
        self.pages
    }
}

pub fn layout_certificate(content: &CertificateContent) -> CertificateDocument {
    let content_width = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    let mut page = PageBuilder::new();

    page.y += line_height(TITLE_SIZE);
    page.text(PAGE_WIDTH_MM / 2.0, content.title, TITLE_SIZE, true, TextAlign::Center);
    page.y += line_height(BODY_SIZE);
    page.paragraph(MARGIN_MM, content_width, INTRO, BODY_SIZE);
    page.y += line_height(BODY_SIZE);

    let item_width = content_width - ITEM_INDENT_MM;
    for (i, item) in content.items.iter().enumerate() {
        let lines = wrap_text(item, item_width, BODY_SIZE);
        let block = lines.len() as f64 * line_height(BODY_SIZE) + ITEM_GAP_MM;
        page.reserve(block);

        let first_baseline = page.y + line_height(BODY_SIZE);
        page.push(DrawOp::Checkbox {
            x: MARGIN_MM,
            y: first_baseline - CHECKBOX_MM + 0.5,
            size: CHECKBOX_MM,
            checked: content.checked.get(i).copied().unwrap_or(false),
        });
        for line in &lines {
            page.y += line_height(BODY_SIZE);
            page.text(MARGIN_MM + ITEM_INDENT_MM, line, BODY_SIZE, false, TextAlign::Left);
        }
        page.y += ITEM_GAP_MM;
    }

    // Signature image, line and label, then date, line and label
    let signature_block = SIGNATURE_HEIGHT_MM + 4.0 * line_height(BODY_SIZE) + 16.0;
    page.y += line_height(BODY_SIZE);
    page.reserve(signature_block);

    if !content.signature.is_empty() {
        page.push(DrawOp::Image {
            data_url: content.signature.to_string(),
            x: MARGIN_MM,
            y: page.y,
            width: SIGNATURE_WIDTH_MM,
            height: SIGNATURE_HEIGHT_MM,
        });
    }
    page.y += SIGNATURE_HEIGHT_MM + 1.0;
    let line_end = MARGIN_MM + SIGNATURE_WIDTH_MM + 20.0;
    page.push(DrawOp::Line { x1: MARGIN_MM, y1: page.y, x2: line_end, y2: page.y });
    page.y += line_height(LABEL_SIZE);
    page.text(MARGIN_MM, "Signature", LABEL_SIZE, false, TextAlign::Left);

    page.y += 2.0 * line_height(BODY_SIZE);
    page.text(MARGIN_MM, content.date, BODY_SIZE, false, TextAlign::Left);
    page.y += 1.5;
    page.push(DrawOp::Line { x1: MARGIN_MM, y1: page.y, x2: line_end, y2: page.y });
    page.y += line_height(LABEL_SIZE);
    page.text(MARGIN_MM, "Date", LABEL_SIZE, false, TextAlign::Left);

    CertificateDocument { pages: page.finish() }
}

/// Visible text of an item's HTML
pub fn plain_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    let decoded = out
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(checkboxes: Vec<bool>, date: &str) -> FormState {
        FormState {
            checkboxes,
            date: date.to_string(),
            signature: String::new(),
        }
    }

    #[test]
    fn test_export_blocked_by_unchecked_item() {
        let s = state(vec![true, true, false, true, true], "2024-05-01");
        assert_eq!(
            validate_export(&s, true),
            Err(ExportBlocked::IncompleteChecklist { unchecked: vec![2] })
        );
    }

    #[test]
    fn test_checklist_checked_before_signature() {
        let s = state(vec![false], "");
        assert!(matches!(
            validate_export(&s, false),
            Err(ExportBlocked::IncompleteChecklist { .. })
        ));
    }

    #[test]
    fn test_export_blocked_by_blank_signature() {
        let s = state(vec![true, true, true], "2024-05-01");
        assert_eq!(validate_export(&s, false), Err(ExportBlocked::MissingSignature));
    }

    #[test]
    fn test_export_blocked_by_missing_date() {
        let s = state(vec![true], "  ");
        assert_eq!(validate_export(&s, true), Err(ExportBlocked::MissingDate));
    }

    #[test]
    fn test_export_allowed() {
        let s = state(vec![true, true], "2024-05-01");
        assert_eq!(validate_export(&s, true), Ok(()));
    }

    #[test]
    fn test_three_item_certificate() {
        let items = vec![
            "Read the handbook.".to_string(),
            "Meet with advisor.".to_string(),
            "Set up environment.".to_string(),
        ];
        let checked = vec![true; 3];
        let doc = layout_certificate(&CertificateContent {
            title: "Lab Onboarding Checklist",
            items: &items,
            checked: &checked,
            date: "2024-05-01",
            signature: "data:image/png;base64,AAAA",
        });

        for item in &items {
            assert!(doc.contains_text(item), "missing {}", item);
        }
        assert_eq!(doc.images(), 1);
        assert!(doc.texts().any(|t| t == "2024-05-01"));
        assert!(doc.contains_text("Page 1 of"));
        let boxes = doc
            .pages
            .iter()
            .flat_map(|p| p.ops.iter())
            .filter(|op| matches!(op, DrawOp::Checkbox { checked: true, .. }))
            .count();
        assert_eq!(boxes, 3);
    }

    #[test]
    fn test_long_checklist_paginates() {
        let items: Vec<String> = (0..60)
            .map(|i| {
                format!("Checklist item number {} with a reasonably long description that wraps", i)
            })
            .collect();
        let checked = vec![true; items.len()];
        let doc = layout_certificate(&CertificateContent {
            title: "Certificate",
            items: &items,
            checked: &checked,
            date: "2024-05-01",
            signature: "data:image/png;base64,AAAA",
        });

        let total = doc.pages.len();
        assert!(total > 1);
        for (i, page) in doc.pages.iter().enumerate() {
            let footer = format!("Page {} of {}", i + 1, total);
            let has_footer = page
                .ops
                .iter()
                .any(|op| matches!(op, DrawOp::Text { text, .. } if *text == footer));
            assert!(has_footer);
            for op in &page.ops {
                if let DrawOp::Text { y, text, .. } = op {
                    if !text.starts_with("Page ") {
                        assert!(*y <= CONTENT_BOTTOM_MM, "{} overflows at {}", text, y);
                    }
                }
            }
        }
        assert!(doc.contains_text("number 59"));
    }

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("alpha beta gamma delta epsilon", 10.0, 11.0);
        // 10mm at 11pt is 5 characters per line
        assert_eq!(lines, vec!["alpha", "beta", "gamma", "delta", "epsil", "on"]);
        assert!(wrap_text("   ", 50.0, 11.0).is_empty());
    }

    #[test]
    fn test_wrap_keeps_short_text_on_one_line() {
        assert_eq!(wrap_text("Read the handbook.", 162.0, 11.0), vec!["Read the handbook."]);
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(
            plain_text("Read the <em>lab&nbsp;handbook</em> &amp; notes"),
            "Read the lab handbook & notes"
        );
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            certificate_file_name("onboarding-checklist-", "2024-05-01"),
            "onboarding-checklist-2024-05-01.pdf"
        );
    }
}
