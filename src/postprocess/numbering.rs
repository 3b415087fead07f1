//! Enumeration Renumbering
//!
//! Some exported enumerations repeat `1.` on every entry or restart midway.
//! Numeric labels are rewritten to run 1, 2, 3, keeping their decoration.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

use crate::error::FormResult;

/// Lists whose labels are rendered as text by the export
const ENUM_LIST_SELECTOR: &str = "dl.enumerate, dl.enumerate-enumitem";
/// Labels inside ordinary lists
const LABEL_SPAN_SELECTOR: &str = "ol > li > .enumerate-label, ol > li > .label";

/// A numeric label split into decoration and value, e.g. `(` `3` `)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumLabel {
    pub prefix: String,
    pub number: u32,
    pub suffix: String,
}

impl EnumLabel {
    pub fn with_number(&self, number: u32) -> String {
        format!("{}{}{}", self.prefix, number, self.suffix)
    }
}

/// `None` for anything that is not a decorated arabic number
pub fn parse_label(label: &str) -> Option<EnumLabel> {
    let label = label.trim();
    let start = label.find(|c: char| c.is_ascii_digit())?;
    let (prefix, rest) = label.split_at(start);
    let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let (digits, suffix) = rest.split_at(end);

    let decoration = |s: &str, allowed: &[char]| s.chars().all(|c| allowed.contains(&c));
    if !decoration(prefix, &['(', '[']) || !decoration(suffix, &['.', ')', ']']) {
        return None;
    }
    Some(EnumLabel {
        prefix: prefix.to_string(),
        number: digits.parse().ok()?,
        suffix: suffix.to_string(),
    })
}

/// New labels, or `None` when the list is already sequential or not numeric
pub fn renumber(labels: &[String]) -> Option<Vec<String>> {
    let parsed: Vec<EnumLabel> = labels.iter().map(|l| parse_label(l)).collect::<Option<_>>()?;
    let sequential = parsed.iter().zip(1u32..).all(|(label, n)| label.number == n);
    if sequential {
        return None;
    }
    Some(parsed.iter().zip(1u32..).map(|(label, n)| label.with_number(n)).collect())
}

fn rewrite(labels: &[Element]) -> bool {
    let texts: Vec<String> = labels.iter().map(|e| e.text_content().unwrap_or_default()).collect();
    match renumber(&texts) {
        Some(new_labels) => {
            for (element, text) in labels.iter().zip(new_labels) {
                element.set_text_content(Some(&text));
            }
            true
        }
        None => false,
    }
}

fn direct_children(parent: &Element, tag: &str) -> Vec<Element> {
    let children = parent.children();
    (0..children.length())
        .filter_map(|i| children.item(i))
        .filter(|child| child.tag_name().eq_ignore_ascii_case(tag))
        .collect()
}

/// Renumber every broken enumeration; returns how many lists changed
pub fn apply(document: &Document) -> FormResult<usize> {
    let mut changed = 0;

    let lists = document.query_selector_all(ENUM_LIST_SELECTOR)?;
    for i in 0..lists.length() {
        let Some(list) = lists.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        if rewrite(&direct_children(&list, "dt")) {
            changed += 1;
        }
    }

    // Label spans are grouped by their list
    let ordered = document.query_selector_all("ol")?;
    for i in 0..ordered.length() {
        let Some(list) = ordered.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        let spans = list.query_selector_all(LABEL_SPAN_SELECTOR)?;
        let labels: Vec<Element> = (0..spans.length())
            .filter_map(|j| spans.item(j))
            .filter_map(|n| n.dyn_into::<Element>().ok())
            .filter(|span| {
                span.parent_element().and_then(|li| li.parent_element()).as_ref() == Some(&list)
            })
            .collect();
        if !labels.is_empty() && rewrite(&labels) {
            changed += 1;
        }
    }

    if changed > 0 {
        log::info!("renumbered {} enumeration(s)", changed);
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(
            parse_label(" (12) "),
            Some(EnumLabel { prefix: "(".into(), number: 12, suffix: ")".into() })
        );
        assert_eq!(parse_label("3.").map(|l| l.number), Some(3));
        assert_eq!(parse_label("a."), None);
        assert_eq!(parse_label("iv)"), None);
        assert_eq!(parse_label("Step 2"), None);
        assert_eq!(parse_label("•"), None);
    }

    #[test]
    fn test_repeated_ones_are_renumbered() {
        let out = renumber(&labels(&["1.", "1.", "1."]));
        assert_eq!(out, Some(labels(&["1.", "2.", "3."])));
    }

    #[test]
    fn test_restart_keeps_decoration() {
        let out = renumber(&labels(&["(1)", "(2)", "(1)"]));
        assert_eq!(out, Some(labels(&["(1)", "(2)", "(3)"])));
    }

    #[test]
    fn test_sequential_is_untouched() {
        assert_eq!(renumber(&labels(&["1.", "2.", "3."])), None);
        assert_eq!(renumber(&[]), None);
    }

    #[test]
    fn test_non_numeric_is_untouched() {
        assert_eq!(renumber(&labels(&["a.", "a.", "b."])), None);
        assert_eq!(renumber(&labels(&["1.", "•"])), None);
    }
}
