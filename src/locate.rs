//! Checklist Region Locator
//!
//! Finds the checklist heading and the run of sibling nodes after it, up to
//! the signature block.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Node};

use crate::error::FormResult;
use crate::extract::{count_glyphs, RegionNode};

const HEADING_SELECTOR: &str = "h1, h2, h3, h4, h5, h6";

/// Heading text names both the checklist and the signature
pub fn is_checklist_heading(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("checklist") && lower.contains("signature")
}

/// Rank of an `h1`..`h6` tag, 1 being the top
pub fn heading_level(tag: &str) -> Option<u8> {
    match tag.to_ascii_lowercase().as_str() {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

pub fn is_heading_tag(tag: &str) -> bool {
    heading_level(tag).is_some()
}

/// `<table>` or the export's div-based tables
pub fn is_table_like(tag: &str, class_name: &str) -> bool {
    tag.eq_ignore_ascii_case("table")
        || class_name
            .split_whitespace()
            .any(|c| c == "tabular" || c == "table")
}

/// A "Signature ... Date" line with no checkbox in it
pub fn is_signature_line(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("signature") && lower.contains("date") && count_glyphs(text) == 0
}

/// Tag, class and text of one sibling after the checklist heading.
/// Text nodes have an empty tag.
#[derive(Debug, Clone, Default)]
pub struct SiblingSummary {
    pub tag: String,
    pub class_name: String,
    pub text: String,
}

/// Index of the sibling that ends the region, if any.
///
/// The region stops at a heading of the same or a higher rank than the
/// checklist heading, at a table-like construct, or at a signature line once
/// at least one checkbox has been passed. Sub-headings stay inside.
pub fn boundary_index(siblings: &[SiblingSummary], checklist_level: u8) -> Option<usize> {
    let mut items_seen = false;
    for (i, sibling) in siblings.iter().enumerate() {
        if let Some(level) = heading_level(&sibling.tag) {
            if level <= checklist_level {
                return Some(i);
            }
        } else if is_table_like(&sibling.tag, &sibling.class_name)
            || (items_seen && is_signature_line(&sibling.text))
        {
            return Some(i);
        }
        items_seen |= count_glyphs(&sibling.text) > 0;
    }
    None
}

/// Heading, the nodes between it and the boundary, and the boundary
pub struct ChecklistRegion {
    pub heading: Element,
    pub nodes: Vec<Node>,
    pub boundary: Option<Node>,
}

impl ChecklistRegion {
    /// Owned snapshots for the extractor
    pub fn snapshot(&self) -> Vec<RegionNode> {
        self.nodes.iter().filter_map(snapshot_node).collect()
    }
}

/// Last matching heading in document order
pub fn find_checklist_heading(document: &Document) -> FormResult<Option<Element>> {
    let headings = document.query_selector_all(HEADING_SELECTOR)?;
    let mut found = None;
    for i in 0..headings.length() {
        let Some(element) = headings.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        let text = element.text_content().unwrap_or_default();
        if is_checklist_heading(&text) {
            if found.is_some() {
                log::debug!("multiple checklist headings, using the later one: {:?}", text.trim());
            }
            found = Some(element);
        }
    }
    Ok(found)
}

fn summarize(node: &Node) -> SiblingSummary {
    let text = node.text_content().unwrap_or_default();
    match node.dyn_ref::<Element>() {
        Some(element) => SiblingSummary {
            tag: element.tag_name(),
            class_name: element.class_name(),
            text,
        },
        None => SiblingSummary { text, ..SiblingSummary::default() },
    }
}

/// Walk the heading's following siblings up to the boundary
pub fn collect_region(heading: Element) -> ChecklistRegion {
    let mut siblings = Vec::new();
    let mut cursor = heading.next_sibling();
    while let Some(node) = cursor {
        cursor = node.next_sibling();
        siblings.push(node);
    }

    let level = heading_level(&heading.tag_name()).unwrap_or(6);
    let summaries: Vec<SiblingSummary> = siblings.iter().map(summarize).collect();
    let mut nodes = siblings;
    let boundary = boundary_index(&summaries, level).and_then(|i| nodes.drain(i..).next());

    ChecklistRegion { heading, nodes, boundary }
}

fn snapshot_node(node: &Node) -> Option<RegionNode> {
    match node.node_type() {
        Node::TEXT_NODE => Some(RegionNode::text(&node.text_content().unwrap_or_default())),
        Node::ELEMENT_NODE => {
            let element = node.dyn_ref::<Element>()?;
            let children = element.child_nodes();
            let children = (0..children.length())
                .filter_map(|i| children.item(i))
                .filter_map(|child| snapshot_node(&child))
                .collect();
            Some(RegionNode::element(&element.tag_name(), &element.outer_html(), children))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checklist_heading_match() {
        assert!(is_checklist_heading("Onboarding Checklist and Signature"));
        assert!(is_checklist_heading("SIGNATURE / checklist"));
        assert!(!is_checklist_heading("Onboarding Checklist"));
        assert!(!is_checklist_heading("Signature Page"));
    }

    fn element(tag: &str, class_name: &str, text: &str) -> SiblingSummary {
        SiblingSummary {
            tag: tag.to_string(),
            class_name: class_name.to_string(),
            text: text.to_string(),
        }
    }

    fn text(content: &str) -> SiblingSummary {
        SiblingSummary { text: content.to_string(), ..SiblingSummary::default() }
    }

    #[test]
    fn test_heading_level() {
        assert_eq!(heading_level("H3"), Some(3));
        assert_eq!(heading_level("h6"), Some(6));
        assert_eq!(heading_level("header"), None);
        assert!(!is_heading_tag("p"));
    }

    #[test]
    fn test_table_and_signature_line_end_region() {
        let siblings = vec![
            element("P", "", "\u{2610} Read the safety manual"),
            element("DIV", "tabular center", ""),
        ];
        assert_eq!(boundary_index(&siblings, 3), Some(1));

        let siblings = vec![
            element("P", "", "\u{2610} Read the safety manual"),
            text("\n"),
            element("P", "", "Signature: ________ Date: ________"),
        ];
        assert_eq!(boundary_index(&siblings, 3), Some(2));
    }

    #[test]
    fn test_sub_heading_stays_in_region() {
        let siblings = vec![
            element("P", "", "\u{2610} Read the safety manual"),
            element("H4", "subsectionHead", "Before your first week"),
            element("P", "", "\u{2610} Request building access"),
            element("H3", "sectionHead", "Appendix"),
        ];
        assert_eq!(boundary_index(&siblings, 3), Some(3));
        assert_eq!(boundary_index(&siblings, 4), Some(1));
    }

    #[test]
    fn test_higher_rank_heading_ends_region() {
        let siblings = vec![
            element("P", "", "\u{2610} Read the safety manual"),
            element("H2", "chapterHead", "Resources"),
        ];
        assert_eq!(boundary_index(&siblings, 3), Some(1));
    }

    #[test]
    fn test_intro_prose_is_not_a_signature_line() {
        let siblings = vec![
            element(
                "P",
                "noindent",
                "Work through every item, then add your signature and the date at the bottom.",
            ),
            element("P", "", "\u{2610} Read the safety manual"),
            element("P", "", "\u{2610} Add your signature to the lab log, with date"),
        ];
        assert_eq!(boundary_index(&siblings, 3), None);
    }
}
