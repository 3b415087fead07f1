//! Checklist Item Extractor
//!
//! Recovers item strings from the checklist region. The export gives no
//! reliable containment: one item may span several inline elements and raw
//! text nodes, and one paragraph may hold several items. Checkbox glyphs are
//! the only trustworthy delimiter.
//!
//! Works on `RegionNode` snapshots so it can run without a browser.

use serde::Deserialize;

use crate::locate::is_heading_tag;
use crate::models::ChecklistItem;

/// ☐ ☑ ☒ □, the full delimiter set
pub const CHECKBOX_GLYPHS: [char; 4] = ['\u{2610}', '\u{2611}', '\u{2612}', '\u{25A1}'];

/// Characters stripped from both ends of a candidate besides whitespace
const STRAY_PUNCTUATION: &[char] = &[
    '-', '\u{2013}', '\u{2014}', '\u{2022}', '\u{00B7}', ':', ';', ',', '|',
];

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "dd", "dt", "ul", "ol", "dl", "br", "tr", "td", "section",
];

pub fn is_checkbox_glyph(c: char) -> bool {
    CHECKBOX_GLYPHS.contains(&c)
}

pub fn count_glyphs(text: &str) -> usize {
    text.chars().filter(|c| is_checkbox_glyph(*c)).count()
}

/// How item boundaries are recovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Walk nodes, keeping inline markup, new item at every glyph
    #[default]
    NodeWalk,
    /// Flatten the region to plain text and split on glyphs
    ConcatenatedText,
}

/// Snapshot of one node of the checklist region
#[derive(Debug, Clone, PartialEq)]
pub enum RegionNode {
    Text(String),
    Element {
        tag: String,
        /// Outer HTML as serialized by the browser
        html: String,
        children: Vec<RegionNode>,
    },
}

impl RegionNode {
    pub fn text(content: &str) -> Self {
        RegionNode::Text(content.to_string())
    }

    pub fn element(tag: &str, html: &str, children: Vec<RegionNode>) -> Self {
        RegionNode::Element {
            tag: tag.to_ascii_lowercase(),
            html: html.to_string(),
            children,
        }
    }

    /// Visible text, like `textContent`
    pub fn visible_text(&self) -> String {
        match self {
            RegionNode::Text(t) => t.clone(),
            RegionNode::Element { children, .. } => {
                children.iter().map(RegionNode::visible_text).collect()
            }
        }
    }

    pub fn contains_glyph(&self) -> bool {
        self.visible_text().chars().any(is_checkbox_glyph)
    }

    /// Sub-heading inside the region; it closes the item before it
    fn is_heading(&self) -> bool {
        matches!(self, RegionNode::Element { tag, .. } if is_heading_tag(tag))
            && !self.contains_glyph()
    }
}

/// Split the region into checklist items.
///
/// Every glyph opens exactly one candidate; text before the first glyph is
/// not an item. Candidates whose cleaned text is empty or shorter than
/// `min_len` characters are dropped.
pub fn extract_items(
    nodes: &[RegionNode],
    strategy: Strategy,
    min_len: usize,
) -> Vec<ChecklistItem> {
    let candidates = match strategy {
        Strategy::NodeWalk => walk_candidates(nodes),
        Strategy::ConcatenatedText => concatenated_candidates(nodes),
    };

    candidates
        .into_iter()
        .filter_map(Candidate::finish)
        .filter(|(_, text)| text.chars().count() >= min_len)
        .enumerate()
        .map(|(index, (html, _))| ChecklistItem { index, text: html, checked: false })
        .collect()
}

#[derive(Debug, Default)]
struct Candidate {
    html: String,
    text: String,
}

impl Candidate {
    /// Cleaned (html, visible text), or None if nothing is left
    fn finish(self) -> Option<(String, String)> {
        let text = clean(&self.text);
        if text.is_empty() {
            return None;
        }
        Some((clean_html(&self.html), text))
    }
}

fn is_stray(c: char) -> bool {
    c.is_whitespace() || STRAY_PUNCTUATION.contains(&c)
}

fn clean(raw: &str) -> String {
    collapse_whitespace(raw.trim_matches(is_stray))
}

/// Like `clean`, but a trailing `;` that closes a character reference stays
fn clean_html(raw: &str) -> String {
    let mut s = raw.trim_start_matches(is_stray);
    loop {
        let trimmed = s.trim_end_matches(char::is_whitespace);
        match trimmed.chars().last() {
            Some(';') if ends_with_entity(trimmed) => {
                s = trimmed;
                break;
            }
            Some(c) if is_stray(c) => s = &trimmed[..trimmed.len() - c.len_utf8()],
            _ => {
                s = trimmed;
                break;
            }
        }
    }
    collapse_whitespace(s)
}

fn ends_with_entity(s: &str) -> bool {
    let Some(amp) = s.rfind('&') else {
        return false;
    };
    let body = &s[amp + 1..s.len() - 1];
    !body.is_empty() && body.chars().all(|c| c.is_ascii_alphanumeric() || c == '#')
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Each run between sub-headings is flattened and split on its own
fn concatenated_candidates(nodes: &[RegionNode]) -> Vec<Candidate> {
    nodes
        .split(RegionNode::is_heading)
        .flat_map(|run| {
            let joined = run.iter().map(RegionNode::visible_text).collect::<Vec<_>>().join(" ");
            joined
                .split(is_checkbox_glyph)
                .skip(1)
                .map(|segment| Candidate {
                    html: escape_html(segment),
                    text: segment.to_string(),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Node-by-node accumulator, reset at each glyph
#[derive(Default)]
struct Accumulator {
    done: Vec<Candidate>,
    current: Option<Candidate>,
}

impl Accumulator {
    fn start_item(&mut self) {
        self.close_item();
        self.current = Some(Candidate::default());
    }

    fn append(&mut self, html: &str, text: &str) {
        if let Some(candidate) = self.current.as_mut() {
            candidate.html.push_str(html);
            candidate.text.push_str(text);
        }
    }

    fn push_text(&mut self, content: &str) {
        for (i, segment) in content.split(is_checkbox_glyph).enumerate() {
            if i > 0 {
                self.start_item();
            }
            self.append(&escape_html(segment), segment);
        }
    }

    /// Text up to the next glyph belongs to no item
    fn close_item(&mut self) {
        if let Some(candidate) = self.current.take() {
            self.done.push(candidate);
        }
    }

    fn walk(&mut self, node: &RegionNode) {
        match node {
            RegionNode::Text(t) => self.push_text(t),
            _ if node.is_heading() => self.close_item(),
            RegionNode::Element { tag, children, .. } if node.contains_glyph() => {
                for child in children {
                    self.walk(child);
                }
                self.separate_block(tag);
            }
            RegionNode::Element { tag, html, .. } => {
                self.append(html, &node.visible_text());
                self.separate_block(tag);
            }
        }
    }

    /// Block elements never run into the following text
    fn separate_block(&mut self, tag: &str) {
        if BLOCK_TAGS.contains(&tag) {
            self.append(" ", " ");
        }
    }

    fn finish(mut self) -> Vec<Candidate> {
        self.close_item();
        self.done
    }
}

fn walk_candidates(nodes: &[RegionNode]) -> Vec<Candidate> {
    let mut acc = Accumulator::default();
    for node in nodes {
        acc.walk(node);
    }
    acc.finish()
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
