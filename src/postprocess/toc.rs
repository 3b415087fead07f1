//! Generated Table of Contents
//!
//! Built from `h2`/`h3` headings when the export did not produce a usable
//! `.tableofcontents`.

use std::collections::HashSet;

use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

use crate::error::FormResult;
use crate::extract::escape_html;

pub const TOC_ID: &str = "generated-toc";

#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    /// 2 or 3
    pub level: u8,
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TocNode {
    pub entry: TocEntry,
    pub children: Vec<TocNode>,
}

/// Lowercase alphanumerics joined by single dashes
pub fn slugify(title: &str) -> String {
    let mut slug = String::new();
    for c in title.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}

/// `base`, or `base-2`, `base-3`... whichever is free
pub fn unique_id(base: &str, taken: &mut HashSet<String>) -> String {
    let mut candidate = base.to_string();
    let mut n = 2;
    while taken.contains(&candidate) {
        candidate = format!("{}-{}", base, n);
        n += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

/// Nest `h3` entries under the preceding `h2`; orphans stay top level
pub fn build_toc(entries: Vec<TocEntry>) -> Vec<TocNode> {
    let mut roots: Vec<TocNode> = Vec::new();
    for entry in entries {
        let node = TocNode { entry, children: Vec::new() };
        match roots.last_mut() {
            Some(parent) if node.entry.level > parent.entry.level => parent.children.push(node),
            _ => roots.push(node),
        }
    }
    roots
}

pub fn render_toc_html(nodes: &[TocNode]) -> String {
    if nodes.is_empty() {
        return String::new();
    }
    let mut html = String::from("<ul class=\"toc-list\">");
    for node in nodes {
        html.push_str(&format!(
            "<li><a href=\"#{}\">{}</a>{}</li>",
            escape_html(&node.entry.id),
            escape_html(&node.entry.title),
            render_toc_html(&node.children)
        ));
    }
    html.push_str("</ul>");
    html
}

fn has_usable_toc(document: &Document) -> FormResult<bool> {
    let exported = document.query_selector(".tableofcontents a")?.is_some();
    Ok(exported || document.get_element_by_id(TOC_ID).is_some())
}

/// Insert the generated TOC; returns the number of entries
pub fn apply(document: &Document) -> FormResult<usize> {
    if has_usable_toc(document)? {
        return Ok(0);
    }

    let headings = document.query_selector_all("h2, h3")?;
    let headings: Vec<Element> = (0..headings.length())
        .filter_map(|i| headings.item(i))
        .filter_map(|n| n.dyn_into::<Element>().ok())
        .collect();
    let is_h2 = |h: &&Element| h.tag_name().eq_ignore_ascii_case("h2");
    let Some(first_h2) = headings.iter().find(is_h2).cloned() else {
        return Ok(0);
    };

    let mut taken: HashSet<String> =
        headings.iter().map(|h| h.id()).filter(|id| !id.is_empty()).collect();
    let mut entries = Vec::new();
    for heading in &headings {
        let title = heading.text_content().unwrap_or_default().trim().to_string();
        if title.is_empty() {
            continue;
        }
        let mut id = heading.id();
        if id.is_empty() {
            id = unique_id(&slugify(&title), &mut taken);
            heading.set_id(&id);
        }
        let level = if heading.tag_name().eq_ignore_ascii_case("h2") { 2 } else { 3 };
        entries.push(TocEntry { level, id, title });
    }
    let count = entries.len();

    let nav = document.create_element("nav")?;
    nav.set_id(TOC_ID);
    nav.set_class_name("generated-toc");
    nav.set_inner_html(&format!(
        "<p class=\"toc-title\">Contents</p>{}",
        render_toc_html(&build_toc(entries))
    ));
    if let Some(parent) = first_h2.parent_node() {
        parent.insert_before(&nav, Some(&first_h2))?;
    }
    log::info!("generated table of contents with {} entries", count);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level: u8, id: &str) -> TocEntry {
        TocEntry { level, id: id.to_string(), title: id.to_uppercase() }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("1.2 Getting Started!"), "1-2-getting-started");
        assert_eq!(slugify("  Safety & PPE  "), "safety-ppe");
        assert_eq!(slugify("???"), "section");
    }

    #[test]
    fn test_unique_id() {
        let mut taken = HashSet::new();
        taken.insert("intro".to_string());
        assert_eq!(unique_id("intro", &mut taken), "intro-2");
        assert_eq!(unique_id("intro", &mut taken), "intro-3");
        assert_eq!(unique_id("safety", &mut taken), "safety");
    }

    #[test]
    fn test_build_toc_nesting() {
        let toc = build_toc(vec![
            entry(3, "orphan"),
            entry(2, "a"),
            entry(3, "a1"),
            entry(3, "a2"),
            entry(2, "b"),
        ]);
        assert_eq!(toc.len(), 3);
        assert_eq!(toc[0].entry.id, "orphan");
        assert_eq!(toc[1].children.len(), 2);
        assert!(toc[2].children.is_empty());
    }

    #[test]
    fn test_render_escapes_titles() {
        let toc = build_toc(vec![TocEntry {
            level: 2,
            id: "qa".into(),
            title: "Q&A <notes>".into(),
        }]);
        let html = render_toc_html(&toc);
        assert_eq!(
            html,
            "<ul class=\"toc-list\"><li><a href=\"#qa\">Q&amp;A &lt;notes&gt;</a></li></ul>"
        );
    }
}
