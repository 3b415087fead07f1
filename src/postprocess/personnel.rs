//! Personnel Cards
//!
//! The "People" section of the manual is exported as a flat list of
//! "Name – Role" lines; it reads better as a grid of cards.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::error::FormResult;
use crate::extract::escape_html;

pub const GRID_CLASS: &str = "personnel-grid";

/// Tried group by group; within a group the earliest occurrence wins.
/// The comma comes last so "Last, First – Role" keeps the whole name.
const SEPARATOR_GROUPS: [&[&str]; 3] = [&["—", "–", " - "], &[":"], &[","]];

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub name: String,
    pub role: Option<String>,
}

pub fn is_personnel_heading(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("personnel") || lower.contains("people")
}

/// Split "Name – Role" on the first separator
pub fn split_person(entry: &str) -> Option<Person> {
    let entry = entry.split_whitespace().collect::<Vec<_>>().join(" ");
    if entry.is_empty() {
        return None;
    }
    let split = SEPARATOR_GROUPS.iter().find_map(|group| {
        group
            .iter()
            .filter_map(|sep| entry.find(sep).map(|at| (at, sep.len())))
            .min_by_key(|(at, _)| *at)
    });

    let person = match split {
        Some((at, len)) => {
            let role = entry[at + len..].trim();
            Person {
                name: entry[..at].trim().to_string(),
                role: (!role.is_empty()).then(|| role.to_string()),
            }
        }
        None => Person { name: entry, role: None },
    };
    (!person.name.is_empty()).then_some(person)
}

pub fn render_grid_html(people: &[Person]) -> String {
    people
        .iter()
        .map(|person| {
            let role = person
                .role
                .as_deref()
                .map(|r| format!("<div class=\"personnel-role\">{}</div>", escape_html(r)))
                .unwrap_or_default();
            format!(
                "<div class=\"personnel-card\"><div class=\"personnel-name\">{}</div>{}</div>",
                escape_html(&person.name),
                role
            )
        })
        .collect()
}

fn child_elements(parent: &Element) -> Vec<Element> {
    let children = parent.children();
    (0..children.length()).filter_map(|i| children.item(i)).collect()
}

fn text_of(element: &Element) -> String {
    element.text_content().unwrap_or_default()
}

/// People listed in `list`; `dt`/`dd` pairs give name and role directly
fn people_in(list: &Element) -> Vec<Person> {
    let children = child_elements(list);
    if list.tag_name().eq_ignore_ascii_case("dl") {
        let mut people = Vec::new();
        for (i, child) in children.iter().enumerate() {
            if !child.tag_name().eq_ignore_ascii_case("dt") {
                continue;
            }
            let role = children
                .get(i + 1)
                .filter(|next| next.tag_name().eq_ignore_ascii_case("dd"))
                .map(text_of);
            let line = match role {
                Some(role) => format!("{}: {}", text_of(child).trim(), role.trim()),
                None => text_of(child),
            };
            people.extend(split_person(&line));
        }
        return people;
    }
    children
        .iter()
        .filter(|child| child.tag_name().eq_ignore_ascii_case("li"))
        .filter_map(|li| split_person(&text_of(li)))
        .collect()
}

/// First list after `heading`, stopping at the next heading
fn list_after(heading: &Element) -> Option<Element> {
    let mut cursor = heading.next_element_sibling();
    while let Some(element) = cursor {
        let tag = element.tag_name().to_ascii_lowercase();
        if matches!(tag.as_str(), "ul" | "ol" | "dl") {
            return Some(element);
        }
        if crate::locate::is_heading_tag(&tag) {
            return None;
        }
        cursor = element.next_element_sibling();
    }
    None
}

/// Replace the personnel list with cards; returns the number of cards
pub fn apply(document: &Document) -> FormResult<usize> {
    if document.query_selector(&format!(".{}", GRID_CLASS))?.is_some() {
        return Ok(0);
    }

    let headings = document.query_selector_all("h1, h2, h3, h4, h5, h6")?;
    let heading = (0..headings.length())
        .filter_map(|i| headings.item(i))
        .filter_map(|n| n.dyn_into::<Element>().ok())
        .find(|h| is_personnel_heading(&text_of(h)));
    let Some(list) = heading.as_ref().and_then(list_after) else {
        return Ok(0);
    };

    let people = people_in(&list);
    if people.is_empty() {
        return Ok(0);
    }

    let grid = document.create_element("div")?;
    grid.set_class_name(GRID_CLASS);
    grid.set_inner_html(&render_grid_html(&people));
    if let Some(parent) = list.parent_node() {
        parent.insert_before(&grid, Some(&list))?;
    }
    if let Some(list) = list.dyn_ref::<HtmlElement>() {
        list.style().set_property("display", "none")?;
    }
    log::info!("rendered {} personnel card(s)", people.len());
    Ok(people.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(name: &str, role: Option<&str>) -> Option<Person> {
        Some(Person { name: name.to_string(), role: role.map(str::to_string) })
    }

    #[test]
    fn test_split_on_dash_variants() {
        assert_eq!(split_person("Ada Lovelace — PI"), person("Ada Lovelace", Some("PI")));
        assert_eq!(split_person("Alan Turing – Postdoc"), person("Alan Turing", Some("Postdoc")));
        assert_eq!(
            split_person("Grace Hopper - Lab manager"),
            person("Grace Hopper", Some("Lab manager"))
        );
    }

    #[test]
    fn test_hyphenated_name_is_not_split() {
        assert_eq!(split_person("Mary-Jane Watson"), person("Mary-Jane Watson", None));
    }

    #[test]
    fn test_colon_before_comma() {
        assert_eq!(
            split_person("Rosalind Franklin: Crystallography, X-ray lab"),
            person("Rosalind Franklin", Some("Crystallography, X-ray lab"))
        );
    }

    #[test]
    fn test_last_first_name_keeps_comma() {
        assert_eq!(
            split_person("Curie, Marie – Visiting scholar"),
            person("Curie, Marie", Some("Visiting scholar"))
        );
        assert_eq!(
            split_person("Franklin, Rosalind: Postdoc"),
            person("Franklin, Rosalind", Some("Postdoc"))
        );
    }

    #[test]
    fn test_empty_entries() {
        assert_eq!(split_person("   \n "), None);
        assert_eq!(split_person(": Technician"), None);
        assert_eq!(split_person("Barbara McClintock:"), person("Barbara McClintock", None));
    }

    #[test]
    fn test_personnel_heading() {
        assert!(is_personnel_heading("3 Lab Personnel"));
        assert!(is_personnel_heading("PEOPLE"));
        assert!(!is_personnel_heading("Equipment"));
    }

    #[test]
    fn test_render_grid() {
        let people = vec![
            Person { name: "A & B".into(), role: Some("PI".into()) },
            Person { name: "C".into(), role: None },
        ];
        assert_eq!(
            render_grid_html(&people),
            "<div class=\"personnel-card\"><div class=\"personnel-name\">A &amp; B</div>\
             <div class=\"personnel-role\">PI</div></div>\
             <div class=\"personnel-card\"><div class=\"personnel-name\">C</div></div>"
        );
    }
}
