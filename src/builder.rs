//! Checklist Form Builder
//!
//! Replaces the static checklist under the "Checklist and Signature"
//! heading with the interactive form. Nothing in the original region is
//! deleted; it is hidden and the form is mounted next to it.

use std::sync::Arc;

use leptos::prelude::*;
use reactive_stores::Store;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Node};

use crate::components::ChecklistForm;
use crate::config::FormConfig;
use crate::context::FormContext;
use crate::error::{FormError, FormResult};
use crate::extract::{extract_items, RegionNode};
use crate::locate::{collect_region, find_checklist_heading, ChecklistRegion};
use crate::models::{today_iso, ChecklistItem, FormState};
use crate::persistence::{load_state, LocalStorageStore, StateStore};
use crate::store::ChecklistState;

/// Marks hidden original content
const ORIGINAL_ATTR: &str = "data-checklist-original";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The form container already exists on this page
    AlreadyBuilt,
    NoHeading,
    /// A heading was found but no usable items under it
    NoItems,
    Built { items: usize },
}

impl std::fmt::Display for BuildOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildOutcome::AlreadyBuilt => write!(f, "checklist form already present"),
            BuildOutcome::NoHeading => write!(f, "no checklist heading on this page"),
            BuildOutcome::NoItems => write!(f, "checklist heading found but no items"),
            BuildOutcome::Built { items } => write!(f, "checklist form built with {} items", items),
        }
    }
}

/// Everything the mounted form starts from
pub struct FormParts {
    pub container_id: String,
    pub items: Vec<ChecklistItem>,
    pub state: FormState,
    pub config: Arc<FormConfig>,
    pub persistence: Arc<dyn StateStore>,
}

/// The page the form is built into.
/// Only `install` may change it.
pub trait FormHost {
    type Region;

    fn has_container(&self, container_id: &str) -> bool;
    fn find_region(&self) -> FormResult<Option<Self::Region>>;
    fn snapshot(&self, region: &Self::Region) -> Vec<RegionNode>;
    /// Hide the region and mount the form after its heading
    fn install(&self, region: Self::Region, parts: FormParts) -> FormResult<()>;
}

pub struct ChecklistFormBuilder<H> {
    host: H,
    config: Arc<FormConfig>,
    persistence: Arc<dyn StateStore>,
}

impl ChecklistFormBuilder<DocumentHost> {
    /// Builder for a live document, persisting to local storage
    pub fn new(document: Document, config: FormConfig) -> Self {
        let persistence = Arc::new(LocalStorageStore::new(config.storage_key.clone()));
        Self::with_store(DocumentHost { document }, config, persistence)
    }
}

impl<H: FormHost> ChecklistFormBuilder<H> {
    pub fn with_store(host: H, config: FormConfig, persistence: Arc<dyn StateStore>) -> Self {
        Self {
            host,
            config: Arc::new(config),
            persistence,
        }
    }

    pub fn run(&self) -> FormResult<BuildOutcome> {
        if self.host.has_container(&self.config.container_id) {
            return Ok(BuildOutcome::AlreadyBuilt);
        }
        let Some(region) = self.host.find_region()? else {
            return Ok(BuildOutcome::NoHeading);
        };

        let nodes = self.host.snapshot(&region);
        let items = extract_items(&nodes, self.config.strategy, self.config.min_item_len);
        if items.is_empty() {
            return Ok(BuildOutcome::NoItems);
        }
        let count = items.len();
        let state = load_state(self.persistence.as_ref(), count, &today_iso());

        self.host.install(
            region,
            FormParts {
                container_id: self.config.container_id.clone(),
                items,
                state,
                config: self.config.clone(),
                persistence: self.persistence.clone(),
            },
        )?;
        Ok(BuildOutcome::Built { items: count })
    }
}

/// The browser document
pub struct DocumentHost {
    document: Document,
}

impl FormHost for DocumentHost {
    type Region = ChecklistRegion;

    fn has_container(&self, container_id: &str) -> bool {
        self.document.get_element_by_id(container_id).is_some()
    }

    fn find_region(&self) -> FormResult<Option<ChecklistRegion>> {
        Ok(find_checklist_heading(&self.document)?.map(collect_region))
    }

    fn snapshot(&self, region: &ChecklistRegion) -> Vec<RegionNode> {
        region.snapshot()
    }

    fn install(&self, region: ChecklistRegion, parts: FormParts) -> FormResult<()> {
        for node in region.nodes.iter().chain(region.boundary.iter()) {
            self.hide_node(node)?;
        }
        let container = self.insert_container(&region.heading, &parts.container_id)?;

        let store = Store::new(ChecklistState::from_form_state(parts.state));
        let ctx = FormContext::new(store, parts.items, parts.config, parts.persistence);
        let handle = leptos::mount::mount_to(container, move || {
            provide_context(ctx);
            view! { <ChecklistForm /> }
        });
        // The form lives as long as the page
        std::mem::forget(handle);
        Ok(())
    }
}

impl DocumentHost {
    fn hide_node(&self, node: &Node) -> FormResult<()> {
        match node.node_type() {
            Node::ELEMENT_NODE => hide_element(node.unchecked_ref::<Element>()),
            Node::TEXT_NODE if needs_wrapping(&node.text_content().unwrap_or_default()) => {
                self.wrap_hidden(node)
            }
            _ => Ok(()),
        }
    }

    /// Text nodes cannot be styled; move them into a hidden span
    fn wrap_hidden(&self, text: &Node) -> FormResult<()> {
        let parent = text
            .parent_node()
            .ok_or_else(|| FormError::Dom("checklist text has no parent".to_string()))?;
        let span = self.document.create_element("span")?;
        hide_element(&span)?;
        parent.insert_before(&span, Some(text))?;
        span.append_child(text)?;
        Ok(())
    }

    fn insert_container(&self, heading: &Element, container_id: &str) -> FormResult<HtmlElement> {
        let container = self
            .document
            .create_element("div")?
            .dyn_into::<HtmlElement>()
            .map_err(|_| FormError::Dom("container is not an HTML element".to_string()))?;
        container.set_id(container_id);
        container.set_class_name("interactive-checklist");

        let parent = heading
            .parent_node()
            .ok_or_else(|| FormError::Dom("checklist heading has no parent".to_string()))?;
        parent.insert_before(&container, heading.next_sibling().as_ref())?;
        Ok(container)
    }
}

/// Whitespace between elements is left alone
fn needs_wrapping(text: &str) -> bool {
    !text.trim().is_empty()
}

fn hide_element(element: &Element) -> FormResult<()> {
    element.set_attribute(ORIGINAL_ATTR, "")?;
    if let Some(html) = element.dyn_ref::<HtmlElement>() {
        html.style().set_property("display", "none")?;
    } else {
        element.set_attribute("hidden", "")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    use crate::persistence::MemoryStore;

    /// In-memory page that records every install
    #[derive(Default)]
    struct PageDouble {
        region: Option<Vec<RegionNode>>,
        container: Cell<bool>,
        installs: RefCell<Vec<(usize, FormState)>>,
    }

    impl PageDouble {
        fn with_region(nodes: Vec<RegionNode>) -> Self {
            Self { region: Some(nodes), ..Self::default() }
        }

        fn install_count(&self) -> usize {
            self.installs.borrow().len()
        }
    }

    impl FormHost for &PageDouble {
        type Region = Vec<RegionNode>;

        fn has_container(&self, _container_id: &str) -> bool {
            self.container.get()
        }

        fn find_region(&self) -> FormResult<Option<Vec<RegionNode>>> {
            Ok(self.region.clone())
        }

        fn snapshot(&self, region: &Vec<RegionNode>) -> Vec<RegionNode> {
            region.clone()
        }

        fn install(&self, _region: Vec<RegionNode>, parts: FormParts) -> FormResult<()> {
            self.container.set(true);
            self.installs.borrow_mut().push((parts.items.len(), parts.state));
            Ok(())
        }
    }

    fn paragraph(content: &str) -> RegionNode {
        RegionNode::element("p", &format!("<p>{}</p>", content), vec![RegionNode::text(content)])
    }

    fn checklist() -> Vec<RegionNode> {
        vec![paragraph(
            "\u{2610} Read the safety manual \u{2610} Request building access",
        )]
    }

    fn builder(page: &PageDouble, store: MemoryStore) -> ChecklistFormBuilder<&PageDouble> {
        ChecklistFormBuilder::with_store(page, FormConfig::default(), Arc::new(store))
    }

    #[test]
    fn test_no_heading_leaves_page_untouched() {
        let page = PageDouble::default();
        let outcome = builder(&page, MemoryStore::default()).run();

        assert_eq!(outcome, Ok(BuildOutcome::NoHeading));
        assert_eq!(page.install_count(), 0);
        assert!(!page.container.get());
    }

    #[test]
    fn test_second_run_does_not_duplicate_form() {
        let page = PageDouble::with_region(checklist());
        let builder = builder(&page, MemoryStore::default());

        assert_eq!(builder.run(), Ok(BuildOutcome::Built { items: 2 }));
        assert_eq!(builder.run(), Ok(BuildOutcome::AlreadyBuilt));
        assert_eq!(page.install_count(), 1);
    }

    #[test]
    fn test_heading_without_items_leaves_page_untouched() {
        let page = PageDouble::with_region(vec![paragraph("Nothing to tick off here yet.")]);
        let outcome = builder(&page, MemoryStore::default()).run();

        assert_eq!(outcome, Ok(BuildOutcome::NoItems));
        assert_eq!(page.install_count(), 0);
    }

    #[test]
    fn test_saved_state_is_restored() {
        let page = PageDouble::with_region(checklist());
        let saved = r#"{"checkboxes":[true,false],"date":"2024-05-01","signature":""}"#;
        builder(&page, MemoryStore::with_value(saved)).run().unwrap();

        let installs = page.installs.borrow();
        let (items, state) = &installs[0];
        assert_eq!(*items, 2);
        assert_eq!(state.checkboxes, vec![true, false]);
        assert_eq!(state.date, "2024-05-01");
    }

    #[test]
    fn test_whitespace_text_is_not_wrapped() {
        assert!(!needs_wrapping("\n   \t"));
        assert!(needs_wrapping(" \u{2610} Read the safety manual"));
    }

    #[test]
    fn test_outcome_messages() {
        assert_eq!(
            BuildOutcome::Built { items: 4 }.to_string(),
            "checklist form built with 4 items"
        );
        assert_eq!(BuildOutcome::NoHeading.to_string(), "no checklist heading on this page");
    }
}
