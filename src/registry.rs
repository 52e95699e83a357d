use kuchiki::NodeRef;
use kuchiki::traits::NodeIterator as _;

use crate::dom;
use crate::effect::Target;

pub const NAV_PLACEHOLDER: &str = r#"[data-include="nav"]"#;
pub const THEME_TOGGLE: &str = "[data-theme-toggle]";
pub const NAV_LINK: &str = ".nav a.chip";
pub const ACCORDION: &str = "[data-accordion]";
pub const ACCORDION_BUTTON: &str = "[data-acc-btn]";
pub const ACCORDION_ITEM_CLASS: &str = "acc-item";
pub const YEAR_SLOT: &str = "[data-year]";

/// One accordion container with its items and buttons, in document order.
#[derive(Debug, Clone)]
pub struct AccordionGroup {
    pub container: NodeRef,
    pub items: Vec<NodeRef>,
    pub buttons: Vec<NodeRef>,
}

/// The `.acc-item` nearest to a button.
#[derive(Debug, Clone, PartialEq)]
pub enum Enclosing {
    /// One of the container's own items, by index.
    Own(usize),
    /// An item outside the container, e.g. one wrapping the whole container.
    Outer(NodeRef),
}

impl AccordionGroup {
    /// Item enclosing the `button`-th button of this container, `None` when
    /// the button has no `.acc-item` ancestor at all.
    pub fn enclosing_item(&self, button: usize) -> Option<Enclosing> {
        let item = dom::closest_with_class(self.buttons.get(button)?, ACCORDION_ITEM_CLASS)?;
        Some(match self.items.iter().position(|candidate| *candidate == item) {
            Some(i) => Enclosing::Own(i),
            None => Enclosing::Outer(item),
        })
    }
}

/// Role to element mapping. Page roles are scanned once at startup; the
/// navigation roles only exist after the fragment is injected and are scanned
/// once at that point.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    pub root: Option<NodeRef>,
    pub placeholders: Vec<NodeRef>,
    pub accordions: Vec<AccordionGroup>,
    pub year_slots: Vec<NodeRef>,
    pub theme_toggle: Option<NodeRef>,
    pub nav_links: Vec<NodeRef>,
}

impl Registry {
    pub fn scan(document: &NodeRef) -> Self {
        let root = document
            .select_first("html")
            .ok()
            .map(|n| n.as_node().clone());

        let accordions = select_all(document, ACCORDION)
            .into_iter()
            .map(|container| AccordionGroup {
                items: select_descendants(&container, &format!(".{ACCORDION_ITEM_CLASS}")),
                buttons: select_descendants(&container, ACCORDION_BUTTON),
                container,
            })
            .collect();

        Self {
            root,
            placeholders: select_all(document, NAV_PLACEHOLDER),
            accordions,
            year_slots: select_all(document, YEAR_SLOT),
            theme_toggle: None,
            nav_links: Vec::new(),
        }
    }

    pub fn scan_navigation(&mut self, document: &NodeRef) {
        self.theme_toggle = document
            .select_first(THEME_TOGGLE)
            .ok()
            .map(|n| n.as_node().clone());
        self.nav_links = select_all(document, NAV_LINK);
    }

    pub fn resolve(&self, target: Target) -> Option<NodeRef> {
        match target {
            Target::Root => self.root.clone(),
            Target::Placeholder(i) => self.placeholders.get(i).cloned(),
            Target::NavLink(i) => self.nav_links.get(i).cloned(),
            Target::AccordionItem { group, item } => {
                self.accordions.get(group)?.items.get(item).cloned()
            }
            Target::EnclosingItem { group, button } => {
                match self.accordions.get(group)?.enclosing_item(button)? {
                    Enclosing::Own(i) => self.accordions[group].items.get(i).cloned(),
                    Enclosing::Outer(node) => Some(node),
                }
            }
            Target::YearSlot(i) => self.year_slots.get(i).cloned(),
        }
    }
}

fn select_all(node: &NodeRef, selector: &str) -> Vec<NodeRef> {
    match node.select(selector) {
        Ok(found) => found.map(|n| n.as_node().clone()).collect(),
        Err(()) => Vec::new(),
    }
}

/// `querySelectorAll` semantics: descendants only, never `node` itself.
fn select_descendants(node: &NodeRef, selector: &str) -> Vec<NodeRef> {
    match node.descendants().select(selector) {
        Ok(found) => found.map(|n| n.as_node().clone()).collect(),
        Err(()) => Vec::new(),
    }
}
