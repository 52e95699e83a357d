use anyhow::Context as _;
use kuchiki::NodeRef;
use url::Url;

use crate::accordion::{AccordionMode, AccordionState, EXPANDED_ATTR};
use crate::dom;
use crate::effect::{Effect, Target};
use crate::highlight;
use crate::nav;
use crate::registry::{Enclosing, Registry};
use crate::storage::Storage;
use crate::theme::{self, THEME_ATTR, Theme};

pub const DEFAULT_NAV_RESOURCE: &str = "nav.html";

#[derive(Debug, Clone)]
pub struct BootConfig {
    /// URL the page is served from; its path picks the active nav link and
    /// the navigation resource is resolved against it.
    pub page_url: Url,
    pub nav_resource: String,
    pub theme_key: String,
    pub accordion_mode: AccordionMode,
}

impl BootConfig {
    pub fn new(page_url: Url) -> Self {
        Self {
            page_url,
            nav_resource: DEFAULT_NAV_RESOURCE.to_string(),
            theme_key: theme::DEFAULT_THEME_KEY.to_string(),
            accordion_mode: AccordionMode::default(),
        }
    }

    pub fn nav_url(&self) -> anyhow::Result<Url> {
        self.page_url
            .join(&self.nav_resource)
            .with_context(|| format!("resolve {} against {}", self.nav_resource, self.page_url))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handler {
    ToggleTheme,
    Accordion { group: usize, button: usize },
}

struct Listener {
    node: NodeRef,
    handler: Handler,
}

/// A loaded document plus everything the components need to act on it.
///
/// Components compute `Effect`s from values read out of the tree; `apply`
/// is the only place that mutates the tree or the storage.
pub struct Page {
    document: NodeRef,
    registry: Registry,
    storage: Box<dyn Storage>,
    config: BootConfig,
    listeners: Vec<Listener>,
    navigation_ready: bool,
}

impl Page {
    pub fn parse(html: &str, config: BootConfig, storage: Box<dyn Storage>) -> Self {
        let document = dom::parse_document(html);
        let registry = Registry::scan(&document);
        Self {
            document,
            registry,
            storage,
            config,
            listeners: Vec::new(),
            navigation_ready: false,
        }
    }

    pub fn document(&self) -> &NodeRef {
        &self.document
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &BootConfig {
        &self.config
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn to_html(&self) -> anyhow::Result<String> {
        dom::serialize(&self.document)
    }

    pub fn theme_attr(&self) -> Option<String> {
        self.registry
            .root
            .as_ref()
            .and_then(|root| dom::attr(root, THEME_ATTR))
    }

    pub fn apply_saved_theme(&mut self) -> Theme {
        let stored = self.storage.get(&self.config.theme_key);
        let (theme, effects) = theme::initial(stored.as_deref());
        self.apply(&effects);
        tracing::debug!(stored = ?stored, %theme, "applied saved theme");
        theme
    }

    pub fn wire_accordions(&mut self) -> usize {
        let mut wired = 0;
        for (group, accordion) in self.registry.accordions.iter().enumerate() {
            for (button, node) in accordion.buttons.iter().enumerate() {
                self.listeners.push(Listener {
                    node: node.clone(),
                    handler: Handler::Accordion { group, button },
                });
                wired += 1;
            }
        }
        tracing::debug!(
            containers = self.registry.accordions.len(),
            buttons = wired,
            "wired accordions"
        );
        wired
    }

    pub fn stamp_year(&mut self, year: i32) -> usize {
        let effects = crate::year::plan(year, self.registry.year_slots.len());
        self.apply(&effects);
        effects.len()
    }

    /// Replaces the content of every placeholder with `html`. Returns the
    /// number of placeholders filled.
    pub fn inject_navigation(&mut self, html: &str) -> usize {
        let effects = nav::plan(html, self.registry.placeholders.len());
        self.apply(&effects);
        effects.len()
    }

    /// Continuation of a successful navigation load. Runs at most once per
    /// page; later calls return `None`.
    pub fn navigation_ready(&mut self) -> Option<(bool, Vec<usize>)> {
        if self.navigation_ready {
            return None;
        }
        self.navigation_ready = true;
        self.registry.scan_navigation(&self.document);
        let toggle = self.wire_theme_toggle();
        let links = self.highlight_active_link();
        Some((toggle, links))
    }

    fn wire_theme_toggle(&mut self) -> bool {
        let Some(toggle) = self.registry.theme_toggle.clone() else {
            tracing::debug!("no theme toggle control");
            return false;
        };
        self.listeners.push(Listener {
            node: toggle,
            handler: Handler::ToggleTheme,
        });
        true
    }

    fn highlight_active_link(&mut self) -> Vec<usize> {
        let hrefs: Vec<Option<String>> = self
            .registry
            .nav_links
            .iter()
            .map(|link| dom::attr(link, "href"))
            .collect();
        let effects = highlight::plan(
            self.config.page_url.path(),
            hrefs.iter().map(|h| h.as_deref()),
        );
        self.apply(&effects);
        let links = highlight::emphasised_links(&effects);
        tracing::debug!(
            page = %highlight::page_identifier(self.config.page_url.path()),
            links = ?links,
            "highlighted active navigation"
        );
        links
    }

    /// Dispatches a click on `target`, bubbling through its ancestors.
    /// Returns the number of handlers run.
    pub fn click(&mut self, target: &NodeRef) -> usize {
        let mut handlers = Vec::new();
        for node in target.inclusive_ancestors() {
            for listener in self.listeners.iter().filter(|l| l.node == node) {
                handlers.push(listener.handler);
            }
        }
        for handler in &handlers {
            self.run_handler(*handler);
        }
        handlers.len()
    }

    /// Clicks the first element matching `selector`. `Ok(false)` when nothing
    /// matches.
    pub fn click_selector(&mut self, selector: &str) -> anyhow::Result<bool> {
        let found = self
            .document
            .select(selector)
            .map_err(|()| anyhow::anyhow!("invalid selector {selector:?}"))?
            .next()
            .map(|n| n.as_node().clone());
        match found {
            Some(node) => {
                self.click(&node);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn run_handler(&mut self, handler: Handler) {
        match handler {
            Handler::ToggleTheme => {
                let current = self.theme_attr();
                let (next, effects) = theme::toggle(current.as_deref(), &self.config.theme_key);
                self.apply(&effects);
                tracing::debug!(from = ?current, to = %next, "toggled theme");
            }
            Handler::Accordion { group, button } => {
                let Some(accordion) = self.registry.accordions.get(group) else {
                    return;
                };
                let Some(enclosing) = accordion.enclosing_item(button) else {
                    return;
                };
                let flags: Vec<Option<String>> = accordion
                    .items
                    .iter()
                    .map(|i| dom::attr(i, EXPANDED_ATTR))
                    .collect();
                let state = AccordionState::from_flags(flags.iter().map(|f| f.as_deref()));
                let mode = self.config.accordion_mode;
                let (_, effects) = match enclosing {
                    Enclosing::Own(item) => state.click(group, item, mode),
                    Enclosing::Outer(item) => {
                        let was_open = dom::attr(&item, EXPANDED_ATTR).as_deref() == Some("true");
                        state.click_outer(group, button, was_open, mode)
                    }
                };
                self.apply(&effects);
            }
        }
    }

    pub fn apply(&mut self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::SetAttribute {
                    target,
                    name,
                    value,
                } => {
                    if let Some(node) = self.node(*target) {
                        dom::set_attr(&node, name, value);
                    }
                }
                Effect::SetStyle {
                    target,
                    property,
                    value,
                } => {
                    if let Some(node) = self.node(*target) {
                        let existing = dom::attr(&node, "style").unwrap_or_default();
                        dom::set_attr(&node, "style", &dom::merge_style(&existing, property, value));
                    }
                }
                Effect::ReplaceInnerHtml { target, html } => {
                    if let Some(node) = self.node(*target) {
                        dom::replace_inner_html(&node, html);
                    }
                }
                Effect::SetText { target, text } => {
                    if let Some(node) = self.node(*target) {
                        dom::set_text(&node, text);
                    }
                }
                Effect::Persist { key, value } => {
                    if let Err(err) = self.storage.set(key, value) {
                        tracing::warn!(key = %key, error = %format!("{err:#}"), "could not persist preference");
                    }
                }
            }
        }
    }

    fn node(&self, target: Target) -> Option<NodeRef> {
        let node = self.registry.resolve(target);
        if node.is_none() {
            tracing::debug!(?target, "effect target not present");
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn page(html: &str, storage: MemoryStorage) -> Page {
        let url = Url::parse("https://site.example/about.html").unwrap();
        Page::parse(html, BootConfig::new(url), Box::new(storage))
    }

    fn item_flags(page: &Page) -> Vec<Option<String>> {
        page.registry().accordions[0]
            .items
            .iter()
            .map(|i| dom::attr(i, EXPANDED_ATTR))
            .collect()
    }

    const ACCORDION_PAGE: &str = r#"<html><body>
<div data-accordion>
  <div class="acc-item" id="a" aria-expanded="false"><button data-acc-btn id="a-btn"><span id="a-label">A</span></button></div>
  <div class="acc-item" id="b" aria-expanded="true"><button data-acc-btn id="b-btn">B</button></div>
</div>
<div data-accordion>
  <div class="acc-item" id="c" aria-expanded="true"><button data-acc-btn id="c-btn">C</button></div>
</div>
</body></html>"#;

    #[test]
    fn saved_theme_is_applied_to_root() {
        let mut p = page("<html><body></body></html>", MemoryStorage::with_entry("as_theme", "light"));
        assert_eq!(p.apply_saved_theme(), Theme::Light);
        assert_eq!(p.theme_attr().as_deref(), Some("light"));

        let mut p = page("<html><body></body></html>", MemoryStorage::with_entry("as_theme", "blue"));
        assert_eq!(p.apply_saved_theme(), Theme::Dark);
        assert_eq!(p.theme_attr().as_deref(), Some("dark"));
    }

    #[test]
    fn accordion_single_open_per_container() {
        let mut p = page(ACCORDION_PAGE, MemoryStorage::new());
        assert_eq!(p.wire_accordions(), 3);

        assert!(p.click_selector("#a-btn").unwrap());
        assert_eq!(
            item_flags(&p),
            vec![Some("true".to_string()), Some("false".to_string())]
        );

        assert!(p.click_selector("#a-btn").unwrap());
        assert_eq!(
            item_flags(&p),
            vec![Some("false".to_string()), Some("false".to_string())]
        );

        // The second container is untouched.
        let c = p.registry().accordions[1].items[0].clone();
        assert_eq!(dom::attr(&c, EXPANDED_ATTR).as_deref(), Some("true"));
    }

    #[test]
    fn click_on_nested_label_bubbles_to_button() {
        let mut p = page(ACCORDION_PAGE, MemoryStorage::new());
        p.wire_accordions();
        assert!(p.click_selector("#a-label").unwrap());
        assert_eq!(item_flags(&p)[0].as_deref(), Some("true"));
    }

    #[test]
    fn multi_mode_keeps_other_items_open() {
        let url = Url::parse("https://site.example/").unwrap();
        let mut config = BootConfig::new(url);
        config.accordion_mode = AccordionMode::Multi;
        let mut p = Page::parse(ACCORDION_PAGE, config, Box::new(MemoryStorage::new()));
        p.wire_accordions();
        p.click_selector("#a-btn").unwrap();
        assert_eq!(
            item_flags(&p),
            vec![Some("true".to_string()), Some("true".to_string())]
        );
    }

    #[test]
    fn item_enclosing_the_container_is_toggled_after_collapse() {
        let html = r#"<html><body>
<div class="acc-item" id="x" aria-expanded="false">
  <div data-accordion>
    <div class="acc-item" id="y" aria-expanded="true"></div>
    <button data-acc-btn id="btn">B</button>
  </div>
</div>
</body></html>"#;
        let mut p = page(html, MemoryStorage::new());
        assert_eq!(p.wire_accordions(), 1);

        let flag = |p: &Page, id: &str| {
            let node = p.document().select_first(id).unwrap().as_node().clone();
            dom::attr(&node, EXPANDED_ATTR)
        };

        p.click_selector("#btn").unwrap();
        assert_eq!(flag(&p, "#x").as_deref(), Some("true"));
        assert_eq!(flag(&p, "#y").as_deref(), Some("false"));

        p.click_selector("#btn").unwrap();
        assert_eq!(flag(&p, "#x").as_deref(), Some("false"));
        assert_eq!(flag(&p, "#y").as_deref(), Some("false"));
    }

    #[test]
    fn empty_theme_attribute_toggles_to_light() {
        let mut p = page(
            r#"<html data-theme=""><body><header data-include="nav"></header></body></html>"#,
            MemoryStorage::new(),
        );
        p.inject_navigation("<button data-theme-toggle>T</button>");
        p.navigation_ready();
        p.click_selector("[data-theme-toggle]").unwrap();
        assert_eq!(p.theme_attr().as_deref(), Some("light"));
        assert_eq!(p.storage().get("as_theme").as_deref(), Some("light"));
    }

    #[test]
    fn unwired_clicks_do_nothing() {
        let mut p = page(ACCORDION_PAGE, MemoryStorage::new());
        assert!(p.click_selector("#a-btn").unwrap());
        assert_eq!(item_flags(&p)[0].as_deref(), Some("false"));
        assert!(!p.click_selector("#missing").unwrap());
        assert!(p.click_selector("[[").is_err());
    }

    #[test]
    fn navigation_continuation_runs_once() {
        let mut p = page(
            r#"<html><body><header data-include="nav"></header></body></html>"#,
            MemoryStorage::new(),
        );
        p.apply_saved_theme();
        let filled = p.inject_navigation(
            r#"<nav class="nav"><a class="chip" href="index.html">Home</a><a class="chip" href="About.html">About</a><button data-theme-toggle>T</button></nav>"#,
        );
        assert_eq!(filled, 1);

        let (toggle, links) = p.navigation_ready().unwrap();
        assert!(toggle);
        assert_eq!(links, vec![1]);
        assert!(p.navigation_ready().is_none());

        // A single listener: one click flips exactly once.
        p.click_selector("[data-theme-toggle]").unwrap();
        assert_eq!(p.theme_attr().as_deref(), Some("light"));
        assert_eq!(p.storage().get("as_theme").as_deref(), Some("light"));
    }

    #[test]
    fn emphasis_style_is_merged_into_existing_style() {
        let mut p = page(
            r#"<html><body><header data-include="nav"></header></body></html>"#,
            MemoryStorage::new(),
        );
        p.inject_navigation(
            r#"<div class="nav"><a class="chip" style="color: red" href="about.html">About</a></div>"#,
        );
        p.navigation_ready();
        let link = p.registry().nav_links[0].clone();
        assert_eq!(
            dom::attr(&link, "style").as_deref(),
            Some("color: red; outline: 2px solid var(--accent); outline-offset: 2px")
        );
    }
}
