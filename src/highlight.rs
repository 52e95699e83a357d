use crate::effect::{Effect, Target};

/// Identifier used when the page path has no last segment.
pub const DEFAULT_PAGE: &str = "index.html";

pub const EMPHASIS: [(&str, &str); 2] = [
    ("outline", "2px solid var(--accent)"),
    ("outline-offset", "2px"),
];

/// Lowercased last path segment, `index.html` when it is empty.
pub fn page_identifier(path: &str) -> String {
    let last = path.rsplit('/').next().unwrap_or("");
    let page = if last.is_empty() { DEFAULT_PAGE } else { last };
    page.to_lowercase()
}

/// Emphasis for every link whose lowercased target equals the page
/// identifier. Duplicate matches are all emphasised.
pub fn plan<'a>(path: &str, hrefs: impl IntoIterator<Item = Option<&'a str>>) -> Vec<Effect> {
    let current = page_identifier(path);
    let mut effects = Vec::new();
    for (i, href) in hrefs.into_iter().enumerate() {
        if href.unwrap_or("").to_lowercase() != current {
            continue;
        }
        for (property, value) in EMPHASIS {
            effects.push(Effect::SetStyle {
                target: Target::NavLink(i),
                property,
                value: value.to_string(),
            });
        }
    }
    effects
}

/// Links touched by a plan, in order, without repeats.
pub fn emphasised_links(effects: &[Effect]) -> Vec<usize> {
    let mut links = Vec::new();
    for effect in effects {
        if let Effect::SetStyle {
            target: Target::NavLink(i),
            ..
        } = effect
        {
            if links.last() != Some(i) {
                links.push(*i);
            }
        }
    }
    links
}
