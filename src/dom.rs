//! Small DOM operations over `kuchiki` trees: attribute access, class tests,
//! `closest`, inner HTML and text replacement, inline style merging.

use anyhow::Context as _;
use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink as _;

pub fn parse_document(html: &str) -> NodeRef {
    kuchiki::parse_html().one(html)
}

pub fn serialize(document: &NodeRef) -> anyhow::Result<String> {
    let mut out = Vec::new();
    document.serialize(&mut out).context("serialize document")?;
    String::from_utf8(out).context("document html not utf-8")
}

pub fn attr(node: &NodeRef, name: &str) -> Option<String> {
    let element = node.as_element()?;
    element.attributes.borrow().get(name).map(|v| v.to_string())
}

pub fn set_attr(node: &NodeRef, name: &str, value: &str) {
    if let Some(element) = node.as_element() {
        element
            .attributes
            .borrow_mut()
            .insert(name, value.to_string());
    }
}

pub fn has_class(node: &NodeRef, class: &str) -> bool {
    attr(node, "class")
        .map(|classes| classes.split_whitespace().any(|c| c == class))
        .unwrap_or(false)
}

/// Nearest inclusive ancestor element carrying `class`.
pub fn closest_with_class(node: &NodeRef, class: &str) -> Option<NodeRef> {
    node.inclusive_ancestors()
        .find(|n| n.as_element().is_some() && has_class(n, class))
}

fn clear_children(node: &NodeRef) {
    let children: Vec<NodeRef> = node.children().collect();
    for child in children {
        child.detach();
    }
}

/// Replace the children of `node` with the parsed `html` fragment.
///
/// The fragment is parsed inside a wrapper matching `node`'s element, so rows
/// land in a table section and options in a select; every other element is
/// treated as a `<body>` child. Deeper contexts (`td`, `svg`) are not modelled.
pub fn replace_inner_html(node: &NodeRef, html: &str) {
    clear_children(node);

    let context = node
        .as_element()
        .map(|e| e.name.local.to_string())
        .unwrap_or_default();
    // Wrapping in <body> keeps head-only tags (link, style, meta) in place
    // instead of letting the parser hoist them into <head>.
    let (wrapped, holder) = match context.as_str() {
        "table" => (format!("<body><table>{html}</table></body>"), "table"),
        "tbody" | "thead" | "tfoot" => (
            format!("<body><table><{context}>{html}</{context}></table></body>"),
            context.as_str(),
        ),
        "tr" => (
            format!("<body><table><tbody><tr>{html}</tr></tbody></table></body>"),
            "tr",
        ),
        "select" => (format!("<body><select>{html}</select></body>"), "select"),
        _ => (format!("<body>{html}</body>"), "body"),
    };

    let fragment = parse_document(&wrapped);
    let Ok(holder) = fragment.select_first(holder) else {
        return;
    };
    let parsed: Vec<NodeRef> = holder.as_node().children().collect();
    for child in parsed {
        child.detach();
        node.append(child);
    }
}

pub fn set_text(node: &NodeRef, text: &str) {
    clear_children(node);
    node.append(NodeRef::new_text(text));
}

/// Set one property in an inline `style` attribute value, dropping any earlier
/// declaration of the same property.
pub fn merge_style(existing: &str, property: &str, value: &str) -> String {
    let mut declarations: Vec<String> = existing
        .split(';')
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .filter(|d| {
            let name = d.split(':').next().unwrap_or("").trim();
            !name.eq_ignore_ascii_case(property)
        })
        .map(str::to_string)
        .collect();
    declarations.push(format!("{property}: {value}"));
    declarations.join("; ")
}
