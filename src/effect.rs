/// Logical address of an element, resolved against the page registry when an
/// effect is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The document root (`<html>`).
    Root,
    Placeholder(usize),
    NavLink(usize),
    AccordionItem { group: usize, item: usize },
    /// Nearest `.acc-item` of a container's button, wherever it sits.
    EnclosingItem { group: usize, button: usize },
    YearSlot(usize),
}

/// One mutation computed by a component. Components never touch the tree
/// themselves; `Page::apply` performs these in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SetAttribute {
        target: Target,
        name: &'static str,
        value: String,
    },
    /// Set one inline style property, keeping the other declarations.
    SetStyle {
        target: Target,
        property: &'static str,
        value: String,
    },
    ReplaceInnerHtml {
        target: Target,
        html: String,
    },
    SetText {
        target: Target,
        text: String,
    },
    Persist {
        key: String,
        value: String,
    },
}
