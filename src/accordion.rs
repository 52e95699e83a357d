use clap::ValueEnum;

use crate::effect::{Effect, Target};

/// Attribute holding an item's expansion flag.
pub const EXPANDED_ATTR: &str = "aria-expanded";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum AccordionMode {
    /// Opening an item closes every other item in the same container.
    #[default]
    Single,
    /// Items open and close independently.
    Multi,
}

/// Expansion flags of one container's items, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccordionState {
    pub expanded: Vec<bool>,
}

impl AccordionState {
    /// Builds the state from raw `aria-expanded` values; only `"true"` counts
    /// as expanded.
    pub fn from_flags<'a>(flags: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        Self {
            expanded: flags.into_iter().map(|f| f == Some("true")).collect(),
        }
    }

    pub fn open_count(&self) -> usize {
        self.expanded.iter().filter(|e| **e).count()
    }

    /// Click on the button of `item`. Returns the next state and the attribute
    /// writes for container `group`. An out-of-range item is a no-op.
    pub fn click(&self, group: usize, item: usize, mode: AccordionMode) -> (Self, Vec<Effect>) {
        let Some(&was_open) = self.expanded.get(item) else {
            return (self.clone(), Vec::new());
        };

        let mut next = self.clone();
        let mut effects = Vec::new();

        if mode == AccordionMode::Single {
            for (i, flag) in next.expanded.iter_mut().enumerate() {
                *flag = false;
                effects.push(set_flag(group, i, false));
            }
        }

        next.expanded[item] = !was_open;
        effects.push(set_flag(group, item, !was_open));
        (next, effects)
    }

    /// Click on button `button` whose enclosing item lies outside the
    /// container. The container's items collapse as usual (single mode) and
    /// the enclosing item flips from `was_open`.
    pub fn click_outer(
        &self,
        group: usize,
        button: usize,
        was_open: bool,
        mode: AccordionMode,
    ) -> (Self, Vec<Effect>) {
        let mut next = self.clone();
        let mut effects = Vec::new();

        if mode == AccordionMode::Single {
            for (i, flag) in next.expanded.iter_mut().enumerate() {
                *flag = false;
                effects.push(set_flag(group, i, false));
            }
        }

        effects.push(Effect::SetAttribute {
            target: Target::EnclosingItem { group, button },
            name: EXPANDED_ATTR,
            value: flag_value(!was_open),
        });
        (next, effects)
    }
}

fn flag_value(open: bool) -> String {
    let value = if open { "true" } else { "false" };
    value.to_string()
}

fn set_flag(group: usize, item: usize, open: bool) -> Effect {
    Effect::SetAttribute {
        target: Target::AccordionItem { group, item },
        name: EXPANDED_ATTR,
        value: flag_value(open),
    }
}
