use std::fmt;

use crate::effect::{Effect, Target};

/// Attribute on the document root that styling rules key off.
pub const THEME_ATTR: &str = "data-theme";

/// Storage key the preference is persisted under.
pub const DEFAULT_THEME_KEY: &str = "as_theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Only the exact strings `light` and `dark` are accepted; anything else,
    /// including a missing value, falls back to dark.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("light") => Theme::Light,
            Some("dark") => Theme::Dark,
            _ => Theme::Dark,
        }
    }

    /// Theme that a toggle click moves to from the current root attribute.
    ///
    /// An unset or empty attribute counts as dark. Any other value than `dark`
    /// moves to dark, so an unexpected attribute value is normalised on the
    /// first click.
    pub fn next_after(current: Option<&str>) -> Self {
        match current {
            None | Some("") | Some("dark") => Theme::Light,
            Some(_) => Theme::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Theme applied at startup from the stored preference.
pub fn initial(stored: Option<&str>) -> (Theme, Vec<Effect>) {
    let theme = Theme::from_stored(stored);
    (theme, vec![set_root(theme)])
}

/// One toggle click: flip the root attribute and persist the new value.
pub fn toggle(current: Option<&str>, key: &str) -> (Theme, Vec<Effect>) {
    let next = Theme::next_after(current);
    let effects = vec![
        set_root(next),
        Effect::Persist {
            key: key.to_string(),
            value: next.as_str().to_string(),
        },
    ];
    (next, effects)
}

fn set_root(theme: Theme) -> Effect {
    Effect::SetAttribute {
        target: Target::Root,
        name: THEME_ATTR,
        value: theme.as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_value_must_match_exactly() {
        assert_eq!(Theme::from_stored(Some("light")), Theme::Light);
        assert_eq!(Theme::from_stored(Some("dark")), Theme::Dark);
        assert_eq!(Theme::from_stored(None), Theme::Dark);
        assert_eq!(Theme::from_stored(Some("Light")), Theme::Dark);
        assert_eq!(Theme::from_stored(Some(" light")), Theme::Dark);
        assert_eq!(Theme::from_stored(Some("")), Theme::Dark);
    }

    #[test]
    fn toggle_flips_and_persists() {
        let (next, effects) = toggle(Some("dark"), "as_theme");
        assert_eq!(next, Theme::Light);
        assert_eq!(
            effects,
            vec![
                Effect::SetAttribute {
                    target: Target::Root,
                    name: THEME_ATTR,
                    value: "light".to_string(),
                },
                Effect::Persist {
                    key: "as_theme".to_string(),
                    value: "light".to_string(),
                },
            ]
        );
    }

    #[test]
    fn unset_or_unknown_attribute_toggles_like_dark_then_to_dark() {
        assert_eq!(Theme::next_after(None), Theme::Light);
        assert_eq!(Theme::next_after(Some("")), Theme::Light);
        assert_eq!(Theme::next_after(Some("light")), Theme::Dark);
        assert_eq!(Theme::next_after(Some("sepia")), Theme::Dark);
    }

    #[test]
    fn toggling_twice_is_identity() {
        for start in [Theme::Light, Theme::Dark] {
            let once = Theme::next_after(Some(start.as_str()));
            let twice = Theme::next_after(Some(once.as_str()));
            assert_eq!(twice, start);
        }
    }
}
