use chrono::Datelike as _;

use crate::effect::{Effect, Target};

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Year text for each of `slots` placeholders. Plain integer formatting, no
/// locale grouping.
pub fn plan(year: i32, slots: usize) -> Vec<Effect> {
    (0..slots)
        .map(|i| Effect::SetText {
            target: Target::YearSlot(i),
            text: year.to_string(),
        })
        .collect()
}
