//! The fixed weekly split. Day ordering everywhere in the API follows this
//! table, never the store's row order.

pub struct DayTemplate {
    pub day: &'static str,
    pub label: &'static str,
    pub categories: &'static [&'static str],
}

pub const WEEKLY_PLAN: &[DayTemplate] = &[
    DayTemplate {
        day: "Monday",
        label: "Chest & Triceps",
        categories: &["Chest", "Arms"],
    },
    DayTemplate {
        day: "Tuesday",
        label: "Back & Biceps",
        categories: &["Back", "Arms"],
    },
    DayTemplate {
        day: "Wednesday",
        label: "Legs & Shoulders",
        categories: &["Legs", "Shoulders"],
    },
    DayTemplate {
        day: "Thursday",
        label: "Core & Functional",
        categories: &["Core", "Cardio"],
    },
    DayTemplate {
        day: "Friday",
        label: "Full-Body",
        categories: &["Full Body"],
    },
];

/// Categories sampled without the compound/accessory split.
const SPECIAL_CATEGORIES: &[&str] = &["Core", "Cardio", "Full Body"];

pub const COMPOUND: &str = "Compound";
pub const ACCESSORY: &str = "Accessory";

/// How many rows each category contributes on a special day.
pub const SPECIAL_SAMPLE: i64 = 6;
/// How many rows per type each category contributes on a split day.
pub const SPLIT_SAMPLE: i64 = 2;

impl DayTemplate {
    pub fn is_special(&self) -> bool {
        self.categories
            .iter()
            .any(|c| SPECIAL_CATEGORIES.contains(c))
    }
}

/// Position of a day within the template, for ordering merged rows.
pub fn day_position(day: &str) -> Option<usize> {
    WEEKLY_PLAN.iter().position(|t| t.day == day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_days_monday_through_friday() {
        let days: Vec<&str> = WEEKLY_PLAN.iter().map(|t| t.day).collect();
        assert_eq!(
            days,
            vec!["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
        );
    }

    #[test]
    fn special_days_are_thursday_and_friday() {
        let special: Vec<&str> = WEEKLY_PLAN
            .iter()
            .filter(|t| t.is_special())
            .map(|t| t.day)
            .collect();
        assert_eq!(special, vec!["Thursday", "Friday"]);
    }

    #[test]
    fn day_position_follows_template() {
        assert_eq!(day_position("Monday"), Some(0));
        assert_eq!(day_position("Friday"), Some(4));
        assert_eq!(day_position("Sunday"), None);
    }
}
