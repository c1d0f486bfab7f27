//! Accepted keys for the enum-ish text fields on a profile. The catalog is
//! fixed; unknown keys are rejected at the handler layer.

pub const TRAINING_GOALS: &[&str] = &[
    "muscle_gain",
    "fat_loss",
    "tone_up",
    "improve_strength",
    "general_fitness",
];

pub const EXPERIENCE_LEVELS: &[&str] = &["beginner", "casual", "consistent", "advanced"];

pub const INJURY_AREAS: &[&str] = &[
    "none",
    "shoulders",
    "lower_back",
    "knees",
    "wrists",
    "elbows",
    "neck",
    "ankles",
    "hips",
];

pub const WEIGHT_UNITS: &[&str] = &["kg", "lb"];

pub const HEIGHT_UNITS: &[&str] = &["cm", "in"];

/// Absent values pass; present values must match one of the allowed keys.
pub fn is_valid_key(value: Option<&str>, allowed: &[&str]) -> bool {
    match value {
        None => true,
        Some(v) => allowed.contains(&v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_values_pass() {
        assert!(is_valid_key(None, TRAINING_GOALS));
    }

    #[test]
    fn known_keys_pass() {
        assert!(is_valid_key(Some("muscle_gain"), TRAINING_GOALS));
        assert!(is_valid_key(Some("beginner"), EXPERIENCE_LEVELS));
        assert!(is_valid_key(Some("lower_back"), INJURY_AREAS));
        assert!(is_valid_key(Some("kg"), WEIGHT_UNITS));
    }

    #[test]
    fn unknown_keys_fail() {
        assert!(!is_valid_key(Some("get_swole"), TRAINING_GOALS));
        assert!(!is_valid_key(Some("pro"), EXPERIENCE_LEVELS));
        assert!(!is_valid_key(Some("stone"), WEIGHT_UNITS));
    }
}
