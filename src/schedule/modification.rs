use crate::schedule::repo::Prescription;

/// Coarse classification of a manual edit against the values currently in
/// effect for the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModificationType {
    Unchanged,
    Increased,
    Reduced,
    Mixed,
}

impl ModificationType {
    pub fn as_str(self) -> &'static str {
        match self {
            ModificationType::Unchanged => "unchanged",
            ModificationType::Increased => "increased",
            ModificationType::Reduced => "reduced",
            ModificationType::Mixed => "mixed",
        }
    }
}

fn tally<T: PartialOrd>(new: Option<T>, base: T, increased: &mut u32, reduced: &mut u32) {
    if let Some(new) = new {
        if new > base {
            *increased += 1;
        } else if new < base {
            *reduced += 1;
        }
    }
}

/// Compares each provided field with the baseline and tallies the direction
/// of change. Fields left out of the edit do not count.
pub fn classify(
    baseline: &Prescription,
    sets: Option<i32>,
    reps: Option<i32>,
    weight_value: Option<f64>,
) -> ModificationType {
    let mut increased = 0;
    let mut reduced = 0;
    tally(sets, baseline.sets, &mut increased, &mut reduced);
    tally(reps, baseline.reps, &mut increased, &mut reduced);
    tally(weight_value, baseline.weight_value, &mut increased, &mut reduced);

    match (increased > 0, reduced > 0) {
        (true, true) => ModificationType::Mixed,
        (true, false) => ModificationType::Increased,
        (false, true) => ModificationType::Reduced,
        (false, false) => ModificationType::Unchanged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline() -> Prescription {
        Prescription {
            sets: 3,
            reps: 10,
            weight_value: 50.0,
            weight_unit: "kg".into(),
        }
    }

    #[test]
    fn more_sets_fewer_reps_is_mixed() {
        let c = classify(&baseline(), Some(4), Some(8), None);
        assert_eq!(c, ModificationType::Mixed);
    }

    #[test]
    fn only_more_sets_is_increased() {
        let c = classify(&baseline(), Some(4), None, None);
        assert_eq!(c, ModificationType::Increased);
    }

    #[test]
    fn only_less_weight_is_reduced() {
        let c = classify(&baseline(), None, None, Some(45.0));
        assert_eq!(c, ModificationType::Reduced);
    }

    #[test]
    fn identical_values_are_unchanged() {
        let c = classify(&baseline(), Some(3), Some(10), Some(50.0));
        assert_eq!(c, ModificationType::Unchanged);
    }

    #[test]
    fn no_fields_is_unchanged() {
        let c = classify(&baseline(), None, None, None);
        assert_eq!(c, ModificationType::Unchanged);
    }
}
