use std::collections::HashMap;

use crate::program::repo::DefaultScheduleRow;
use crate::program::template::{COMPOUND, WEEKLY_PLAN};
use crate::schedule::dto::{DayView, WeightView, WorkoutView};
use crate::schedule::repo::OverrideRow;

/// Merges the default schedule with a user's override rows into the weekly
/// view. Days follow the template order; within a day compound movements
/// come first, otherwise the store order is kept. Entries without an
/// override render null sets/reps/weight.
pub fn assemble_week(defaults: &[DefaultScheduleRow], overrides: Vec<OverrideRow>) -> Vec<DayView> {
    let by_key: HashMap<(String, i64), OverrideRow> = overrides
        .into_iter()
        .map(|o| ((o.day.clone(), o.workout_id), o))
        .collect();

    WEEKLY_PLAN
        .iter()
        .map(|template| {
            let mut rows: Vec<&DefaultScheduleRow> = defaults
                .iter()
                .filter(|r| r.day == template.day)
                .collect();
            // stable, so equal kinds keep their relative order
            rows.sort_by_key(|r| r.kind != COMPOUND);

            DayView {
                day: template.day.to_string(),
                category: template.label.to_string(),
                workouts: rows
                    .into_iter()
                    .map(|r| {
                        let resolved = by_key
                            .get(&(r.day.clone(), r.workout_id))
                            .map(|o| o.resolve());
                        WorkoutView {
                            name: r.name.clone(),
                            category: r.category.clone(),
                            kind: r.kind.clone(),
                            sets: resolved.as_ref().map(|p| p.sets),
                            reps: resolved.as_ref().map(|p| p.reps),
                            weight: resolved.map(|p| WeightView {
                                value: p.weight_value,
                                unit: p.weight_unit,
                            }),
                        }
                    })
                    .collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_row(day: &str, id: i64, name: &str, kind: &str) -> DefaultScheduleRow {
        DefaultScheduleRow {
            day: day.into(),
            workout_id: id,
            name: name.into(),
            category: "Chest".into(),
            kind: kind.into(),
        }
    }

    fn override_row(day: &str, id: i64, sets: i32) -> OverrideRow {
        OverrideRow {
            day: day.into(),
            workout_id: id,
            sets,
            reps: 10,
            weight_value: 60.0,
            weight_unit: "kg".into(),
            sets_modified: None,
            reps_modified: None,
            weight_modified: None,
            is_modified: false,
        }
    }

    #[test]
    fn days_follow_template_order_regardless_of_row_order() {
        let defaults = vec![
            default_row("Friday", 1, "Thruster", "Compound"),
            default_row("Monday", 2, "Bench Press", "Compound"),
            default_row("Wednesday", 3, "Back Squat", "Compound"),
        ];
        let week = assemble_week(&defaults, vec![]);
        let days: Vec<&str> = week.iter().map(|d| d.day.as_str()).collect();
        assert_eq!(
            days,
            vec!["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]
        );
        assert_eq!(week[0].workouts.len(), 1);
        assert_eq!(week[1].workouts.len(), 0);
    }

    #[test]
    fn compounds_sort_before_accessories_stably() {
        let defaults = vec![
            default_row("Monday", 1, "Cable Fly", "Accessory"),
            default_row("Monday", 2, "Bench Press", "Compound"),
            default_row("Monday", 3, "Triceps Pushdown", "Accessory"),
            default_row("Monday", 4, "Incline Press", "Compound"),
        ];
        let week = assemble_week(&defaults, vec![]);
        let names: Vec<&str> = week[0].workouts.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Bench Press",
                "Incline Press",
                "Cable Fly",
                "Triceps Pushdown"
            ]
        );
    }

    #[test]
    fn unmatched_defaults_render_null_prescription() {
        let defaults = vec![default_row("Monday", 1, "Bench Press", "Compound")];
        let week = assemble_week(&defaults, vec![]);
        let workout = &week[0].workouts[0];
        assert_eq!(workout.sets, None);
        assert_eq!(workout.reps, None);
        assert!(workout.weight.is_none());
    }

    #[test]
    fn override_decorates_matching_day_and_workout_only() {
        let defaults = vec![
            default_row("Monday", 1, "Bench Press", "Compound"),
            default_row("Friday", 1, "Bench Press", "Compound"),
        ];
        let week = assemble_week(&defaults, vec![override_row("Monday", 1, 4)]);
        assert_eq!(week[0].workouts[0].sets, Some(4));
        assert_eq!(week[4].workouts[0].sets, None);
    }

    #[test]
    fn modified_layer_wins_in_the_view() {
        let defaults = vec![default_row("Monday", 1, "Bench Press", "Compound")];
        let overrides = vec![OverrideRow {
            sets_modified: Some(5),
            weight_modified: Some(70.0),
            is_modified: true,
            ..override_row("Monday", 1, 3)
        }];
        let week = assemble_week(&defaults, overrides);
        let workout = &week[0].workouts[0];
        assert_eq!(workout.sets, Some(5));
        assert_eq!(workout.reps, Some(10));
        assert_eq!(
            workout.weight,
            Some(WeightView {
                value: 70.0,
                unit: "kg".into()
            })
        );
    }
}
