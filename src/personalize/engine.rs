use std::collections::{HashMap, HashSet};

use serde::Serialize;
use serde_json::Value;
use time::{Date, OffsetDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    errors::ApiError,
    personalize::dto::{
        PersonalizeResetResponse, PersonalizeResponse, PersonalizedDay, PersonalizedItem,
    },
    profile::repo::UserProfile,
    program::{repo as program_repo, repo::ProgramWorkout, template::day_position},
    schedule::repo::{self as schedule_repo, NewOverrideRow},
    state::AppState,
};

const SYSTEM_PROMPT: &str = r#"You are a fitness coach assigning sets, reps and working weight.

You are given a JSON payload:
  - profile: { age, height, weight, background, training_goal, training_experience, injury_caution_area }
  - workouts: array of { id, name }

Reply with ONLY a JSON array, one object per workout id, each shaped exactly:
  { "id": 1, "sets": 3, "reps": 12, "weight_value": 50, "weight_unit": "kg" }

Rules:
  - weight_unit must be "kg" or "lb".
  - weight_value may be 0 only for bodyweight movements; barbell squats,
    deadlifts, bench presses and overhead presses must never be 0.
  - Respect the injury caution area when choosing loads.
  - No markdown fences, no commentary, no wrapping object."#;

#[derive(Debug, Serialize)]
struct PromptProfile<'a> {
    age: Option<i64>,
    height: Option<f64>,
    weight: Option<f64>,
    background: Option<&'a str>,
    training_goal: Option<&'a str>,
    training_experience: Option<&'a str>,
    injury_caution_area: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct PromptWorkout<'a> {
    id: i64,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct PromptPayload<'a> {
    profile: PromptProfile<'a>,
    workouts: Vec<PromptWorkout<'a>>,
}

/// One validated reply item, before expansion across days.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanItem {
    pub id: i64,
    pub sets: i32,
    pub reps: i32,
    pub weight_value: f64,
    pub weight_unit: String,
}

pub async fn personalize_plan(
    state: &AppState,
    user_id: Uuid,
) -> Result<PersonalizeResponse, ApiError> {
    let profile = UserProfile::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let meta = program_repo::find_active(&state.db)
        .await?
        .ok_or_else(|| ApiError::Fatal("No active program found".into()))?;

    // write-once per (user, program) until an explicit reset
    if schedule_repo::has_overrides(&state.db, user_id, meta.id).await? {
        return Err(ApiError::Conflict(
            "Plan already personalized for this program; reset it first".into(),
        ));
    }

    let workouts = program_repo::load_program_workouts(&state.db, meta.id).await?;
    if workouts.is_empty() {
        return Err(ApiError::Fatal("Active program has no workouts".into()));
    }

    let payload = build_payload(&profile, &workouts);
    let payload_json =
        serde_json::to_string(&payload).map_err(|e| ApiError::Internal(e.into()))?;

    let reply = state
        .coach
        .complete(SYSTEM_PROMPT, &payload_json)
        .await
        .map_err(ApiError::Internal)?;

    let items = validate_items(parse_reply(&reply)?)?;
    let rows = expand_items(&items, &workouts);
    if rows.is_empty() {
        warn!(user_id = %user_id, program_id = meta.id, "model reply matched no program workouts");
        return Err(ApiError::Unprocessable(
            "No valid data in personalized plan".into(),
        ));
    }

    let mut tx = state.db.begin().await?;
    match schedule_repo::insert_personalized(&mut tx, user_id, meta.id, &rows).await {
        Ok(()) => tx.commit().await?,
        Err(e) => {
            // a concurrent personalize won the race past the read guard
            let duplicate = e
                .as_database_error()
                .map(|db_err| db_err.is_unique_violation())
                .unwrap_or(false);
            if duplicate {
                return Err(ApiError::Conflict(
                    "Plan already personalized for this program; reset it first".into(),
                ));
            }
            return Err(e.into());
        }
    }

    info!(user_id = %user_id, program_id = meta.id, rows = rows.len(), "plan personalized");
    Ok(PersonalizeResponse {
        program_id: meta.id,
        personalized: group_by_day(rows),
    })
}

pub async fn reset_plan(
    state: &AppState,
    user_id: Uuid,
) -> Result<PersonalizeResetResponse, ApiError> {
    let meta = program_repo::find_active(&state.db)
        .await?
        .ok_or_else(|| ApiError::Fatal("No active program found".into()))?;

    let cleared = schedule_repo::delete_for_user(&state.db, user_id, meta.id).await?;
    info!(user_id = %user_id, program_id = meta.id, cleared, "personalized plan reset");
    Ok(PersonalizeResetResponse {
        message: "Personalized plan cleared".into(),
        cleared,
    })
}

fn build_payload<'a>(
    profile: &'a UserProfile,
    workouts: &'a [ProgramWorkout],
) -> PromptPayload<'a> {
    let today = OffsetDateTime::now_utc().date();
    PromptPayload {
        profile: PromptProfile {
            age: profile.birthday.map(|b| age_from_birthday(b, today)),
            height: profile.height,
            weight: profile.weight,
            background: profile.background.as_deref(),
            training_goal: profile.training_goal.as_deref(),
            training_experience: profile.training_experience.as_deref(),
            injury_caution_area: profile.injury_caution_area.as_deref(),
        },
        workouts: workouts
            .iter()
            .map(|w| PromptWorkout {
                id: w.workout_id,
                name: &w.name,
            })
            .collect(),
    }
}

fn age_from_birthday(birthday: Date, today: Date) -> i64 {
    (today - birthday).whole_days() / 365
}

/// Strict array parse, with exactly one bounded fallback: re-parse the slice
/// between the outermost brackets. Anything else is surfaced, not repaired.
fn parse_reply(text: &str) -> Result<Vec<Value>, ApiError> {
    if let Ok(items) = serde_json::from_str::<Vec<Value>>(text) {
        return Ok(items);
    }

    let sliced = text.find('[').and_then(|start| {
        text.rfind(']')
            .filter(|&end| end > start)
            .map(|end| &text[start..=end])
    });
    if let Some(sliced) = sliced {
        if let Ok(items) = serde_json::from_str::<Vec<Value>>(sliced) {
            warn!("model reply needed bracket-slice fallback");
            return Ok(items);
        }
    }

    Err(ApiError::UpstreamInvalid {
        raw: text.to_string(),
    })
}

/// Every item must carry a numeric id/sets/reps/weight_value and an accepted
/// unit; the first violation fails the whole request, naming the workout.
fn validate_items(values: Vec<Value>) -> Result<Vec<PlanItem>, ApiError> {
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let id = value.get("id").and_then(Value::as_i64).ok_or_else(|| {
                ApiError::Unprocessable(format!("Item {index}: missing or non-numeric id"))
            })?;
            let sets = value
                .get("sets")
                .and_then(Value::as_i64)
                .ok_or_else(|| invalid_field(id, "sets"))? as i32;
            let reps = value
                .get("reps")
                .and_then(Value::as_i64)
                .ok_or_else(|| invalid_field(id, "reps"))? as i32;
            let weight_value = value
                .get("weight_value")
                .and_then(Value::as_f64)
                .ok_or_else(|| invalid_field(id, "weight_value"))?;
            let weight_unit = value
                .get("weight_unit")
                .and_then(Value::as_str)
                .filter(|u| *u == "kg" || *u == "lb")
                .ok_or_else(|| {
                    ApiError::Unprocessable(format!(
                        "Workout {id}: weight_unit must be \"kg\" or \"lb\""
                    ))
                })?
                .to_string();
            Ok(PlanItem {
                id,
                sets,
                reps,
                weight_value,
                weight_unit,
            })
        })
        .collect()
}

fn invalid_field(id: i64, field: &str) -> ApiError {
    ApiError::Unprocessable(format!("Workout {id}: {field} must be a number"))
}

/// Expands each item across every day its workout occurs on, deduplicating
/// by (day, id). Ids the program never scheduled contribute nothing.
fn expand_items(items: &[PlanItem], workouts: &[ProgramWorkout]) -> Vec<NewOverrideRow> {
    let days_by_id: HashMap<i64, &[String]> = workouts
        .iter()
        .map(|w| (w.workout_id, w.days.as_slice()))
        .collect();

    let mut seen: HashSet<(&str, i64)> = HashSet::new();
    let mut rows = Vec::new();
    for item in items {
        let Some(days) = days_by_id.get(&item.id) else {
            continue;
        };
        for day in *days {
            if seen.insert((day.as_str(), item.id)) {
                rows.push(NewOverrideRow {
                    day: day.clone(),
                    workout_id: item.id,
                    sets: item.sets,
                    reps: item.reps,
                    weight_value: item.weight_value,
                    weight_unit: item.weight_unit.clone(),
                });
            }
        }
    }
    rows
}

/// Groups inserted rows by day in template order for the response body.
fn group_by_day(rows: Vec<NewOverrideRow>) -> Vec<PersonalizedDay> {
    let mut days: Vec<PersonalizedDay> = Vec::new();
    let mut sorted = rows;
    sorted.sort_by_key(|r| day_position(&r.day).unwrap_or(usize::MAX));

    for row in sorted {
        let item = PersonalizedItem {
            workout_id: row.workout_id,
            sets: row.sets,
            reps: row.reps,
            weight_value: row.weight_value,
            weight_unit: row.weight_unit,
        };
        match days.last_mut() {
            Some(d) if d.day == row.day => d.workouts.push(item),
            _ => days.push(PersonalizedDay {
                day: row.day,
                workouts: vec![item],
            }),
        }
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn program() -> Vec<ProgramWorkout> {
        vec![
            ProgramWorkout {
                workout_id: 1,
                name: "Bench Press".into(),
                days: vec!["Monday".into(), "Friday".into()],
            },
            ProgramWorkout {
                workout_id: 2,
                name: "Plank".into(),
                days: vec!["Thursday".into()],
            },
        ]
    }

    fn item(id: i64) -> PlanItem {
        PlanItem {
            id,
            sets: 3,
            reps: 12,
            weight_value: 50.0,
            weight_unit: "kg".into(),
        }
    }

    #[test]
    fn age_is_floored_years() {
        assert_eq!(age_from_birthday(date!(2000 - 01 - 01), date!(2026 - 08 - 05)), 26);
        assert_eq!(age_from_birthday(date!(2000 - 12 - 31), date!(2026 - 08 - 05)), 25);
    }

    #[test]
    fn strict_array_parses() {
        let items = parse_reply(r#"[{"id":1,"sets":3}]"#).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn fenced_reply_is_rescued_by_bracket_slice() {
        let text = "```json\n[{\"id\":1,\"sets\":3}]\n```";
        let items = parse_reply(text).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn chatty_prefix_is_rescued_by_bracket_slice() {
        let text = "Here is your plan: [{\"id\": 2, \"sets\": 4}] Enjoy!";
        let items = parse_reply(text).unwrap();
        assert_eq!(items[0]["id"], 2);
    }

    #[test]
    fn garbage_is_rejected_with_raw_text() {
        let err = parse_reply("sorry, I cannot do that").unwrap_err();
        match err {
            ApiError::UpstreamInvalid { raw } => assert!(raw.contains("sorry")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn object_wrapper_is_rejected() {
        // the slice between the outermost brackets spans both inner arrays
        // and is not itself valid JSON
        let err = parse_reply(r#"{"Monday": [], "Tuesday": []}"#).unwrap_err();
        assert!(matches!(err, ApiError::UpstreamInvalid { .. }));
    }

    #[test]
    fn validation_accepts_well_formed_items() {
        let values =
            serde_json::from_str(r#"[{"id":1,"sets":3,"reps":12,"weight_value":50,"weight_unit":"kg"}]"#)
                .unwrap();
        let items = validate_items(values).unwrap();
        assert_eq!(items[0], item(1));
    }

    #[test]
    fn non_numeric_sets_fails_naming_the_workout() {
        let values = serde_json::from_str(
            r#"[{"id":7,"sets":"three","reps":12,"weight_value":50,"weight_unit":"kg"}]"#,
        )
        .unwrap();
        let err = validate_items(values).unwrap_err();
        assert!(err.to_string().contains("Workout 7"));
        assert!(err.to_string().contains("sets"));
    }

    #[test]
    fn unknown_weight_unit_fails_naming_the_workout() {
        let values = serde_json::from_str(
            r#"[{"id":9,"sets":3,"reps":12,"weight_value":50,"weight_unit":"stone"}]"#,
        )
        .unwrap();
        let err = validate_items(values).unwrap_err();
        assert!(err.to_string().contains("Workout 9"));
        assert!(err.to_string().contains("weight_unit"));
    }

    #[test]
    fn one_bad_item_fails_the_whole_batch() {
        let values = serde_json::from_str(
            r#"[
                {"id":1,"sets":3,"reps":12,"weight_value":50,"weight_unit":"kg"},
                {"id":2,"sets":3,"reps":12,"weight_value":"heavy","weight_unit":"kg"}
            ]"#,
        )
        .unwrap();
        assert!(validate_items(values).is_err());
    }

    #[test]
    fn expansion_covers_every_scheduled_day() {
        let rows = expand_items(&[item(1)], &program());
        let days: Vec<&str> = rows.iter().map(|r| r.day.as_str()).collect();
        assert_eq!(days, vec!["Monday", "Friday"]);
    }

    #[test]
    fn expansion_dedupes_repeated_items() {
        let rows = expand_items(&[item(1), item(1)], &program());
        assert_eq!(rows.len(), 2); // Monday + Friday once each
    }

    #[test]
    fn unknown_ids_contribute_no_rows() {
        let rows = expand_items(&[item(99)], &program());
        assert!(rows.is_empty());
    }

    #[test]
    fn grouping_follows_template_day_order() {
        let rows = expand_items(&[item(2), item(1)], &program());
        let grouped = group_by_day(rows);
        let days: Vec<&str> = grouped.iter().map(|d| d.day.as_str()).collect();
        assert_eq!(days, vec!["Monday", "Thursday", "Friday"]);
    }
}
