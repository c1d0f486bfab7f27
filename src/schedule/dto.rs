use serde::{Deserialize, Serialize};
use time::Date;

#[derive(Debug, Serialize)]
pub struct WeeklyScheduleResponse {
    pub program_id: i64,
    pub program_start: Date,
    pub expires_on: Date,
    /// Display name, present when the request carried a valid token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub schedule: Vec<DayView>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct DayView {
    pub day: String,
    pub category: String,
    pub workouts: Vec<WorkoutView>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct WorkoutView {
    pub name: String,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub weight: Option<WeightView>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct WeightView {
    pub value: f64,
    pub unit: String,
}

/// Manual per-exercise edit. At least one of sets/reps/weight_value must be
/// present.
#[derive(Debug, Deserialize)]
pub struct WorkoutUpdateRequest {
    pub program_id: i64,
    pub workout_id: i64,
    pub day: String,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub weight_value: Option<f64>,
    pub weight_unit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WorkoutKeyRequest {
    pub program_id: i64,
    pub workout_id: i64,
    pub day: String,
}

#[derive(Debug, Serialize)]
pub struct ModificationResponse {
    pub message: String,
    pub modification_type: String,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub message: String,
}
