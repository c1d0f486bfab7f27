use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PersonalizeResponse {
    pub program_id: i64,
    pub personalized: Vec<PersonalizedDay>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PersonalizedDay {
    pub day: String,
    pub workouts: Vec<PersonalizedItem>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PersonalizedItem {
    pub workout_id: i64,
    pub sets: i32,
    pub reps: i32,
    pub weight_value: f64,
    pub weight_unit: String,
}

#[derive(Debug, Serialize)]
pub struct PersonalizeResetResponse {
    pub message: String,
    pub cleared: u64,
}
