use axum::{
    extract::State,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::jwt::{AuthUser, OptionalAuthUser},
    errors::ApiError,
    profile::{enums, repo::UserProfile},
    program::{generator, repo as program_repo},
    schedule::{
        assembler::assemble_week,
        dto::{
            ModificationResponse, ResetResponse, WeeklyScheduleResponse, WorkoutKeyRequest,
            WorkoutUpdateRequest,
        },
        modification::{classify, ModificationType},
        repo as schedule_repo,
    },
    state::AppState,
};

pub fn schedule_routes() -> Router<AppState> {
    Router::new()
        .route("/schedule", get(get_schedule))
        .route("/schedule/workout/update", patch(update_workout))
        .route("/schedule/workout/reset", post(reset_workout))
}

/// The weekly view. Generation is lazy: the first read after expiry creates
/// and seeds the next window.
#[instrument(skip(state))]
pub async fn get_schedule(
    State(state): State<AppState>,
    OptionalAuthUser(user_id): OptionalAuthUser,
) -> Result<Json<WeeklyScheduleResponse>, ApiError> {
    let meta = generator::ensure_active_program(&state.db).await?;
    let defaults = program_repo::load_default_rows(&state.db, meta.id).await?;

    let (overrides, user) = match user_id {
        Some(user_id) => {
            let overrides = schedule_repo::list_overrides(&state.db, user_id, meta.id).await?;
            let name = UserProfile::find_by_id(&state.db, user_id)
                .await?
                .map(|u| u.name);
            (overrides, name)
        }
        None => (Vec::new(), None),
    };

    Ok(Json(WeeklyScheduleResponse {
        program_id: meta.id,
        program_start: meta.start_date,
        expires_on: meta.end_date,
        user,
        schedule: assemble_week(&defaults, overrides),
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_workout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<WorkoutUpdateRequest>,
) -> Result<Json<ModificationResponse>, ApiError> {
    if payload.sets.is_none() && payload.reps.is_none() && payload.weight_value.is_none() {
        return Err(ApiError::BadRequest(
            "Provide at least one of sets, reps, weight_value".into(),
        ));
    }
    if !enums::is_valid_key(payload.weight_unit.as_deref(), enums::WEIGHT_UNITS) {
        return Err(ApiError::BadRequest("Invalid value for weight_unit".into()));
    }

    let row = schedule_repo::find_override(
        &state.db,
        user_id,
        payload.program_id,
        &payload.day,
        payload.workout_id,
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("No personalized entry for this workout".into()))?;

    let baseline = row.resolve();
    let classification = classify(
        &baseline,
        payload.sets,
        payload.reps,
        payload.weight_value,
    );
    if classification == ModificationType::Unchanged {
        return Err(ApiError::BadRequest(
            "No changes detected; nothing to modify".into(),
        ));
    }

    schedule_repo::apply_modification(
        &state.db,
        user_id,
        payload.program_id,
        &payload.day,
        payload.workout_id,
        payload.sets,
        payload.reps,
        payload.weight_value,
        payload.weight_unit.as_deref(),
        classification.as_str(),
    )
    .await?;

    info!(
        user_id = %user_id,
        workout_id = payload.workout_id,
        day = %payload.day,
        classification = classification.as_str(),
        "workout modification applied"
    );
    Ok(Json(ModificationResponse {
        message: "Workout modification saved".into(),
        modification_type: classification.as_str().into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn reset_workout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<WorkoutKeyRequest>,
) -> Result<Json<ResetResponse>, ApiError> {
    let affected = schedule_repo::reset_modification(
        &state.db,
        user_id,
        payload.program_id,
        &payload.day,
        payload.workout_id,
    )
    .await?;

    if affected == 0 {
        return Err(ApiError::NotFound(
            "No modified entry for this workout".into(),
        ));
    }

    info!(
        user_id = %user_id,
        workout_id = payload.workout_id,
        day = %payload.day,
        "workout modification reset"
    );
    Ok(Json(ResetResponse {
        message: "Workout modification cleared".into(),
    }))
}
