use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::handlers::is_valid_email,
    auth::jwt::AuthUser,
    errors::ApiError,
    profile::{
        dto::{ProfileResponse, UpdateProfileRequest},
        enums,
        repo::UserProfile,
    },
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/user-profile", get(get_profile).put(update_profile))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = UserProfile::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    Ok(Json(ProfileResponse::from(user)))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(mut payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    if payload.is_empty() {
        return Err(ApiError::BadRequest("No updatable fields provided".into()));
    }

    if let Some(email) = payload.email.as_mut() {
        *email = email.trim().to_lowercase();
        if !is_valid_email(email) {
            return Err(ApiError::BadRequest("Invalid email".into()));
        }
        if UserProfile::email_taken_by_other(&state.db, email, user_id).await? {
            warn!(user_id = %user_id, "email conflict on profile update");
            return Err(ApiError::Conflict("Email already in use".into()));
        }
    }

    validate_enum_fields(&payload)?;

    let user = UserProfile::update(&state.db, user_id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    info!(user_id = %user_id, "profile updated");
    Ok(Json(ProfileResponse::from(user)))
}

fn validate_enum_fields(payload: &UpdateProfileRequest) -> Result<(), ApiError> {
    let checks = [
        (
            payload.training_goal.as_deref(),
            enums::TRAINING_GOALS,
            "training_goal",
        ),
        (
            payload.training_experience.as_deref(),
            enums::EXPERIENCE_LEVELS,
            "training_experience",
        ),
        (
            payload.injury_caution_area.as_deref(),
            enums::INJURY_AREAS,
            "injury_caution_area",
        ),
        (
            payload.weight_unit.as_deref(),
            enums::WEIGHT_UNITS,
            "weight_unit",
        ),
        (
            payload.height_unit.as_deref(),
            enums::HEIGHT_UNITS,
            "height_unit",
        ),
    ];
    for (value, allowed, field) in checks {
        if !enums::is_valid_key(value, allowed) {
            return Err(ApiError::BadRequest(format!(
                "Invalid value for {field}"
            )));
        }
    }
    Ok(())
}
