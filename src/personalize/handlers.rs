use axum::{
    extract::State,
    routing::{delete, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::jwt::AuthUser,
    errors::ApiError,
    personalize::{
        dto::{PersonalizeResetResponse, PersonalizeResponse},
        engine,
    },
    state::AppState,
};

pub fn personalize_routes() -> Router<AppState> {
    Router::new()
        .route("/personalize/plan", post(personalize_plan))
        .route("/personalize/reset", delete(reset_plan))
}

#[instrument(skip(state))]
pub async fn personalize_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PersonalizeResponse>, ApiError> {
    engine::personalize_plan(&state, user_id).await.map(Json)
}

#[instrument(skip(state))]
pub async fn reset_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PersonalizeResetResponse>, ApiError> {
    engine::reset_plan(&state, user_id).await.map(Json)
}
