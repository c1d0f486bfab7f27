use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod engine;
pub mod handlers;
pub mod llm;

pub fn router() -> Router<AppState> {
    handlers::personalize_routes()
}
