use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod enums;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    handlers::profile_routes()
}
