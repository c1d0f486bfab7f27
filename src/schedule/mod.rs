use crate::state::AppState;
use axum::Router;

pub mod assembler;
pub mod dto;
pub mod handlers;
pub mod modification;
pub mod repo;

pub fn router() -> Router<AppState> {
    handlers::schedule_routes()
}
