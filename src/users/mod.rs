pub mod dto;
pub mod handlers;
pub mod postgres;
pub mod repo;
pub mod repo_types;
pub mod sqlite;

#[cfg(test)]
pub mod fixtures;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
