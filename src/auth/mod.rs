use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use jwt::{AuthUser, SessionKeys};

/// Unauthenticated routes: register, login, logout.
pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
