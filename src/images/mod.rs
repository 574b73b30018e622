pub mod handlers;
pub mod services;

use crate::{config::UploadConfig, state::AppState};
use axum::Router;

/// Upload endpoint plus static serving of the upload directory.
pub fn router(uploads: &UploadConfig) -> Router<AppState> {
    handlers::image_routes(uploads)
}
