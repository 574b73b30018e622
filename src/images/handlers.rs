use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tower_http::services::ServeDir;
use tracing::{instrument, warn};

use super::services::{store_upload, UploadItem, MAX_UPLOAD_BYTES};
use crate::{
    config::UploadConfig,
    error::{AppError, AppResult},
    state::AppState,
};

/// Oversized files must still reach the size check and get a JSON 400.
const UPLOAD_BODY_LIMIT: usize = 4 * MAX_UPLOAD_BYTES;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub url: String,
}

pub fn image_routes(uploads: &UploadConfig) -> Router<AppState> {
    Router::new()
        .route(
            "/upload-image",
            post(upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .nest_service("/uploads", ServeDir::new(&uploads.dir))
}

/// POST /api/upload-image (multipart, field `image`, first file only)
#[instrument(skip(state, mp))]
pub async fn upload_image(
    State(state): State<AppState>,
    mp: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadResponse>> {
    let mut mp = mp.map_err(|e| {
        warn!(error = %e, "not a multipart request");
        AppError::Validation("Failed to get multipart form".into())
    })?;

    let item = loop {
        let field = mp.next_field().await.map_err(|e| {
            warn!(error = %e, "malformed multipart body");
            AppError::Validation("Failed to get multipart form".into())
        })?;
        let Some(field) = field else {
            return Err(AppError::Validation("No files uploaded".into()));
        };
        if field.name() != Some("image") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("image").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = field.bytes().await.map_err(|e| {
            warn!(error = %e, "failed to read upload");
            AppError::Validation("Failed to get multipart form".into())
        })?;
        break UploadItem {
            file_name,
            content_type,
            body,
        };
    };

    let url = store_upload(state.storage.as_ref(), item).await?;
    Ok(Json(UploadResponse {
        message: "File uploaded successfully".into(),
        url,
    }))
}
