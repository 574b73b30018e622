use bytes::Bytes;
use rand::Rng;
use time::OffsetDateTime;
use tracing::{error, info, warn};

use crate::error::{AppError, AppResult};
use crate::storage::{is_key_taken, StorageClient};

pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

/// Fresh names tried before giving up on a run of collisions.
const NAME_ATTEMPTS: usize = 5;

const ALLOWED_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/gif"];

pub struct UploadItem {
    pub file_name: String,
    pub content_type: String,
    pub body: Bytes,
}

/// Checks the declared content type, then the size.
pub fn validate_upload(item: &UploadItem) -> AppResult<()> {
    if !ALLOWED_TYPES.contains(&item.content_type.as_str()) {
        warn!(content_type = %item.content_type, "upload rejected: type");
        return Err(AppError::Validation("Invalid file type".into()));
    }
    if item.body.len() > MAX_UPLOAD_BYTES {
        warn!(size = item.body.len(), "upload rejected: size");
        return Err(AppError::Validation("File size exceeds the 2MB limit".into()));
    }
    Ok(())
}

/// Final path component only, restricted to `[A-Za-z0-9._-]`.
fn sanitize_file_name(original: &str) -> String {
    let base = original.rsplit(&['/', '\\'][..]).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.to_string()
    }
}

/// `<unix seconds>_<0..1000><sanitized name>`.
pub fn stored_file_name(original: &str) -> String {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let suffix: u16 = rand::thread_rng().gen_range(0..1000);
    format!("{}_{}{}", now, suffix, sanitize_file_name(original))
}

/// Validates, stores and returns the public URL of one uploaded image.
pub async fn store_upload(storage: &dyn StorageClient, item: UploadItem) -> AppResult<String> {
    validate_upload(&item)?;

    let size = item.body.len();
    let mut attempt = 1;
    loop {
        let key = stored_file_name(&item.file_name);
        match storage
            .put_object(&key, item.body.clone(), &item.content_type)
            .await
        {
            Ok(()) => {
                info!(%key, size, "image uploaded");
                return Ok(storage.public_url(&key));
            }
            Err(e) if is_key_taken(&e) && attempt < NAME_ATTEMPTS => {
                warn!(%key, attempt, "stored name taken, retrying");
                attempt += 1;
            }
            Err(e) => {
                error!(error = ?e, %key, "failed to save upload");
                return Err(AppError::Internal(e.context("Failed to save file")));
            }
        }
    }
}
