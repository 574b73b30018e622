use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;

/// Where uploaded files land and how clients reach them.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Never replaces an existing object; a taken key fails with an
    /// `io::ErrorKind::AlreadyExists` error (see [`is_key_taken`]).
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    fn public_url(&self, key: &str) -> String;
}

/// True when `put_object` failed only because the key is already in use.
pub fn is_key_taken(err: &anyhow::Error) -> bool {
    err.downcast_ref::<std::io::Error>()
        .is_some_and(|e| e.kind() == std::io::ErrorKind::AlreadyExists)
}

/// Files on local disk under `root`, served back by the static uploads route.
#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl StorageClient for LocalStorage {
    /// `key` must be a bare file name; the directory is created on demand.
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("create upload dir {}", self.root.display()))?;
        let path = self.root.join(key);
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .with_context(|| format!("create {}", path.display()))?;
        file.write_all(&body)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        file.flush()
            .await
            .with_context(|| format!("flush {}", path.display()))?;
        tracing::debug!(key, content_type, size = body.len(), "object stored");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/api/uploads/{}", self.base_url, key)
    }
}
