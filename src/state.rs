use crate::auth::repo::{PgUserRepo, UserRepo};
use crate::config::{AppConfig, StoreKind};
use crate::db;
use crate::memory::MemoryStore;
use crate::posts::repo::{PgPostRepo, PostRepo};
use crate::storage::{LocalStorage, StorageClient};
use anyhow::Context;
use std::sync::Arc;

/// Handles injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepo>,
    pub posts: Arc<dyn PostRepo>,
    pub storage: Arc<dyn StorageClient>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let storage = Arc::new(LocalStorage::new(
            &config.uploads.dir,
            &config.uploads.public_base_url,
        )) as Arc<dyn StorageClient>;

        match config.store {
            StoreKind::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL is not set")?;
                let pool = db::connect(url).await?;
                db::run_migrations(&pool).await;
                Ok(Self {
                    users: Arc::new(PgUserRepo::new(pool.clone())),
                    posts: Arc::new(PgPostRepo::new(pool)),
                    storage,
                    config,
                })
            }
            StoreKind::Memory => {
                tracing::warn!("using in-memory store; data is lost on restart");
                Ok(Self::in_memory(config, storage))
            }
        }
    }

    pub fn from_parts(
        users: Arc<dyn UserRepo>,
        posts: Arc<dyn PostRepo>,
        storage: Arc<dyn StorageClient>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            users,
            posts,
            storage,
            config,
        }
    }

    /// Both stores backed by one shared [`MemoryStore`].
    pub fn in_memory(config: Arc<AppConfig>, storage: Arc<dyn StorageClient>) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::from_parts(store.clone(), store, storage, config)
    }
}
