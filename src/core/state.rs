//! Shared handle threaded through every request handler.

use std::sync::Arc;

use sqlx::PgPool;

use crate::core::{config::Settings, redis::RedisHandle};
use crate::services::storage::StorageService;

/// Cheap to clone; all collaborators live behind a single `Arc`.
#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    settings: Settings,
    db: PgPool,
    redis: RedisHandle,
    storage: Option<StorageService>,
}

impl AppState {
    /// State without a document store. Upload endpoints reject requests
    /// until storage is attached via [`AppState::with_storage`].
    pub(crate) fn new(settings: Settings, db: PgPool, redis: RedisHandle) -> Self {
        Self { inner: Arc::new(Inner { settings, db, redis, storage: None }) }
    }

    pub(crate) fn with_storage(
        settings: Settings,
        db: PgPool,
        redis: RedisHandle,
        storage: StorageService,
    ) -> Self {
        Self { inner: Arc::new(Inner { settings, db, redis, storage: Some(storage) }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn redis(&self) -> &RedisHandle {
        &self.inner.redis
    }

    pub(crate) fn storage(&self) -> Option<&StorageService> {
        self.inner.storage.as_ref()
    }
}
