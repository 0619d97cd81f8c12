//! Logged-in user state.
//!
//! [`SessionContext`] is the in-memory session shared by every clone of the
//! controller. [`SessionStore`] is where the id survives between runs, the
//! way a browser tab keeps a value in session storage.

use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::ServiceError;
use crate::storage::json_map_store::JsonMapStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    pub logged_in_user_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Session>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> Session {
        *self.inner.read().await
    }

    pub async fn user_id(&self) -> Option<i64> {
        self.inner.read().await.logged_in_user_id
    }

    pub async fn set_user_id(&self, user_id: Option<i64>) {
        self.inner.write().await.logged_in_user_id = user_id;
    }

    pub async fn clear(&self) {
        self.set_user_id(None).await;
    }
}

/// Persistence for the logged-in user id.
/// Implementations can be file-backed or purely in memory.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The raw stored value, if any.
    async fn load(&self) -> Option<String>;
    async fn save(&self, user_id: i64) -> Result<(), ServiceError>;
    async fn clear(&self) -> Result<(), ServiceError>;
}

/// Stores `key -> user id` in a JSON file.
pub struct FileSessionStore {
    store: Arc<JsonMapStore<String, String>>,
    key: String,
}

impl FileSessionStore {
    /// Open (or create) the store file.
    pub async fn open<P: Into<PathBuf>>(path: P, key: impl Into<String>) -> Result<Arc<Self>, ServiceError> {
        let store = JsonMapStore::<String, String>::open(path).await?;
        Ok(Arc::new(Self { store, key: key.into() }))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Option<String> {
        self.store.get(&self.key).await
    }

    async fn save(&self, user_id: i64) -> Result<(), ServiceError> {
        self.store.insert(self.key.clone(), user_id.to_string()).await
    }

    async fn clear(&self) -> Result<(), ServiceError> {
        self.store.remove(&self.key).await.map(|_| ())
    }
}

/// Keeps the id for the lifetime of the process only.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    value: RwLock<Option<String>>,
}

impl MemorySessionStore {
    pub fn with_value(value: impl Into<String>) -> Self {
        Self { value: RwLock::new(Some(value.into())) }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Option<String> {
        self.value.read().await.clone()
    }

    async fn save(&self, user_id: i64) -> Result<(), ServiceError> {
        *self.value.write().await = Some(user_id.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), ServiceError> {
        *self.value.write().await = None;
        Ok(())
    }
}
