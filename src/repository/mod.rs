//! Repository layer for per-visitor documents
//!
//! Every visitor owns one JSON document per collection, stored under
//! `{prefix}:{collection}:{user_id}`. Mutations go through [`Repository::update`],
//! which serializes read-modify-write cycles inside this process.

pub mod redis;
pub mod store;

use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    config::{StorageBackend, StorageConfig},
    error::AppResult,
};
use store::{KvStore, MemoryStore};

pub const SHELVES: &str = "shelves";
pub const FAVORITES: &str = "favorites";
pub const READING_LIST: &str = "reading_list";
pub const NOTES: &str = "notes";
pub const REVIEWS: &str = "reviews";

#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn KvStore>,
    prefix: String,
    write_lock: Arc<Mutex<()>>,
}

impl Repository {
    pub fn new(store: Arc<dyn KvStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), "bookfinder")
    }

    /// Build the repository for the configured backend
    pub async fn connect(config: &StorageConfig) -> AppResult<Self> {
        let store: Arc<dyn KvStore> = match config.backend {
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
            StorageBackend::Redis => Arc::new(redis::RedisStore::new(&config.redis_url).await?),
        };
        Ok(Self::new(store, config.key_prefix.clone()))
    }

    fn key(&self, collection: &str, user_id: &str) -> String {
        format!("{}:{}:{}", self.prefix, collection, user_id)
    }

    /// Load a visitor document, `None` if it was never written
    pub async fn load<T: DeserializeOwned>(
        &self,
        collection: &str,
        user_id: &str,
    ) -> AppResult<Option<T>> {
        match self.store.get(&self.key(collection, user_id)).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Load a visitor document or its default value
    pub async fn load_or_default<T: DeserializeOwned + Default>(
        &self,
        collection: &str,
        user_id: &str,
    ) -> AppResult<T> {
        Ok(self.load(collection, user_id).await?.unwrap_or_default())
    }

    pub async fn save<T: Serialize + Sync>(
        &self,
        collection: &str,
        user_id: &str,
        document: &T,
    ) -> AppResult<()> {
        let raw = serde_json::to_string(document)?;
        self.store.set(&self.key(collection, user_id), &raw).await
    }

    /// Apply `change` to a visitor document and persist it.
    ///
    /// Nothing is written when `change` fails.
    pub async fn update<T, R, F>(&self, collection: &str, user_id: &str, change: F) -> AppResult<R>
    where
        T: Serialize + DeserializeOwned + Default + Send + Sync,
        R: Send,
        F: FnOnce(&mut T) -> AppResult<R> + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut document: T = self.load_or_default(collection, user_id).await?;
        let result = change(&mut document)?;
        self.save(collection, user_id, &document).await?;
        Ok(result)
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}
