//! Page-plan cache backed by Redis.
//!
//! Keys are namespaced by a generation counter. Revalidation bumps the
//! counter, which orphans every cached plan at once; orphans expire on their
//! own TTL.
//!
//! A plan is written under the generation that was current when its lookup
//! missed, never the one current at write time. A plan fetched before a
//! revalidation therefore lands in the orphaned namespace.

use std::sync::Arc;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::debug;

const GENERATION_KEY: &str = "werobot:generation";
const PAGE_PREFIX: &str = "werobot:page";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Cache entry encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Invalid cache generation counter: {0}")]
    InvalidGeneration(String),
}

/// The handful of key-value operations the page cache needs.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set_ex(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), CacheError>;

    /// Atomically increments an integer key, returning the new value.
    async fn incr(&self, key: &str) -> Result<u64, CacheError>;
}

/// Redis store over one auto-reconnecting multiplexed connection, cloned per
/// call.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self {
            conn: ConnectionManager::new(client).await?,
        })
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn.clone();
        Ok(conn.get(key).await?)
    }

    async fn set_ex(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_secs as _).await?;
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<u64, CacheError> {
        let mut conn = self.conn.clone();
        Ok(conn.incr(key, 1).await?)
    }
}

/// Result of a cache read: the hit (if any) and the generation it was read
/// under. Pass the generation back to [`PageCache::put`].
#[derive(Debug)]
pub struct Lookup<T> {
    pub generation: u64,
    pub hit: Option<T>,
}

#[derive(Clone)]
pub struct PageCache {
    store: Arc<dyn CacheStore>,
    ttl_secs: u64,
}

impl PageCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl_secs: u64) -> Self {
        Self { store, ttl_secs }
    }

    async fn generation(&self) -> Result<u64, CacheError> {
        match self.store.get(GENERATION_KEY).await? {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| CacheError::InvalidGeneration(raw)),
            None => Ok(0),
        }
    }

    pub async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Result<Lookup<T>, CacheError> {
        let generation = self.generation().await?;
        let hit = match self.store.get(&page_key(generation, key)).await? {
            Some(raw) => {
                debug!("Page cache hit: {key} (generation {generation})");
                Some(serde_json::from_str(&raw)?)
            }
            None => None,
        };
        Ok(Lookup { generation, hit })
    }

    /// Stores `value` under `generation`, as returned by the lookup that
    /// missed.
    pub async fn put<T: Serialize>(
        &self,
        generation: u64,
        key: &str,
        value: &T,
    ) -> Result<(), CacheError> {
        let raw = serde_json::to_string(value)?;
        self.store
            .set_ex(&page_key(generation, key), raw, self.ttl_secs)
            .await
    }

    /// Invalidates every cached plan. Returns the new generation.
    pub async fn revalidate(&self) -> Result<u64, CacheError> {
        self.store.incr(GENERATION_KEY).await
    }
}

fn page_key(generation: u64, key: &str) -> String {
    format!("{PAGE_PREFIX}:{generation}:{key}")
}

/// In-process store for tests. Ignores TTLs.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    entries: std::sync::Mutex<std::collections::HashMap<String, String>>,
    pub fail: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
impl MemoryStore {
    fn check(&self) -> Result<(), CacheError> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(CacheError::Redis(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "store offline",
            ))));
        }
        Ok(())
    }

    pub fn set_raw(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

#[cfg(test)]
#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.check()?;
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set_ex(&self, key: &str, value: String, _ttl_secs: u64) -> Result<(), CacheError> {
        self.check()?;
        self.entries.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<u64, CacheError> {
        self.check()?;
        let mut entries = self.entries.lock().unwrap();
        let next = entries
            .get(key)
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0)
            + 1;
        entries.insert(key.to_string(), next.to_string());
        Ok(next)
    }
}
