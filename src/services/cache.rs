use crate::core::MatchingRun;
use redis::aio::ConnectionManager;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// Two-tier store for matching runs
///
/// L1 is an in-process moka cache, L2 an optional Redis shared across
/// instances. Runs are immutable, so entries are only ever inserted or
/// expired, never updated.
pub struct RunCache {
    // Store ConnectionManager in a Mutex for interior mutability
    redis: Option<Arc<tokio::sync::Mutex<ConnectionManager>>>,
    l1_cache: moka::future::Cache<String, Arc<MatchingRun>>,
    ttl_secs: u64,
}

impl RunCache {
    /// Create a cache backed by Redis
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Some(Arc::new(tokio::sync::Mutex::new(redis))),
            ..Self::in_memory(l1_size, ttl_secs)
        })
    }

    /// Create a process-local cache without Redis
    pub fn in_memory(l1_size: u64, ttl_secs: u64) -> Self {
        let l1_cache = moka::future::CacheBuilder::new(l1_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            redis: None,
            l1_cache,
            ttl_secs,
        }
    }

    pub fn is_shared(&self) -> bool {
        self.redis.is_some()
    }

    /// Get a run (L1 first, then L2)
    pub async fn get(&self, run_id: &str) -> Result<Arc<MatchingRun>, CacheError> {
        let key = CacheKey::run(run_id);

        if let Some(run) = self.l1_cache.get(&key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(run);
        }

        if let Some(l2) = &self.redis {
            let mut conn = l2.lock().await;
            let value: Option<String> = redis::cmd("GET")
                .arg(&key)
                .query_async(&mut *conn)
                .await?;
            drop(conn);

            if let Some(json) = value {
                tracing::trace!("L2 cache hit: {}", key);

                let run: Arc<MatchingRun> = Arc::new(serde_json::from_str(&json)?);
                self.l1_cache.insert(key, run.clone()).await;
                return Ok(run);
            }
        }

        tracing::trace!("Cache miss: {}", key);
        Err(CacheError::CacheMiss(run_id.to_string()))
    }

    /// Store a run in both tiers
    pub async fn put(&self, run: MatchingRun) -> Result<Arc<MatchingRun>, CacheError> {
        let key = CacheKey::run(&run.id);
        let run = Arc::new(run);

        if let Some(l2) = &self.redis {
            let json = serde_json::to_string(run.as_ref())?;
            let mut conn = l2.lock().await;
            redis::cmd("SETEX")
                .arg(&key)
                .arg(self.ttl_secs)
                .arg(json)
                .query_async::<()>(&mut *conn)
                .await?;
        }

        self.l1_cache.insert(key.clone(), run.clone()).await;

        tracing::trace!("Cache set: {}", key);
        Ok(run)
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a matching run
    pub fn run(run_id: &str) -> String {
        format!("matching-run:{}", run_id)
    }
}
