use chrono::Duration;
use deadpool_redis::{Connection, Pool};
use redis::AsyncCommands;
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tracing::{debug, error};

/// Read-through JSON cache on top of a redis pool.
///
/// Every failure is logged and reported as a miss so callers fall back to the database.
#[derive(Clone)]
pub struct CacheStore {
    redis_pool: Arc<Pool>,
}

impl CacheStore {
    pub fn new(redis_pool: Pool) -> Self {
        Self {
            redis_pool: Arc::new(redis_pool),
        }
    }

    async fn conn(&self) -> Option<Connection> {
        self.redis_pool
            .get()
            .await
            .map_err(|e| error!("❌ Redis pool unavailable: {:?}", e))
            .ok()
    }

    pub async fn get_from_cache<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let mut conn = self.conn().await?;

        let raw = match conn.get::<_, Option<String>>(key).await {
            Ok(raw) => raw,
            Err(e) => {
                error!("❌ Cache read failed for '{key}': {:?}", e);
                return None;
            }
        };

        let Some(raw) = raw else {
            debug!("Cache miss for '{key}'");
            return None;
        };

        serde_json::from_str(&raw)
            .map_err(|e| error!("❌ Dropping undecodable cache entry '{key}': {:?}", e))
            .ok()
    }

    pub async fn set_to_cache<T>(&self, key: &str, data: &T, ttl: Duration)
    where
        T: Serialize,
    {
        let payload = match serde_json::to_string(data) {
            Ok(payload) => payload,
            Err(e) => {
                error!("❌ Cannot encode cache entry '{key}': {:?}", e);
                return;
            }
        };
        let seconds = u64::try_from(ttl.num_seconds()).unwrap_or(0).max(1);

        let Some(mut conn) = self.conn().await else {
            return;
        };

        match conn.set_ex::<_, _, ()>(key, payload, seconds).await {
            Ok(()) => debug!("Cached '{key}' for {seconds}s"),
            Err(e) => error!("❌ Cache write failed for '{key}': {:?}", e),
        }
    }

    pub async fn delete_from_cache(&self, key: &str) {
        self.delete_many(&[key.to_string()]).await;
    }

    /// Drops all `keys` with a single `DEL`.
    pub async fn delete_many(&self, keys: &[String]) {
        if keys.is_empty() {
            return;
        }

        let Some(mut conn) = self.conn().await else {
            return;
        };

        match conn.del::<_, usize>(keys.to_vec()).await {
            Ok(removed) => debug!("Evicted {removed} of {} cache keys", keys.len()),
            Err(e) => error!("❌ Cache eviction failed for {:?}: {:?}", keys, e),
        }
    }
}
