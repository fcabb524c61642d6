use crate::abstract_trait::ProductCacheTrait;
use async_trait::async_trait;
use shared::cache::{CacheStore, keys::product_keys};
use std::sync::Arc;
use tracing::debug;

/// Redis-backed eviction for product detail and featured entries.
#[derive(Clone)]
pub struct ProductCache {
    cache_store: Arc<CacheStore>,
}

impl ProductCache {
    pub fn new(cache_store: Arc<CacheStore>) -> Self {
        Self { cache_store }
    }
}

#[async_trait]
impl ProductCacheTrait for ProductCache {
    async fn invalidate(&self, product_ids: &[i32]) {
        let keys = product_keys(product_ids.iter().copied());
        debug!("🧹 Evicting product cache keys {:?}", keys);
        self.cache_store.delete_many(&keys).await;
    }
}
