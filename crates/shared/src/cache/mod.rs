mod cache_store;
pub mod keys;

pub use self::cache_store::CacheStore;
