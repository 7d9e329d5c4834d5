use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Read-through cache of raw table values keyed by storage key.
#[derive(Clone)]
pub struct CacheManager {
    cache: Arc<Mutex<LruCache<String, String>>>,
}

impl CacheManager {
    pub fn new(cache_size: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let mut cache = self.cache.lock().await;
        cache.get(key).cloned()
    }

    pub async fn put(&self, key: &str, value: String) {
        let mut cache = self.cache.lock().await;
        cache.put(key.to_string(), value);
    }

    pub async fn invalidate(&self, key: &str) {
        let mut cache = self.cache.lock().await;
        cache.pop(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn evicts_least_recently_used() {
        let cache = CacheManager::new(2);
        cache.put("a", "1".into()).await;
        cache.put("b", "2".into()).await;
        assert_eq!(cache.get("a").await.as_deref(), Some("1"));
        cache.put("c", "3".into()).await;

        assert_eq!(cache.get("b").await, None);
        assert_eq!(cache.get("a").await.as_deref(), Some("1"));
        cache.invalidate("a").await;
        assert_eq!(cache.get("a").await, None);
    }

    #[tokio::test]
    async fn zero_size_still_caches_one_value() {
        let cache = CacheManager::new(0);
        cache.put("k", "v".into()).await;
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));
    }
}
