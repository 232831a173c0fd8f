use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// In-memory cache where every entry expires after a fixed time-to-live.
#[derive(Clone)]
pub struct Cache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    ttl: Duration,
    inner: Arc<Mutex<HashMap<K, Entry<V>>>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Send + Sync + std::fmt::Debug,
    V: Clone + Send + Sync,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let mut cache = self.inner.lock().await;
        match cache.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                debug!("Cache HIT for key: {:?}", key);
                Some(entry.value.clone())
            }
            Some(_) => {
                debug!("Cache entry expired for key: {:?}", key);
                cache.remove(key);
                None
            }
            None => {
                debug!("Cache MISS for key: {:?}", key);
                None
            }
        }
    }

    pub async fn put(&self, key: K, value: V) {
        let expires_at = Instant::now() + self.ttl;
        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for key: {:?}", key);
        cache.insert(key, Entry { value, expires_at });
    }
}
