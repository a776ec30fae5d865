use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Geocode(String),
    Forecast(String),
    MovieSearch { query: String, page: u32 },
    GenreDiscover { genre_id: i64, page: u32 },
    MovieDetails(i64),
    Configuration,
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Geocode(city) => write!(f, "geocode:{}", city.to_lowercase()),
            CacheKey::Forecast(coordinates) => write!(f, "forecast:{}", coordinates),
            CacheKey::MovieSearch { query, page } => {
                write!(f, "search:{}:{}", query.to_lowercase(), page)
            }
            CacheKey::GenreDiscover { genre_id, page } => {
                write!(f, "discover:{}:{}", genre_id, page)
            }
            CacheKey::MovieDetails(id) => write!(f, "details:{}", id),
            CacheKey::Configuration => write!(f, "configuration"),
        }
    }
}

/// A cached value and the instant it stops being served
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub expires_at: Instant,
}

impl<T> CacheEntry<T> {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// In-process key/value cache with a per-entry time-to-live.
///
/// Expiry is lazy: stale entries are dropped when a read finds them. Cloning
/// shares the underlying storage, so each owning component creates its own
/// instance and hands out clones only to its own tasks.
///
/// Concurrent misses on the same cold key are not coalesced; every caller that
/// misses performs its own upstream fetch.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    entries: Arc<RwLock<HashMap<K, CacheEntry<V>>>>,
}

impl<K, V> Clone for TtlCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K, V> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh value for `key`, evicting it if it has expired
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();

        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if entry.is_fresh(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        let mut entries = self.entries.write();
        // Another writer may have refreshed the entry between the two locks
        if let Some(entry) = entries.get(key) {
            if entry.is_fresh(now) {
                return Some(entry.value.clone());
            }
            entries.remove(key);
        }
        None
    }

    pub fn insert(&self, key: K, value: V, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().insert(key, entry);
    }

    pub fn remove(&self, key: &K) {
        self.entries.write().remove(key);
    }

    /// Number of stored entries, including ones that expired but were not read since
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
