//! # Shopping List Cache Module
//!
//! This module provides a key-value cache with expiry for computed shopping
//! lists. The cache is injected into the aggregator by the caller instead of
//! living in a process-wide global, so concurrent requests and tests each get
//! the isolation they need.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, warn};

/// Storage interface for computed shopping lists
///
/// Implementations must be safe to share between threads.
pub trait ShoppingListCache<V>: Send + Sync {
    /// Fetch a live entry, `None` when absent or expired
    fn get(&self, key: &str) -> Option<V>;

    /// Store a value, replacing any previous entry for the key
    fn put(&self, key: &str, value: V);

    /// Remove one entry
    fn invalidate(&self, key: &str);

    /// Remove every entry
    fn clear(&self);
}

/// Expiry and capacity settings for [`InMemoryShoppingListCache`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Seconds an entry stays valid after being stored (default: 3600)
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Maximum number of stored entries before the oldest is evicted (default: 256)
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_ttl_secs() -> u64 {
    3600
}

fn default_max_entries() -> usize {
    256
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_entries: default_max_entries(),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Thread-safe in-memory cache with time-based expiry
///
/// # Expiry
///
/// An entry is expired once `ttl_secs` have elapsed since it was stored, so a
/// TTL of zero never returns a hit. Expired entries are dropped lazily on
/// access and when the cache is full.
///
/// # Capacity
///
/// When `max_entries` is reached, expired entries are purged first and then
/// the oldest remaining entry is evicted.
///
/// # Examples
///
/// ```rust
/// use grocery_aggregator::shopping_list_cache::{
///     CacheConfig, InMemoryShoppingListCache, ShoppingListCache,
/// };
///
/// let cache = InMemoryShoppingListCache::new(CacheConfig::default());
/// cache.put("menu-42", vec!["2 cups milk".to_string()]);
/// assert_eq!(cache.get("menu-42"), Some(vec!["2 cups milk".to_string()]));
/// ```
#[derive(Debug)]
pub struct InMemoryShoppingListCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    config: CacheConfig,
}

impl<V: Clone> InMemoryShoppingListCache<V> {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Number of stored entries, including ones that expired but were not purged yet
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn ttl(&self) -> Duration {
        Duration::from_secs(self.config.ttl_secs)
    }

    fn is_expired(&self, entry: &CacheEntry<V>) -> bool {
        entry.inserted_at.elapsed() >= self.ttl()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("Shopping list cache lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl<V: Clone> Default for InMemoryShoppingListCache<V> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl<V: Clone + Send> ShoppingListCache<V> for InMemoryShoppingListCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.lock();
        let expired = match entries.get(key) {
            Some(entry) if !self.is_expired(entry) => {
                debug!(key = %key, "Shopping list cache hit");
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            debug!(key = %key, "Shopping list cache entry expired");
            entries.remove(key);
        } else {
            debug!(key = %key, "Shopping list cache miss");
        }
        None
    }

    fn put(&self, key: &str, value: V) {
        if self.config.max_entries == 0 {
            return;
        }

        let mut entries = self.lock();
        if !entries.contains_key(key) && entries.len() >= self.config.max_entries {
            let ttl = self.ttl();
            entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);

            if entries.len() >= self.config.max_entries {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.inserted_at)
                    .map(|(oldest_key, _)| oldest_key.clone());
                if let Some(oldest) = oldest {
                    debug!(evicted = %oldest, "Shopping list cache full, evicting oldest entry");
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    fn invalidate(&self, key: &str) {
        if self.lock().remove(key).is_some() {
            debug!(key = %key, "Shopping list cache entry invalidated");
        }
    }

    fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(ttl_secs: u64, max_entries: usize) -> InMemoryShoppingListCache<String> {
        InMemoryShoppingListCache::new(CacheConfig {
            ttl_secs,
            max_entries,
        })
    }

    #[test]
    fn test_put_and_get() {
        let cache = cache(60, 4);
        assert!(cache.get("a").is_none());

        cache.put("a", "apples".to_string());
        assert_eq!(cache.get("a").as_deref(), Some("apples"));

        cache.put("a", "avocados".to_string());
        assert_eq!(cache.get("a").as_deref(), Some("avocados"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_zero_ttl_never_hits() {
        let cache = cache(0, 4);
        cache.put("a", "apples".to_string());
        assert!(cache.get("a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_oldest_entry_evicted_when_full() {
        let cache = cache(60, 2);
        cache.put("first", "1".to_string());
        std::thread::sleep(Duration::from_millis(5));
        cache.put("second", "2".to_string());
        std::thread::sleep(Duration::from_millis(5));
        cache.put("third", "3".to_string());

        assert_eq!(cache.len(), 2);
        assert!(cache.get("first").is_none());
        assert!(cache.get("second").is_some());
        assert!(cache.get("third").is_some());
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = cache(60, 4);
        cache.put("a", "apples".to_string());
        cache.put("b", "bananas".to_string());

        cache.invalidate("a");
        assert!(cache.get("a").is_none());
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_default_config() {
        let config: CacheConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CacheConfig::default());
        assert_eq!(config.ttl_secs, 3600);
        assert_eq!(config.max_entries, 256);
    }
}
