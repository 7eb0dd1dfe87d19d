use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::store::{CacheStore, FileStore, MemoryStore};
use super::CacheKey;

/// Entries are treated as absent once they are 3 hours old.
pub const CACHE_TTL_MINUTES: i64 = 3 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    /// Write time, never updated afterwards
    pub timestamp: DateTime<Utc>,
    pub data: T,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            timestamp: Utc::now(),
            data,
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.timestamp).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            let remaining_mins = minutes % 60;
            if remaining_mins >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            let remaining_hours = (minutes % 1440) / 60;
            if remaining_hours >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }

    /// Age >= ttl. Entries from the future (clock skew) are fresh.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        Utc::now() - self.timestamp >= ttl
    }
}

/// Key and age of a stored entry, for diagnostics.
#[derive(Debug, Clone)]
pub struct CacheEntryInfo {
    pub key: String,
    /// None when the entry could not be decoded
    pub age: Option<String>,
    pub expired: bool,
}

/// Typed, TTL-checked access to a `CacheStore`.
///
/// Caching is an optimization: every storage or decode failure is logged and
/// reported as a miss (reads) or dropped (writes), never propagated.
pub struct CacheManager {
    store: Box<dyn CacheStore>,
    ttl: Duration,
    /// Per-key locks so a read that evicts an expired entry cannot delete a
    /// fresh value written concurrently under the same key.
    key_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CacheManager {
    pub fn new(store: impl CacheStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            ttl: Duration::minutes(CACHE_TTL_MINUTES),
            key_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn file_backed(cache_dir: PathBuf) -> Result<Self> {
        Ok(Self::new(FileStore::new(cache_dir)?))
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn key_locks(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<Mutex<()>>>> {
        self.key_locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` holding the lock for `key`. The lock entry is dropped again
    /// once no other caller holds it, so the map only tracks keys in use.
    fn with_key_lock<R>(&self, key: &str, f: impl FnOnce() -> R) -> R {
        let lock = self.key_locks().entry(key.to_string()).or_default().clone();
        let result = {
            let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            f()
        };

        // Clones only happen under the map lock, so the count is stable here
        let mut locks = self.key_locks();
        if Arc::strong_count(&lock) == 2 {
            locks.remove(key);
        }
        result
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<CachedData<T>> {
        let contents = match self.store.read(key) {
            Ok(Some(contents)) => contents,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = key, error = %e, "Failed to read cache entry");
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(cached) => Some(cached),
            Err(e) => {
                warn!(key = key, error = %e, "Failed to parse cache entry");
                None
            }
        }
    }

    /// Cached value for `key`, or None if absent, corrupt or expired.
    /// An expired entry is deleted as part of the read.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        self.with_key_lock(key.as_str(), || {
            let cached: CachedData<T> = self.load(key.as_str())?;
            if cached.is_expired(self.ttl) {
                debug!(key = %key, age_minutes = cached.age_minutes(), "Cache entry expired, evicting");
                if let Err(e) = self.store.remove(key.as_str()) {
                    warn!(key = %key, error = %e, "Failed to evict expired cache entry");
                }
                return None;
            }

            debug!(key = %key, age = %cached.age_display(), "Cache hit");
            Some(cached.data)
        })
    }

    /// Stamp `value` with the current time and overwrite `key`.
    pub fn set<T: Serialize>(&self, key: &CacheKey, value: &T) {
        let contents = match serde_json::to_string(&CachedData::new(value)) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to serialize cache entry");
                return;
            }
        };

        self.with_key_lock(key.as_str(), || match self.store.write(key.as_str(), &contents) {
            Ok(()) => debug!(key = %key, bytes = contents.len(), "Cache entry written"),
            Err(e) => warn!(key = %key, error = %e, "Failed to write cache entry"),
        });
    }

    /// Remove exactly the named key.
    pub fn remove(&self, key: &str) {
        self.with_key_lock(key, || {
            if let Err(e) = self.store.remove(key) {
                warn!(key = key, error = %e, "Failed to remove cache entry");
            }
        });
    }

    /// Remove every stored entry, returning how many were removed.
    pub fn clear(&self) -> Result<usize> {
        let keys = self.store.keys()?;
        for key in &keys {
            self.remove(key);
        }
        Ok(keys.len())
    }

    pub fn entries(&self) -> Vec<CacheEntryInfo> {
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "Failed to list cache entries");
                return Vec::new();
            }
        };

        keys.into_iter()
            .map(|key| {
                let cached: Option<CachedData<IgnoredAny>> = self.load(&key);
                CacheEntryInfo {
                    age: cached.as_ref().map(CachedData::age_display),
                    expired: cached.as_ref().map(|c| c.is_expired(self.ttl)).unwrap_or(true),
                    key,
                }
            })
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_backdated(manager: &CacheManager, key: &CacheKey, value: &[u32], age: Duration) {
        let mut cached = CachedData::new(value.to_vec());
        cached.timestamp = Utc::now() - age;
        manager
            .store
            .write(key.as_str(), &serde_json::to_string(&cached).unwrap())
            .unwrap();
    }

    #[test]
    fn test_cached_data_age_display_just_now() {
        let cached = CachedData::new(vec![1, 2, 3]);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_cached_data_age_display_rounding() {
        let mut cached = CachedData::new(1);
        cached.timestamp = Utc::now() - Duration::minutes(5);
        assert_eq!(cached.age_display(), "5m ago");
        cached.timestamp = Utc::now() - Duration::minutes(95);
        assert_eq!(cached.age_display(), "2h ago");
        cached.timestamp = Utc::now() - Duration::hours(26);
        assert_eq!(cached.age_display(), "1d ago");
        cached.timestamp = Utc::now() + Duration::minutes(10);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_cached_data_is_expired_at_ttl() {
        let ttl = Duration::minutes(CACHE_TTL_MINUTES);
        let mut cached = CachedData::new(1);
        assert!(!cached.is_expired(ttl));
        cached.timestamp = Utc::now() - ttl;
        assert!(cached.is_expired(ttl));
        cached.timestamp = Utc::now() + Duration::hours(1);
        assert!(!cached.is_expired(ttl));
    }

    #[test]
    fn test_set_then_get_round_trip() {
        let manager = CacheManager::in_memory();
        let key = CacheKey::standings();
        manager.set(&key, &vec!["a".to_string(), "b".to_string()]);
        let value: Option<Vec<String>> = manager.get(&key);
        assert_eq!(value, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_set_overwrites() {
        let manager = CacheManager::in_memory();
        let key = CacheKey::schedule();
        manager.set(&key, &1u32);
        manager.set(&key, &2u32);
        assert_eq!(manager.get::<u32>(&key), Some(2));
    }

    #[test]
    fn test_expired_entry_is_absent_and_evicted() {
        let manager = CacheManager::in_memory();
        let key = CacheKey::standings();
        write_backdated(&manager, &key, &[1, 2], Duration::hours(3));

        assert_eq!(manager.get::<Vec<u32>>(&key), None);
        assert_eq!(manager.store.read(key.as_str()).unwrap(), None);
    }

    #[test]
    fn test_entry_just_under_ttl_is_served() {
        let manager = CacheManager::in_memory();
        let key = CacheKey::standings();
        write_backdated(&manager, &key, &[7], Duration::minutes(CACHE_TTL_MINUTES - 1));
        assert_eq!(manager.get::<Vec<u32>>(&key), Some(vec![7]));
    }

    #[test]
    fn test_corrupt_entry_is_a_miss() {
        let manager = CacheManager::in_memory();
        let key = CacheKey::schedule();
        manager.store.write(key.as_str(), "{not json").unwrap();
        assert_eq!(manager.get::<Vec<u32>>(&key), None);

        // Valid JSON of the wrong shape is a miss too
        manager.set(&key, &"a string");
        assert_eq!(manager.get::<Vec<u32>>(&key), None);
    }

    #[test]
    fn test_remove_only_named_key() {
        let manager = CacheManager::in_memory();
        manager.set(&CacheKey::standings(), &1u32);
        manager.set(&CacheKey::schedule(), &2u32);
        manager.remove("standings_v2");
        assert_eq!(manager.get::<u32>(&CacheKey::standings()), None);
        assert_eq!(manager.get::<u32>(&CacheKey::schedule()), Some(2));
    }

    #[test]
    fn test_entries_and_clear() {
        let manager = CacheManager::in_memory();
        manager.set(&CacheKey::standings(), &vec![1u32]);
        write_backdated(&manager, &CacheKey::schedule(), &[1], Duration::hours(4));
        manager.store.write("broken_v1", "nope").unwrap();

        let entries = manager.entries();
        assert_eq!(entries.len(), 3);
        let standings = entries.iter().find(|e| e.key == "standings_v2").unwrap();
        assert_eq!(standings.age.as_deref(), Some("just now"));
        assert!(!standings.expired);
        let schedule = entries.iter().find(|e| e.key == "schedule_v3").unwrap();
        assert!(schedule.expired);
        let broken = entries.iter().find(|e| e.key == "broken_v1").unwrap();
        assert_eq!(broken.age, None);

        assert_eq!(manager.clear().unwrap(), 3);
        assert!(manager.entries().is_empty());
    }

    #[test]
    fn test_file_backed_survives_new_manager() {
        let dir = tempfile::tempdir().unwrap();
        let key = CacheKey::team_details("13");
        CacheManager::file_backed(dir.path().to_path_buf())
            .unwrap()
            .set(&key, &vec![5u32]);
        let reopened = CacheManager::file_backed(dir.path().to_path_buf()).unwrap();
        assert_eq!(reopened.get::<Vec<u32>>(&key), Some(vec![5]));
    }

    #[test]
    fn test_team_ids_that_sanitize_alike_stay_separate() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CacheManager::file_backed(dir.path().to_path_buf()).unwrap();
        manager.set(&CacheKey::team_details("a_b"), &vec![1u32]);
        manager.set(&CacheKey::team_details("a/b"), &vec![2u32]);

        assert_eq!(manager.get::<Vec<u32>>(&CacheKey::team_details("a_b")), Some(vec![1]));
        assert_eq!(manager.get::<Vec<u32>>(&CacheKey::team_details("a/b")), Some(vec![2]));

        manager.remove("team_details_a/b_v3");
        assert_eq!(manager.get::<Vec<u32>>(&CacheKey::team_details("a_b")), Some(vec![1]));
        assert_eq!(manager.get::<Vec<u32>>(&CacheKey::team_details("a/b")), None);
    }

    #[test]
    fn test_key_locks_are_released_after_use() {
        let manager = CacheManager::in_memory();
        for id in 0..50 {
            let key = CacheKey::team_details(&id.to_string());
            manager.set(&key, &id);
            assert_eq!(manager.get::<u32>(&key), Some(id));
            manager.remove(key.as_str());
        }
        assert!(manager.key_locks().is_empty());
    }

    #[test]
    fn test_concurrent_writers_same_key() {
        let manager = Arc::new(CacheManager::in_memory());
        let key = CacheKey::schedule();
        let handles: Vec<_> = (0..8u32)
            .map(|i| {
                let manager = Arc::clone(&manager);
                let key = key.clone();
                std::thread::spawn(move || {
                    manager.set(&key, &i);
                    manager.get::<u32>(&key)
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().is_some());
        }
        assert!(manager.get::<u32>(&key).is_some());
        assert!(manager.key_locks().is_empty());
    }
}
