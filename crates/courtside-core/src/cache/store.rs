//! Raw key/value storage behind the cache manager.
//!
//! Stores only see serialized strings. TTL, typing and error swallowing
//! live in `CacheManager`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};

pub trait CacheStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Overwrites any existing value
    fn write(&self, key: &str, contents: &str) -> Result<()>;

    /// Removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;

    fn keys(&self) -> Result<Vec<String>>;
}

/// One JSON file per key in a cache directory.
pub struct FileStore {
    cache_dir: PathBuf,
}

impl FileStore {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory: {}", cache_dir.display()))?;
        Ok(Self { cache_dir })
    }

    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", encode_file_stem(key)))
    }
}

/// Escape a key into a file stem that stays inside its directory.
///
/// ASCII alphanumerics, `_` and `-` are kept; every other byte becomes `%XX`.
/// The mapping is one-to-one, so distinct keys never share a file.
pub(crate) fn encode_file_stem(key: &str) -> String {
    let mut stem = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("%{:02X}", byte));
        }
    }
    stem
}

/// Inverse of `encode_file_stem`; None for stems it could not have produced.
pub(crate) fn decode_file_stem(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = stem.get(i + 1..i + 3)?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}

impl CacheStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.cache_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", key))?;
        Ok(Some(contents))
    }

    fn write(&self, key: &str, contents: &str) -> Result<()> {
        let path = self.cache_path(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, contents).with_context(|| format!("Failed to write cache file: {}", key))?;
        std::fs::rename(&tmp, &path).with_context(|| format!("Failed to swap cache file: {}", key))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.cache_path(key);
        if path.exists() {
            std::fs::remove_file(&path).with_context(|| format!("Failed to remove cache file: {}", key))?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.cache_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(key) = path.file_stem().and_then(|s| s.to_str()).and_then(decode_file_stem) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Process-local store, used in tests and when no cache directory exists.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CacheStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn write(&self, key: &str, contents: &str) -> Result<()> {
        self.lock().insert(key.to_string(), contents.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("cache")).unwrap();

        assert_eq!(store.read("standings_v2").unwrap(), None);
        store.write("standings_v2", "{\"a\":1}").unwrap();
        store.write("schedule_v3", "[]").unwrap();
        assert_eq!(store.read("standings_v2").unwrap().as_deref(), Some("{\"a\":1}"));
        assert_eq!(store.keys().unwrap(), vec!["schedule_v3", "standings_v2"]);

        store.remove("standings_v2").unwrap();
        assert_eq!(store.read("standings_v2").unwrap(), None);
        assert_eq!(store.read("schedule_v3").unwrap().as_deref(), Some("[]"));
        // Removing again is fine
        store.remove("standings_v2").unwrap();
    }

    #[test]
    fn test_file_store_keeps_odd_keys_inside_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();
        store.write("team_details_../../etc_v3", "{}").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["team_details_../../etc_v3"]);
        assert_eq!(store.read("team_details_../../etc_v3").unwrap().as_deref(), Some("{}"));

        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().path()).collect();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].parent(), Some(dir.path()));
    }

    #[test]
    fn test_file_store_similar_keys_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf()).unwrap();
        store.write("team_details_a_b_v3", "1").unwrap();
        store.write("team_details_a/b_v3", "2").unwrap();
        store.write("team_details_a%2Fb_v3", "3").unwrap();

        assert_eq!(store.read("team_details_a_b_v3").unwrap().as_deref(), Some("1"));
        assert_eq!(store.read("team_details_a/b_v3").unwrap().as_deref(), Some("2"));
        assert_eq!(store.read("team_details_a%2Fb_v3").unwrap().as_deref(), Some("3"));

        store.remove("team_details_a/b_v3").unwrap();
        assert_eq!(store.read("team_details_a_b_v3").unwrap().as_deref(), Some("1"));
        assert_eq!(store.keys().unwrap(), vec!["team_details_a%2Fb_v3", "team_details_a_b_v3"]);
    }

    #[test]
    fn test_file_stem_encoding_round_trips() {
        for key in ["standings_v2", "a/b", "50%", "caf\u{e9}", ".."] {
            assert_eq!(decode_file_stem(&encode_file_stem(key)).as_deref(), Some(key));
        }
        assert_eq!(encode_file_stem("a/b.c"), "a%2Fb%2Ec");
        assert_eq!(decode_file_stem("bad%2"), None);
    }

    #[test]
    fn test_memory_store_overwrites() {
        let store = MemoryStore::new();
        store.write("k", "1").unwrap();
        store.write("k", "2").unwrap();
        assert_eq!(store.read("k").unwrap().as_deref(), Some("2"));
        assert_eq!(store.keys().unwrap(), vec!["k"]);
    }
}
