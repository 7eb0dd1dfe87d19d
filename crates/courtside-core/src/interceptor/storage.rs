use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::AssetResponse;
use crate::cache::store::{decode_file_stem, encode_file_stem};

type NamedCaches = HashMap<String, HashMap<String, AssetResponse>>;

/// On-disk form of one cached asset; the file name only identifies it.
#[derive(Serialize, Deserialize)]
struct StoredAsset {
    key: String,
    response: AssetResponse,
}

/// Named asset caches shared by every page the interceptor serves.
///
/// With a root directory every cache is mirrored to `<root>/<name>/`, one
/// JSON file per entry, so caches outlive the process and a later version
/// can retire them. Locks are never held across a network call.
#[derive(Default)]
pub struct CacheStorage {
    caches: RwLock<NamedCaches>,
    root: Option<PathBuf>,
}

impl CacheStorage {
    /// Process-local storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage mirrored under `root`, loading whatever earlier runs left there.
    pub fn persistent(root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create asset cache directory: {}", root.display()))?;

        let mut caches = NamedCaches::new();
        for entry in std::fs::read_dir(&root)? {
            let path = entry?.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|s| s.to_str()).and_then(decode_file_stem) else {
                continue;
            };
            let entries = load_cache_dir(&path);
            debug!(cache = %name, entries = entries.len(), "Loaded asset cache");
            caches.insert(name, entries);
        }

        Ok(Self {
            caches: RwLock::new(caches),
            root: Some(root),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, NamedCaches> {
        self.caches.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, NamedCaches> {
        self.caches.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn cache_dir(&self, name: &str) -> Option<PathBuf> {
        self.root.as_ref().map(|root| root.join(encode_file_stem(name)))
    }

    /// Create the named cache if it does not exist yet.
    pub fn open(&self, name: &str) {
        let mut caches = self.write();
        caches.entry(name.to_string()).or_default();
        if let Some(dir) = self.cache_dir(name) {
            if let Err(e) = std::fs::create_dir_all(&dir) {
                warn!(cache = %name, error = %e, "Failed to create asset cache directory");
            }
        }
    }

    /// Returns whether a cache by that name existed.
    pub fn delete(&self, name: &str) -> bool {
        let mut caches = self.write();
        let existed = caches.remove(name).is_some();
        if let Some(dir) = self.cache_dir(name) {
            if dir.exists() {
                if let Err(e) = std::fs::remove_dir_all(&dir) {
                    warn!(cache = %name, error = %e, "Failed to delete asset cache directory");
                }
            }
        }
        existed
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn match_request(&self, name: &str, key: &str) -> Option<AssetResponse> {
        self.read().get(name).and_then(|cache| cache.get(key)).cloned()
    }

    /// Store a response, creating the cache if needed. A failed disk write
    /// is logged and leaves the in-memory entry in place.
    pub fn put(&self, name: &str, key: &str, response: AssetResponse) {
        let mut caches = self.write();
        if let Some(dir) = self.cache_dir(name) {
            if let Err(e) = write_entry(&dir, key, &response) {
                warn!(cache = %name, key = %key, error = %e, "Failed to persist asset");
            }
        }
        caches
            .entry(name.to_string())
            .or_default()
            .insert(key.to_string(), response);
    }

    pub fn len(&self, name: &str) -> usize {
        self.read().get(name).map(HashMap::len).unwrap_or(0)
    }

    pub fn is_empty(&self, name: &str) -> bool {
        self.len(name) == 0
    }
}

fn write_entry(dir: &Path, key: &str, response: &AssetResponse) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let stored = StoredAsset {
        key: key.to_string(),
        response: response.clone(),
    };
    let path = dir.join(format!("{}.json", encode_file_stem(key)));
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, serde_json::to_vec(&stored)?)?;
    std::fs::rename(&tmp, &path)?;
    Ok(())
}

/// Entries of one cache directory; unreadable files are skipped.
fn load_cache_dir(dir: &Path) -> HashMap<String, AssetResponse> {
    let mut entries = HashMap::new();
    let Ok(files) = std::fs::read_dir(dir) else {
        return entries;
    };
    for path in files.flatten().map(|f| f.path()) {
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let stored = std::fs::read(&path)
            .map_err(anyhow::Error::from)
            .and_then(|bytes| Ok(serde_json::from_slice::<StoredAsset>(&bytes)?));
        match stored {
            Ok(stored) => {
                entries.insert(stored.key, stored.response);
            }
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable asset"),
        }
    }
    entries
}
