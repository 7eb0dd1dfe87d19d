//! Local response cache for offline and rate-limit friendly access.
//!
//! This module provides the `CacheManager` for storing and retrieving
//! normalized feed data. Entries are wrapped in `CachedData` with their
//! write time and treated as absent once they are 3 hours old.
//!
//! Keys carry a schema version (`standings_v2`); changing the shape of a
//! cached type means bumping its version, never migrating old entries.

pub mod key;
pub mod manager;
pub mod store;

pub use key::CacheKey;
pub use manager::{CacheEntryInfo, CacheManager, CachedData, CACHE_TTL_MINUTES};
pub use store::{CacheStore, FileStore, MemoryStore};
