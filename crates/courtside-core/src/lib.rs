//! Courtside core - the data synchronization and caching layer behind the
//! league schedule and standings board.
//!
//! - `api`: the upstream feed boundary (wire types, reqwest client, `Feed` trait)
//! - `normalize`: pure mapping from upstream payloads into domain models
//! - `cache`: versioned, TTL-bounded persistent response cache
//! - `sync`: the fetch orchestrator consumed by the rendering layer
//! - `interceptor`: request interception with per-resource-class policies

pub mod api;
pub mod cache;
pub mod config;
pub mod interceptor;
pub mod models;
pub mod normalize;
pub mod sync;

pub use api::{Feed, FeedClient, FeedError};
pub use cache::{CacheKey, CacheManager, CachedData, FileStore, MemoryStore};
pub use config::Config;
pub use models::{Conference, Game, GameStatus, Player, Team, TeamDetailBundle};
pub use sync::{SyncOptions, SyncService};
