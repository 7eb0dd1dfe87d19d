//! Upstream feed boundary.
//!
//! This module provides the `Feed` trait, its reqwest implementation
//! `FeedClient`, the lenient wire types the feed is decoded into, and the
//! classified `FeedError` every upstream call returns.

pub mod client;
pub mod error;
pub mod wire;

pub use client::{Feed, FeedClient};
pub use error::{FailureKind, FeedError, FeedResult};
