//! In-memory guild configuration cache.
//!
//! [`ConfigCache`] implements the same [`ConfigStore`](herald_storage::ConfigStore)
//! contract as the persistent backends, so it can stand in for them when
//! persistence is disabled and serve as the fallback when they fail.
//! [`GuildLocks`] serializes read-modify-write sequences per guild.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod locks;

pub use cache::{CachedConfig, ConfigCache};
pub use locks::GuildLocks;
