//! Guild configuration persistence trait.

use crate::StoreResult;
use async_trait::async_trait;
use herald_core::{GuildConfig, GuildConfigPatch, GuildId};

/// What a [`ConfigStore::save`] writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWrite {
    /// Store the document as given
    Replace(GuildConfig),
    /// Deep-merge into the stored document, or into the defaults if none exists
    Merge(GuildConfigPatch),
}

impl ConfigWrite {
    /// Document resulting from applying this write to `current`.
    pub fn apply(self, current: Option<GuildConfig>) -> GuildConfig {
        match self {
            ConfigWrite::Replace(config) => config,
            ConfigWrite::Merge(patch) => current.unwrap_or_default().merged(&patch),
        }
    }
}

/// Keyed document store for guild configuration.
///
/// `save` is an idempotent upsert returning the document as stored.
/// Concurrent saves to the same guild resolve last-writer-wins; callers that
/// read, modify and write must serialize per guild themselves.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Stored configuration, if the guild has one.
    async fn get(&self, guild_id: GuildId) -> StoreResult<Option<GuildConfig>>;

    /// Insert or update the guild's configuration.
    async fn save(&self, guild_id: GuildId, write: ConfigWrite) -> StoreResult<GuildConfig>;

    /// Every stored configuration.
    async fn list_all(&self) -> StoreResult<Vec<(GuildId, GuildConfig)>>;
}
