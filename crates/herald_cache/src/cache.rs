//! Configuration cache implementation.

use async_trait::async_trait;
use derive_getters::Getters;
use herald_core::{GuildConfig, GuildId};
use herald_storage::{ConfigStore, ConfigWrite, StoreResult};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Cached configuration with the time it was stored.
#[derive(Debug, Clone, Getters)]
pub struct CachedConfig {
    config: GuildConfig,
    stored_at: Instant,
}

impl CachedConfig {
    fn new(config: GuildConfig) -> Self {
        Self {
            config,
            stored_at: Instant::now(),
        }
    }
}

/// Guild configurations held in memory.
///
/// Entries never expire: the cache mirrors every document read from or
/// written to the primary store, and is the last known good copy when the
/// primary is unreachable. Clones share the same entries.
///
/// # Example
///
/// ```
/// use herald_cache::ConfigCache;
/// use herald_core::{GuildConfigPatch, GuildId};
/// use herald_storage::{ConfigStore, ConfigWrite};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let cache = ConfigCache::new();
/// let stored = cache
///     .save(GuildId(1), ConfigWrite::Merge(GuildConfigPatch::prefix("?")))
///     .await
///     .unwrap();
/// assert_eq!(stored.prefix, "?");
/// assert_eq!(cache.get(GuildId(1)).await.unwrap(), Some(stored));
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigCache {
    entries: Arc<RwLock<HashMap<GuildId, CachedConfig>>>,
}

impl ConfigCache {
    /// Empty cache.
    pub fn new() -> Self {
        tracing::debug!("Creating new ConfigCache");
        Self::default()
    }

    /// Mirror a document already persisted elsewhere.
    #[tracing::instrument(skip(self, config), fields(guild_id = %guild_id))]
    pub async fn insert(&self, guild_id: GuildId, config: GuildConfig) {
        self.entries
            .write()
            .await
            .insert(guild_id, CachedConfig::new(config));
        tracing::debug!("Cached guild configuration");
    }

    /// Mirror many documents at once.
    pub async fn extend(&self, configs: impl IntoIterator<Item = (GuildId, GuildConfig)>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        for (guild_id, config) in configs {
            entries.insert(guild_id, CachedConfig::new(config));
        }
        let added = entries.len() - before;
        tracing::debug!(added, total = entries.len(), "Cache extended");
        added
    }

    /// Cached entry with its timestamp.
    pub async fn entry(&self, guild_id: GuildId) -> Option<CachedConfig> {
        self.entries.read().await.get(&guild_id).cloned()
    }

    /// Number of cached guilds.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl ConfigStore for ConfigCache {
    async fn get(&self, guild_id: GuildId) -> StoreResult<Option<GuildConfig>> {
        let entry = self.entries.read().await.get(&guild_id).map(|e| e.config.clone());
        tracing::trace!(guild_id = %guild_id, hit = entry.is_some(), "Cache lookup");
        Ok(entry)
    }

    #[tracing::instrument(skip(self, write), fields(guild_id = %guild_id))]
    async fn save(&self, guild_id: GuildId, write: ConfigWrite) -> StoreResult<GuildConfig> {
        let mut entries = self.entries.write().await;
        let current = entries.get(&guild_id).map(|e| e.config.clone());
        let config = write.apply(current);
        entries.insert(guild_id, CachedConfig::new(config.clone()));
        tracing::debug!("Guild configuration saved to cache");
        Ok(config)
    }

    async fn list_all(&self) -> StoreResult<Vec<(GuildId, GuildConfig)>> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .map(|(id, e)| (*id, e.config.clone()))
            .collect())
    }
}
