//! Guild configuration resolver.

use crate::effective_config;
use herald_cache::{ConfigCache, GuildLocks};
use herald_core::{
    ChannelId, ChannelOverride, EffectiveConfig, EffectiveSection, GuildConfig, GuildConfigPatch,
    GuildId, MessageMode, RoleId, SectionKind,
};
use herald_error::{HeraldResult, ValidationError, ValidationErrorKind};
use herald_storage::{ConfigStore, ConfigWrite};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Resolves the effective configuration of a guild and applies
/// administrative changes to it.
///
/// Reads go to the primary store and are mirrored into the cache. When the
/// primary fails, the cached copy is used, then the built-in defaults, so
/// resolution never fails. A guild seen for the first time gets the defaults
/// written through the primary store exactly once.
///
/// Every read-modify-write (first-use synthesis and administrative writes)
/// holds the guild's lock, so writes to one guild are serialized while other
/// guilds proceed independently.
///
/// # Example
///
/// ```
/// use herald_cache::ConfigCache;
/// use herald_core::{GuildId, MessageMode};
/// use herald_resolver::ConfigResolver;
/// use std::sync::Arc;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let cache = ConfigCache::new();
/// let resolver = ConfigResolver::new(Arc::new(cache.clone()), cache);
/// let config = resolver.resolve(GuildId(1), None, None).await;
/// assert_eq!(config.prefix, "!");
/// assert_eq!(config.welcome.mode, MessageMode::Embed);
/// # });
/// ```
#[derive(Clone)]
pub struct ConfigResolver {
    primary: Arc<dyn ConfigStore>,
    cache: ConfigCache,
    locks: GuildLocks,
}

impl std::fmt::Debug for ConfigResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigResolver")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl ConfigResolver {
    /// Resolver over `primary`, mirroring into `cache`.
    ///
    /// When persistence is disabled, pass a clone of the cache as the primary.
    pub fn new(primary: Arc<dyn ConfigStore>, cache: ConfigCache) -> Self {
        Self {
            primary,
            cache,
            locks: GuildLocks::new(),
        }
    }

    /// Cache mirrored by this resolver.
    pub fn cache(&self) -> &ConfigCache {
        &self.cache
    }

    /// Effective configuration for an event in `guild_id`.
    ///
    /// `channel_id` selects the channel override of each section and
    /// `inline` is layered on top of everything else.
    #[instrument(skip(self, inline))]
    pub async fn resolve(
        &self,
        guild_id: GuildId,
        channel_id: Option<ChannelId>,
        inline: Option<&GuildConfigPatch>,
    ) -> EffectiveConfig {
        let config = self.load(guild_id).await;
        effective_config(guild_id, &config, channel_id, inline)
    }

    /// One effective section for an event in `guild_id`.
    pub async fn resolve_section(
        &self,
        guild_id: GuildId,
        kind: SectionKind,
        channel_id: Option<ChannelId>,
    ) -> EffectiveSection {
        let effective = self.resolve(guild_id, channel_id, None).await;
        match kind {
            SectionKind::Welcome => effective.welcome,
            SectionKind::Leave => effective.leave,
        }
    }

    /// Stored configuration of `guild_id`, synthesized on first use.
    ///
    /// Degrades like [`resolve`](Self::resolve) when the store fails.
    pub async fn guild_config(&self, guild_id: GuildId) -> GuildConfig {
        self.load(guild_id).await
    }

    /// Fill the cache from every stored configuration.
    ///
    /// A store failure is logged and leaves the cache as it was.
    #[instrument(skip(self))]
    pub async fn warm(&self) -> usize {
        match self.primary.list_all().await {
            Ok(configs) => {
                let count = configs.len();
                self.cache.extend(configs).await;
                info!(count, "Configuration cache warmed");
                count
            }
            Err(e) => {
                warn!(error = %e, "Failed to warm configuration cache");
                0
            }
        }
    }

    async fn load(&self, guild_id: GuildId) -> GuildConfig {
        match self.primary.get(guild_id).await {
            Ok(Some(config)) => {
                self.cache.insert(guild_id, config.clone()).await;
                config
            }
            Ok(None) => self.synthesize(guild_id).await,
            Err(e) => {
                warn!(guild_id = %guild_id, error = %e, "Config store read failed, using cache");
                self.fallback(guild_id).await
            }
        }
    }

    async fn fallback(&self, guild_id: GuildId) -> GuildConfig {
        match self.cache.entry(guild_id).await {
            Some(entry) => entry.config().clone(),
            None => {
                debug!(guild_id = %guild_id, "No cached configuration, using defaults");
                GuildConfig::default()
            }
        }
    }

    /// Write the defaults for a guild that has no stored configuration.
    async fn synthesize(&self, guild_id: GuildId) -> GuildConfig {
        let _guard = self.locks.acquire(guild_id).await;

        // Another task may have written it while we waited for the lock.
        match self.primary.get(guild_id).await {
            Ok(Some(config)) => {
                self.cache.insert(guild_id, config.clone()).await;
                return config;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(guild_id = %guild_id, error = %e, "Config store read failed, using cache");
                return self.fallback(guild_id).await;
            }
        }

        match self
            .primary
            .save(guild_id, ConfigWrite::Replace(GuildConfig::default()))
            .await
        {
            Ok(config) => {
                info!(guild_id = %guild_id, "Created default configuration");
                self.cache.insert(guild_id, config.clone()).await;
                config
            }
            Err(e) => {
                warn!(guild_id = %guild_id, error = %e, "Failed to store default configuration");
                GuildConfig::default()
            }
        }
    }

    async fn current(&self, guild_id: GuildId) -> HeraldResult<GuildConfig> {
        Ok(self.primary.get(guild_id).await?.unwrap_or_default())
    }

    async fn commit(&self, guild_id: GuildId, write: ConfigWrite) -> HeraldResult<GuildConfig> {
        let stored = self.primary.save(guild_id, write).await?;
        self.cache.insert(guild_id, stored.clone()).await;
        Ok(stored)
    }

    /// Deep-merge `patch` into the guild's configuration.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the merged configuration is invalid,
    /// before anything is written, or a store error if the write fails.
    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        guild_id: GuildId,
        patch: GuildConfigPatch,
    ) -> HeraldResult<GuildConfig> {
        let _guard = self.locks.acquire(guild_id).await;
        let candidate = self.current(guild_id).await?.merged(&patch);
        candidate.validate()?;
        let stored = self.commit(guild_id, ConfigWrite::Merge(patch)).await?;
        info!("Guild configuration updated");
        Ok(stored)
    }

    /// Apply an edit to the whole configuration and replace it.
    async fn modify<F>(&self, guild_id: GuildId, edit: F) -> HeraldResult<GuildConfig>
    where
        F: FnOnce(&mut GuildConfig) -> Result<(), ValidationError> + Send,
    {
        let _guard = self.locks.acquire(guild_id).await;
        let mut candidate = self.current(guild_id).await?;
        edit(&mut candidate)?;
        candidate.validate()?;
        let stored = self.commit(guild_id, ConfigWrite::Replace(candidate)).await?;
        debug!(guild_id = %guild_id, "Guild configuration replaced");
        Ok(stored)
    }

    /// Change the command prefix.
    ///
    /// # Errors
    ///
    /// Rejects empty, whitespace-containing or overlong prefixes.
    pub async fn set_prefix(
        &self,
        guild_id: GuildId,
        prefix: impl Into<String>,
    ) -> HeraldResult<GuildConfig> {
        self.update(guild_id, GuildConfigPatch::prefix(prefix)).await
    }

    /// Change a section's default presentation mode.
    pub async fn set_default_mode(
        &self,
        guild_id: GuildId,
        kind: SectionKind,
        mode: MessageMode,
    ) -> HeraldResult<GuildConfig> {
        let patch = GuildConfigPatch::default().with_section(kind, |s| s.default_mode = Some(mode));
        self.update(guild_id, patch).await
    }

    /// Turn a section on or off.
    pub async fn set_enabled(
        &self,
        guild_id: GuildId,
        kind: SectionKind,
        enabled: bool,
    ) -> HeraldResult<GuildConfig> {
        let patch = GuildConfigPatch::default().with_section(kind, |s| s.enabled = Some(enabled));
        self.update(guild_id, patch).await
    }

    /// Register a channel override, replacing any existing one for the
    /// same channel.
    #[instrument(skip(self, entry), fields(channel_id = %entry.channel_id))]
    pub async fn add_channel(
        &self,
        guild_id: GuildId,
        kind: SectionKind,
        entry: ChannelOverride,
    ) -> HeraldResult<GuildConfig> {
        self.modify(guild_id, |config| {
            config.section_mut(kind).upsert_channel(entry);
            Ok(())
        })
        .await
    }

    /// Remove a channel override.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrorKind::UnknownChannel`] if the section has no
    /// override for the channel.
    #[instrument(skip(self))]
    pub async fn remove_channel(
        &self,
        guild_id: GuildId,
        kind: SectionKind,
        channel_id: ChannelId,
    ) -> HeraldResult<GuildConfig> {
        self.modify(guild_id, |config| {
            if config.section_mut(kind).remove_channel(channel_id) {
                Ok(())
            } else {
                Err(ValidationError::new(ValidationErrorKind::UnknownChannel(
                    channel_id.get(),
                )))
            }
        })
        .await
    }

    /// Grant `role_id` to every member on join.
    pub async fn add_auto_role(
        &self,
        guild_id: GuildId,
        role_id: RoleId,
    ) -> HeraldResult<GuildConfig> {
        self.modify(guild_id, |config| {
            config.roles.auto_assign.insert(role_id);
            Ok(())
        })
        .await
    }

    /// Stop granting `role_id` on join.
    pub async fn remove_auto_role(
        &self,
        guild_id: GuildId,
        role_id: RoleId,
    ) -> HeraldResult<GuildConfig> {
        self.modify(guild_id, |config| {
            config.roles.auto_assign.remove(&role_id);
            Ok(())
        })
        .await
    }

    /// Let members grant themselves `role_id`.
    pub async fn add_self_assignable_role(
        &self,
        guild_id: GuildId,
        role_id: RoleId,
    ) -> HeraldResult<GuildConfig> {
        self.modify(guild_id, |config| {
            config.roles.self_assignable.insert(role_id);
            Ok(())
        })
        .await
    }

    /// Withdraw `role_id` from self-assignment.
    pub async fn remove_self_assignable_role(
        &self,
        guild_id: GuildId,
        role_id: RoleId,
    ) -> HeraldResult<GuildConfig> {
        self.modify(guild_id, |config| {
            config.roles.self_assignable.remove(&role_id);
            Ok(())
        })
        .await
    }
}
