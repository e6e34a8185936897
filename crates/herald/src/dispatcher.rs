//! Discord event entry points.

use herald_core::{
    ChannelId, Clock, EffectiveSection, GuildConfig, GuildId, RoleId, SectionKind, UserId,
};
use herald_rate_limit::RateLimiter;
use herald_resolver::{ConfigResolver, effective_config};
use herald_stats::{RecordOutcome, StatsAggregator};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// What the bot should do for a member joining or leaving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberNotice {
    /// Which notification this is
    pub kind: SectionKind,
    /// Resolved message for each configured channel; empty when disabled
    pub deliveries: Vec<EffectiveSection>,
    /// Roles to grant; only populated for joins with role automation on
    pub auto_roles: Vec<RoleId>,
    /// Where the event was counted
    pub recorded: RecordOutcome,
}

/// Verdict for a user command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandGate {
    /// Run the command
    Proceed {
        /// Calls left in the window
        remaining: u32,
    },
    /// Reject the command
    Throttled {
        /// Whole seconds until the user may retry
        retry_after_secs: u64,
    },
}

/// Routes gateway events through the resolver, statistics and limiter.
///
/// Every dependency degrades on its own (cached or default configuration,
/// in-memory statistics, fail-open limiting), so no handler returns an error.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    resolver: ConfigResolver,
    stats: StatsAggregator,
    limiter: RateLimiter,
    clock: Arc<dyn Clock>,
}

impl EventDispatcher {
    /// Dispatcher over the given components.
    pub fn new(
        resolver: ConfigResolver,
        stats: StatsAggregator,
        limiter: RateLimiter,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            resolver,
            stats,
            limiter,
            clock,
        }
    }

    /// A member joined `guild_id`.
    #[instrument(skip(self))]
    pub async fn handle_member_join(&self, guild_id: GuildId, user_id: UserId) -> MemberNotice {
        let (mut notice, config) = self
            .member_event(guild_id, user_id, SectionKind::Welcome)
            .await;
        if config.roles.enabled {
            notice.auto_roles = config.roles.auto_assign.iter().copied().collect();
        }
        info!(
            deliveries = notice.deliveries.len(),
            auto_roles = notice.auto_roles.len(),
            "Member join handled"
        );
        notice
    }

    /// A member left `guild_id`.
    #[instrument(skip(self))]
    pub async fn handle_member_leave(&self, guild_id: GuildId, user_id: UserId) -> MemberNotice {
        let (notice, _) = self.member_event(guild_id, user_id, SectionKind::Leave).await;
        info!(deliveries = notice.deliveries.len(), "Member leave handled");
        notice
    }

    async fn member_event(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        kind: SectionKind,
    ) -> (MemberNotice, GuildConfig) {
        let record = async {
            match kind {
                SectionKind::Welcome => self.stats.record_join(guild_id, user_id).await,
                SectionKind::Leave => self.stats.record_leave(guild_id, user_id).await,
            }
        };
        let (recorded, config) = tokio::join!(record, self.resolver.guild_config(guild_id));

        let section = config.section(kind);
        let deliveries = if section.enabled {
            section
                .channels
                .iter()
                .map(|c| effective_config(guild_id, &config, Some(c.channel_id), None))
                .map(|effective| effective.section(kind).clone())
                .collect()
        } else {
            debug!(%kind, "Notifications disabled");
            Vec::new()
        };

        let notice = MemberNotice {
            kind,
            deliveries,
            auto_roles: Vec::new(),
            recorded,
        };
        (notice, config)
    }

    /// Effective section for a notification preview in one channel.
    pub async fn preview(
        &self,
        guild_id: GuildId,
        kind: SectionKind,
        channel_id: Option<ChannelId>,
    ) -> EffectiveSection {
        self.resolver.resolve_section(guild_id, kind, channel_id).await
    }

    /// A user invoked `command`.
    #[instrument(skip(self))]
    pub async fn handle_command(&self, command: &str, user_id: UserId) -> CommandGate {
        let decision = self.limiter.check_and_consume(command, user_id).await;
        if decision.limited {
            CommandGate::Throttled {
                retry_after_secs: decision.retry_after_secs(self.clock.now()),
            }
        } else {
            CommandGate::Proceed {
                remaining: decision.remaining,
            }
        }
    }
}
