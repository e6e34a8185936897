//! Engagement statistics persistence trait.

use crate::StoreResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use herald_core::{EventKind, GuildId, GuildStats, HistoryEntry, Period};

/// Store of per-guild counters and bounded event history.
///
/// Every method is a single atomic operation on the backend. Callers never
/// read counters, modify them and write them back.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Create zeroed statistics for the guild if none exist.
    async fn ensure(&self, guild_id: GuildId, now: DateTime<Utc>) -> StoreResult<()>;

    /// Add one to every period counter of `kind` and set `last_update` to `at`.
    async fn increment(&self, guild_id: GuildId, kind: EventKind, at: DateTime<Utc>)
    -> StoreResult<()>;

    /// Append to the history of `kind`, evicting the oldest entries past capacity.
    async fn push_history(
        &self,
        guild_id: GuildId,
        kind: EventKind,
        entry: HistoryEntry,
    ) -> StoreResult<()>;

    /// Statistics of one guild.
    async fn get(&self, guild_id: GuildId) -> StoreResult<Option<GuildStats>>;

    /// Zero the join and leave counters of `period`.
    ///
    /// With `stale_before`, only guilds whose `last_update` is earlier (or
    /// unset) are touched. Returns the number of guilds reset.
    async fn reset_period(
        &self,
        period: Period,
        stale_before: Option<DateTime<Utc>>,
    ) -> StoreResult<u64>;

    /// Statistics of every guild.
    async fn list_all(&self) -> StoreResult<Vec<GuildStats>>;
}
