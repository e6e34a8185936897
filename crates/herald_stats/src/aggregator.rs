//! Event recording and period rollover.

use crate::DailyActivity;
use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use herald_core::{
    Clock, EventKind, GuildId, GuildStats, HistoryEntry, Period, SystemClock, UserId,
};
use herald_error::{HeraldResult, SchedulerError, SchedulerErrorKind};
use herald_scheduler::{BoundaryScheduler, CalendarBoundary, current_period_start};
use herald_storage::{InMemoryStatsStore, StatsStore, StoreResult};
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::{debug, error, info, instrument, warn};

/// Longest span [`StatsAggregator::activity`] reports, in days.
pub const MAX_ACTIVITY_DAYS: u32 = 366;

/// Where a recorded event ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordOutcome {
    /// Written to the primary store
    Persisted,
    /// Primary store failed; kept in process memory
    Fallback,
}

/// Records membership events and rolls counters over at period boundaries.
///
/// Each event is one `ensure`, one atomic `increment` and one history append
/// on the store; the aggregator never reads counters back to modify them.
/// When the primary store fails the event goes to an in-memory fallback so
/// recording never fails.
#[derive(Clone)]
pub struct StatsAggregator {
    primary: Arc<dyn StatsStore>,
    fallback: InMemoryStatsStore,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for StatsAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsAggregator")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

async fn write_event(
    store: &dyn StatsStore,
    guild_id: GuildId,
    kind: EventKind,
    entry: HistoryEntry,
) -> StoreResult<()> {
    store.ensure(guild_id, entry.timestamp).await?;
    store.increment(guild_id, kind, entry.timestamp).await?;
    store.push_history(guild_id, kind, entry).await
}

impl StatsAggregator {
    /// Aggregator over `primary` using the wall clock.
    pub fn new(primary: Arc<dyn StatsStore>) -> Self {
        Self {
            primary,
            fallback: InMemoryStatsStore::new(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Read the current time from `clock`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Use `fallback` for events the primary store rejects.
    pub fn with_fallback(mut self, fallback: InMemoryStatsStore) -> Self {
        self.fallback = fallback;
        self
    }

    /// In-memory store holding events the primary rejected.
    pub fn fallback(&self) -> &InMemoryStatsStore {
        &self.fallback
    }

    /// Count a member joining.
    pub async fn record_join(&self, guild_id: GuildId, user_id: UserId) -> RecordOutcome {
        self.record(guild_id, user_id, EventKind::Join).await
    }

    /// Count a member leaving.
    pub async fn record_leave(&self, guild_id: GuildId, user_id: UserId) -> RecordOutcome {
        self.record(guild_id, user_id, EventKind::Leave).await
    }

    #[instrument(skip(self))]
    async fn record(&self, guild_id: GuildId, user_id: UserId, kind: EventKind) -> RecordOutcome {
        let entry = HistoryEntry {
            user_id,
            timestamp: self.clock.now(),
        };

        match write_event(self.primary.as_ref(), guild_id, kind, entry.clone()).await {
            Ok(()) => {
                debug!("Event recorded");
                RecordOutcome::Persisted
            }
            Err(e) => {
                warn!(error = %e, "Stats store write failed, recording in memory");
                if let Err(e) = write_event(&self.fallback, guild_id, kind, entry).await {
                    error!(error = %e, "Fallback stats write failed");
                }
                RecordOutcome::Fallback
            }
        }
    }

    /// Statistics of one guild, from the primary store or else the fallback.
    pub async fn stats(&self, guild_id: GuildId) -> Option<GuildStats> {
        match self.primary.get(guild_id).await {
            Ok(Some(stats)) => return Some(stats),
            Ok(None) => {}
            Err(e) => warn!(guild_id = %guild_id, error = %e, "Stats store read failed"),
        }
        self.fallback.get(guild_id).await.ok().flatten()
    }

    /// Joins and leaves per local calendar day for the `days` days ending
    /// on the day containing `now`, oldest first.
    ///
    /// Built from the bounded histories, so days older than the oldest
    /// retained entry read as zero. `days` is capped at
    /// [`MAX_ACTIVITY_DAYS`].
    pub async fn activity<Tz: TimeZone>(
        &self,
        guild_id: GuildId,
        days: u32,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> Vec<DailyActivity> {
        let today = now.with_timezone(tz).date_naive();
        let days = days.min(MAX_ACTIVITY_DAYS);
        let mut buckets: Vec<DailyActivity> = (0..days)
            .rev()
            .filter_map(|back| today.checked_sub_days(Days::new(u64::from(back))))
            .map(DailyActivity::empty)
            .collect();

        let Some(stats) = self.stats(guild_id).await else {
            return buckets;
        };

        let bucket_of = |at: &DateTime<Utc>| -> Option<usize> {
            let date: NaiveDate = at.with_timezone(tz).date_naive();
            buckets.binary_search_by_key(&date, |b| b.date).ok()
        };
        let slots = |kind| -> Vec<usize> {
            stats
                .history(kind)
                .iter()
                .filter_map(|e| bucket_of(&e.timestamp))
                .collect()
        };
        let join_slots = slots(EventKind::Join);
        let leave_slots = slots(EventKind::Leave);

        for slot in join_slots {
            buckets[slot].joins += 1;
        }
        for slot in leave_slots {
            buckets[slot].leaves += 1;
        }
        buckets
    }

    /// Zero the counters of `period` for every guild.
    ///
    /// # Errors
    ///
    /// Returns the primary store's error; the fallback is reset regardless.
    #[instrument(skip(self))]
    pub async fn reset(&self, period: Period) -> HeraldResult<u64> {
        if let Err(e) = self.fallback.reset_period(period, None).await {
            warn!(error = %e, "Fallback stats reset failed");
        }
        let reset = self.primary.reset_period(period, None).await?;
        info!(guilds = reset, "Period counters reset");
        Ok(reset)
    }

    /// Zero every period whose boundary passed while nothing was counted.
    ///
    /// Meant to run once at startup: a guild whose last event precedes the
    /// start of the current day, week or month has that counter zeroed, so
    /// rollovers missed while the process was down are applied exactly once.
    ///
    /// # Errors
    ///
    /// Returns an error if a period start cannot be represented in `tz` or
    /// the primary store fails.
    #[instrument(skip(self, tz))]
    pub async fn reconcile_stale_periods<Tz: TimeZone>(
        &self,
        now: DateTime<Utc>,
        tz: &Tz,
    ) -> HeraldResult<u64> {
        let mut total = 0;
        for period in Period::iter() {
            let start = current_period_start(period, now, tz).ok_or_else(|| {
                SchedulerError::new(SchedulerErrorKind::NoBoundary(now.to_rfc3339()))
            })?;
            if let Err(e) = self.fallback.reset_period(period, Some(start)).await {
                warn!(error = %e, "Fallback stats reconciliation failed");
            }
            let reset = self.primary.reset_period(period, Some(start)).await?;
            debug!(%period, since = %start, guilds = reset, "Stale counters reset");
            total += reset;
        }
        info!(guilds = total, "Stale period counters reconciled");
        Ok(total)
    }

    /// Arm one rollover job per period on `scheduler`.
    pub async fn schedule_rollovers<Tz>(&self, scheduler: &BoundaryScheduler, tz: Tz)
    where
        Tz: TimeZone + Send + Sync + 'static,
        Tz::Offset: Send + Sync,
    {
        for period in Period::iter() {
            let aggregator = self.clone();
            scheduler
                .schedule(
                    &rollover_job_name(period),
                    CalendarBoundary::new(period, tz.clone()),
                    move || {
                        let aggregator = aggregator.clone();
                        async move { aggregator.reset(period).await.map(|_| ()) }
                    },
                )
                .await;
        }
    }
}

/// Scheduler job name of the rollover for `period`.
pub fn rollover_job_name(period: Period) -> String {
    format!("stats-rollover-{period}")
}
