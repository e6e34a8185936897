//! Engagement statistics documents.

use crate::{GuildId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of entries kept in each event history.
pub const HISTORY_CAPACITY: usize = 1000;

/// Membership event kind.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventKind {
    /// Member joined
    Join,
    /// Member left
    Leave,
}

/// Rolling counter period.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Period {
    /// Resets at local midnight
    Daily,
    /// Resets at the start of Sunday
    Weekly,
    /// Resets at the start of the month
    Monthly,
}

/// Event counters per rollover period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodCounters {
    /// Events since local midnight
    pub today: u64,
    /// Events since the start of the week
    pub week: u64,
    /// Events since the start of the month
    pub month: u64,
    /// Events ever recorded; never reset
    pub total: u64,
}

impl PeriodCounters {
    /// Count one event in every period.
    pub fn increment(&mut self) {
        self.today += 1;
        self.week += 1;
        self.month += 1;
        self.total += 1;
    }

    /// Zero the counter of one period. `total` is untouched.
    pub fn reset(&mut self, period: Period) {
        match period {
            Period::Daily => self.today = 0,
            Period::Weekly => self.week = 0,
            Period::Monthly => self.month = 0,
        }
    }

    /// Counter value for a period.
    pub fn get(&self, period: Period) -> u64 {
        match period {
            Period::Daily => self.today,
            Period::Weekly => self.week,
            Period::Monthly => self.month,
        }
    }
}

/// One recorded membership event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Member the event concerns
    pub user_id: UserId,
    /// When the event was recorded
    pub timestamp: DateTime<Utc>,
}

/// FIFO event log that never exceeds its capacity.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use herald_core::{BoundedHistory, HistoryEntry, UserId};
///
/// let mut history = BoundedHistory::with_capacity(2);
/// for id in 1..=3 {
///     history.push(HistoryEntry { user_id: UserId(id), timestamp: Utc::now() });
/// }
/// assert_eq!(history.len(), 2);
/// assert_eq!(history.iter().next().map(|e| e.user_id), Some(UserId(2)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<HistoryEntry>", into = "Vec<HistoryEntry>")]
pub struct BoundedHistory {
    capacity: usize,
    entries: VecDeque<HistoryEntry>,
}

impl BoundedHistory {
    /// Empty history holding at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity.min(HISTORY_CAPACITY)),
        }
    }

    /// Append an entry, evicting the oldest ones past capacity.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are held.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for BoundedHistory {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl From<Vec<HistoryEntry>> for BoundedHistory {
    fn from(entries: Vec<HistoryEntry>) -> Self {
        let mut history = Self::default();
        for entry in entries {
            history.push(entry);
        }
        history
    }
}

impl From<BoundedHistory> for Vec<HistoryEntry> {
    fn from(history: BoundedHistory) -> Self {
        history.entries.into()
    }
}

/// Engagement statistics of one guild.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct GuildStats {
    /// Guild the statistics belong to
    guild_id: GuildId,
    /// Join counters
    #[builder(default)]
    joins: PeriodCounters,
    /// Leave counters
    #[builder(default)]
    leaves: PeriodCounters,
    /// Most recent joins
    #[builder(default)]
    join_history: BoundedHistory,
    /// Most recent leaves
    #[builder(default)]
    leave_history: BoundedHistory,
    /// When an event was last counted
    #[builder(default)]
    last_update: Option<DateTime<Utc>>,
    /// When the record was created
    created_at: DateTime<Utc>,
}

impl GuildStats {
    /// Zeroed statistics.
    pub fn new(guild_id: GuildId, created_at: DateTime<Utc>) -> Self {
        Self::with_history_capacity(guild_id, created_at, HISTORY_CAPACITY)
    }

    /// Zeroed statistics whose histories hold `capacity` entries.
    pub fn with_history_capacity(
        guild_id: GuildId,
        created_at: DateTime<Utc>,
        capacity: usize,
    ) -> Self {
        Self {
            guild_id,
            joins: PeriodCounters::default(),
            leaves: PeriodCounters::default(),
            join_history: BoundedHistory::with_capacity(capacity),
            leave_history: BoundedHistory::with_capacity(capacity),
            last_update: None,
            created_at,
        }
    }

    /// Creates a new stats builder.
    pub fn builder() -> GuildStatsBuilder {
        GuildStatsBuilder::default()
    }

    /// Counters for an event kind.
    pub fn counters(&self, kind: EventKind) -> &PeriodCounters {
        match kind {
            EventKind::Join => &self.joins,
            EventKind::Leave => &self.leaves,
        }
    }

    /// History for an event kind.
    pub fn history(&self, kind: EventKind) -> &BoundedHistory {
        match kind {
            EventKind::Join => &self.join_history,
            EventKind::Leave => &self.leave_history,
        }
    }

    /// Count one event and stamp `last_update`.
    pub fn increment(&mut self, kind: EventKind, at: DateTime<Utc>) {
        match kind {
            EventKind::Join => self.joins.increment(),
            EventKind::Leave => self.leaves.increment(),
        }
        self.last_update = Some(at);
    }

    /// Append an event to the bounded history.
    pub fn push_history(&mut self, kind: EventKind, entry: HistoryEntry) {
        match kind {
            EventKind::Join => self.join_history.push(entry),
            EventKind::Leave => self.leave_history.push(entry),
        }
    }

    /// Zero the join and leave counters of a period.
    ///
    /// `last_update` keeps the time of the last event, so a counter whose
    /// `last_update` precedes the current period start is known to be stale.
    pub fn reset(&mut self, period: Period) {
        self.joins.reset(period);
        self.leaves.reset(period);
    }

    /// Whether no event has been counted since `period_start`.
    pub fn is_stale(&self, period_start: DateTime<Utc>) -> bool {
        self.last_update.is_none_or(|at| at < period_start)
    }
}
