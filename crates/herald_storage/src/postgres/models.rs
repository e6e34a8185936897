//! Row types and id conversions.

use super::schema::{guild_configs, guild_stats, guild_stats_history};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use herald_core::{GuildId, PeriodCounters, UserId};
use herald_error::{StoreError, StoreErrorKind};

/// Row of `guild_configs`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = guild_configs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ConfigRow {
    /// Guild id
    pub guild_id: i64,
    /// Serialized configuration
    pub document: serde_json::Value,
    /// Last write time
    pub updated_at: DateTime<Utc>,
}

/// Insertable `guild_configs` row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = guild_configs)]
pub struct NewConfigRow {
    /// Guild id
    pub guild_id: i64,
    /// Serialized configuration
    pub document: serde_json::Value,
    /// Write time
    pub updated_at: DateTime<Utc>,
}

/// Row of `guild_stats`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = guild_stats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StatsRow {
    /// Guild id
    pub guild_id: i64,
    /// Joins today
    pub joins_today: i64,
    /// Joins this week
    pub joins_week: i64,
    /// Joins this month
    pub joins_month: i64,
    /// Joins ever
    pub joins_total: i64,
    /// Leaves today
    pub leaves_today: i64,
    /// Leaves this week
    pub leaves_week: i64,
    /// Leaves this month
    pub leaves_month: i64,
    /// Leaves ever
    pub leaves_total: i64,
    /// Time of the last counted event
    pub last_update: Option<DateTime<Utc>>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl StatsRow {
    /// Join counters.
    pub fn joins(&self) -> PeriodCounters {
        counters(
            self.joins_today,
            self.joins_week,
            self.joins_month,
            self.joins_total,
        )
    }

    /// Leave counters.
    pub fn leaves(&self) -> PeriodCounters {
        counters(
            self.leaves_today,
            self.leaves_week,
            self.leaves_month,
            self.leaves_total,
        )
    }
}

fn counters(today: i64, week: i64, month: i64, total: i64) -> PeriodCounters {
    let clamp = |v: i64| u64::try_from(v).unwrap_or(0);
    PeriodCounters {
        today: clamp(today),
        week: clamp(week),
        month: clamp(month),
        total: clamp(total),
    }
}

/// Row of `guild_stats_history`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = guild_stats_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct HistoryRow {
    /// Sequence number
    pub id: i64,
    /// Guild id
    pub guild_id: i64,
    /// `join` or `leave`
    pub kind: String,
    /// Member id
    pub user_id: i64,
    /// Event time
    pub recorded_at: DateTime<Utc>,
}

/// Insertable `guild_stats_history` row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = guild_stats_history)]
pub struct NewHistoryRow {
    /// Guild id
    pub guild_id: i64,
    /// `join` or `leave`
    pub kind: String,
    /// Member id
    pub user_id: i64,
    /// Event time
    pub recorded_at: DateTime<Utc>,
}

/// Snowflake as a `BIGINT` column value.
pub fn to_db_id(id: u64) -> Result<i64, StoreError> {
    i64::try_from(id).map_err(|_| {
        StoreError::new(StoreErrorKind::Serialization(format!(
            "id {id} exceeds BIGINT range"
        )))
    })
}

/// `BIGINT` column value as a guild id.
pub fn guild_from_db(id: i64) -> Result<GuildId, StoreError> {
    u64::try_from(id).map(GuildId).map_err(|_| {
        StoreError::new(StoreErrorKind::Serialization(format!(
            "negative guild id {id}"
        )))
    })
}

/// `BIGINT` column value as a user id.
pub fn user_from_db(id: i64) -> Result<UserId, StoreError> {
    u64::try_from(id).map(UserId).map_err(|_| {
        StoreError::new(StoreErrorKind::Serialization(format!(
            "negative user id {id}"
        )))
    })
}
