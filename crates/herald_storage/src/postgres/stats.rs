//! PostgreSQL statistics store.

use super::models::{
    HistoryRow, NewHistoryRow, StatsRow, guild_from_db, to_db_id, user_from_db,
};
use super::schema::{guild_stats, guild_stats_history};
use super::{PgPool, with_connection};
use crate::{StatsStore, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use herald_core::{
    BoundedHistory, EventKind, GuildId, GuildStats, HISTORY_CAPACITY, HistoryEntry, Period,
};
use herald_error::{StoreError, StoreErrorKind};
use tracing::{debug, instrument};

/// Counters in `guild_stats`, history in `guild_stats_history`.
///
/// Increments are single `UPDATE ... SET col = col + 1` statements, so
/// concurrent events never lose counts.
#[derive(Debug, Clone)]
pub struct PgStatsStore {
    pool: PgPool,
    history_capacity: i64,
}

impl PgStatsStore {
    /// Store using `pool` with the standard history capacity.
    pub fn new(pool: PgPool) -> Self {
        Self::with_history_capacity(pool, HISTORY_CAPACITY)
    }

    /// Store using `pool` whose histories hold `capacity` entries.
    pub fn with_history_capacity(pool: PgPool, capacity: usize) -> Self {
        Self {
            pool,
            history_capacity: i64::try_from(capacity).unwrap_or(i64::MAX),
        }
    }
}

fn ensure_row(conn: &mut PgConnection, guild: i64, now: DateTime<Utc>) -> QueryResult<usize> {
    diesel::insert_into(guild_stats::table)
        .values((
            guild_stats::guild_id.eq(guild),
            guild_stats::created_at.eq(now),
        ))
        .on_conflict_do_nothing()
        .execute(conn)
}

fn reset_counters(
    conn: &mut PgConnection,
    period: Period,
    stale_before: Option<DateTime<Utc>>,
) -> QueryResult<usize> {
    use guild_stats::dsl as s;

    macro_rules! zero {
        ($joins:ident, $leaves:ident) => {
            match stale_before {
                Some(before) => diesel::update(
                    s::guild_stats.filter(s::last_update.lt(before).or(s::last_update.is_null())),
                )
                .set((s::$joins.eq(0), s::$leaves.eq(0)))
                .execute(conn),
                None => diesel::update(s::guild_stats)
                    .set((s::$joins.eq(0), s::$leaves.eq(0)))
                    .execute(conn),
            }
        };
    }

    match period {
        Period::Daily => zero!(joins_today, leaves_today),
        Period::Weekly => zero!(joins_week, leaves_week),
        Period::Monthly => zero!(joins_month, leaves_month),
    }
}

fn load_history(
    conn: &mut PgConnection,
    guild: i64,
    kind: EventKind,
    capacity: i64,
) -> StoreResult<BoundedHistory> {
    let mut rows = guild_stats_history::table
        .filter(guild_stats_history::guild_id.eq(guild))
        .filter(guild_stats_history::kind.eq(kind.to_string()))
        .order(guild_stats_history::id.desc())
        .limit(capacity)
        .select(HistoryRow::as_select())
        .load(conn)?;
    rows.reverse();

    let mut history = BoundedHistory::with_capacity(usize::try_from(capacity).unwrap_or(usize::MAX));
    for row in rows {
        history.push(HistoryEntry {
            user_id: user_from_db(row.user_id)?,
            timestamp: row.recorded_at,
        });
    }
    Ok(history)
}

fn assemble(conn: &mut PgConnection, row: StatsRow, capacity: i64) -> StoreResult<GuildStats> {
    let join_history = load_history(conn, row.guild_id, EventKind::Join, capacity)?;
    let leave_history = load_history(conn, row.guild_id, EventKind::Leave, capacity)?;
    GuildStats::builder()
        .guild_id(guild_from_db(row.guild_id)?)
        .joins(row.joins())
        .leaves(row.leaves())
        .join_history(join_history)
        .leave_history(leave_history)
        .last_update(row.last_update)
        .created_at(row.created_at)
        .build()
        .map_err(|e| StoreError::new(StoreErrorKind::Serialization(e.to_string())))
}

#[async_trait]
impl StatsStore for PgStatsStore {
    #[instrument(skip(self), fields(guild_id = %guild_id))]
    async fn ensure(&self, guild_id: GuildId, now: DateTime<Utc>) -> StoreResult<()> {
        let guild = to_db_id(guild_id.get())?;
        with_connection(&self.pool, move |conn| {
            ensure_row(conn, guild, now)?;
            Ok(())
        })
        .await
    }

    #[instrument(skip(self), fields(guild_id = %guild_id))]
    async fn increment(
        &self,
        guild_id: GuildId,
        kind: EventKind,
        at: DateTime<Utc>,
    ) -> StoreResult<()> {
        use guild_stats::dsl as s;

        let guild = to_db_id(guild_id.get())?;
        with_connection(&self.pool, move |conn| {
            ensure_row(conn, guild, at)?;
            let target = diesel::update(s::guild_stats.filter(s::guild_id.eq(guild)));
            let updated = match kind {
                EventKind::Join => target
                    .set((
                        s::joins_today.eq(s::joins_today + 1),
                        s::joins_week.eq(s::joins_week + 1),
                        s::joins_month.eq(s::joins_month + 1),
                        s::joins_total.eq(s::joins_total + 1),
                        s::last_update.eq(Some(at)),
                    ))
                    .execute(conn)?,
                EventKind::Leave => target
                    .set((
                        s::leaves_today.eq(s::leaves_today + 1),
                        s::leaves_week.eq(s::leaves_week + 1),
                        s::leaves_month.eq(s::leaves_month + 1),
                        s::leaves_total.eq(s::leaves_total + 1),
                        s::last_update.eq(Some(at)),
                    ))
                    .execute(conn)?,
            };
            debug!(updated, "Counters incremented");
            Ok(())
        })
        .await
    }

    #[instrument(skip(self, entry), fields(guild_id = %guild_id))]
    async fn push_history(
        &self,
        guild_id: GuildId,
        kind: EventKind,
        entry: HistoryEntry,
    ) -> StoreResult<()> {
        let guild = to_db_id(guild_id.get())?;
        let user = to_db_id(entry.user_id.get())?;
        let capacity = self.history_capacity;
        with_connection(&self.pool, move |conn| {
            conn.transaction::<_, StoreError, _>(|conn| {
                ensure_row(conn, guild, entry.timestamp)?;
                diesel::insert_into(guild_stats_history::table)
                    .values(&NewHistoryRow {
                        guild_id: guild,
                        kind: kind.to_string(),
                        user_id: user,
                        recorded_at: entry.timestamp,
                    })
                    .execute(conn)?;

                let newest_evicted = guild_stats_history::table
                    .filter(guild_stats_history::guild_id.eq(guild))
                    .filter(guild_stats_history::kind.eq(kind.to_string()))
                    .order(guild_stats_history::id.desc())
                    .offset(capacity)
                    .select(guild_stats_history::id)
                    .first::<i64>(conn)
                    .optional()?;

                if let Some(cutoff) = newest_evicted {
                    let evicted = diesel::delete(
                        guild_stats_history::table
                            .filter(guild_stats_history::guild_id.eq(guild))
                            .filter(guild_stats_history::kind.eq(kind.to_string()))
                            .filter(guild_stats_history::id.le(cutoff)),
                    )
                    .execute(conn)?;
                    debug!(evicted, "Evicted oldest history entries");
                }
                Ok(())
            })
        })
        .await
    }

    #[instrument(skip(self), fields(guild_id = %guild_id))]
    async fn get(&self, guild_id: GuildId) -> StoreResult<Option<GuildStats>> {
        let guild = to_db_id(guild_id.get())?;
        let capacity = self.history_capacity;
        with_connection(&self.pool, move |conn| {
            let row = guild_stats::table
                .filter(guild_stats::guild_id.eq(guild))
                .select(StatsRow::as_select())
                .first(conn)
                .optional()?;
            row.map(|row| assemble(conn, row, capacity)).transpose()
        })
        .await
    }

    #[instrument(skip(self))]
    async fn reset_period(
        &self,
        period: Period,
        stale_before: Option<DateTime<Utc>>,
    ) -> StoreResult<u64> {
        with_connection(&self.pool, move |conn| {
            let reset = reset_counters(conn, period, stale_before)?;
            debug!(reset, "Reset period counters");
            Ok(u64::try_from(reset).unwrap_or(u64::MAX))
        })
        .await
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> StoreResult<Vec<GuildStats>> {
        let capacity = self.history_capacity;
        with_connection(&self.pool, move |conn| {
            let rows = guild_stats::table
                .select(StatsRow::as_select())
                .load(conn)?;
            rows.into_iter()
                .map(|row| assemble(conn, row, capacity))
                .collect()
        })
        .await
    }
}
