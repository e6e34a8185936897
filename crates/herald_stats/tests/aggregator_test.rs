use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use herald_core::{
    EventKind, GuildId, GuildStats, HistoryEntry, ManualClock, Period, UserId,
};
use herald_error::{StoreError, StoreErrorKind};
use herald_scheduler::BoundaryScheduler;
use herald_stats::{MAX_ACTIVITY_DAYS, RecordOutcome, StatsAggregator, rollover_job_name};
use herald_storage::{InMemoryStatsStore, StatsStore, StoreResult};
use std::sync::Arc;

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn aggregator(start: DateTime<Utc>) -> (StatsAggregator, InMemoryStatsStore, ManualClock) {
    let store = InMemoryStatsStore::new();
    let clock = ManualClock::new(start);
    let aggregator =
        StatsAggregator::new(Arc::new(store.clone())).with_clock(Arc::new(clock.clone()));
    (aggregator, store, clock)
}

struct DownStore;

fn down() -> StoreError {
    StoreError::new(StoreErrorKind::Unavailable("database offline".to_string()))
}

#[async_trait]
impl StatsStore for DownStore {
    async fn ensure(&self, _guild_id: GuildId, _now: DateTime<Utc>) -> StoreResult<()> {
        Err(down())
    }

    async fn increment(
        &self,
        _guild_id: GuildId,
        _kind: EventKind,
        _at: DateTime<Utc>,
    ) -> StoreResult<()> {
        Err(down())
    }

    async fn push_history(
        &self,
        _guild_id: GuildId,
        _kind: EventKind,
        _entry: HistoryEntry,
    ) -> StoreResult<()> {
        Err(down())
    }

    async fn get(&self, _guild_id: GuildId) -> StoreResult<Option<GuildStats>> {
        Err(down())
    }

    async fn reset_period(
        &self,
        _period: Period,
        _stale_before: Option<DateTime<Utc>>,
    ) -> StoreResult<u64> {
        Err(down())
    }

    async fn list_all(&self) -> StoreResult<Vec<GuildStats>> {
        Err(down())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_joins_are_all_counted() {
    let (aggregator, store, _clock) = aggregator(at(2024, 6, 5, 12));

    let tasks: Vec<_> = (0..200)
        .map(|i| {
            let aggregator = aggregator.clone();
            tokio::spawn(async move { aggregator.record_join(GuildId(1), UserId(i)).await })
        })
        .collect();
    for outcome in futures::future::join_all(tasks).await {
        assert_eq!(outcome.unwrap(), RecordOutcome::Persisted);
    }

    let stats = store.get(GuildId(1)).await.unwrap().unwrap();
    assert_eq!(stats.joins().total, 200);
    assert_eq!(stats.joins().today, 200);
    assert_eq!(stats.join_history().len(), 200);
    assert_eq!(stats.leaves().total, 0);
}

#[tokio::test]
async fn rollovers_only_touch_their_period() {
    let (aggregator, _store, _clock) = aggregator(at(2024, 6, 5, 12));
    for user in 0..3 {
        aggregator.record_join(GuildId(1), UserId(user)).await;
    }
    aggregator.record_leave(GuildId(1), UserId(0)).await;

    aggregator.reset(Period::Daily).await.unwrap();
    let stats = aggregator.stats(GuildId(1)).await.unwrap();
    assert_eq!(stats.joins().today, 0);
    assert_eq!(stats.joins().week, 3);
    assert_eq!(stats.leaves().today, 0);
    assert_eq!(stats.leaves().week, 1);

    aggregator.reset(Period::Weekly).await.unwrap();
    let stats = aggregator.stats(GuildId(1)).await.unwrap();
    assert_eq!(stats.joins().week, 0);
    assert_eq!(stats.joins().month, 3);

    aggregator.reset(Period::Monthly).await.unwrap();
    let stats = aggregator.stats(GuildId(1)).await.unwrap();
    assert_eq!(stats.joins().month, 0);
    assert_eq!(stats.joins().total, 3);
    assert_eq!(stats.leaves().total, 1);
}

#[tokio::test]
async fn store_outage_records_in_memory() {
    let clock = ManualClock::new(at(2024, 6, 5, 12));
    let aggregator = StatsAggregator::new(Arc::new(DownStore)).with_clock(Arc::new(clock));

    assert_eq!(
        aggregator.record_join(GuildId(9), UserId(1)).await,
        RecordOutcome::Fallback
    );
    assert_eq!(
        aggregator.record_leave(GuildId(9), UserId(1)).await,
        RecordOutcome::Fallback
    );

    let stats = aggregator.stats(GuildId(9)).await.unwrap();
    assert_eq!(stats.joins().total, 1);
    assert_eq!(stats.leaves().total, 1);
    assert_eq!(aggregator.fallback().len().await, 1);

    assert!(aggregator.reset(Period::Daily).await.is_err());
    let stats = aggregator.stats(GuildId(9)).await.unwrap();
    assert_eq!(stats.joins().today, 0);
}

#[tokio::test]
async fn reconcile_resets_periods_missed_while_down() {
    // Wednesday
    let (aggregator, _store, clock) = aggregator(at(2024, 6, 5, 12));
    aggregator.record_join(GuildId(1), UserId(1)).await;

    // Thursday of the following week, same month.
    let now = at(2024, 6, 13, 9);
    clock.set(now);
    aggregator.record_join(GuildId(2), UserId(2)).await;

    aggregator.reconcile_stale_periods(now, &Utc).await.unwrap();

    let idle = aggregator.stats(GuildId(1)).await.unwrap();
    assert_eq!(idle.joins().today, 0);
    assert_eq!(idle.joins().week, 0);
    assert_eq!(idle.joins().month, 1);
    assert_eq!(idle.joins().total, 1);

    let active = aggregator.stats(GuildId(2)).await.unwrap();
    assert_eq!(active.joins().today, 1);
    assert_eq!(active.joins().week, 1);

    // Running it again changes nothing.
    aggregator.reconcile_stale_periods(now, &Utc).await.unwrap();
    let idle_again = aggregator.stats(GuildId(1)).await.unwrap();
    assert_eq!(idle_again.joins().month, 1);
}

#[tokio::test]
async fn activity_buckets_by_day() {
    let (aggregator, _store, clock) = aggregator(at(2024, 6, 3, 10));
    aggregator.record_join(GuildId(1), UserId(1)).await;
    clock.advance(Duration::days(2));
    aggregator.record_join(GuildId(1), UserId(2)).await;
    aggregator.record_join(GuildId(1), UserId(3)).await;
    aggregator.record_leave(GuildId(1), UserId(1)).await;

    let activity = aggregator
        .activity(GuildId(1), 3, at(2024, 6, 5, 23), &Utc)
        .await;

    let dates: Vec<_> = activity.iter().map(|d| d.date).collect();
    assert_eq!(
        dates,
        vec![
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 4).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(),
        ]
    );
    assert_eq!((activity[0].joins, activity[0].leaves), (1, 0));
    assert_eq!((activity[1].joins, activity[1].leaves), (0, 0));
    assert_eq!((activity[2].joins, activity[2].leaves), (2, 1));

    let unknown = aggregator
        .activity(GuildId(2), 7, at(2024, 6, 5, 23), &Utc)
        .await;
    assert_eq!(unknown.len(), 7);
    assert!(unknown.iter().all(|d| d.joins == 0 && d.leaves == 0));
}

#[tokio::test]
async fn rollover_jobs_are_armed_per_period() {
    let clock = ManualClock::new(at(2024, 6, 5, 12));
    let (aggregator, _store, _) = aggregator(at(2024, 6, 5, 12));
    let scheduler = BoundaryScheduler::new(Arc::new(clock));

    aggregator.schedule_rollovers(&scheduler, Utc).await;

    for period in [Period::Daily, Period::Weekly, Period::Monthly] {
        assert!(scheduler.is_scheduled(&rollover_job_name(period)).await);
    }
    scheduler.shutdown().await;
    assert!(scheduler.job_names().await.is_empty());
}

#[tokio::test]
async fn activity_span_is_capped() {
    let (aggregator, _store, _clock) = aggregator(at(2024, 6, 3, 10));
    aggregator.record_join(GuildId(1), UserId(1)).await;

    let activity = aggregator
        .activity(GuildId(1), u32::MAX, at(2024, 6, 3, 12), &Utc)
        .await;

    assert_eq!(activity.len(), MAX_ACTIVITY_DAYS as usize);
    let last = activity.last().unwrap();
    assert_eq!(last.date, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
    assert_eq!(last.joins, 1);
}
