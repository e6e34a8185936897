use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use herald_core::{EventKind, GuildConfig, GuildId, HistoryEntry, Period, UserId};
use herald_error::StoreErrorKind;
use herald_storage::{
    ConfigStore, ConfigWrite, InMemoryStatsStore, StatsStore, StoreResult, TimeoutStore,
};
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_increments_are_not_lost() {
    let store = Arc::new(InMemoryStatsStore::new());
    let guild = GuildId(1);
    store.ensure(guild, Utc::now()).await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..100 {
        let store = Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            store.increment(guild, EventKind::Join, Utc::now()).await.unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let stats = store.get(guild).await.unwrap().unwrap();
    assert_eq!(stats.joins().total, 100);
    assert_eq!(stats.joins().today, 100);
}

#[tokio::test]
async fn ensure_does_not_overwrite_existing_stats() {
    let store = InMemoryStatsStore::new();
    let guild = GuildId(5);
    store.ensure(guild, Utc::now()).await.unwrap();
    store.increment(guild, EventKind::Leave, Utc::now()).await.unwrap();
    store.ensure(guild, Utc::now()).await.unwrap();

    assert_eq!(store.get(guild).await.unwrap().unwrap().leaves().total, 1);
}

#[tokio::test]
async fn history_capacity_is_respected() {
    let store = InMemoryStatsStore::with_history_capacity(3);
    let guild = GuildId(1);
    for id in 0..5 {
        store
            .push_history(
                guild,
                EventKind::Join,
                HistoryEntry {
                    user_id: UserId(id),
                    timestamp: Utc::now(),
                },
            )
            .await
            .unwrap();
    }
    let stats = store.get(guild).await.unwrap().unwrap();
    let ids: Vec<_> = stats.join_history().iter().map(|e| e.user_id).collect();
    assert_eq!(ids, vec![UserId(2), UserId(3), UserId(4)]);
    assert!(stats.leave_history().is_empty());
}

#[tokio::test]
async fn stale_reset_skips_recently_updated_guilds() {
    let store = InMemoryStatsStore::new();
    let week_start = Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap();

    store
        .increment(GuildId(1), EventKind::Join, week_start - Duration::hours(2))
        .await
        .unwrap();
    store
        .increment(GuildId(2), EventKind::Join, week_start + Duration::hours(2))
        .await
        .unwrap();

    let reset = store
        .reset_period(Period::Weekly, Some(week_start))
        .await
        .unwrap();

    assert_eq!(reset, 1);
    let stale = store.get(GuildId(1)).await.unwrap().unwrap();
    let fresh = store.get(GuildId(2)).await.unwrap().unwrap();
    assert_eq!((stale.joins().week, stale.joins().total), (0, 1));
    assert_eq!(fresh.joins().week, 1);
}

#[tokio::test]
async fn unconditional_reset_touches_every_guild() {
    let store = InMemoryStatsStore::new();
    for id in 1..=3 {
        store
            .increment(GuildId(id), EventKind::Leave, Utc::now())
            .await
            .unwrap();
    }
    assert_eq!(store.reset_period(Period::Daily, None).await.unwrap(), 3);
    for stats in store.list_all().await.unwrap() {
        assert_eq!(stats.leaves().today, 0);
        assert_eq!(stats.leaves().month, 1);
    }
}

#[derive(Debug)]
struct HangingStore;

#[async_trait]
impl ConfigStore for HangingStore {
    async fn get(&self, _guild_id: GuildId) -> StoreResult<Option<GuildConfig>> {
        std::future::pending().await
    }

    async fn save(&self, _guild_id: GuildId, _write: ConfigWrite) -> StoreResult<GuildConfig> {
        std::future::pending().await
    }

    async fn list_all(&self) -> StoreResult<Vec<(GuildId, GuildConfig)>> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn timeout_store_fails_hung_calls() {
    let store = TimeoutStore::new(HangingStore, std::time::Duration::from_millis(20));
    let err = store.get(GuildId(1)).await.unwrap_err();
    assert_eq!(err.kind, StoreErrorKind::Timeout(20));
    assert!(err.is_timeout());
}
