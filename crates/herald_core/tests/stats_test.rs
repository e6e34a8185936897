use chrono::{Duration, TimeZone, Utc};
use herald_core::{
    BoundedHistory, EventKind, GuildId, GuildStats, HISTORY_CAPACITY, HistoryEntry, Period,
    UserId,
};

fn entry(id: u64) -> HistoryEntry {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    HistoryEntry {
        user_id: UserId(id),
        timestamp: base + Duration::seconds(id as i64),
    }
}

#[test]
fn history_evicts_exactly_the_oldest_entry() {
    let mut history = BoundedHistory::default();
    for id in 0..HISTORY_CAPACITY as u64 {
        history.push(entry(id));
    }
    assert_eq!(history.len(), HISTORY_CAPACITY);

    history.push(entry(HISTORY_CAPACITY as u64));

    assert_eq!(history.len(), HISTORY_CAPACITY);
    let ids: Vec<u64> = history.iter().map(|e| e.user_id.get()).collect();
    assert_eq!(ids.first(), Some(&1));
    assert_eq!(ids.last(), Some(&(HISTORY_CAPACITY as u64)));
}

#[test]
fn history_deserialization_truncates_oversized_lists() {
    let entries: Vec<HistoryEntry> = (0..1005).map(entry).collect();
    let json = serde_json::to_string(&entries).unwrap();
    let history: BoundedHistory = serde_json::from_str(&json).unwrap();
    assert_eq!(history.len(), HISTORY_CAPACITY);
    assert_eq!(history.iter().next().map(|e| e.user_id), Some(UserId(5)));
}

#[test]
fn increment_counts_every_period() {
    let now = Utc::now();
    let mut stats = GuildStats::new(GuildId(1), now);
    stats.increment(EventKind::Join, now);
    stats.increment(EventKind::Join, now);
    stats.increment(EventKind::Leave, now);

    let joins = stats.counters(EventKind::Join);
    assert_eq!((joins.today, joins.week, joins.month, joins.total), (2, 2, 2, 2));
    assert_eq!(stats.counters(EventKind::Leave).total, 1);
    assert_eq!(*stats.last_update(), Some(now));
}

#[test]
fn reset_only_touches_its_period() {
    let now = Utc::now();
    let mut stats = GuildStats::new(GuildId(1), now);
    for _ in 0..3 {
        stats.increment(EventKind::Join, now);
    }

    stats.reset(Period::Daily);
    let joins = stats.counters(EventKind::Join);
    assert_eq!((joins.today, joins.week, joins.month, joins.total), (0, 3, 3, 3));

    stats.reset(Period::Weekly);
    stats.reset(Period::Monthly);
    let joins = stats.counters(EventKind::Join);
    assert_eq!((joins.today, joins.week, joins.month, joins.total), (0, 0, 0, 3));
}

#[test]
fn builder_restores_persisted_stats() {
    let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let stats = GuildStats::builder()
        .guild_id(GuildId(3))
        .created_at(created)
        .last_update(Some(created))
        .build()
        .unwrap();
    assert_eq!(*stats.guild_id(), GuildId(3));
    assert_eq!(stats.joins().total, 0);
    assert!(stats.join_history().is_empty());
}
