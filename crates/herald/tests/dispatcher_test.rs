use chrono::{TimeZone, Utc};
use herald::{CommandGate, EventDispatcher, Herald, HeraldSettings, RATE_LIMIT_PURGE_JOB};
use herald_cache::ConfigCache;
use herald_core::{
    ChannelId, ChannelOverride, EmbedPatch, GuildId, ManualClock, MessageMode, RoleId,
    SectionKind, UserId,
};
use herald_rate_limit::{InMemoryWindow, RateLimitConfig, RateLimiter};
use herald_resolver::ConfigResolver;
use herald_stats::{RecordOutcome, StatsAggregator};
use herald_storage::InMemoryStatsStore;
use std::sync::Arc;

fn dispatcher(clock: &ManualClock) -> (EventDispatcher, ConfigResolver, StatsAggregator) {
    let cache = ConfigCache::new();
    let resolver = ConfigResolver::new(Arc::new(cache.clone()), cache);
    let stats = StatsAggregator::new(Arc::new(InMemoryStatsStore::new()))
        .with_clock(Arc::new(clock.clone()));
    let limiter = RateLimiter::new(RateLimitConfig::default())
        .with_backend(Arc::new(InMemoryWindow::new()))
        .with_clock(Arc::new(clock.clone()));
    let dispatcher = EventDispatcher::new(
        resolver.clone(),
        stats.clone(),
        limiter,
        Arc::new(clock.clone()),
    );
    (dispatcher, resolver, stats)
}

fn clock() -> ManualClock {
    ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 10, 18, 0, 0).unwrap())
}

#[tokio::test]
async fn join_resolves_each_channel_and_counts() {
    let clock = clock();
    let (dispatcher, resolver, stats) = dispatcher(&clock);
    let guild = GuildId(1);
    resolver
        .add_channel(guild, SectionKind::Welcome, ChannelOverride::new(ChannelId(10)))
        .await
        .unwrap();
    resolver
        .add_channel(
            guild,
            SectionKind::Welcome,
            ChannelOverride::new(ChannelId(11))
                .with_mode(MessageMode::Text)
                .with_embed(EmbedPatch::title("Hi")),
        )
        .await
        .unwrap();
    resolver.add_auto_role(guild, RoleId(5)).await.unwrap();

    let notice = dispatcher.handle_member_join(guild, UserId(99)).await;

    assert_eq!(notice.recorded, RecordOutcome::Persisted);
    assert_eq!(notice.deliveries.len(), 2);
    assert_eq!(notice.deliveries[0].channel_id, Some(ChannelId(10)));
    assert_eq!(notice.deliveries[0].mode, MessageMode::Embed);
    assert_eq!(notice.deliveries[1].mode, MessageMode::Text);
    assert_eq!(notice.deliveries[1].embed.title, "Hi");
    assert_eq!(notice.auto_roles, vec![RoleId(5)]);

    let counted = stats.stats(guild).await.unwrap();
    assert_eq!(counted.joins().total, 1);
}

#[tokio::test]
async fn disabled_leave_sends_nothing_but_still_counts() {
    let clock = clock();
    let (dispatcher, resolver, stats) = dispatcher(&clock);
    let guild = GuildId(2);
    resolver
        .add_channel(guild, SectionKind::Leave, ChannelOverride::new(ChannelId(1)))
        .await
        .unwrap();
    resolver
        .set_enabled(guild, SectionKind::Leave, false)
        .await
        .unwrap();

    let notice = dispatcher.handle_member_leave(guild, UserId(3)).await;
    assert!(notice.deliveries.is_empty());
    assert!(notice.auto_roles.is_empty());
    assert_eq!(stats.stats(guild).await.unwrap().leaves().total, 1);
}

#[tokio::test]
async fn commands_are_throttled_per_category() {
    let clock = clock();
    let (dispatcher, _, _) = dispatcher(&clock);

    for remaining in [2, 1, 0] {
        assert_eq!(
            dispatcher.handle_command("admin", UserId(1)).await,
            CommandGate::Proceed { remaining }
        );
    }
    clock.advance(chrono::Duration::milliseconds(1500));
    assert_eq!(
        dispatcher.handle_command("admin", UserId(1)).await,
        CommandGate::Throttled {
            retry_after_secs: 59
        }
    );
}

#[tokio::test]
async fn preview_uses_channel_override() {
    let clock = clock();
    let (dispatcher, resolver, _) = dispatcher(&clock);
    resolver
        .add_channel(
            GuildId(4),
            SectionKind::Welcome,
            ChannelOverride::new(ChannelId(8)).with_text("hey {user}"),
        )
        .await
        .unwrap();

    let section = dispatcher
        .preview(GuildId(4), SectionKind::Welcome, Some(ChannelId(8)))
        .await;
    assert_eq!(section.text, "hey {user}");
}

#[tokio::test]
async fn runtime_starts_and_stops_in_memory() {
    let clock = clock();
    let herald = Herald::build_with_clock(HeraldSettings::default(), Arc::new(clock.clone()))
        .await
        .unwrap();
    herald.start().await;
    assert_eq!(herald.scheduler().job_names().await.len(), 4);
    assert!(herald.scheduler().is_scheduled(RATE_LIMIT_PURGE_JOB).await);

    let notice = herald
        .dispatcher()
        .handle_member_join(GuildId(1), UserId(1))
        .await;
    assert_eq!(notice.recorded, RecordOutcome::Persisted);
    assert_eq!(herald.resolver().cache().len().await, 1);

    herald.shutdown().await;
    assert!(herald.scheduler().job_names().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn runtime_purges_idle_rate_limit_windows() {
    let clock = clock();
    let herald = Herald::build_with_clock(HeraldSettings::default(), Arc::new(clock.clone()))
        .await
        .unwrap();
    herald.start().await;
    let dispatcher = herald.dispatcher();

    for user in 0..1000 {
        dispatcher.handle_command("help", UserId(user)).await;
    }
    assert_eq!(herald.limiter().tracked_keys().await, Some(1000));

    clock.advance(chrono::Duration::hours(24));
    tokio::time::sleep(herald.limiter().purge_interval() + std::time::Duration::from_secs(1))
        .await;
    assert_eq!(herald.limiter().tracked_keys().await, Some(0));

    dispatcher.handle_command("help", UserId(1)).await;
    assert_eq!(herald.limiter().tracked_keys().await, Some(1));

    herald.shutdown().await;
}

#[tokio::test]
async fn persistence_without_database_support_is_rejected() {
    if cfg!(feature = "database") {
        return;
    }
    let mut settings = HeraldSettings::default();
    settings.persistence.enabled = true;
    assert!(Herald::build(settings).await.is_err());
}
