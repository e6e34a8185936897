//! Component wiring and lifecycle.

use crate::{EventDispatcher, HeraldSettings};
use chrono::Local;
use herald_cache::ConfigCache;
use herald_core::{Clock, SystemClock};
use herald_error::HeraldResult;
use herald_rate_limit::{InMemoryWindow, RateLimiter, WindowBackend};
use herald_resolver::ConfigResolver;
use herald_scheduler::{BoundaryScheduler, IntervalBoundary};
use herald_stats::StatsAggregator;
use herald_storage::{ConfigStore, InMemoryStatsStore, StatsStore};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Name of the job that drops idle rate limit windows.
pub const RATE_LIMIT_PURGE_JOB: &str = "rate-limit-purge";

/// Every Herald component, built from settings.
///
/// # Example
///
/// ```
/// use herald::{Herald, HeraldSettings};
/// use herald_core::{GuildId, UserId};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let herald = Herald::build(HeraldSettings::default()).await.unwrap();
/// herald.start().await;
///
/// let notice = herald
///     .dispatcher()
///     .handle_member_join(GuildId(1), UserId(2))
///     .await;
/// assert!(notice.deliveries.is_empty());
///
/// herald.shutdown().await;
/// # });
/// ```
#[derive(Debug)]
pub struct Herald {
    settings: HeraldSettings,
    resolver: ConfigResolver,
    stats: StatsAggregator,
    limiter: RateLimiter,
    scheduler: BoundaryScheduler,
    clock: Arc<dyn Clock>,
}

struct Stores {
    config: Arc<dyn ConfigStore>,
    stats: Arc<dyn StatsStore>,
}

#[cfg(feature = "database")]
async fn persistent_stores(settings: &HeraldSettings) -> HeraldResult<Stores> {
    use herald_error::ConfigError;
    use herald_storage::TimeoutStore;
    use herald_storage::postgres::{self, PgConfigStore, PgStatsStore};

    let url = settings.persistence.database_url.as_deref().ok_or_else(|| {
        ConfigError::new("persistence.database_url is required when persistence is enabled")
    })?;
    let pool = postgres::connect(url, settings.persistence.pool_size)?;
    postgres::run_migrations(&pool).await?;

    let timeout = settings.persistence.store_timeout();
    Ok(Stores {
        config: Arc::new(TimeoutStore::new(PgConfigStore::new(pool.clone()), timeout)),
        stats: Arc::new(TimeoutStore::new(
            PgStatsStore::with_history_capacity(pool, settings.stats.history_capacity),
            timeout,
        )),
    })
}

#[cfg(not(feature = "database"))]
async fn persistent_stores(_settings: &HeraldSettings) -> HeraldResult<Stores> {
    Err(herald_error::ConfigError::new(
        "persistence is enabled but herald was built without the `database` feature",
    )
    .into())
}

#[cfg(feature = "redis")]
async fn window_backend(settings: &HeraldSettings) -> Arc<dyn WindowBackend> {
    if let Some(url) = &settings.rate_limits.redis_url {
        match herald_rate_limit::RedisWindow::connect(url).await {
            Ok(window) => return Arc::new(window),
            Err(e) => warn!(error = %e, "Redis unavailable, keeping rate limits in memory"),
        }
    }
    Arc::new(InMemoryWindow::new())
}

#[cfg(not(feature = "redis"))]
async fn window_backend(settings: &HeraldSettings) -> Arc<dyn WindowBackend> {
    if settings.rate_limits.redis_url.is_some() {
        warn!("redis_url is set but herald was built without the `redis` feature");
    }
    Arc::new(InMemoryWindow::new())
}

impl Herald {
    /// Build every component using the wall clock.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence is enabled and the database cannot be
    /// reached or migrated.
    pub async fn build(settings: HeraldSettings) -> HeraldResult<Self> {
        Self::build_with_clock(settings, Arc::new(SystemClock)).await
    }

    /// Build every component reading time from `clock`.
    ///
    /// # Errors
    ///
    /// See [`build`](Self::build).
    #[instrument(skip_all, fields(persistence = settings.persistence.enabled))]
    pub async fn build_with_clock(
        settings: HeraldSettings,
        clock: Arc<dyn Clock>,
    ) -> HeraldResult<Self> {
        let cache = ConfigCache::new();
        let fallback = InMemoryStatsStore::with_history_capacity(settings.stats.history_capacity);

        let stores = if settings.persistence.enabled {
            persistent_stores(&settings).await?
        } else {
            info!("Persistence disabled, keeping state in memory");
            Stores {
                config: Arc::new(cache.clone()),
                stats: Arc::new(InMemoryStatsStore::with_history_capacity(
                    settings.stats.history_capacity,
                )),
            }
        };

        let resolver = ConfigResolver::new(stores.config, cache);
        let stats = StatsAggregator::new(stores.stats)
            .with_fallback(fallback)
            .with_clock(Arc::clone(&clock));
        let limiter = RateLimiter::new(settings.rate_limits.to_config())
            .with_backend(window_backend(&settings).await)
            .with_clock(Arc::clone(&clock));
        let scheduler = BoundaryScheduler::new(Arc::clone(&clock));

        Ok(Self {
            settings,
            resolver,
            stats,
            limiter,
            scheduler,
            clock,
        })
    }

    /// Warm the configuration cache, apply rollovers missed while stopped,
    /// then arm the rollover jobs and the rate limit purge.
    ///
    /// Failures are logged; the components work without either step.
    #[instrument(skip(self))]
    pub async fn start(&self) {
        self.resolver.warm().await;
        if let Err(e) = self
            .stats
            .reconcile_stale_periods(self.clock.now(), &Local)
            .await
        {
            warn!(error = %e, "Failed to reconcile stale statistics periods");
        }
        self.stats.schedule_rollovers(&self.scheduler, Local).await;
        self.schedule_rate_limit_purge().await;
        info!("Herald started");
    }

    async fn schedule_rate_limit_purge(&self) {
        let limiter = self.limiter.clone();
        self.scheduler
            .schedule(
                RATE_LIMIT_PURGE_JOB,
                IntervalBoundary::new(self.limiter.purge_interval()),
                move || {
                    let limiter = limiter.clone();
                    async move {
                        let purged = limiter.purge_idle().await;
                        let tracked = limiter.tracked_keys().await;
                        debug!(purged, ?tracked, "Rate limit windows purged");
                        Ok(())
                    }
                },
            )
            .await;
    }

    /// Stop the scheduled jobs, letting a running one finish.
    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;
        info!("Herald stopped");
    }

    /// Event entry points over these components.
    pub fn dispatcher(&self) -> EventDispatcher {
        EventDispatcher::new(
            self.resolver.clone(),
            self.stats.clone(),
            self.limiter.clone(),
            Arc::clone(&self.clock),
        )
    }

    /// Settings the components were built from.
    pub fn settings(&self) -> &HeraldSettings {
        &self.settings
    }

    /// Configuration resolver.
    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    /// Statistics aggregator.
    pub fn stats(&self) -> &StatsAggregator {
        &self.stats
    }

    /// Command rate limiter.
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Scheduler running rollovers and purges.
    pub fn scheduler(&self) -> &BoundaryScheduler {
        &self.scheduler
    }
}
