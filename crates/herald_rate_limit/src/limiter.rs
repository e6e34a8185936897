//! Command gate.

use crate::{RateLimitConfig, WindowBackend};
use chrono::{DateTime, TimeDelta, Utc};
use herald_core::{Clock, SystemClock, UserId};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

/// `remaining` reported when the limiter fails open.
pub const FAIL_OPEN_REMAINING: u32 = 999;

/// Shortest interval between idle-log purges.
pub const MIN_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Verdict for one command invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the invocation must be rejected
    pub limited: bool,
    /// Calls left in the current window
    pub remaining: u32,
    /// When the oldest in-window call expires
    pub reset_at: Option<DateTime<Utc>>,
}

impl RateLimitDecision {
    /// Allowed without consulting a backend.
    pub fn fail_open() -> Self {
        Self {
            limited: false,
            remaining: FAIL_OPEN_REMAINING,
            reset_at: None,
        }
    }

    /// Whole seconds until `reset_at`, rounded up.
    pub fn retry_after_secs(&self, now: DateTime<Utc>) -> u64 {
        self.reset_at
            .map(|reset| {
                let millis = (reset - now).num_milliseconds().max(0);
                u64::try_from(millis).unwrap_or(0).div_ceil(1000)
            })
            .unwrap_or(0)
    }
}

/// Sliding-window limiter keyed by user and command.
///
/// Without a backend every call is allowed. Backend failures are logged and
/// the call is allowed, so an outage never blocks commands.
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    backend: Option<Arc<dyn WindowBackend>>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .field("has_backend", &self.backend.is_some())
            .finish()
    }
}

impl RateLimiter {
    /// Limiter with no backend, using the wall clock.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            backend: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `backend` to store window logs.
    pub fn with_backend(mut self, backend: Arc<dyn WindowBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Read the current time from `clock`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Active limits.
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// How often idle logs should be purged: the longest configured window,
    /// but never more often than [`MIN_PURGE_INTERVAL`].
    pub fn purge_interval(&self) -> Duration {
        self.config.longest_window().max(MIN_PURGE_INTERVAL)
    }

    /// Drop logs that no longer hold an entry inside any window.
    ///
    /// Failures are logged and reported as nothing purged.
    #[instrument(skip(self))]
    pub async fn purge_idle(&self) -> usize {
        let Some(backend) = &self.backend else {
            return 0;
        };
        match backend
            .purge_idle(self.config.longest_window(), self.clock.now())
            .await
        {
            Ok(purged) => purged,
            Err(e) => {
                warn!(error = %e, "Failed to purge idle rate limit windows");
                0
            }
        }
    }

    /// Logs held by the backend, if it can count them.
    pub async fn tracked_keys(&self) -> Option<usize> {
        match &self.backend {
            Some(backend) => backend.tracked_keys().await,
            None => Some(0),
        }
    }

    fn key(command: &str, user_id: UserId) -> String {
        format!("ratelimit:{user_id}:{command}")
    }

    /// Consume one call of `command` for `user_id` if the window allows it.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn check_and_consume(&self, command: &str, user_id: UserId) -> RateLimitDecision {
        let Some(backend) = &self.backend else {
            debug!("No rate limit backend, allowing");
            return RateLimitDecision::fail_open();
        };

        let limit = self.config.for_command(command);
        let now = self.clock.now();
        let outcome = match backend
            .check_and_record(&Self::key(command, user_id), *limit.limit(), limit.window(), now)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Rate limit backend failed, allowing");
                return RateLimitDecision::fail_open();
            }
        };

        let window = TimeDelta::from_std(limit.window()).unwrap_or(TimeDelta::MAX);
        let reset_at = outcome.oldest.and_then(|oldest| oldest.checked_add_signed(window));
        let decision = RateLimitDecision {
            limited: !outcome.allowed,
            remaining: if outcome.allowed {
                limit.limit().saturating_sub(outcome.count)
            } else {
                0
            },
            reset_at,
        };

        if decision.limited {
            warn!(
                retry_after_secs = decision.retry_after_secs(now),
                "Command rate limited"
            );
        } else {
            debug!(remaining = decision.remaining, "Command allowed");
        }
        decision
    }
}
