//! Window storage abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use herald_error::RateLimitError;
use std::time::Duration;

/// Result of one check-and-record against a window log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowOutcome {
    /// Whether the call was recorded
    pub allowed: bool,
    /// Entries in the window after the call
    pub count: u32,
    /// Oldest entry still in the window
    pub oldest: Option<DateTime<Utc>>,
}

/// Storage for sliding-window logs.
///
/// `check_and_record` must be atomic per key: prune entries at or before
/// `now - window`, then record `now` only if fewer than `limit` remain.
#[async_trait]
pub trait WindowBackend: Send + Sync {
    /// Prune, count and conditionally record in one step.
    async fn check_and_record(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
        now: DateTime<Utc>,
    ) -> Result<WindowOutcome, RateLimitError>;

    /// Drop every log with no entry after `now - window`, returning how many
    /// were dropped.
    ///
    /// Backends whose keys expire on their own keep the default.
    async fn purge_idle(
        &self,
        _window: Duration,
        _now: DateTime<Utc>,
    ) -> Result<usize, RateLimitError> {
        Ok(0)
    }

    /// Number of logs held, when the backend can count them cheaply.
    async fn tracked_keys(&self) -> Option<usize> {
        None
    }
}
