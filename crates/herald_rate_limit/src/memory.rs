//! Process-local window logs.

use crate::{WindowBackend, WindowOutcome};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use herald_error::RateLimitError;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

fn cutoff(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(window)
        .ok()
        .and_then(|w| now.checked_sub_signed(w))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Window logs kept in a mutex-guarded map.
#[derive(Debug, Default)]
pub struct InMemoryWindow {
    logs: Mutex<HashMap<String, VecDeque<DateTime<Utc>>>>,
}

impl InMemoryWindow {
    /// Empty window store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.logs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no key is tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl WindowBackend for InMemoryWindow {
    async fn check_and_record(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
        now: DateTime<Utc>,
    ) -> Result<WindowOutcome, RateLimitError> {
        let cutoff = cutoff(now, window);
        let mut logs = self.logs.lock().unwrap_or_else(PoisonError::into_inner);
        let log = logs.entry(key.to_string()).or_default();

        while log.front().is_some_and(|oldest| *oldest <= cutoff) {
            log.pop_front();
        }

        let allowed = log.len() < limit as usize;
        if allowed {
            log.push_back(now);
        }

        Ok(WindowOutcome {
            allowed,
            count: u32::try_from(log.len()).unwrap_or(u32::MAX),
            oldest: log.front().copied(),
        })
    }

    async fn purge_idle(
        &self,
        window: Duration,
        now: DateTime<Utc>,
    ) -> Result<usize, RateLimitError> {
        let cutoff = cutoff(now, window);
        let mut logs = self.logs.lock().unwrap_or_else(PoisonError::into_inner);
        let before = logs.len();
        logs.retain(|_, log| log.back().is_some_and(|newest| *newest > cutoff));
        let purged = before - logs.len();
        debug!(purged, remaining = logs.len(), "Purged idle rate limit windows");
        Ok(purged)
    }

    async fn tracked_keys(&self) -> Option<usize> {
        Some(self.len())
    }
}
