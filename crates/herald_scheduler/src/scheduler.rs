//! Boundary-driven job runner.

use crate::Boundary;
use chrono::{DateTime, Utc};
use herald_core::Clock;
use herald_error::HeraldResult;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

/// Runs named jobs at calendar boundaries until shut down.
///
/// Each job computes its next boundary from the current time, sleeps until
/// then, runs its action and re-arms. A failed action is logged and the job
/// keeps its schedule. Shutdown stops all waiting jobs; an action already
/// running is allowed to finish.
#[derive(Debug)]
pub struct BoundaryScheduler {
    clock: Arc<dyn Clock>,
    jobs: Arc<RwLock<HashMap<String, JoinHandle<()>>>>,
    shutdown: watch::Sender<bool>,
}

impl BoundaryScheduler {
    /// Scheduler reading the current time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            clock,
            jobs: Arc::new(RwLock::new(HashMap::new())),
            shutdown,
        }
    }

    /// Start a job. A job already registered under `name` is replaced.
    #[instrument(skip(self, boundary, action))]
    pub async fn schedule<B, F, Fut>(&self, name: &str, boundary: B, action: F)
    where
        B: Boundary + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HeraldResult<()>> + Send + 'static,
    {
        let job = name.to_string();
        let clock = Arc::clone(&self.clock);
        let mut stop = self.shutdown.subscribe();

        let handle = tokio::spawn(async move {
            let mut last_fired: Option<DateTime<Utc>> = None;
            loop {
                if *stop.borrow() {
                    break;
                }
                let now = clock.now();
                let reference = last_fired.map_or(now, |fired| fired.max(now));
                let Some(next) = boundary.next_after(reference) else {
                    error!(job = %job, "No further boundary, stopping job");
                    break;
                };
                let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
                debug!(job = %job, next = %next, wait_secs = wait.as_secs(), "Job armed");

                tokio::select! {
                    _ = tokio::time::sleep(wait) => {}
                    changed = stop.changed() => {
                        if changed.is_err() || *stop.borrow() {
                            break;
                        }
                        continue;
                    }
                }

                last_fired = Some(next);
                info!(job = %job, boundary = %next, "Running scheduled job");
                if let Err(e) = action().await {
                    error!(job = %job, error = ?e, "Scheduled job failed");
                }
            }
            debug!(job = %job, "Job stopped");
        });

        let mut jobs = self.jobs.write().await;
        if let Some(old) = jobs.insert(name.to_string(), handle) {
            warn!("Replacing existing job");
            old.abort();
        }
        info!("Job scheduled");
    }

    /// Whether a job is registered under `name`.
    pub async fn is_scheduled(&self, name: &str) -> bool {
        self.jobs.read().await.contains_key(name)
    }

    /// Names of registered jobs.
    pub async fn job_names(&self) -> Vec<String> {
        self.jobs.read().await.keys().cloned().collect()
    }

    /// Stop arming new runs and wait for every job to wind down.
    ///
    /// Jobs blocked in their action finish it first.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        self.shutdown.send_replace(true);
        let jobs: Vec<_> = self.jobs.write().await.drain().collect();
        for (name, handle) in jobs {
            if let Err(e) = handle.await {
                warn!(job = %name, error = %e, "Job ended abnormally");
            }
        }
        info!("Scheduler shut down");
    }
}
