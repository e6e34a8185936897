use chrono::{DateTime, Duration, TimeZone, Utc};
use herald_core::{Clock, ManualClock, Period, SystemClock};
use herald_error::{HeraldResult, StoreError, StoreErrorKind};
use herald_scheduler::{Boundary, BoundaryScheduler, CalendarBoundary};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Fires every `step` of wall-clock time.
struct Every {
    step: Duration,
}

impl Boundary for Every {
    fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        Some(now + self.step)
    }
}

/// Records every boundary it hands out.
struct Recording<B> {
    inner: B,
    armed: Arc<Mutex<Vec<DateTime<Utc>>>>,
}

impl<B: Boundary> Boundary for Recording<B> {
    fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let next = self.inner.next_after(now);
        if let Some(next) = next {
            self.armed.lock().unwrap().push(next);
        }
        next
    }
}

fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

#[tokio::test]
async fn job_rearms_after_each_run() {
    let scheduler = BoundaryScheduler::new(system_clock());
    let runs = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&runs);
    scheduler
        .schedule(
            "tick",
            Every {
                step: Duration::milliseconds(20),
            },
            move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            },
        )
        .await;

    tokio::time::sleep(std::time::Duration::from_millis(150)).await;
    scheduler.shutdown().await;

    assert!(runs.load(Ordering::SeqCst) >= 2);
}

#[tokio::test]
async fn failing_job_keeps_its_schedule() {
    let scheduler = BoundaryScheduler::new(system_clock());
    let attempts = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&attempts);
    scheduler
        .schedule(
            "flaky",
            Every {
                step: Duration::milliseconds(20),
            },
            move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let result: HeraldResult<()> = Err(StoreError::new(
                        StoreErrorKind::Unavailable("store down".to_string()),
                    )
                    .into());
                    result
                }
            },
        )
        .await;

    tokio::time::sleep(std::time::Duration::from_millis(150)).await;
    scheduler.shutdown().await;

    assert!(attempts.load(Ordering::SeqCst) >= 2);
}

#[tokio::test]
async fn shutdown_lets_running_action_finish() {
    let scheduler = BoundaryScheduler::new(system_clock());
    let started = Arc::new(AtomicBool::new(false));
    let finished = Arc::new(AtomicBool::new(false));

    let (s, f) = (Arc::clone(&started), Arc::clone(&finished));
    scheduler
        .schedule(
            "slow",
            Every {
                step: Duration::milliseconds(10),
            },
            move || {
                let (s, f) = (Arc::clone(&s), Arc::clone(&f));
                async move {
                    s.store(true, Ordering::SeqCst);
                    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                    f.store(true, Ordering::SeqCst);
                    Ok(())
                }
            },
        )
        .await;

    while !started.load(Ordering::SeqCst) {
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    scheduler.shutdown().await;

    assert!(finished.load(Ordering::SeqCst));
    assert!(scheduler.job_names().await.is_empty());
}

#[tokio::test]
async fn shutdown_stops_waiting_jobs() {
    let scheduler = BoundaryScheduler::new(system_clock());
    let runs = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&runs);
    scheduler
        .schedule(
            "daily",
            CalendarBoundary::new(Period::Daily, Utc),
            move || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            },
        )
        .await;
    assert!(scheduler.is_scheduled("daily").await);

    tokio::time::timeout(std::time::Duration::from_secs(1), scheduler.shutdown())
        .await
        .unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missed_boundaries_are_skipped_not_replayed() {
    let start = Utc.with_ymd_and_hms(2024, 6, 3, 23, 59, 59).unwrap() + Duration::milliseconds(950);
    let clock = ManualClock::new(start);
    let scheduler = BoundaryScheduler::new(Arc::new(clock.clone()));
    let armed = Arc::new(Mutex::new(Vec::new()));
    let runs = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&runs);
    let jump = clock.clone();
    scheduler
        .schedule(
            "daily",
            Recording {
                inner: CalendarBoundary::new(Period::Daily, Utc),
                armed: Arc::clone(&armed),
            },
            move || {
                let counter = Arc::clone(&counter);
                let jump = jump.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    // Simulate the process stalling for three and a half days.
                    jump.set(Utc.with_ymd_and_hms(2024, 6, 7, 12, 0, 0).unwrap());
                    Ok(())
                }
            },
        )
        .await;

    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    scheduler.shutdown().await;

    assert_eq!(runs.load(Ordering::SeqCst), 1);
    let armed = armed.lock().unwrap().clone();
    assert_eq!(
        armed,
        vec![
            Utc.with_ymd_and_hms(2024, 6, 4, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 8, 0, 0, 0).unwrap(),
        ]
    );
}
