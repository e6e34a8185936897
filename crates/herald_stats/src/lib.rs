//! Member engagement statistics for Herald.
//!
//! [`StatsAggregator`] counts joins and leaves per guild into daily, weekly,
//! monthly and all-time counters, keeps a bounded history of recent events,
//! and zeroes each period's counters at its calendar boundary through the
//! [`BoundaryScheduler`](herald_scheduler::BoundaryScheduler).
//!
//! Rollovers that were missed while the process was down are applied once at
//! startup by [`StatsAggregator::reconcile_stale_periods`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod activity;
mod aggregator;

pub use activity::DailyActivity;
pub use aggregator::{MAX_ACTIVITY_DAYS, RecordOutcome, StatsAggregator, rollover_job_name};
