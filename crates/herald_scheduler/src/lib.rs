//! Calendar-boundary job scheduling.
//!
//! A job waits until the next boundary of its [`Boundary`], runs once, then
//! recomputes the following boundary from the current time and waits again.
//! Boundaries that pass while the process is down or busy are skipped, never
//! replayed.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod boundary;
mod scheduler;

pub use boundary::{
    Boundary, CalendarBoundary, IntervalBoundary, current_period_start, next_local_midnight,
    next_month_start, next_period_start, next_week_start, period_start,
};
pub use scheduler::BoundaryScheduler;
