//! Calendar period boundaries.

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeDelta, TimeZone, Utc};
use herald_core::Period;

/// Computes when a job should next fire.
pub trait Boundary: Send + Sync {
    /// First boundary strictly after `now`, or `None` if there is none.
    fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>>;
}

/// First day of the period containing `date`. Weeks start on Sunday.
fn start_date(period: Period, date: NaiveDate) -> Option<NaiveDate> {
    match period {
        Period::Daily => Some(date),
        Period::Weekly => {
            date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_sunday())))
        }
        Period::Monthly => date.with_day(1),
    }
}

/// First day of the period after the one starting on `start`.
fn following_date(period: Period, start: NaiveDate) -> Option<NaiveDate> {
    match period {
        Period::Daily => start.checked_add_days(Days::new(1)),
        Period::Weekly => start.checked_add_days(Days::new(7)),
        Period::Monthly => {
            if start.month() == 12 {
                NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
            }
        }
    }
}

/// Local midnight of `date` as a UTC instant.
///
/// When midnight falls in a daylight-saving gap the first valid instant
/// after the gap is used; when it is ambiguous the earlier one is used.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    let resolved = tz.from_local_datetime(&midnight).earliest().or_else(|| {
        (1..=4)
            .filter_map(|hours| midnight.checked_add_signed(TimeDelta::minutes(30 * hours)))
            .find_map(|candidate| tz.from_local_datetime(&candidate).earliest())
    })?;
    Some(resolved.with_timezone(&Utc))
}

/// Start of the period containing `now`, in the calendar of `tz`.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use herald_core::Period;
/// use herald_scheduler::period_start;
///
/// // Wednesday 2024-06-05 belongs to the week starting Sunday 2024-06-02.
/// let now = Utc.with_ymd_and_hms(2024, 6, 5, 15, 30, 0).unwrap();
/// let start = period_start(Period::Weekly, now, &Utc).unwrap();
/// assert_eq!(start, Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap());
/// ```
pub fn period_start<Tz: TimeZone>(
    period: Period,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Option<DateTime<Utc>> {
    let today = now.with_timezone(tz).date_naive();
    let start = start_date(period, today)?;
    let instant = local_midnight(tz, start)?;
    if instant <= now {
        Some(instant)
    } else {
        // Midnight shifted past `now` by a DST gap; the period began earlier.
        let previous = start_date(period, start.pred_opt()?)?;
        local_midnight(tz, previous)
    }
}

/// Start of the period following the one containing `now`.
///
/// Always strictly after `now`.
pub fn next_period_start<Tz: TimeZone>(
    period: Period,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Option<DateTime<Utc>> {
    let today = now.with_timezone(tz).date_naive();
    let mut start = start_date(period, today)?;
    loop {
        start = following_date(period, start)?;
        let instant = local_midnight(tz, start)?;
        if instant > now {
            return Some(instant);
        }
    }
}

/// Next local midnight strictly after `now`.
pub fn next_local_midnight<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> Option<DateTime<Utc>> {
    next_period_start(Period::Daily, now, tz)
}

/// Next Sunday 00:00 strictly after `now`.
pub fn next_week_start<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> Option<DateTime<Utc>> {
    next_period_start(Period::Weekly, now, tz)
}

/// Next first-of-month 00:00 strictly after `now`.
pub fn next_month_start<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> Option<DateTime<Utc>> {
    next_period_start(Period::Monthly, now, tz)
}

/// Start of the current `period` in local time.
///
/// Alias of [`period_start`] named for reconciliation call sites.
pub fn current_period_start<Tz: TimeZone>(
    period: Period,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Option<DateTime<Utc>> {
    period_start(period, now, tz)
}

/// Boundary a fixed interval after the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalBoundary {
    every: TimeDelta,
}

impl IntervalBoundary {
    /// Boundary `every` after each reference instant.
    pub fn new(every: std::time::Duration) -> Self {
        Self {
            every: TimeDelta::from_std(every).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Interval between runs.
    pub fn every(&self) -> TimeDelta {
        self.every
    }
}

impl Boundary for IntervalBoundary {
    fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.every <= TimeDelta::zero() {
            return None;
        }
        now.checked_add_signed(self.every)
    }
}

/// Boundary at the start of every calendar period in a time zone.
#[derive(Debug, Clone)]
pub struct CalendarBoundary<Tz> {
    period: Period,
    tz: Tz,
}

impl<Tz: TimeZone> CalendarBoundary<Tz> {
    /// Boundary at each start of `period` in `tz`.
    pub fn new(period: Period, tz: Tz) -> Self {
        Self { period, tz }
    }

    /// Period this boundary marks.
    pub fn period(&self) -> Period {
        self.period
    }
}

impl<Tz> Boundary for CalendarBoundary<Tz>
where
    Tz: TimeZone + Send + Sync,
    Tz::Offset: Send + Sync,
{
    fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        next_period_start(self.period, now, &self.tz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn next_midnight_is_strictly_after_now() {
        let at_midnight = utc(2024, 3, 10, 0, 0);
        assert_eq!(
            next_period_start(Period::Daily, at_midnight, &Utc),
            Some(utc(2024, 3, 11, 0, 0))
        );
    }

    #[test]
    fn saturday_rolls_to_sunday() {
        // 2024-06-08 is a Saturday.
        let saturday_night = utc(2024, 6, 8, 23, 59);
        assert_eq!(
            next_period_start(Period::Weekly, saturday_night, &Utc),
            Some(utc(2024, 6, 9, 0, 0))
        );
        let sunday = utc(2024, 6, 9, 0, 0);
        assert_eq!(period_start(Period::Weekly, sunday, &Utc), Some(sunday));
    }

    #[test]
    fn december_rolls_into_next_year() {
        assert_eq!(
            next_period_start(Period::Monthly, utc(2024, 12, 31, 12, 0), &Utc),
            Some(utc(2025, 1, 1, 0, 0))
        );
        assert_eq!(
            period_start(Period::Monthly, utc(2024, 2, 29, 8, 0), &Utc),
            Some(utc(2024, 2, 1, 0, 0))
        );
    }

    #[test]
    fn boundaries_follow_local_calendar() {
        let east = FixedOffset::east_opt(9 * 3600).unwrap();
        // 15:30 UTC is 00:30 on the next local day in UTC+9.
        let now = utc(2024, 6, 5, 15, 30);
        assert_eq!(
            period_start(Period::Daily, now, &east),
            Some(utc(2024, 6, 5, 15, 0))
        );
        assert_eq!(
            next_period_start(Period::Daily, now, &east),
            Some(utc(2024, 6, 6, 15, 0))
        );
    }

    #[test]
    fn interval_boundary_steps_from_reference() {
        let every = IntervalBoundary::new(std::time::Duration::from_secs(90));
        assert_eq!(
            every.next_after(utc(2024, 6, 5, 10, 0)),
            Some(utc(2024, 6, 5, 10, 1) + TimeDelta::seconds(30))
        );
        assert_eq!(
            IntervalBoundary::new(std::time::Duration::ZERO).next_after(utc(2024, 6, 5, 10, 0)),
            None
        );
    }
}
