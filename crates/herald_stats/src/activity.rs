//! Per-day activity buckets.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Joins and leaves counted on one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyActivity {
    /// Local calendar day
    pub date: NaiveDate,
    /// Members who joined that day
    pub joins: u32,
    /// Members who left that day
    pub leaves: u32,
}

impl DailyActivity {
    /// Day with no activity.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            joins: 0,
            leaves: 0,
        }
    }
}
