//! Monthly Histogram
//!
//! Entry counts for the nine calendar months ending with the current one.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::videos::VideoEntry;
use crate::core::{log_day, MONTH_KEY_FORMAT};

/// Number of months in the series.
pub const MONTHLY_WINDOW: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCount {
    /// `MM/YY`
    pub month: String,
    pub year: i32,
    /// 1..=12
    pub month_number: u32,
    pub count: usize,
}

/// Index of a calendar month counted from year 0.
fn month_index(year: i32, month: u32) -> i64 {
    i64::from(year) * 12 + i64::from(month) - 1
}

fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|first| first.format(MONTH_KEY_FORMAT).to_string())
        .unwrap_or_default()
}

/// Nine points, oldest first, zero-filled. Months are stepped on the calendar,
/// so a `today` of March 31 yields July..March with no skipped or repeated
/// month. Entries with an unparsable `log_date` are ignored.
pub fn monthly_series(videos: &[VideoEntry], today: NaiveDate) -> Vec<MonthCount> {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for day in videos.iter().filter_map(|v| log_day(&v.log_date)) {
        *counts.entry(month_index(day.year(), day.month())).or_default() += 1;
    }

    let current = month_index(today.year(), today.month());
    (0..MONTHLY_WINDOW as i64)
        .rev()
        .map(|back| {
            let index = current - back;
            let year = index.div_euclid(12) as i32;
            let month_number = (index.rem_euclid(12) + 1) as u32;
            MonthCount {
                month: month_label(year, month_number),
                year,
                month_number,
                count: counts.get(&index).copied().unwrap_or(0),
            }
        })
        .collect()
}
