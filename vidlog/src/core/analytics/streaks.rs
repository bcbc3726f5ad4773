//! Streak Detection
//!
//! Entries are grouped by the calendar day of their `log_date`. A streak is a
//! run of day-groups exactly one day apart.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::log_day;
use crate::core::videos::VideoEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayGroup {
    pub day: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    /// Entries logged across the run
    pub videos: usize,
    /// Calendar days in the run
    pub days: usize,
}

impl Streak {
    fn start(group: &DayGroup) -> Self {
        Self {
            videos: group.count,
            days: 1,
        }
    }

    fn extend(&mut self, group: &DayGroup) {
        self.videos += group.count;
        self.days += 1;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streaks {
    pub current: Streak,
    pub longest: Streak,
}

/// Day-groups, most recent day first. Unparsable log dates are skipped.
pub fn day_groups(videos: &[VideoEntry]) -> Vec<DayGroup> {
    let mut by_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for video in videos {
        if let Some(day) = log_day(&video.log_date) {
            *by_day.entry(day).or_default() += 1;
        }
    }

    by_day
        .into_iter()
        .rev()
        .map(|(day, count)| DayGroup { day, count })
        .collect()
}

fn consecutive(newer: &DayGroup, older: &DayGroup) -> bool {
    (newer.day - older.day).num_days() == 1
}

/// Current and longest streak as of `today`.
///
/// The current streak counts only if the latest day-group is today or
/// yesterday (a future-dated group also counts). The longest streak is the run
/// with the most entries; on a tie the more recent run is kept.
pub fn streaks(videos: &[VideoEntry], today: NaiveDate) -> Streaks {
    let groups = day_groups(videos);
    let Some(latest) = groups.first() else {
        return Streaks::default();
    };

    let mut current = Streak::default();
    if (today - latest.day).num_days() <= 1 {
        current = Streak::start(latest);
        for pair in groups.windows(2) {
            if !consecutive(&pair[0], &pair[1]) {
                break;
            }
            current.extend(&pair[1]);
        }
    }

    let mut longest = Streak::default();
    let mut run = Streak::start(latest);
    for pair in groups.windows(2) {
        if consecutive(&pair[0], &pair[1]) {
            run.extend(&pair[1]);
        } else {
            if run.videos > longest.videos {
                longest = run;
            }
            run = Streak::start(&pair[1]);
        }
    }
    if run.videos > longest.videos {
        longest = run;
    }

    Streaks { current, longest }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analytics::test_support::video;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn logged(dates: &[&str]) -> Vec<VideoEntry> {
        dates
            .iter()
            .enumerate()
            .map(|(i, d)| video(&format!("v{i}"), d, 0.0, "c"))
            .collect()
    }

    fn gapped_january() -> Vec<VideoEntry> {
        logged(&[
            "2025-01-01 9:00 AM",
            "2025-01-02 10:00 AM",
            "2025-01-02 11:30 PM",
            "2025-01-04 7:15 PM",
        ])
    }

    #[test]
    fn test_empty_input_has_no_streaks() {
        assert_eq!(streaks(&[], day(2025, 1, 5)), Streaks::default());
    }

    #[test]
    fn test_day_groups_collapse_same_day() {
        let groups = day_groups(&gapped_january());

        assert_eq!(
            groups,
            vec![
                DayGroup { day: day(2025, 1, 4), count: 1 },
                DayGroup { day: day(2025, 1, 2), count: 2 },
                DayGroup { day: day(2025, 1, 1), count: 1 },
            ]
        );
    }

    #[test]
    fn test_gap_breaks_current_but_not_longest() {
        let result = streaks(&gapped_january(), day(2025, 1, 5));

        assert_eq!(result.longest, Streak { videos: 3, days: 2 });
        assert_eq!(result.current, Streak { videos: 1, days: 1 });
    }

    #[test]
    fn test_current_streak_starting_today() {
        let videos = logged(&["2025-01-03 1:00 PM", "2025-01-04 1:00 PM", "2025-01-05 8:00 AM"]);

        let result = streaks(&videos, day(2025, 1, 5));

        assert_eq!(result.current, Streak { videos: 3, days: 3 });
        assert_eq!(result.longest, Streak { videos: 3, days: 3 });
    }

    #[test]
    fn test_stale_latest_day_has_no_current_streak() {
        let result = streaks(&gapped_january(), day(2025, 1, 6));

        assert_eq!(result.current, Streak::default());
        assert_eq!(result.longest, Streak { videos: 3, days: 2 });
    }

    #[test]
    fn test_future_dated_entry_counts_as_current() {
        let videos = logged(&["2025-01-07 1:00 PM", "2025-01-06 1:00 PM"]);

        let result = streaks(&videos, day(2025, 1, 5));

        assert_eq!(result.current, Streak { videos: 2, days: 2 });
    }

    #[test]
    fn test_longest_keeps_more_recent_run_on_tie() {
        let videos = logged(&[
            "2025-01-01 1:00 PM",
            "2025-01-02 1:00 PM",
            "2025-01-10 1:00 PM",
            "2025-01-10 2:00 PM",
        ]);

        let result = streaks(&videos, day(2025, 2, 1));

        // Both runs hold two entries; the Jan 10 run is seen first.
        assert_eq!(result.longest, Streak { videos: 2, days: 1 });
    }

    #[test]
    fn test_invalid_dates_are_ignored() {
        let videos = logged(&["garbage", "", "2025-01-05 1:00 PM"]);

        let result = streaks(&videos, day(2025, 1, 5));

        assert_eq!(result.current, Streak { videos: 1, days: 1 });
    }
}
