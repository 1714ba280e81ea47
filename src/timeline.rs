// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Date utilities shared by journal, wearable and garden views

use chrono::{Duration, NaiveDate};

use crate::journal::JournalEntry;
use crate::wearable::ProcessedWearable;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Records that fall on a calendar day
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

impl Dated for JournalEntry {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for ProcessedWearable {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for NaiveDate {
    fn date(&self) -> NaiveDate {
        *self
    }
}

/// True for a valid `YYYY-MM-DD` calendar date
pub fn validate_date_format(s: &str) -> bool {
    NaiveDate::parse_from_str(s, DATE_FORMAT).is_ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// The last `days` days ending today, newest first
pub fn date_range(days: u32, today: NaiveDate) -> Vec<NaiveDate> {
    (0..i64::from(days))
        .map(|i| today - Duration::days(i))
        .collect()
}

/// Length of the run of consecutive days at the start of a newest-first,
/// duplicate-free list
pub(crate) fn consecutive_run(days: &[NaiveDate]) -> u32 {
    if days.is_empty() {
        return 0;
    }
    let steps = days
        .windows(2)
        .take_while(|w| w[0] - Duration::days(1) == w[1])
        .count();
    steps as u32 + 1
}

/// Consecutive journaling days ending today; 0 when nothing was logged today
pub fn streak_days<T: Dated>(items: &[T], today: NaiveDate) -> u32 {
    let mut days: Vec<NaiveDate> = items.iter().map(Dated::date).collect();
    days.sort_unstable_by(|a, b| b.cmp(a));
    days.dedup();

    match days.first() {
        Some(&latest) if latest == today => consecutive_run(&days),
        _ => 0,
    }
}

/// Items dated within `start..=end`
pub fn filter_by_date_range<T: Dated + Clone>(items: &[T], start: NaiveDate, end: NaiveDate) -> Vec<T> {
    items
        .iter()
        .filter(|item| (start..=end).contains(&item.date()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_validate_date_format() {
        assert!(validate_date_format("2024-02-29"));
        assert!(!validate_date_format("2023-02-29"));
        assert!(!validate_date_format("03/10/2024"));
        assert!(!validate_date_format(""));
    }

    #[test]
    fn test_format_and_range() {
        assert_eq!(format_date(day("2024-03-01")), "2024-03-01");
        let range = date_range(3, day("2024-03-01"));
        assert_eq!(range, [day("2024-03-01"), day("2024-02-29"), day("2024-02-28")]);
        assert!(date_range(0, day("2024-03-01")).is_empty());
    }

    #[test]
    fn test_streak_requires_today() {
        let dates = [day("2024-03-08"), day("2024-03-09")];
        assert_eq!(streak_days(&dates, day("2024-03-10")), 0);
        assert_eq!(streak_days::<NaiveDate>(&[], day("2024-03-10")), 0);
    }

    #[test]
    fn test_streak_counts_consecutive_days() {
        let dates = [
            day("2024-03-06"),
            day("2024-03-10"),
            day("2024-03-08"),
            day("2024-03-09"),
            day("2024-03-10"),
        ];
        assert_eq!(streak_days(&dates, day("2024-03-10")), 3);
    }

    #[test]
    fn test_filter_by_date_range() {
        let dates = [day("2024-03-01"), day("2024-03-05"), day("2024-03-10")];
        let filtered = filter_by_date_range(&dates, day("2024-03-02"), day("2024-03-10"));
        assert_eq!(filtered, [day("2024-03-05"), day("2024-03-10")]);
    }
}
