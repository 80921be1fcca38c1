// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Which weekdays the shop is closed. Closed days never hold records and are
/// skipped by every aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessCalendar {
    excluded: Vec<Weekday>,
}

impl Default for BusinessCalendar {
    fn default() -> Self {
        BusinessCalendar {
            excluded: vec![Weekday::Sun],
        }
    }
}

impl BusinessCalendar {
    pub fn new(excluded: Vec<Weekday>) -> Self {
        let mut excluded = excluded;
        excluded.sort_by_key(|w| w.num_days_from_monday());
        excluded.dedup();
        BusinessCalendar { excluded }
    }

    /// Parses a comma separated weekday list such as `sun` or `sat, sun`.
    /// An empty string means the shop opens every day.
    pub fn parse(list: &str) -> Result<Self> {
        let mut days = Vec::new();
        for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let day = part
                .parse::<Weekday>()
                .map_err(|_| anyhow!("Invalid weekday '{}'", part))?;
            days.push(day);
        }
        Ok(BusinessCalendar::new(days))
    }

    pub fn excluded(&self) -> &[Weekday] {
        &self.excluded
    }

    pub fn is_business_day(&self, d: NaiveDate) -> bool {
        !self.excluded.contains(&d.weekday())
    }

    pub fn business_days(&self, from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> + '_ {
        iter_dates(from, to).filter(move |d| self.is_business_day(*d))
    }

    pub fn to_setting(&self) -> String {
        self.excluded
            .iter()
            .map(|w| w.to_string().to_lowercase())
            .collect::<Vec<_>>()
            .join(",")
    }
}

pub fn iter_dates(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    from.iter_days().take_while(move |d| *d <= to)
}

/// Returns the range with its bounds in ascending order.
pub fn ordered(from: NaiveDate, to: NaiveDate) -> (NaiveDate, NaiveDate) {
    if from > to { (to, from) } else { (from, to) }
}

pub fn month_range(d: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = d.with_day(1).unwrap_or(d);
    let next_month = if d.month() == 12 {
        NaiveDate::from_ymd_opt(d.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(d.year(), d.month() + 1, 1)
    };
    let last = next_month.and_then(|n| n.pred_opt()).unwrap_or(d);
    (first, last)
}

/// The period of equal length ending the day before `from`.
pub fn previous_period(from: NaiveDate, to: NaiveDate) -> (NaiveDate, NaiveDate) {
    let len = (to - from).num_days() + 1;
    let prev_to = from - Duration::days(1);
    let prev_from = prev_to - Duration::days(len - 1);
    (prev_from, prev_to)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn previous_period_is_adjacent_and_same_length() {
        assert_eq!(
            previous_period(d("2025-03-01"), d("2025-03-10")),
            (d("2025-02-19"), d("2025-02-28"))
        );
        assert_eq!(
            previous_period(d("2025-01-01"), d("2025-01-01")),
            (d("2024-12-31"), d("2024-12-31"))
        );
    }

    #[test]
    fn month_range_handles_december_and_leap_years() {
        assert_eq!(month_range(d("2025-12-15")), (d("2025-12-01"), d("2025-12-31")));
        assert_eq!(month_range(d("2024-02-10")), (d("2024-02-01"), d("2024-02-29")));
    }

    #[test]
    fn default_calendar_skips_sundays() {
        let cal = BusinessCalendar::default();
        // 2025-03-02 and 2025-03-09 are Sundays
        let days: Vec<_> = cal.business_days(d("2025-03-01"), d("2025-03-10")).collect();
        assert_eq!(days.len(), 8);
        assert!(!days.contains(&d("2025-03-02")));
        assert!(!days.contains(&d("2025-03-09")));
    }

    #[test]
    fn parse_weekday_list() {
        let cal = BusinessCalendar::parse("sun, Saturday").unwrap();
        assert_eq!(cal.excluded(), &[Weekday::Sat, Weekday::Sun]);
        assert_eq!(cal.to_setting(), "sat,sun");
        assert!(BusinessCalendar::parse("").unwrap().excluded().is_empty());
        assert!(BusinessCalendar::parse("someday").is_err());
    }
}
