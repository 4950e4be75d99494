use crate::dates::{self, ROLLING_WINDOW_DAYS, date_key};
use crate::entries::{EntryIndex, binarize};
use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// The two window shapes stats are computed over. Their average and
/// standard-deviation semantics differ on purpose: a fixed year reports
/// the mean of observed values, the rolling window reports the fraction
/// of the last 365 days completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    FixedYear(i32),
    Rolling,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitStats {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_entries: u32,
    pub total: f64,
    pub average: f64,
    pub standard_deviation: f64,
}

/// Computes all statistics for one habit over `window`. Pure function of
/// its inputs; an empty entry set yields the all-zero struct. `as_of` is
/// the caller's single notion of "today".
pub fn calculate_stats(
    window: Window,
    index: &EntryIndex,
    goal: Option<f64>,
    as_of: NaiveDate,
) -> HabitStats {
    let days = match window {
        Window::FixedYear(year) => dates::year_day_keys(year),
        Window::Rolling => dates::rolling_day_keys(as_of),
    };
    let completed = |key: &str| {
        index
            .get(key)
            .is_some_and(|day| binarize(day.value, goal) == 1)
    };

    let longest_streak = longest_run(&days, &completed);
    let current_streak = run_ending_at(&days, as_of, &completed);

    let (total, total_entries, average, standard_deviation) = match window {
        Window::FixedYear(_) => {
            // Raw values of the days actually logged; streaks above use
            // the binarized view, totals use what was recorded.
            let values: Vec<f64> = days.iter().filter_map(|key| index.value(key)).collect();
            let count = values.len();
            let total: f64 = values.iter().sum();
            let average = if count > 0 { total / count as f64 } else { 0.0 };
            let variance = if count > 0 {
                values.iter().map(|v| (v - average).powi(2)).sum::<f64>() / count as f64
            } else {
                0.0
            };
            (total, count as u32, average, variance.sqrt())
        }
        Window::Rolling => {
            // Completed-day count over the full window; days without an
            // entry count as 0 toward the average.
            let entries = days.iter().filter(|key| index.get(key).is_some()).count();
            let total = days.iter().filter(|key| completed(key)).count() as f64;
            let p = total / ROLLING_WINDOW_DAYS as f64;
            (total, entries as u32, p, (p * (1.0 - p)).sqrt())
        }
    };

    HabitStats {
        current_streak,
        longest_streak,
        total_entries,
        total,
        average,
        standard_deviation,
    }
}

/// Longest run of consecutive completed days, one chronological scan.
pub fn longest_run<F>(days: &[String], completed: F) -> u32
where
    F: Fn(&str) -> bool,
{
    let mut longest = 0u32;
    let mut current = 0u32;
    for day in days {
        if completed(day) {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Run of completed days ending at `as_of`. A habit not yet logged today
/// anchors at yesterday instead; if neither day is completed the run is 0.
pub fn run_ending_at<F>(days: &[String], as_of: NaiveDate, completed: F) -> u32
where
    F: Fn(&str) -> bool,
{
    let today = date_key(as_of);
    let yesterday = date_key(as_of - Duration::days(1));
    let anchor = if completed(&today) {
        today
    } else if completed(&yesterday) {
        yesterday
    } else {
        return 0;
    };

    let Some(end) = days.iter().rposition(|day| *day == anchor) else {
        return 0;
    };
    let mut streak = 0;
    for day in days[..=end].iter().rev() {
        if completed(day) {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryRecord;

    fn date(raw: &str) -> NaiveDate {
        dates::parse_date_key(raw).unwrap()
    }

    fn entries(days: &[(&str, f64)]) -> Vec<EntryRecord> {
        days.iter()
            .map(|(day, value)| EntryRecord {
                id: format!("e-{day}"),
                date: day.to_string(),
                value: *value,
                journal: None,
            })
            .collect()
    }

    #[test]
    fn empty_input_yields_zero_stats() {
        let index = EntryIndex::build(&[]);
        let as_of = date("2025-06-15");
        for window in [Window::FixedYear(2025), Window::Rolling] {
            let stats = calculate_stats(window, &index, None, as_of);
            assert_eq!(stats, HabitStats::default());
        }
    }

    #[test]
    fn current_streak_anchors_at_yesterday() {
        // Five completed days ending yesterday; nothing logged today.
        let records = entries(&[
            ("2025-06-10", 1.0),
            ("2025-06-11", 1.0),
            ("2025-06-12", 1.0),
            ("2025-06-13", 1.0),
            ("2025-06-14", 1.0),
        ]);
        let index = EntryIndex::build(&records);
        let stats = calculate_stats(Window::FixedYear(2025), &index, None, date("2025-06-15"));
        assert_eq!(stats.current_streak, 5);
        assert_eq!(stats.longest_streak, 5);
    }

    #[test]
    fn gap_at_yesterday_breaks_current_streak() {
        // Same run but yesterday is empty: the earlier run no longer counts.
        let records = entries(&[
            ("2025-06-10", 1.0),
            ("2025-06-11", 1.0),
            ("2025-06-12", 1.0),
            ("2025-06-13", 1.0),
        ]);
        let index = EntryIndex::build(&records);
        let stats = calculate_stats(Window::FixedYear(2025), &index, None, date("2025-06-15"));
        assert_eq!(stats.current_streak, 0);
        assert_eq!(stats.longest_streak, 4);
    }

    #[test]
    fn value_zero_breaks_runs() {
        let records = entries(&[
            ("2025-06-12", 1.0),
            ("2025-06-13", 0.0),
            ("2025-06-14", 1.0),
            ("2025-06-15", 1.0),
        ]);
        let index = EntryIndex::build(&records);
        let stats = calculate_stats(Window::FixedYear(2025), &index, None, date("2025-06-15"));
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 2);
    }

    #[test]
    fn number_habit_streak_respects_goal() {
        let records = entries(&[("2025-06-14", 9999.0), ("2025-06-15", 10000.0)]);
        let index = EntryIndex::build(&records);
        let stats = calculate_stats(
            Window::FixedYear(2025),
            &index,
            Some(10000.0),
            date("2025-06-15"),
        );
        // 9999 misses the goal, so only today counts.
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.longest_streak, 1);
        assert_eq!(stats.total, 19999.0);
    }

    #[test]
    fn fixed_year_average_is_mean_of_observed_values() {
        let records = entries(&[
            ("2025-02-01", 2.0),
            ("2025-02-02", 4.0),
            ("2025-02-04", 6.0),
        ]);
        let index = EntryIndex::build(&records);
        let stats = calculate_stats(Window::FixedYear(2025), &index, None, date("2025-06-15"));
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.total, 12.0);
        assert_eq!(stats.average, 4.0);
        // Population std dev of {2, 4, 6}.
        assert!((stats.standard_deviation - (8.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn rolling_average_divides_by_window_length() {
        let records = entries(&[("2025-06-14", 1.0), ("2025-06-15", 1.0)]);
        let index = EntryIndex::build(&records);
        let stats = calculate_stats(Window::Rolling, &index, None, date("2025-06-15"));
        assert_eq!(stats.total, 2.0);
        assert_eq!(stats.total_entries, 2);
        let p = 2.0 / 365.0;
        assert!((stats.average - p).abs() < 1e-12);
        assert!((stats.standard_deviation - (p * (1.0 - p)).sqrt()).abs() < 1e-12);
        assert_eq!(stats.current_streak, 2);
    }

    #[test]
    fn entries_outside_window_are_ignored() {
        let records = entries(&[("2024-12-31", 5.0), ("2025-01-01", 3.0)]);
        let index = EntryIndex::build(&records);
        let stats = calculate_stats(Window::FixedYear(2025), &index, None, date("2025-06-15"));
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.total, 3.0);
    }

    #[test]
    fn longest_streak_bounds_current_streak() {
        let records = entries(&[
            ("2025-03-01", 1.0),
            ("2025-03-02", 1.0),
            ("2025-03-03", 1.0),
            ("2025-06-14", 1.0),
        ]);
        let index = EntryIndex::build(&records);
        let stats = calculate_stats(Window::FixedYear(2025), &index, None, date("2025-06-15"));
        assert!(stats.longest_streak >= stats.current_streak);
        assert_eq!(stats.longest_streak, 3);
        assert_eq!(stats.current_streak, 1);
    }

    #[test]
    fn stats_are_idempotent() {
        let records = entries(&[("2025-06-13", 2.0), ("2025-06-14", 3.0)]);
        let index = EntryIndex::build(&records);
        let as_of = date("2025-06-15");
        let first = calculate_stats(Window::Rolling, &index, Some(2.0), as_of);
        let second = calculate_stats(Window::Rolling, &index, Some(2.0), as_of);
        assert_eq!(first, second);
    }
}
