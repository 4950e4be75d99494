use crate::dates;
use crate::entries::EntryIndex;
use crate::stats;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// Completion-rate threshold for a day to count toward aggregate streaks.
const STREAK_RATE_THRESHOLD: f64 = 50.0;

/// One habit's contribution to the dashboard overview.
pub struct HabitWindow {
    pub goal_value: Option<f64>,
    pub index: EntryIndex,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRollup {
    pub date: String,
    pub total_value: f64,
    pub completed_habits: u32,
    pub total_habits: u32,
    pub completion_rate: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_habits: u32,
    pub total_entries: u32,
    pub days_with_activity: u32,
    pub average_completion_rate: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub daily_data: Vec<DailyRollup>,
}

/// Folds a user's habit set into the per-day completion timeline for the
/// rolling 365-day window ending `as_of`. Every day bucket exists up
/// front, so a day nobody logged is an explicit zero, not a missing row.
pub fn build_overview(habits: &[HabitWindow], as_of: NaiveDate) -> Overview {
    let days = dates::rolling_day_keys(as_of);
    let total_habits = habits.len() as u32;

    let mut daily: Vec<DailyRollup> = days
        .iter()
        .map(|date| DailyRollup {
            date: date.clone(),
            total_value: 0.0,
            completed_habits: 0,
            total_habits,
            completion_rate: 0.0,
        })
        .collect();

    let mut total_entries = 0u32;
    for habit in habits {
        for day in daily.iter_mut() {
            let Some(found) = habit.index.get(&day.date) else {
                continue;
            };
            total_entries += 1;
            day.total_value += found.value;
            // A goal-less habit counts any positive value as completed.
            let completed = match habit.goal_value {
                Some(goal) => found.value >= goal,
                None => found.value > 0.0,
            };
            if completed {
                day.completed_habits += 1;
            }
        }
    }

    for day in daily.iter_mut() {
        day.completion_rate = if total_habits > 0 {
            f64::from(day.completed_habits) / f64::from(total_habits) * 100.0
        } else {
            0.0
        };
    }

    let days_with_activity = daily.iter().filter(|day| day.completed_habits > 0).count() as u32;
    let average_completion_rate = (daily
        .iter()
        .map(|day| day.completion_rate)
        .sum::<f64>()
        / daily.len() as f64)
        .round() as u32;

    // The aggregate streaks run the per-habit engine over the boolean
    // "did at least half the habits complete that day" timeline.
    let rate_by_day: HashMap<&str, f64> = daily
        .iter()
        .map(|day| (day.date.as_str(), day.completion_rate))
        .collect();
    let completed = |key: &str| {
        rate_by_day
            .get(key)
            .is_some_and(|rate| *rate >= STREAK_RATE_THRESHOLD)
    };
    let longest_streak = stats::longest_run(&days, &completed);
    let current_streak = stats::run_ending_at(&days, as_of, &completed);

    Overview {
        total_habits,
        total_entries,
        days_with_activity,
        average_completion_rate,
        current_streak,
        longest_streak,
        daily_data: daily,
    }
}
