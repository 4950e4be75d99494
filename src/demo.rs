use crate::dates::date_key;
use crate::models::EntryRecord;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

/// Fixed seed so the landing-page sample renders the same on every call.
pub const DEMO_SEED: u64 = 12345;

pub const DEMO_HABIT_NAME: &str = "Morning Meditation";
pub const DEMO_HABIT_COLOR: &str = "#10b981";

const JOURNAL_SAMPLES: [&str; 8] = [
    "Great session today, felt very focused",
    "Had trouble concentrating but pushed through",
    "Perfect 20 minutes of peace",
    "Mind was busy but managed to observe thoughts",
    "Felt grateful and centered",
    "Quick session but effective",
    "Deep breathing helped me start the day right",
    "Noticed improvement in staying present",
];

/// Generates a year of plausible checkbox entries ending on `as_of`.
/// Weekdays complete more often than weekends, and winter months dip a
/// little. The seed is an explicit parameter; dates and values are fully
/// determined by (seed, as_of).
pub fn sample_entries(seed: u64, as_of: NaiveDate) -> Vec<EntryRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut entries = Vec::new();

    for offset in (0..365).rev() {
        let date = as_of - Duration::days(offset);
        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        let mut chance: f64 = if weekend { 0.65 } else { 0.85 };
        if matches!(date.month(), 12 | 1 | 2) {
            chance -= 0.1;
        }

        if rng.gen_bool(chance.clamp(0.0, 1.0)) {
            let journal = if rng.gen_bool(0.1) {
                Some(JOURNAL_SAMPLES[rng.gen_range(0..JOURNAL_SAMPLES.len())].to_string())
            } else {
                None
            };
            entries.push(EntryRecord {
                id: Uuid::new_v4().to_string(),
                date: date_key(date),
                value: 1.0,
                journal,
            });
        }
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_date_key;

    #[test]
    fn same_seed_same_days() {
        let as_of = parse_date_key("2025-06-15").unwrap();
        let first = sample_entries(DEMO_SEED, as_of);
        let second = sample_entries(DEMO_SEED, as_of);
        let days = |entries: &[EntryRecord]| {
            entries
                .iter()
                .map(|entry| (entry.date.clone(), entry.value))
                .collect::<Vec<_>>()
        };
        assert_eq!(days(&first), days(&second));
    }

    #[test]
    fn entries_stay_inside_the_window() {
        let as_of = parse_date_key("2025-06-15").unwrap();
        let entries = sample_entries(DEMO_SEED, as_of);
        assert!(!entries.is_empty());
        assert!(entries.len() <= 365);
        assert!(
            entries
                .iter()
                .all(|entry| entry.date.as_str() <= "2025-06-15"
                    && entry.date.as_str() >= "2024-06-16")
        );
        assert!(entries.iter().all(|entry| entry.value == 1.0));
    }
}
