use crate::models::EntryRecord;
use std::collections::HashMap;

/// The recorded observation for one day, as seen by the grid and stats code.
#[derive(Debug, Clone, PartialEq)]
pub struct DayValue {
    pub value: f64,
    pub journal: Option<String>,
}

/// Date-key lookup over one habit's entries, rebuilt from the raw entry
/// list on every query. O(n) to build, O(1) per lookup. A missing key
/// means "no observation that day", which is distinct from a recorded 0.
#[derive(Debug, Default)]
pub struct EntryIndex {
    map: HashMap<String, DayValue>,
}

impl EntryIndex {
    /// Builds the index from raw entries. The storage layer keys entries
    /// by date, but a collaborator that hands us duplicates gets the
    /// last-one-wins treatment rather than a panic.
    pub fn build<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a EntryRecord>,
    {
        let mut map = HashMap::new();
        for entry in entries {
            map.insert(
                entry.date.clone(),
                DayValue {
                    value: entry.value,
                    journal: entry.journal.clone(),
                },
            );
        }
        Self { map }
    }

    /// Like [`EntryIndex::build`], but values are collapsed to 0/1 against
    /// the habit's goal. Used where a number habit is displayed in a
    /// completed/not-completed context.
    pub fn build_binarized<'a, I>(entries: I, goal: Option<f64>) -> Self
    where
        I: IntoIterator<Item = &'a EntryRecord>,
    {
        let mut map = HashMap::new();
        for entry in entries {
            map.insert(
                entry.date.clone(),
                DayValue {
                    value: f64::from(binarize(entry.value, goal)),
                    journal: entry.journal.clone(),
                },
            );
        }
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&DayValue> {
        self.map.get(key)
    }

    pub fn value(&self, key: &str) -> Option<f64> {
        self.map.get(key).map(|day| day.value)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// A raw value counts as completed once it reaches the goal; habits
/// without a goal default to 1, so any value >= 1 completes the day.
pub fn binarize(value: f64, goal: Option<f64>) -> u8 {
    if value >= goal.unwrap_or(1.0) { 1 } else { 0 }
}
