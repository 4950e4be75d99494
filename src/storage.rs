use crate::errors::AppError;
use crate::models::{EntryRecord, HabitRecord, StoreData, UserRecord};
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::error;
use uuid::Uuid;

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/habitmap.json"))
}

pub async fn load_data(path: &Path) -> StoreData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                StoreData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => StoreData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            StoreData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &StoreData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

impl StoreData {
    pub fn user_by_email(&self, email: &str) -> Option<&UserRecord> {
        self.users.values().find(|user| user.email == email)
    }

    pub fn user_for_token(&self, token: &str) -> Option<&UserRecord> {
        self.sessions.get(token).and_then(|id| self.users.get(id))
    }

    pub fn habits_for(&self, user_id: &str) -> Vec<&HabitRecord> {
        self.habits
            .values()
            .filter(|habit| habit.user_id == user_id)
            .collect()
    }

    /// Looks a habit up under an ownership check. A habit owned by someone
    /// else comes back as `None`, indistinguishable from a missing one.
    pub fn owned_habit(&self, user_id: &str, habit_id: &str) -> Option<&HabitRecord> {
        self.habits
            .get(habit_id)
            .filter(|habit| habit.user_id == user_id)
    }

    pub fn habit_by_token(&self, token: &str) -> Option<&HabitRecord> {
        self.habits
            .values()
            .find(|habit| habit.embed_token == token)
    }

    /// Entries for one habit in ascending date order.
    pub fn entries_for(&self, habit_id: &str) -> Vec<&EntryRecord> {
        self.entries
            .get(habit_id)
            .map(|per_day| per_day.values().collect())
            .unwrap_or_default()
    }

    /// Entries within an inclusive date-key range, ascending. ISO date
    /// keys order lexicographically, so plain string bounds work.
    pub fn entries_between(
        &self,
        habit_id: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Vec<&EntryRecord> {
        self.entries_for(habit_id)
            .into_iter()
            .filter(|entry| {
                from.is_none_or(|from| entry.date.as_str() >= from)
                    && to.is_none_or(|to| entry.date.as_str() <= to)
            })
            .collect()
    }

    /// Creates or overwrites the entry for (habit, date). An existing
    /// entry keeps its id, and its journal is only replaced when a new
    /// one is supplied.
    pub fn upsert_entry(
        &mut self,
        habit_id: &str,
        date: String,
        value: f64,
        journal: Option<String>,
    ) -> EntryRecord {
        let per_day = self.entries.entry(habit_id.to_string()).or_default();
        match per_day.get_mut(&date) {
            Some(existing) => {
                existing.value = value;
                if journal.is_some() {
                    existing.journal = journal;
                }
                existing.clone()
            }
            None => {
                let record = EntryRecord {
                    id: Uuid::new_v4().to_string(),
                    date: date.clone(),
                    value,
                    journal,
                };
                per_day.insert(date, record.clone());
                record
            }
        }
    }

    pub fn delete_entry(&mut self, habit_id: &str, entry_id: &str) -> bool {
        let Some(per_day) = self.entries.get_mut(habit_id) else {
            return false;
        };
        let Some(date) = per_day
            .iter()
            .find(|(_, entry)| entry.id == entry_id)
            .map(|(date, _)| date.clone())
        else {
            return false;
        };
        per_day.remove(&date);
        true
    }

    /// Removes a habit and everything it owns.
    pub fn remove_habit(&mut self, habit_id: &str) -> Option<HabitRecord> {
        self.entries.remove(habit_id);
        self.habits.remove(habit_id)
    }
}
