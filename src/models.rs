use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitKind {
    Number,
    Checkbox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalPeriod {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub password_hash: String,
    pub salt: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitRecord {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub color: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub goal_value: Option<f64>,
    #[serde(default, rename = "goalType")]
    pub goal_period: Option<GoalPeriod>,
    #[serde(rename = "type")]
    pub kind: HabitKind,
    #[serde(default, rename = "isPrivate")]
    pub private: bool,
    #[serde(default = "default_active_days")]
    pub active_days: Vec<String>,
    #[serde(default = "default_enabled_stats")]
    pub enabled_stats: Vec<String>,
    pub embed_token: String,
    #[serde(default)]
    pub allow_direct_log: bool,
    pub created_at: String,
}

/// One observation for one habit on one calendar day. At most one entry
/// exists per (habit, date); the per-habit map in the store is keyed by
/// the date, so logging twice overwrites instead of duplicating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryRecord {
    pub id: String,
    pub date: String,
    pub value: f64,
    #[serde(default)]
    pub journal: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreData {
    #[serde(default)]
    pub users: BTreeMap<String, UserRecord>,
    /// Session token -> user id.
    #[serde(default)]
    pub sessions: BTreeMap<String, String>,
    #[serde(default)]
    pub habits: BTreeMap<String, HabitRecord>,
    /// Habit id -> (date key -> entry).
    #[serde(default)]
    pub entries: BTreeMap<String, BTreeMap<String, EntryRecord>>,
}

pub fn default_active_days() -> Vec<String> {
    [
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
        "Sunday",
    ]
    .map(String::from)
    .to_vec()
}

pub fn default_enabled_stats() -> Vec<String> {
    ["streak", "longestStreak", "average", "total", "numberOfDays"]
        .map(String::from)
        .to_vec()
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHabitRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: HabitKind,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub goal_value: Option<f64>,
    #[serde(default, rename = "goalType")]
    pub goal_period: Option<GoalPeriod>,
    #[serde(default, rename = "isPrivate")]
    pub private: Option<bool>,
    #[serde(default)]
    pub active_days: Option<Vec<String>>,
    #[serde(default)]
    pub enabled_stats: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHabitRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub goal_value: Option<f64>,
    #[serde(default, rename = "goalType")]
    pub goal_period: Option<GoalPeriod>,
    #[serde(default, rename = "isPrivate")]
    pub private: Option<bool>,
    #[serde(default)]
    pub allow_direct_log: Option<bool>,
    #[serde(default)]
    pub active_days: Option<Vec<String>>,
    #[serde(default)]
    pub enabled_stats: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct LogEntryRequest {
    pub date: String,
    pub value: f64,
    #[serde(default)]
    pub journal: Option<String>,
}
