use crate::calendar::MonthGrid;
use crate::day_key::{Calendar, DayKey};
use crate::streak::StreakInfo;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

pub type RoutineId = Uuid;

/// One tracked habit and the days it was done.
///
/// Serialized field names are the on-disk document's; unknown fields fail the
/// whole load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Routine {
    pub id: RoutineId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub completions: BTreeSet<DayKey>,
}

impl Routine {
    pub fn new(title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            created_at,
            completions: BTreeSet::new(),
        }
    }

    pub fn created_day(&self, calendar: &Calendar) -> NaiveDate {
        calendar.day_of(&self.created_at)
    }

    pub fn is_completed_on(&self, key: &DayKey) -> bool {
        self.completions.contains(key)
    }
}

#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    pub title: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ToggleRequest {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionRequest {
    pub date: Option<String>,
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub id: RoutineId,
}

#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoutineView {
    pub id: RoutineId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub completed_today: bool,
    pub total_completions: usize,
    pub streak: Option<StreakInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoutinesResponse {
    pub date: String,
    pub selected: Option<RoutineId>,
    pub routines: Vec<RoutineView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub id: RoutineId,
    pub date: String,
    pub completed: bool,
    pub streak: Option<StreakInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodayResponse {
    pub date: String,
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub routine_id: RoutineId,
    pub title: String,
    #[serde(flatten)]
    pub grid: MonthGrid,
}

#[derive(Debug, Serialize)]
pub struct DailyPoint {
    pub date: String,
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct WeeklyPoint {
    pub week: String,
    pub start_date: String,
    pub end_date: String,
    pub completed: usize,
    pub days_counted: u8,
    pub avg_completed: f64,
    pub completion_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub last_7_days: Vec<DailyPoint>,
    pub weekly: Vec<WeeklyPoint>,
}
