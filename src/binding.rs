//! Get/set pairs tied to one routine id.
//!
//! A binding holds only ids; the store is passed in on every call.

use crate::day_key::{CalendarDate, DayKey};
use crate::models::RoutineId;
use crate::store::RoutineStore;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleBinding {
    pub id: RoutineId,
}

impl TitleBinding {
    pub fn new(id: RoutineId) -> Self {
        Self { id }
    }

    pub fn get<'a>(&self, store: &'a RoutineStore) -> Option<&'a str> {
        store.routine(self.id).map(|routine| routine.title.as_str())
    }

    pub async fn set(&self, store: &mut RoutineStore, title: &str) -> bool {
        store.update_title(self.id, title).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionBinding {
    pub id: RoutineId,
    pub day: NaiveDate,
}

impl CompletionBinding {
    pub fn new(id: RoutineId, date: &impl CalendarDate, store: &RoutineStore) -> Self {
        Self {
            id,
            day: date.day_in(store.calendar()),
        }
    }

    pub fn key(&self) -> DayKey {
        DayKey::from_day(self.day)
    }

    pub fn get(&self, store: &RoutineStore) -> bool {
        store.is_completed(self.id, &self.day)
    }

    pub async fn set(&self, store: &mut RoutineStore, completed: bool) -> bool {
        store.set_completion(self.id, self.day, completed).await
    }
}
