use crate::calendar::{MonthGrid, month_grid};
use crate::clock::Clock;
use crate::day_key::{Calendar, CalendarDate, DayKey, Month};
use crate::models::{Routine, RoutineId};
use crate::storage::RoutineStorage;
use crate::streak::{StreakInfo, current_streak, longest_streak};
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Added(RoutineId),
    Deleted(RoutineId),
    TitleChanged(RoutineId),
    CompletionChanged {
        id: RoutineId,
        day: DayKey,
        completed: bool,
    },
    SelectionChanged(Option<RoutineId>),
}

/// Owns the routine collection and the selection.
///
/// Mutations apply in memory first and then save the whole collection. A
/// failed save is logged and dropped; memory stays the source of truth. Calls
/// naming an unknown id, and titles that trim to nothing, are no-ops.
pub struct RoutineStore {
    routines: Vec<Routine>,
    selected: Option<RoutineId>,
    calendar: Calendar,
    storage: RoutineStorage,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<StoreEvent>,
}

impl RoutineStore {
    pub async fn open(storage: RoutineStorage, calendar: Calendar, clock: Arc<dyn Clock>) -> Self {
        let routines = storage.load().await;
        let selected = routines.first().map(|routine| routine.id);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            routines,
            selected,
            calendar,
            storage,
            clock,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.calendar.day_of(&self.clock.now())
    }

    pub fn routines(&self) -> &[Routine] {
        &self.routines
    }

    pub fn routine(&self, id: RoutineId) -> Option<&Routine> {
        self.routines.iter().find(|routine| routine.id == id)
    }

    pub fn len(&self) -> usize {
        self.routines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }

    pub fn selected(&self) -> Option<RoutineId> {
        self.selected
    }

    pub fn selected_routine(&self) -> Option<&Routine> {
        self.selected.and_then(|id| self.routine(id))
    }

    pub async fn add(&mut self, title: &str) -> Option<RoutineId> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        let routine = Routine::new(title, self.clock.now());
        let id = routine.id;
        self.routines.insert(0, routine);
        debug!(%id, "added routine");
        self.notify(StoreEvent::Added(id));
        self.set_selected(Some(id));
        self.persist().await;
        Some(id)
    }

    pub async fn delete(&mut self, id: RoutineId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        self.routines.remove(index);
        debug!(%id, "deleted routine");
        self.notify(StoreEvent::Deleted(id));
        if self.selected == Some(id) {
            let next = self.routines.first().map(|routine| routine.id);
            self.set_selected(next);
        }
        self.persist().await;
        true
    }

    /// Empty titles are rejected here exactly as in [`RoutineStore::add`].
    pub async fn update_title(&mut self, id: RoutineId, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() {
            return false;
        }
        let Some(routine) = self.routine_mut(id) else {
            return false;
        };

        if routine.title != title {
            routine.title = title.to_string();
            self.notify(StoreEvent::TitleChanged(id));
            self.persist().await;
        }
        true
    }

    pub async fn set_completion(&mut self, id: RoutineId, date: impl CalendarDate, completed: bool) -> bool {
        let key = DayKey::from_date(&date, &self.calendar);
        let Some(routine) = self.routine_mut(id) else {
            return false;
        };

        let changed = if completed {
            routine.completions.insert(key.clone())
        } else {
            routine.completions.remove(&key)
        };

        if changed {
            debug!(%id, day = %key, completed, "completion changed");
            self.notify(StoreEvent::CompletionChanged {
                id,
                day: key,
                completed,
            });
            self.persist().await;
        }
        true
    }

    pub async fn toggle_completion(&mut self, id: RoutineId, date: impl CalendarDate) -> bool {
        let completed = self.is_completed(id, &date);
        self.set_completion(id, date, !completed).await
    }

    pub fn is_completed(&self, id: RoutineId, date: &impl CalendarDate) -> bool {
        let key = DayKey::from_date(date, &self.calendar);
        self.routine(id).is_some_and(|routine| routine.is_completed_on(&key))
    }

    pub fn completed_count(&self, date: &impl CalendarDate) -> usize {
        let key = DayKey::from_date(date, &self.calendar);
        self.routines
            .iter()
            .filter(|routine| routine.is_completed_on(&key))
            .count()
    }

    pub fn remaining_count(&self, date: &impl CalendarDate) -> usize {
        self.routines.len().saturating_sub(self.completed_count(date))
    }

    pub fn current_streak(&self, routine: &Routine, today: &impl CalendarDate) -> Option<StreakInfo> {
        current_streak(&routine.completions, today.day_in(&self.calendar))
    }

    pub fn longest_streak(&self, id: RoutineId) -> Option<StreakInfo> {
        self.routine(id).and_then(|routine| longest_streak(&routine.completions))
    }

    pub fn calendar_status(&self, routine: &Routine, month: Month, today: &impl CalendarDate) -> MonthGrid {
        month_grid(routine, month, today.day_in(&self.calendar), &self.calendar)
    }

    pub fn select(&mut self, id: RoutineId) -> bool {
        if self.position(id).is_none() {
            return false;
        }
        self.set_selected(Some(id));
        true
    }

    fn set_selected(&mut self, selected: Option<RoutineId>) {
        if self.selected != selected {
            self.selected = selected;
            self.notify(StoreEvent::SelectionChanged(selected));
        }
    }

    fn position(&self, id: RoutineId) -> Option<usize> {
        self.routines.iter().position(|routine| routine.id == id)
    }

    fn routine_mut(&mut self, id: RoutineId) -> Option<&mut Routine> {
        self.routines.iter_mut().find(|routine| routine.id == id)
    }

    fn notify(&self, event: StoreEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    async fn persist(&self) {
        if let Err(err) = self.storage.save(&self.routines).await {
            error!(path = %self.storage.path().display(), "failed to save routines: {err}");
        }
    }
}
