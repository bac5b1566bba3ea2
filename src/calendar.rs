use crate::day_key::{Calendar, DayKey, Month};
use crate::models::Routine;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    BeforeCreated,
    Future,
    Completed,
    Missed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub day: u32,
    pub date: NaiveDate,
    pub status: DayStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub leading_blanks: u32,
    pub days: Vec<DayCell>,
}

impl MonthGrid {
    pub fn status_of(&self, day: u32) -> Option<DayStatus> {
        self.days.iter().find(|cell| cell.day == day).map(|cell| cell.status)
    }
}

pub fn leading_blanks(month: Month, calendar: &Calendar) -> u32 {
    calendar.weekday_index(month.first_day().weekday())
}

pub fn classify_day(
    routine: &Routine,
    date: NaiveDate,
    created: NaiveDate,
    today: NaiveDate,
) -> DayStatus {
    if date < created {
        DayStatus::BeforeCreated
    } else if date > today {
        DayStatus::Future
    } else if routine.is_completed_on(&DayKey::from_day(date)) {
        DayStatus::Completed
    } else {
        DayStatus::Missed
    }
}

/// Render model for one routine's month. Pure; never touches the routine.
pub fn month_grid(routine: &Routine, month: Month, today: NaiveDate, calendar: &Calendar) -> MonthGrid {
    let created = routine.created_day(calendar);
    let days = (1..=month.days_in_month())
        .filter_map(|day| month.day(day).map(|date| (day, date)))
        .map(|(day, date)| DayCell {
            day,
            date,
            status: classify_day(routine, date, created, today),
        })
        .collect();

    MonthGrid {
        year: month.year(),
        month: month.month(),
        leading_blanks: leading_blanks(month, calendar),
        days,
    }
}
