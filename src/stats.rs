use crate::day_key::{Calendar, DayKey};
use crate::models::{DailyPoint, Routine, StatsResponse, WeeklyPoint};
use chrono::{Datelike, Duration, NaiveDate};

pub fn build_stats_at(today: NaiveDate, routines: &[Routine], calendar: &Calendar) -> StatsResponse {
    const WEEK_COUNT: usize = 8;

    let mut last_7_days = Vec::with_capacity(7);
    for offset in (0..7).rev() {
        let date = today - Duration::days(offset as i64);
        let (completed, total) = day_totals(date, routines, calendar);
        last_7_days.push(DailyPoint {
            date: date.to_string(),
            completed,
            total,
        });
    }

    let current_week_start = calendar.week_start(today);
    let mut weekly = Vec::with_capacity(WEEK_COUNT);

    for offset in (0..WEEK_COUNT).rev() {
        let start = current_week_start - Duration::weeks(offset as i64);
        let end = start + Duration::days(6);

        let days_counted = if today < start {
            0
        } else if today > end {
            7
        } else {
            (today - start).num_days() as u8 + 1
        };

        let mut completed_sum = 0usize;
        let mut possible_sum = 0usize;
        for day_offset in 0..i64::from(days_counted) {
            let (completed, total) = day_totals(start + Duration::days(day_offset), routines, calendar);
            completed_sum = completed_sum.saturating_add(completed);
            possible_sum = possible_sum.saturating_add(total);
        }

        let denom = if days_counted == 0 { 1.0 } else { f64::from(days_counted) };
        let completion_rate = if possible_sum == 0 {
            0.0
        } else {
            completed_sum as f64 / possible_sum as f64
        };

        weekly.push(WeeklyPoint {
            week: week_label(start),
            start_date: start.to_string(),
            end_date: end.to_string(),
            completed: completed_sum,
            days_counted,
            avg_completed: completed_sum as f64 / denom,
            completion_rate,
        });
    }

    StatsResponse { last_7_days, weekly }
}

/// Completed routines on `date`, and routines that existed on it.
fn day_totals(date: NaiveDate, routines: &[Routine], calendar: &Calendar) -> (usize, usize) {
    let key = DayKey::from_day(date);
    routines
        .iter()
        .filter(|routine| routine.created_day(calendar) <= date)
        .fold((0, 0), |(completed, total), routine| {
            let done = usize::from(routine.is_completed_on(&key));
            (completed + done, total + 1)
        })
}

fn week_label(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}
