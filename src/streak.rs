use crate::day_key::DayKey;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakInfo {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub length: u32,
}

/// The run of consecutive completed days ending today, or ending yesterday
/// when today is not marked yet.
pub fn current_streak(completions: &BTreeSet<DayKey>, today: NaiveDate) -> Option<StreakInfo> {
    let done = |day: NaiveDate| completions.contains(&DayKey::from_day(day));

    let anchor = if done(today) {
        today
    } else {
        today.pred_opt().filter(|yesterday| done(*yesterday))?
    };

    let mut start = anchor;
    let mut length = 1u32;
    while let Some(previous) = start.pred_opt() {
        if !done(previous) {
            break;
        }
        start = previous;
        length = length.saturating_add(1);
    }

    Some(StreakInfo {
        start,
        end: anchor,
        length,
    })
}

/// Longest run anywhere in the history. Ties go to the earliest run.
pub fn longest_streak(completions: &BTreeSet<DayKey>) -> Option<StreakInfo> {
    let mut best: Option<StreakInfo> = None;
    let mut run: Option<StreakInfo> = None;

    for day in completions.iter().filter_map(DayKey::to_date) {
        run = match run {
            Some(current) if current.end.succ_opt() == Some(day) => Some(StreakInfo {
                end: day,
                length: current.length.saturating_add(1),
                ..current
            }),
            _ => Some(StreakInfo {
                start: day,
                end: day,
                length: 1,
            }),
        };
        if let Some(current) = run {
            if best.is_none_or(|b| current.length > b.length) {
                best = Some(current);
            }
        }
    }

    best
}
