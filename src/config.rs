use crate::day_key::{Calendar, CalendarZone};
use chrono::{FixedOffset, Weekday};
use std::{env, path::PathBuf};
use tracing::warn;

const DEFAULT_DATA_PATH: &str = "data/routines.json";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: PathBuf,
    pub port: u16,
    pub calendar: Calendar,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_path = lookup("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let first_weekday = match lookup("APP_FIRST_WEEKDAY") {
            Some(raw) => raw.trim().parse::<Weekday>().unwrap_or_else(|_| {
                warn!("ignoring APP_FIRST_WEEKDAY={raw}");
                Weekday::Mon
            }),
            None => Weekday::Mon,
        };

        let zone = match lookup("APP_UTC_OFFSET_MINUTES") {
            Some(raw) => match raw
                .trim()
                .parse::<i32>()
                .ok()
                .and_then(|minutes| minutes.checked_mul(60))
                .and_then(FixedOffset::east_opt)
            {
                Some(offset) => CalendarZone::Fixed(offset),
                None => {
                    warn!("ignoring APP_UTC_OFFSET_MINUTES={raw}");
                    CalendarZone::Local
                }
            },
            None => CalendarZone::Local,
        };

        Self {
            data_path,
            port,
            calendar: Calendar { zone, first_weekday },
        }
    }
}
