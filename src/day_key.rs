use chrono::{DateTime, Datelike, Days, FixedOffset, Local, NaiveDate, Offset, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

const KEY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarZone {
    Local,
    Fixed(FixedOffset),
}

/// Rules used to turn instants into calendar days and to lay out weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    pub zone: CalendarZone,
    pub first_weekday: Weekday,
}

impl Default for Calendar {
    fn default() -> Self {
        Self {
            zone: CalendarZone::Local,
            first_weekday: Weekday::Mon,
        }
    }
}

impl Calendar {
    pub fn fixed(offset: FixedOffset, first_weekday: Weekday) -> Self {
        Self {
            zone: CalendarZone::Fixed(offset),
            first_weekday,
        }
    }

    pub fn utc() -> Self {
        Self::fixed(Utc.fix(), Weekday::Mon)
    }

    pub fn day_of(&self, instant: &DateTime<Utc>) -> NaiveDate {
        match self.zone {
            CalendarZone::Local => instant.with_timezone(&Local).date_naive(),
            CalendarZone::Fixed(offset) => instant.with_timezone(&offset).date_naive(),
        }
    }

    /// Position of `weekday` in a week that starts on `first_weekday`, 0..=6.
    pub fn weekday_index(&self, weekday: Weekday) -> u32 {
        (weekday.num_days_from_monday() + 7 - self.first_weekday.num_days_from_monday()) % 7
    }

    pub fn week_start(&self, date: NaiveDate) -> NaiveDate {
        let back = self.weekday_index(date.weekday());
        date.checked_sub_days(Days::new(u64::from(back)))
            .unwrap_or(NaiveDate::MIN)
    }
}

/// Anything that can be reduced to a single calendar day.
pub trait CalendarDate {
    fn day_in(&self, calendar: &Calendar) -> NaiveDate;
}

impl CalendarDate for NaiveDate {
    fn day_in(&self, _calendar: &Calendar) -> NaiveDate {
        *self
    }
}

impl<Tz: TimeZone> CalendarDate for DateTime<Tz> {
    fn day_in(&self, calendar: &Calendar) -> NaiveDate {
        calendar.day_of(&self.with_timezone(&Utc))
    }
}

/// Canonical `YYYY-MM-DD` identifier of one calendar day.
///
/// Keys are fixed width, so string order is chronological order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DayKey(String);

impl DayKey {
    pub fn from_date(date: &impl CalendarDate, calendar: &Calendar) -> Self {
        Self::from_day(date.day_in(calendar))
    }

    pub fn from_day(day: NaiveDate) -> Self {
        Self(day.format(KEY_FORMAT).to_string())
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let day = NaiveDate::parse_from_str(raw, KEY_FORMAT).ok()?;
        let key = Self::from_day(day);
        // chrono accepts unpadded fields; only the canonical spelling is a key
        (key.0 == raw).then_some(key)
    }

    pub fn to_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.0, KEY_FORMAT).ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DayKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid day key '{value}'"))
    }
}

impl From<DayKey> for String {
    fn from(key: DayKey) -> Self {
        key.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "MonthParts")]
pub struct Month {
    year: i32,
    month: u32,
}

#[derive(Deserialize)]
struct MonthParts {
    year: i32,
    month: u32,
}

impl TryFrom<MonthParts> for Month {
    type Error = String;

    fn try_from(parts: MonthParts) -> Result<Self, Self::Error> {
        Self::new(parts.year, parts.month)
            .ok_or_else(|| format!("invalid month {}-{}", parts.year, parts.month))
    }
}

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn days_in_month(&self) -> u32 {
        self.next()
            .and_then(|next| next.first_day().pred_opt())
            .map(|last| last.day())
            // only the last representable December has no successor
            .unwrap_or(31)
    }

    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn next(&self) -> Option<Self> {
        if self.month == 12 {
            Self::new(self.year.checked_add(1)?, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    pub fn previous(&self) -> Option<Self> {
        if self.month == 1 {
            Self::new(self.year.checked_sub(1)?, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
