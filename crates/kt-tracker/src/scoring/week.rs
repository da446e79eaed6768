use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
    Utc, Weekday,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Canonical reporting-period key: the Friday closing a Monday–Sunday week.
///
/// Constructing one always goes through normalisation, so two submissions for
/// the same week compare equal regardless of which day they were filed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeekEnding(NaiveDate);

impl WeekEnding {
    pub fn date(self) -> NaiveDate {
        self.0
    }

    /// The key as a timestamp, truncated to 00:00:00 UTC.
    pub fn midnight_utc(self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.0.and_time(NaiveTime::MIN))
    }

    pub fn previous(self) -> Self {
        Self(self.0 - Duration::days(7))
    }

    pub fn next(self) -> Self {
        Self(self.0 + Duration::days(7))
    }
}

impl fmt::Display for WeekEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for WeekEnding {
    type Err = WeekEndingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let date = parse_utc_date(raw).ok_or_else(|| WeekEndingError::Invalid {
            raw: raw.to_string(),
        })?;
        checked_normalise(date).ok_or_else(|| WeekEndingError::OutOfRange {
            raw: raw.to_string(),
        })
    }
}

impl TryFrom<String> for WeekEnding {
    type Error = WeekEndingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WeekEnding> for String {
    fn from(value: WeekEnding) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WeekEndingError {
    #[error("'{raw}' is not a valid date (expected YYYY-MM-DD or RFC 3339)")]
    Invalid { raw: String },
    #[error("'{raw}' is outside the supported calendar range")]
    OutOfRange { raw: String },
}

/// Anything that identifies a calendar day once projected onto UTC.
pub trait UtcDate {
    fn utc_date(&self) -> NaiveDate;
}

impl UtcDate for NaiveDate {
    fn utc_date(&self) -> NaiveDate {
        *self
    }
}

/// Naive timestamps are treated as already being in UTC.
impl UtcDate for NaiveDateTime {
    fn utc_date(&self) -> NaiveDate {
        self.date()
    }
}

impl UtcDate for DateTime<Utc> {
    fn utc_date(&self) -> NaiveDate {
        self.date_naive()
    }
}

impl UtcDate for DateTime<FixedOffset> {
    fn utc_date(&self) -> NaiveDate {
        self.with_timezone(&Utc).date_naive()
    }
}

impl UtcDate for WeekEnding {
    fn utc_date(&self) -> NaiveDate {
        self.0
    }
}

/// Maps a date onto the Friday of its week using the UTC weekday: Saturday and
/// Sunday roll back to the Friday just gone, Monday to Friday roll forward.
///
/// Panics only for dates within four days of the end of chrono's calendar range;
/// string input goes through [`WeekEnding::from_str`], which reports that case.
pub fn normalise_week_ending<D: UtcDate>(date: D) -> WeekEnding {
    let date = date.utc_date();
    WeekEnding(date + Duration::days(friday_offset(date.weekday())))
}

/// String entry point: fails loudly on unparseable input instead of producing a
/// sentinel date.
pub fn normalise_week_ending_str(raw: &str) -> Result<WeekEnding, WeekEndingError> {
    raw.parse()
}

fn friday_offset(weekday: Weekday) -> i64 {
    match weekday.num_days_from_sunday() {
        6 => -1,
        0 => -2,
        day => 5 - i64::from(day),
    }
}

fn checked_normalise(date: NaiveDate) -> Option<WeekEnding> {
    date.checked_add_signed(Duration::days(friday_offset(date.weekday())))
        .map(WeekEnding)
}

fn parse_utc_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.utc_date());
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Some(date);
    }

    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}
