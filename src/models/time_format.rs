//! Date and time string formats used in stored documents.
//!
//! Dates are `YYYY-MM-DD`, times of day are `HH:MM`.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serializer};

use super::ValidationError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::new(format!("Invalid date '{}'. Use YYYY-MM-DD.", s)))
}

/// Parses `HH:MM`, also accepting `HH:MM:SS` (seconds are dropped).
pub fn parse_time(s: &str) -> Result<NaiveTime, ValidationError> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S").map(truncate_to_minute))
        .map_err(|_| ValidationError::new(format!("Invalid time '{}'. Use HH:MM.", s)))
}

pub fn truncate_to_minute(t: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(t.hour(), t.minute(), 0).unwrap_or(t)
}

pub fn midnight() -> NaiveTime {
    NaiveTime::MIN
}

/// Serde adapter for `HH:MM` times.
pub mod hhmm {
    use super::*;

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_time(&s).map_err(serde::de::Error::custom)
    }
}
