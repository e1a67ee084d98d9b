use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::time_format::{self, hhmm};
use super::{check_text, resolve_when, ValidationError};

pub const MIN_WEIGHT_LB: f64 = 50.0;
pub const MAX_WEIGHT_LB: f64 = 1000.0;
const MAX_NOTES_LEN: usize = 500;

/// A body-weight reading in pounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub date: NaiveDate,
    #[serde(with = "hhmm", default = "time_format::midnight")]
    pub time: NaiveTime,
    #[serde(rename = "weight")]
    pub weight_lb: f64,
    #[serde(default)]
    pub notes: String,
}

impl WeightEntry {
    pub fn new(date: NaiveDate, time: NaiveTime, weight_lb: f64) -> Self {
        Self {
            date,
            time,
            weight_lb,
            notes: String::new(),
        }
    }

    pub fn recorded_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeightInput {
    pub weight: f64,
    #[serde(default)]
    pub notes: String,
    pub date: Option<String>,
    pub time: Option<String>,
}

impl WeightInput {
    pub fn validate(self, now: NaiveDateTime) -> Result<WeightEntry, ValidationError> {
        if !self.weight.is_finite() || !(MIN_WEIGHT_LB..=MAX_WEIGHT_LB).contains(&self.weight) {
            return Err(ValidationError::new(format!(
                "weight must be between {} and {} lb (got {})",
                MIN_WEIGHT_LB, MAX_WEIGHT_LB, self.weight
            )));
        }
        let notes = self.notes.trim().to_string();
        check_text("notes", &notes, MAX_NOTES_LEN)?;

        let (date, time) = resolve_when(self.date.as_deref(), self.time.as_deref(), now)?;
        let mut entry = WeightEntry::new(date, time, self.weight);
        entry.notes = notes;
        Ok(entry)
    }
}
