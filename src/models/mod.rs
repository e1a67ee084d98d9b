//! Typed journal records.
//!
//! Every record here is what ends up in a user's JSON document. The `*Input`
//! types are what clients send; they are validated into records at the
//! journal boundary so the stored document never holds out-of-range values.

mod document;
mod goal_plan;
mod meal;
mod photo;
mod settings;
mod template;
pub mod time_format;
mod weight;
mod workout;

pub use document::{UserDocument, RECOGNIZED_KEYS};
pub use goal_plan::GoalPlan;
pub use meal::{MealEntry, MealInput};
pub use photo::{PhotoEntry, PhotoInput};
pub use settings::{GoalUpdate, Settings};
pub use template::{MealTemplate, TemplateInput};
pub use weight::{WeightEntry, WeightInput};
pub use workout::{estimated_1rm, Lift, LiftInput, WorkoutEntry, WorkoutInput};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Maximum calories accepted for a single meal.
pub const MAX_MEAL_CALORIES: i64 = 10_000;
/// Maximum grams accepted for a single macro on a single meal.
pub const MAX_MACRO_GRAMS: i64 = 1_000;
/// Maximum length of a free-text description.
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// A client-supplied field failed validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Checks that `value` lies in `0..=max` and narrows it to `u32`.
pub(crate) fn check_amount(field: &str, value: i64, max: i64) -> Result<u32, ValidationError> {
    if value < 0 {
        return Err(ValidationError::new(format!(
            "{} must not be negative (got {})",
            field, value
        )));
    }
    if value > max {
        return Err(ValidationError::new(format!(
            "{} must be at most {} (got {})",
            field, max, value
        )));
    }
    Ok(value as u32)
}

/// Checks a free-text field against a maximum character count.
pub(crate) fn check_text(field: &str, value: &str, max_len: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max_len {
        return Err(ValidationError::new(format!(
            "{} must be at most {} characters",
            field, max_len
        )));
    }
    Ok(())
}

/// Resolves optional client-supplied date/time strings, falling back to `now`.
pub(crate) fn resolve_when(
    date: Option<&str>,
    time: Option<&str>,
    now: NaiveDateTime,
) -> Result<(NaiveDate, NaiveTime), ValidationError> {
    let date = match date {
        Some(d) => time_format::parse_date(d)?,
        None => now.date(),
    };
    let time = match time {
        Some(t) => time_format::parse_time(t)?,
        None => time_format::truncate_to_minute(now.time()),
    };
    Ok((date, time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_amount_bounds() {
        assert_eq!(check_amount("calories", 0, 10).unwrap(), 0);
        assert_eq!(check_amount("calories", 10, 10).unwrap(), 10);

        let err = check_amount("calories", -1, 10).unwrap_err();
        assert!(err.to_string().contains("negative"));

        let err = check_amount("calories", 11, 10).unwrap_err();
        assert!(err.to_string().contains("at most 10"));
    }

    #[test]
    fn test_resolve_when_defaults_to_now() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 3)
            .unwrap()
            .and_hms_opt(12, 34, 56)
            .unwrap();

        let (date, time) = resolve_when(None, None, now).unwrap();
        assert_eq!(date, now.date());
        assert_eq!(time, NaiveTime::from_hms_opt(12, 34, 0).unwrap());
    }

    #[test]
    fn test_resolve_when_rejects_bad_date() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 3)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        assert!(resolve_when(Some("03/03/2024"), None, now).is_err());
        assert!(resolve_when(None, Some("noon"), now).is_err());
    }
}
