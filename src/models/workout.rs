use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{time_format, ValidationError};

const MAX_LIFTS_PER_WORKOUT: usize = 20;
const MAX_LIFT_WEIGHT: f64 = 2000.0;
const MAX_REPS: i64 = 100;

/// Estimated one-rep max using the Epley formula.
pub fn estimated_1rm(weight: f64, reps: u32) -> f64 {
    if reps == 1 {
        weight
    } else {
        weight * (1.0 + reps as f64 / 30.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lift {
    pub name: String,
    pub weight: f64,
    pub reps: u32,
}

impl Lift {
    pub fn new(name: impl Into<String>, weight: f64, reps: u32) -> Self {
        Self {
            name: name.into(),
            weight,
            reps,
        }
    }

    pub fn estimated_1rm(&self) -> f64 {
        estimated_1rm(self.weight, self.reps)
    }
}

/// A training session. `timestamp` is seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutEntry {
    pub date: NaiveDate,
    #[serde(default)]
    pub timestamp: f64,
    #[serde(default)]
    pub lifts: Vec<Lift>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LiftInput {
    pub name: String,
    pub weight: f64,
    pub reps: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkoutInput {
    pub lifts: Vec<LiftInput>,
    pub date: Option<String>,
}

impl WorkoutInput {
    /// `at` is the real instant of logging; its local date is the default
    /// workout date and its epoch seconds become the timestamp.
    pub fn validate(self, at: DateTime<FixedOffset>) -> Result<WorkoutEntry, ValidationError> {
        if self.lifts.is_empty() {
            return Err(ValidationError::new("a workout needs at least one lift"));
        }
        if self.lifts.len() > MAX_LIFTS_PER_WORKOUT {
            return Err(ValidationError::new(format!(
                "a workout may have at most {} lifts",
                MAX_LIFTS_PER_WORKOUT
            )));
        }

        let mut lifts = Vec::with_capacity(self.lifts.len());
        for lift in self.lifts {
            let name = lift.name.trim();
            if name.is_empty() {
                return Err(ValidationError::new("lift name must not be empty"));
            }
            if !lift.weight.is_finite() || !(0.0..=MAX_LIFT_WEIGHT).contains(&lift.weight) {
                return Err(ValidationError::new(format!(
                    "weight for '{}' must be between 0 and {}",
                    name, MAX_LIFT_WEIGHT
                )));
            }
            if !(1..=MAX_REPS).contains(&lift.reps) {
                return Err(ValidationError::new(format!(
                    "reps for '{}' must be between 1 and {}",
                    name, MAX_REPS
                )));
            }
            lifts.push(Lift::new(name, lift.weight, lift.reps as u32));
        }

        let date = match self.date.as_deref() {
            Some(d) => time_format::parse_date(d)?,
            None => at.date_naive(),
        };

        Ok(WorkoutEntry {
            date,
            timestamp: at.timestamp() as f64,
            lifts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimated_1rm() {
        assert_eq!(estimated_1rm(200.0, 1), 200.0);
        let five = estimated_1rm(200.0, 5);
        assert!((five - 233.333).abs() < 0.01);
    }

    fn bench() -> WorkoutInput {
        WorkoutInput {
            lifts: vec![LiftInput {
                name: " Bench ".to_string(),
                weight: 185.0,
                reps: 5,
            }],
            date: None,
        }
    }

    fn utc(hour: u32) -> DateTime<FixedOffset> {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
            .and_utc()
            .fixed_offset()
    }

    #[test]
    fn test_workout_input_validate() {
        let now = utc(18);
        let workout = bench().validate(now).unwrap();
        assert_eq!(workout.date, now.date_naive());
        assert_eq!(workout.lifts[0].name, "Bench");
        assert_eq!(workout.timestamp, now.timestamp() as f64);
    }

    #[test]
    fn test_workout_timestamp_ignores_local_offset() {
        // 02:00 UTC on May 1 is still April 30 at UTC-6.
        let central = FixedOffset::west_opt(6 * 3600).unwrap();
        let at = utc(2).with_timezone(&central);

        let workout = bench().validate(at).unwrap();
        assert_eq!(workout.date, NaiveDate::from_ymd_opt(2024, 4, 30).unwrap());
        assert_eq!(workout.timestamp, utc(2).timestamp() as f64);
    }

    #[test]
    fn test_workout_input_rejects_bad_lifts() {
        let now = utc(18);

        assert!(WorkoutInput::default().validate(now).is_err());

        let zero_reps = WorkoutInput {
            lifts: vec![LiftInput {
                name: "Squat".to_string(),
                weight: 225.0,
                reps: 0,
            }],
            date: None,
        };
        assert!(zero_reps.validate(now).is_err());

        let too_many = WorkoutInput {
            lifts: (0..21)
                .map(|i| LiftInput {
                    name: format!("lift{}", i),
                    weight: 10.0,
                    reps: 10,
                })
                .collect(),
            date: None,
        };
        assert!(too_many.validate(now).is_err());
    }
}
