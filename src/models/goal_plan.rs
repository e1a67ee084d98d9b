use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::weight::{MAX_WEIGHT_LB, MIN_WEIGHT_LB};
use super::ValidationError;

/// A weight-loss (or gain) plan the projection is measured against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalPlan {
    pub started_date: NaiveDate,
    #[serde(alias = "current_weight")]
    pub starting_weight: f64,
    pub goal_weight: f64,
    pub target_date: NaiveDate,
    pub daily_calorie_goal: u32,
    #[serde(default)]
    pub daily_protein_goal: Option<u32>,
}

/// Longest span, in days, a plan may cover.
pub const MAX_PLAN_DAYS: i64 = 3660;

impl GoalPlan {
    /// Checks weights and dates. A plan must already have started by `today`
    /// and may span at most [`MAX_PLAN_DAYS`].
    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationError> {
        for (field, value) in [
            ("starting_weight", self.starting_weight),
            ("goal_weight", self.goal_weight),
        ] {
            if !value.is_finite() || !(MIN_WEIGHT_LB..=MAX_WEIGHT_LB).contains(&value) {
                return Err(ValidationError::new(format!(
                    "{} must be between {} and {} lb",
                    field, MIN_WEIGHT_LB, MAX_WEIGHT_LB
                )));
            }
        }
        if self.target_date <= self.started_date {
            return Err(ValidationError::new(
                "target_date must be after started_date",
            ));
        }
        if self.started_date > today {
            return Err(ValidationError::new("started_date cannot be in the future"));
        }
        if (today - self.started_date).num_days() > MAX_PLAN_DAYS
            || (self.target_date - self.started_date).num_days() > MAX_PLAN_DAYS
        {
            return Err(ValidationError::new(format!(
                "a plan may span at most {} days",
                MAX_PLAN_DAYS
            )));
        }
        if self.daily_calorie_goal == 0 || self.daily_calorie_goal > 20_000 {
            return Err(ValidationError::new(
                "daily_calorie_goal must be between 1 and 20000",
            ));
        }
        Ok(())
    }
}
