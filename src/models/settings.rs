use serde::{Deserialize, Serialize};

use super::{check_amount, ValidationError};

const MAX_GOAL: i64 = 20_000;

fn default_calorie_goal() -> u32 {
    2200
}

fn default_protein_goal() -> u32 {
    200
}

fn default_carbs_goal() -> u32 {
    250
}

fn default_fat_goal() -> u32 {
    70
}

/// Per-user daily targets. Any field missing from a stored document is
/// filled with its default when the document is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_calorie_goal")]
    pub daily_calorie_goal: u32,
    #[serde(default = "default_protein_goal")]
    pub daily_protein_goal: u32,
    #[serde(default = "default_carbs_goal")]
    pub daily_carbs_goal: u32,
    #[serde(default = "default_fat_goal")]
    pub daily_fat_goal: u32,
    #[serde(default)]
    pub onboarded: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            daily_calorie_goal: default_calorie_goal(),
            daily_protein_goal: default_protein_goal(),
            daily_carbs_goal: default_carbs_goal(),
            daily_fat_goal: default_fat_goal(),
            onboarded: false,
        }
    }
}

/// Partial goal update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoalUpdate {
    pub calories: Option<i64>,
    pub protein: Option<i64>,
    pub carbs: Option<i64>,
    pub fat: Option<i64>,
    pub onboarded: Option<bool>,
}

impl GoalUpdate {
    /// Applies the update. Nothing is changed unless every field is valid.
    pub fn apply(&self, settings: &mut Settings) -> Result<(), ValidationError> {
        let mut updated = settings.clone();

        if let Some(v) = self.calories {
            updated.daily_calorie_goal = check_amount("calorie goal", v, MAX_GOAL)?;
        }
        if let Some(v) = self.protein {
            updated.daily_protein_goal = check_amount("protein goal", v, MAX_GOAL)?;
        }
        if let Some(v) = self.carbs {
            updated.daily_carbs_goal = check_amount("carbs goal", v, MAX_GOAL)?;
        }
        if let Some(v) = self.fat {
            updated.daily_fat_goal = check_amount("fat goal", v, MAX_GOAL)?;
        }
        if let Some(v) = self.onboarded {
            updated.onboarded = v;
        }

        *settings = updated;
        Ok(())
    }
}
