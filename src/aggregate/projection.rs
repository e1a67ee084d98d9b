use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use super::streak::{last_run, longest_run};
use super::weight::round1;
use crate::models::{GoalPlan, UserDocument};

/// Calories per pound of body weight.
pub const KCAL_PER_LB: f64 = 3500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionStatus {
    OnPace,
    Slipping,
    OffTrack,
}

impl ProjectionStatus {
    /// `actual >= 0.9 * required` is on pace, `>= 0.7 *` is slipping.
    pub fn classify(actual_weekly_loss: f64, required_weekly_loss: f64) -> Self {
        if actual_weekly_loss >= 0.9 * required_weekly_loss {
            ProjectionStatus::OnPace
        } else if actual_weekly_loss >= 0.7 * required_weekly_loss {
            ProjectionStatus::Slipping
        } else {
            ProjectionStatus::OffTrack
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectionStatus::OnPace => "on_pace",
            ProjectionStatus::Slipping => "slipping",
            ProjectionStatus::OffTrack => "off_track",
        }
    }

    /// Short human-readable verdict.
    pub fn status_text(&self) -> &'static str {
        match self {
            ProjectionStatus::OnPace => "On pace to hit your goal",
            ProjectionStatus::Slipping => "Slipping behind pace",
            ProjectionStatus::OffTrack => "Off track",
        }
    }
}

impl fmt::Display for ProjectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProjection {
    pub lbs_lost: f64,
    pub current_weight: f64,
    pub required_weekly_loss: f64,
    pub actual_weekly_loss: f64,
    pub status: ProjectionStatus,
    pub status_text: &'static str,
    pub goal_weight: f64,
    pub lbs_to_goal: f64,
    pub days_to_goal: i64,
    pub days_tracked: u32,
    pub days_under_target: u32,
    pub total_deficit: i64,
    pub logging_streak: u32,
    pub current_streak: u32,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Projects progress against `plan` from the calories logged since it began.
///
/// Only days with at least one meal contribute to the deficit; days with no
/// meals are skipped without penalty. Weekly pace is still measured over
/// every elapsed day since the plan started.
pub fn goal_projection(doc: &UserDocument, plan: &GoalPlan, now: NaiveDateTime) -> GoalProjection {
    let today = now.date();
    let goal = i64::from(plan.daily_calorie_goal);

    let mut eaten_by_date: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for meal in doc
        .meals
        .iter()
        .filter(|m| m.date >= plan.started_date && m.date <= today)
    {
        *eaten_by_date.entry(meal.date).or_default() += i64::from(meal.calories);
    }

    let mut total_deficit: i64 = 0;
    let mut days_under_target = 0u32;
    for eaten in eaten_by_date.values() {
        let deficit = goal - eaten;
        total_deficit += deficit;
        if deficit > 0 {
            days_under_target += 1;
        }
    }

    let elapsed = (today - plan.started_date).num_days().max(0);
    let days_tracked = u32::try_from(elapsed).unwrap_or(u32::MAX);

    let lbs_lost = total_deficit as f64 / KCAL_PER_LB;
    let current_weight = plan.starting_weight - lbs_lost;
    let lbs_to_goal = current_weight - plan.goal_weight;
    let days_to_goal = (plan.target_date - today).num_days();

    let required_weekly_loss = if days_to_goal > 0 {
        lbs_to_goal / days_to_goal as f64 * 7.0
    } else {
        0.0
    };
    let actual_weekly_loss = if days_tracked > 0 {
        lbs_lost / f64::from(days_tracked) * 7.0
    } else {
        0.0
    };

    let status = ProjectionStatus::classify(actual_weekly_loss, required_weekly_loss);

    GoalProjection {
        lbs_lost: round1(lbs_lost),
        current_weight: round1(current_weight),
        required_weekly_loss: round2(required_weekly_loss),
        actual_weekly_loss: round2(actual_weekly_loss),
        status,
        status_text: status.status_text(),
        goal_weight: plan.goal_weight,
        lbs_to_goal: round1(lbs_to_goal),
        days_to_goal,
        days_tracked,
        days_under_target,
        total_deficit,
        logging_streak: longest_run(eaten_by_date.keys()),
        current_streak: last_run(eaten_by_date.keys()),
    }
}
