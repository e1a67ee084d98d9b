//! Pure, read-only computations over a loaded [`UserDocument`].
//!
//! Nothing here fails on empty input: no data yet yields zero totals, `None`
//! weights and empty series.

mod energy;
mod projection;
mod recap;
mod streak;
mod strength;
mod totals;
mod weight;

pub use energy::{
    bmr_tdee, mifflin_st_jeor, ActivityLevel, EnergyEstimate, EnergyParams, EnergyRequest, Sex,
};
pub use projection::{goal_projection, GoalProjection, ProjectionStatus, KCAL_PER_LB};
pub use recap::{weekly_recap, RecapPeriod, WeeklyRecap};
pub use streak::{logging_streak, Streak};
pub use strength::{latest_lifts, workouts_this_week, LatestLift};
pub use totals::{
    daily_totals, meal_history, range_series, today_summary, trailing_series, DailyTotals,
    DayMeals, GoalProgress, TodaySummary,
};
pub use weight::{current_weight, weekly_weight_change, weight_history, WeightHistory, WeightStats};

pub use crate::models::estimated_1rm;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::models::{Settings, UserDocument};

/// Everything the dashboard shows at a glance.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub today: DailyTotals,
    pub goals: Settings,
    pub current_weight: Option<f64>,
    pub weekly_weight_change: f64,
    pub streak: Streak,
    pub workouts_this_week: usize,
    pub latest_lifts: Vec<LatestLift>,
    pub total_meals: usize,
}

pub fn dashboard(doc: &UserDocument, now: NaiveDateTime) -> Dashboard {
    Dashboard {
        today: daily_totals(doc, now.date()),
        goals: doc.settings.clone(),
        current_weight: current_weight(doc),
        weekly_weight_change: weight::round1(weekly_weight_change(doc, now)),
        streak: logging_streak(doc, now),
        workouts_this_week: workouts_this_week(doc, now).len(),
        latest_lifts: latest_lifts(doc),
        total_meals: doc.meals.len(),
    }
}
