use serde::{Deserialize, Serialize};
use std::fmt;

use super::projection::KCAL_PER_LB;
use super::weight::round1;
use crate::models::ValidationError;

const KG_PER_LB: f64 = 0.453592;
const CM_PER_INCH: f64 = 2.54;
const MIN_RECOMMENDED_CALORIES: f64 = 1500.0;
const MAX_SAFE_WEEKLY_RATE: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl From<&str> for Sex {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "female" | "f" => Sex::Female,
            _ => Sex::Male,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn factor(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }
}

/// Unrecognized levels fall back to moderate.
impl From<&str> for ActivityLevel {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "sedentary" => ActivityLevel::Sedentary,
            "light" => ActivityLevel::Light,
            "active" => ActivityLevel::Active,
            "very_active" => ActivityLevel::VeryActive,
            _ => ActivityLevel::Moderate,
        }
    }
}

impl fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mifflin-St Jeor basal metabolic rate in kcal/day.
pub fn mifflin_st_jeor(sex: Sex, weight_kg: f64, height_cm: f64, age: u32) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    }
}

/// Loosely-typed goal calculator input, as submitted by a form or the CLI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnergyRequest {
    pub current_weight: f64,
    pub goal_weight: f64,
    pub height_cm: Option<f64>,
    pub height_inches: Option<f64>,
    pub age: Option<u32>,
    pub sex: Option<String>,
    #[serde(alias = "activity_level")]
    pub activity: Option<String>,
    pub timeline_weeks: Option<u32>,
}

impl EnergyRequest {
    pub fn into_params(self) -> Result<EnergyParams, ValidationError> {
        let height_cm = match (self.height_cm, self.height_inches) {
            (Some(cm), _) => cm,
            (None, Some(inches)) => inches * CM_PER_INCH,
            (None, None) => return Err(ValidationError::new("height is required")),
        };

        Ok(EnergyParams {
            sex: self.sex.as_deref().map(Sex::from).unwrap_or(Sex::Male),
            age: self.age.unwrap_or(30),
            height_cm,
            current_weight_lb: self.current_weight,
            goal_weight_lb: self.goal_weight,
            activity: self
                .activity
                .as_deref()
                .map(ActivityLevel::from)
                .unwrap_or(ActivityLevel::Moderate),
            timeline_weeks: self.timeline_weeks.unwrap_or(12),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyParams {
    pub sex: Sex,
    pub age: u32,
    pub height_cm: f64,
    pub current_weight_lb: f64,
    pub goal_weight_lb: f64,
    pub activity: ActivityLevel,
    pub timeline_weeks: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyEstimate {
    pub bmr: i64,
    pub tdee: i64,
    pub daily_deficit: i64,
    pub recommended_calories: i64,
    pub recommended_protein: i64,
    pub weekly_rate: f64,
    pub total_weight_change: f64,
    pub warnings: Vec<String>,
}

pub fn bmr_tdee(params: &EnergyParams) -> Result<EnergyEstimate, ValidationError> {
    if params.timeline_weeks == 0 {
        return Err(ValidationError::new("timeline_weeks must be at least 1"));
    }
    for (field, value) in [
        ("current_weight", params.current_weight_lb),
        ("goal_weight", params.goal_weight_lb),
        ("height", params.height_cm),
    ] {
        if !value.is_finite() || value <= 0.0 {
            return Err(ValidationError::new(format!("{} must be positive", field)));
        }
    }

    let weight_kg = params.current_weight_lb * KG_PER_LB;
    let bmr = mifflin_st_jeor(params.sex, weight_kg, params.height_cm, params.age);
    let tdee = bmr * params.activity.factor();

    let total_weight_change = params.goal_weight_lb - params.current_weight_lb;
    let days = f64::from(params.timeline_weeks) * 7.0;
    let daily_deficit = total_weight_change * KCAL_PER_LB / days;
    let weekly_rate = daily_deficit * 7.0 / KCAL_PER_LB;

    let mut warnings = Vec::new();

    let mut recommended = tdee + daily_deficit;
    if recommended < MIN_RECOMMENDED_CALORIES {
        recommended = MIN_RECOMMENDED_CALORIES;
        warnings.push(format!(
            "Recommended calories raised to the {} kcal minimum; consider a longer timeline",
            MIN_RECOMMENDED_CALORIES
        ));
    }
    if weekly_rate.abs() > MAX_SAFE_WEEKLY_RATE {
        warnings.push(format!(
            "A rate of {:.1} lb/week exceeds the recommended {} lb/week",
            weekly_rate.abs(),
            MAX_SAFE_WEEKLY_RATE
        ));
    }

    let protein_per_lb = if total_weight_change < 0.0 { 1.0 } else { 0.8 };

    Ok(EnergyEstimate {
        bmr: bmr.round() as i64,
        tdee: tdee.round() as i64,
        daily_deficit: daily_deficit.round() as i64,
        recommended_calories: recommended.round() as i64,
        recommended_protein: (params.current_weight_lb * protein_per_lb).round() as i64,
        weekly_rate: (weekly_rate * 100.0).round() / 100.0,
        total_weight_change: round1(total_weight_change),
        warnings,
    })
}
