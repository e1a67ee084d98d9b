use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::streak::logging_streak;
use super::totals::range_series;
use super::weight::round1;
use crate::models::{UserDocument, WeightEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecapPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Data for the weekly progress card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyRecap {
    pub weight_lost: f64,
    pub streak: u32,
    pub meals_logged: usize,
    pub avg_deficit: u64,
    pub period: RecapPeriod,
}

fn first_minus_last(entries: &[&WeightEntry]) -> Option<f64> {
    match (entries.first(), entries.last()) {
        (Some(first), Some(last)) if entries.len() >= 2 => Some(first.weight_lb - last.weight_lb),
        _ => None,
    }
}

/// Summarizes the week ending today.
///
/// `weight_lost` uses the week's weigh-ins, or the whole history when the
/// week has fewer than two. `avg_deficit` only counts days under goal toward
/// the sum, divided by the number of days with meals.
pub fn weekly_recap(doc: &UserDocument, now: NaiveDateTime) -> WeeklyRecap {
    let end = now.date();
    let start = end - Duration::days(7);

    let all: Vec<&WeightEntry> = doc.weights.iter().collect();
    let in_week: Vec<&WeightEntry> = doc
        .weights
        .iter()
        .filter(|w| w.date >= start && w.date <= end)
        .collect();
    let weight_lost = first_minus_last(&in_week)
        .or_else(|| first_minus_last(&all))
        .map(round1)
        .unwrap_or(0.0);

    let goal = u64::from(doc.settings.daily_calorie_goal);
    let days = range_series(doc, start, end);
    let logged: Vec<_> = days.iter().filter(|d| d.meal_count > 0).collect();
    let meals_logged = logged.iter().map(|d| d.meal_count).sum();
    let deficit_sum: u64 = logged.iter().map(|d| goal.saturating_sub(d.calories)).sum();
    let avg_deficit = deficit_sum / (logged.len().max(1) as u64);

    WeeklyRecap {
        weight_lost,
        streak: logging_streak(doc, now).current,
        meals_logged,
        avg_deficit,
        period: RecapPeriod { start, end },
    }
}
