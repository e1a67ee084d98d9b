use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{MealEntry, Settings, UserDocument};

/// Macro sums for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub calories: u64,
    pub protein: u64,
    pub carbs: u64,
    pub fat: u64,
    pub meal_count: usize,
}

impl DailyTotals {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            calories: 0,
            protein: 0,
            carbs: 0,
            fat: 0,
            meal_count: 0,
        }
    }

    fn add(&mut self, meal: &MealEntry) {
        self.calories += u64::from(meal.calories);
        self.protein += u64::from(meal.protein_g);
        self.carbs += u64::from(meal.carbs_g);
        self.fat += u64::from(meal.fat_g);
        self.meal_count += 1;
    }

    fn of<'a>(date: NaiveDate, meals: impl IntoIterator<Item = &'a MealEntry>) -> Self {
        let mut totals = Self::empty(date);
        for meal in meals {
            totals.add(meal);
        }
        totals
    }
}

pub fn daily_totals(doc: &UserDocument, date: NaiveDate) -> DailyTotals {
    DailyTotals::of(date, doc.meals.iter().filter(|m| m.date == date))
}

/// One entry per day in `[start, end]`, zero-filled. Empty if `start > end`.
pub fn range_series(doc: &UserDocument, start: NaiveDate, end: NaiveDate) -> Vec<DailyTotals> {
    if start > end {
        return Vec::new();
    }

    let mut by_date: BTreeMap<NaiveDate, DailyTotals> = start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|d| (d, DailyTotals::empty(d)))
        .collect();

    for meal in doc.meals.iter().filter(|m| m.date >= start && m.date <= end) {
        if let Some(totals) = by_date.get_mut(&meal.date) {
            totals.add(meal);
        }
    }

    by_date.into_values().collect()
}

/// The trailing `days` days ending today. Empty if that reaches before the
/// earliest representable date.
pub fn trailing_series(doc: &UserDocument, now: NaiveDateTime, days: u32) -> Vec<DailyTotals> {
    if days == 0 {
        return Vec::new();
    }
    let end = now.date();
    match end.checked_sub_signed(Duration::days(i64::from(days) - 1)) {
        Some(start) => range_series(doc, start, end),
        None => Vec::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GoalProgress {
    pub calories_pct: u32,
    pub protein_pct: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TodaySummary {
    pub date: NaiveDate,
    pub meals: Vec<MealEntry>,
    pub totals: DailyTotals,
    pub goals: Settings,
    pub progress: GoalProgress,
}

fn percent(value: u64, goal: u32) -> u32 {
    if goal == 0 {
        return 0;
    }
    (value as f64 / f64::from(goal) * 100.0).round() as u32
}

pub fn today_summary(doc: &UserDocument, now: NaiveDateTime) -> TodaySummary {
    let date = now.date();
    let meals: Vec<MealEntry> = doc.meals.iter().filter(|m| m.date == date).cloned().collect();
    let totals = DailyTotals::of(date, &meals);

    TodaySummary {
        date,
        progress: GoalProgress {
            calories_pct: percent(totals.calories, doc.settings.daily_calorie_goal),
            protein_pct: percent(totals.protein, doc.settings.daily_protein_goal),
        },
        meals,
        totals,
        goals: doc.settings.clone(),
    }
}

/// Meals logged on one day.
#[derive(Debug, Clone, Serialize)]
pub struct DayMeals {
    pub date: NaiveDate,
    pub meals: Vec<MealEntry>,
    pub totals: DailyTotals,
}

/// All logged days, newest first.
pub fn meal_history(doc: &UserDocument) -> Vec<DayMeals> {
    let mut by_date: BTreeMap<NaiveDate, Vec<MealEntry>> = BTreeMap::new();
    for meal in &doc.meals {
        by_date.entry(meal.date).or_default().push(meal.clone());
    }

    by_date
        .into_iter()
        .rev()
        .map(|(date, meals)| DayMeals {
            date,
            totals: DailyTotals::of(date, &meals),
            meals,
        })
        .collect()
}
