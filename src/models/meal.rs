use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::time_format::{self, hhmm};
use super::{
    check_amount, check_text, resolve_when, ValidationError, MAX_DESCRIPTION_LEN,
    MAX_MACRO_GRAMS, MAX_MEAL_CALORIES,
};

/// A logged meal. Macros are whole grams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealEntry {
    pub date: NaiveDate,
    #[serde(with = "hhmm", default = "time_format::midnight")]
    pub time: NaiveTime,
    #[serde(default)]
    pub description: String,
    pub calories: u32,
    #[serde(rename = "protein", default)]
    pub protein_g: u32,
    #[serde(rename = "carbs", default)]
    pub carbs_g: u32,
    #[serde(rename = "fat", default)]
    pub fat_g: u32,
}

impl MealEntry {
    pub fn new(date: NaiveDate, time: NaiveTime, calories: u32) -> Self {
        Self {
            date,
            time,
            description: String::new(),
            calories,
            protein_g: 0,
            carbs_g: 0,
            fat_g: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_macros(mut self, protein_g: u32, carbs_g: u32, fat_g: u32) -> Self {
        self.protein_g = protein_g;
        self.carbs_g = carbs_g;
        self.fat_g = fat_g;
        self
    }
}

impl fmt::Display for MealEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} kcal (P {}g / C {}g / F {}g)",
            self.date,
            self.time.format(time_format::TIME_FORMAT),
            self.calories,
            self.protein_g,
            self.carbs_g,
            self.fat_g
        )?;
        if !self.description.is_empty() {
            write!(f, " {}", self.description)?;
        }
        Ok(())
    }
}

/// Client request to log a meal. Missing macros count as zero.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MealInput {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub calories: i64,
    #[serde(default)]
    pub protein: i64,
    #[serde(default)]
    pub carbs: i64,
    #[serde(default)]
    pub fat: i64,
    /// `YYYY-MM-DD`; defaults to today.
    pub date: Option<String>,
    /// `HH:MM`; defaults to the current time.
    pub time: Option<String>,
}

impl MealInput {
    pub fn validate(self, now: NaiveDateTime) -> Result<MealEntry, ValidationError> {
        let description = self.description.trim().to_string();
        check_text("description", &description, MAX_DESCRIPTION_LEN)?;

        let calories = check_amount("calories", self.calories, MAX_MEAL_CALORIES)?;
        let protein = check_amount("protein", self.protein, MAX_MACRO_GRAMS)?;
        let carbs = check_amount("carbs", self.carbs, MAX_MACRO_GRAMS)?;
        let fat = check_amount("fat", self.fat, MAX_MACRO_GRAMS)?;

        let (date, time) = resolve_when(self.date.as_deref(), self.time.as_deref(), now)?;

        Ok(MealEntry::new(date, time, calories)
            .with_description(description)
            .with_macros(protein, carbs, fat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(8, 15, 30)
            .unwrap()
    }

    #[test]
    fn test_meal_input_validate() {
        let input = MealInput {
            description: "  eggs and toast ".to_string(),
            calories: 450,
            protein: 30,
            carbs: 40,
            fat: 18,
            ..Default::default()
        };

        let meal = input.validate(now()).unwrap();
        assert_eq!(meal.date, now().date());
        assert_eq!(meal.time, NaiveTime::from_hms_opt(8, 15, 0).unwrap());
        assert_eq!(meal.description, "eggs and toast");
        assert_eq!(meal.calories, 450);
        assert_eq!((meal.protein_g, meal.carbs_g, meal.fat_g), (30, 40, 18));
    }

    #[test]
    fn test_meal_input_rejects_negative_calories() {
        let input = MealInput {
            calories: -5,
            ..Default::default()
        };
        let err = input.validate(now()).unwrap_err();
        assert!(err.to_string().contains("calories"));
    }

    #[test]
    fn test_meal_input_rejects_calorie_cap() {
        let input = MealInput {
            calories: 10_001,
            ..Default::default()
        };
        assert!(input.validate(now()).is_err());
    }

    #[test]
    fn test_meal_input_explicit_date_time() {
        let input = MealInput {
            calories: 300,
            date: Some("2023-12-31".to_string()),
            time: Some("21:05".to_string()),
            ..Default::default()
        };
        let meal = input.validate(now()).unwrap();
        assert_eq!(meal.date, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(meal.time, NaiveTime::from_hms_opt(21, 5, 0).unwrap());
    }

    #[test]
    fn test_meal_json_uses_legacy_field_names() {
        let meal = MealEntry::new(now().date(), NaiveTime::from_hms_opt(12, 30, 0).unwrap(), 500)
            .with_macros(40, 50, 10);
        let json = serde_json::to_value(&meal).unwrap();

        assert_eq!(json["date"], "2024-01-01");
        assert_eq!(json["time"], "12:30");
        assert_eq!(json["protein"], 40);
        assert_eq!(json["carbs"], 50);
        assert_eq!(json["fat"], 10);
    }

    #[test]
    fn test_meal_missing_macros_default_to_zero() {
        let json = r#"{"date": "2024-01-01", "time": "09:00", "calories": 400, "protein": 20}"#;
        let meal: MealEntry = serde_json::from_str(json).unwrap();
        assert_eq!(meal.carbs_g, 0);
        assert_eq!(meal.fat_g, 0);
        assert_eq!(meal.description, "");
    }

    #[test]
    fn test_meal_display() {
        let meal = MealEntry::new(now().date(), NaiveTime::from_hms_opt(7, 0, 0).unwrap(), 250)
            .with_description("oatmeal");
        let output = format!("{}", meal);
        assert!(output.contains("2024-01-01 07:00"));
        assert!(output.contains("250 kcal"));
        assert!(output.contains("oatmeal"));
    }
}
