use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{
    check_amount, check_text, time_format, MealEntry, ValidationError, MAX_DESCRIPTION_LEN,
    MAX_MACRO_GRAMS, MAX_MEAL_CALORIES,
};

/// A saved meal that can be logged again with one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealTemplate {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub calories: u32,
    #[serde(default)]
    pub protein: u32,
    #[serde(default)]
    pub carbs: u32,
    #[serde(default)]
    pub fat: u32,
}

impl MealTemplate {
    /// Builds the meal this template logs at `now`.
    pub fn to_meal(&self, now: NaiveDateTime) -> MealEntry {
        let description = if self.description.is_empty() {
            self.name.clone()
        } else {
            self.description.clone()
        };
        MealEntry::new(
            now.date(),
            time_format::truncate_to_minute(now.time()),
            self.calories,
        )
        .with_description(description)
        .with_macros(self.protein, self.carbs, self.fat)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateInput {
    pub name: String,
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
}

impl TemplateInput {
    pub fn validate(self, id: u32) -> Result<MealTemplate, ValidationError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::new("template name must not be empty"));
        }
        check_text("name", &name, 100)?;
        let description = self.description.trim().to_string();
        check_text("description", &description, MAX_DESCRIPTION_LEN)?;

        Ok(MealTemplate {
            id,
            name,
            description,
            calories: check_amount("calories", self.calories, MAX_MEAL_CALORIES)?,
            protein: check_amount("protein", self.protein, MAX_MACRO_GRAMS)?,
            carbs: check_amount("carbs", self.carbs, MAX_MACRO_GRAMS)?,
            fat: check_amount("fat", self.fat, MAX_MACRO_GRAMS)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_template_to_meal() {
        let template = TemplateInput {
            name: "Shake".to_string(),
            calories: 320,
            protein: 50,
            carbs: 12,
            fat: 6,
            ..Default::default()
        }
        .validate(3)
        .unwrap();

        let now = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(15, 20, 11)
            .unwrap();
        let meal = template.to_meal(now);

        assert_eq!(template.id, 3);
        assert_eq!(meal.description, "Shake");
        assert_eq!(meal.calories, 320);
        assert_eq!(meal.protein_g, 50);
        assert_eq!(meal.time.format("%H:%M").to_string(), "15:20");
    }

    #[test]
    fn test_template_requires_name() {
        assert!(TemplateInput::default().validate(1).is_err());
    }
}
