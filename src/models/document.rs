use serde::{Deserialize, Serialize};

use super::{
    GoalPlan, MealEntry, MealTemplate, PhotoEntry, Settings, WeightEntry, WorkoutEntry,
};

/// Top-level keys that mark a JSON object as a journal document.
pub const RECOGNIZED_KEYS: [&str; 5] = [
    "meals",
    "weight_history",
    "workouts",
    "settings",
    "progress_photos",
];

/// Everything stored for one user. This is the unit of persistence: it is
/// always read and written whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(default)]
    pub meals: Vec<MealEntry>,
    #[serde(rename = "weight_history", default)]
    pub weights: Vec<WeightEntry>,
    #[serde(default)]
    pub workouts: Vec<WorkoutEntry>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub progress_photos: Vec<PhotoEntry>,
    #[serde(default)]
    pub meal_templates: Vec<MealTemplate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_plan: Option<GoalPlan>,
}

impl UserDocument {
    /// Re-establishes chronological order of every entry list.
    ///
    /// All sorts are stable, so entries sharing a timestamp keep their
    /// insertion order.
    pub fn normalize(&mut self) {
        self.meals.sort_by_key(|m| (m.date, m.time));
        self.weights.sort_by_key(|w| (w.date, w.time));
        self.workouts
            .sort_by(|a, b| a.date.cmp(&b.date).then(a.timestamp.total_cmp(&b.timestamp)));
        self.progress_photos.sort_by_key(|p| p.date);
    }

    pub fn push_meal(&mut self, meal: MealEntry) {
        self.meals.push(meal);
        self.meals.sort_by_key(|m| (m.date, m.time));
    }

    pub fn push_weight(&mut self, entry: WeightEntry) {
        self.weights.push(entry);
        self.weights.sort_by_key(|w| (w.date, w.time));
    }

    pub fn push_workout(&mut self, workout: WorkoutEntry) {
        self.workouts.push(workout);
        self.workouts
            .sort_by(|a, b| a.date.cmp(&b.date).then(a.timestamp.total_cmp(&b.timestamp)));
    }

    pub fn push_photo(&mut self, photo: PhotoEntry) {
        self.progress_photos.push(photo);
        self.progress_photos.sort_by_key(|p| p.date);
    }

    /// Removes the meal at `index` (position in the sorted list).
    pub fn remove_meal(&mut self, index: usize) -> Option<MealEntry> {
        if index < self.meals.len() {
            Some(self.meals.remove(index))
        } else {
            None
        }
    }

    pub fn next_template_id(&self) -> u32 {
        self.meal_templates
            .iter()
            .map(|t| t.id)
            .max()
            .unwrap_or(0)
            + 1
    }

    pub fn template(&self, id: u32) -> Option<&MealTemplate> {
        self.meal_templates.iter().find(|t| t.id == id)
    }

    pub fn remove_template(&mut self, id: u32) -> Option<MealTemplate> {
        let pos = self.meal_templates.iter().position(|t| t.id == id)?;
        Some(self.meal_templates.remove(pos))
    }
}
