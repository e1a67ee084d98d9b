//! Serialized read-modify-write access to user documents.
//!
//! Every mutation takes the user's lock, loads the document, applies the
//! change in memory and saves the whole document back. If the change fails
//! nothing is saved, so a mutation is never partially applied.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::Serialize;
use std::path::PathBuf;

use crate::error::{JournalError, Result};
use crate::models::{
    GoalPlan, GoalUpdate, MealEntry, MealInput, MealTemplate, PhotoEntry, PhotoInput, Settings,
    TemplateInput, UserDocument, WeightEntry, WeightInput, WorkoutEntry, WorkoutInput,
};
use crate::store::{DocumentStore, UserId, UserLocks};

/// Export envelope for a user's full document.
#[derive(Debug, Clone, Serialize)]
pub struct Export {
    pub exported_at: NaiveDateTime,
    pub version: &'static str,
    pub data: UserDocument,
}

#[derive(Debug)]
pub struct Journal {
    store: DocumentStore,
    locks: UserLocks,
}

impl Journal {
    pub fn new(store: DocumentStore) -> Self {
        Self {
            store,
            locks: UserLocks::new(),
        }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Loads a user's document for read-only use.
    ///
    /// Takes the lock too, since the first load of a new user writes the
    /// initial document.
    pub async fn read(&self, user: &UserId) -> Result<UserDocument> {
        let _guard = self.locks.lock(user).await;
        Ok(self.store.load(user)?)
    }

    /// Runs `f` against the user's document and saves the result.
    pub async fn update<T, F>(&self, user: &UserId, f: F) -> Result<T>
    where
        F: FnOnce(&mut UserDocument) -> Result<T>,
    {
        let _guard = self.locks.lock(user).await;
        let mut doc = self.store.load(user)?;
        let out = f(&mut doc)?;
        self.store.save(user, &doc)?;
        Ok(out)
    }

    pub async fn log_meal(
        &self,
        user: &UserId,
        input: MealInput,
        now: NaiveDateTime,
    ) -> Result<MealEntry> {
        let meal = input.validate(now)?;
        self.update(user, |doc| {
            doc.push_meal(meal.clone());
            Ok(meal)
        })
        .await
    }

    /// Deletes the meal at `index` in the date/time-sorted meal list.
    pub async fn delete_meal(&self, user: &UserId, index: usize) -> Result<MealEntry> {
        self.update(user, |doc| {
            doc.remove_meal(index)
                .ok_or_else(|| JournalError::not_found(format!("meal at position {}", index)))
        })
        .await
    }

    pub async fn log_weight(
        &self,
        user: &UserId,
        input: WeightInput,
        now: NaiveDateTime,
    ) -> Result<WeightEntry> {
        let entry = input.validate(now)?;
        self.update(user, |doc| {
            doc.push_weight(entry.clone());
            Ok(entry)
        })
        .await
    }

    pub async fn log_workout(
        &self,
        user: &UserId,
        input: WorkoutInput,
        at: DateTime<FixedOffset>,
    ) -> Result<WorkoutEntry> {
        let workout = input.validate(at)?;
        self.update(user, |doc| {
            doc.push_workout(workout.clone());
            Ok(workout)
        })
        .await
    }

    pub async fn update_goals(&self, user: &UserId, update: GoalUpdate) -> Result<Settings> {
        self.update(user, |doc| {
            update.apply(&mut doc.settings)?;
            Ok(doc.settings.clone())
        })
        .await
    }

    /// Stores a goal plan and adopts its calorie/protein targets.
    pub async fn save_goal_plan(
        &self,
        user: &UserId,
        plan: GoalPlan,
        now: NaiveDateTime,
    ) -> Result<Settings> {
        plan.validate(now.date())?;
        self.update(user, |doc| {
            doc.settings.daily_calorie_goal = plan.daily_calorie_goal;
            if let Some(protein) = plan.daily_protein_goal {
                doc.settings.daily_protein_goal = protein;
            }
            doc.settings.onboarded = true;
            doc.goal_plan = Some(plan);
            Ok(doc.settings.clone())
        })
        .await
    }

    /// Backs up the current document, then resets it to defaults.
    ///
    /// Returns the backup path.
    pub async fn clear_all(&self, user: &UserId, now: NaiveDateTime) -> Result<PathBuf> {
        let _guard = self.locks.lock(user).await;
        let doc = self.store.load(user)?;
        let backup = self.store.save_backup(user, &doc, now)?;
        self.store.save(user, &UserDocument::default())?;
        tracing::info!(user = %user, backup = %backup.display(), "cleared all data");
        Ok(backup)
    }

    pub async fn add_template(&self, user: &UserId, input: TemplateInput) -> Result<MealTemplate> {
        self.update(user, |doc| {
            let template = input.validate(doc.next_template_id())?;
            doc.meal_templates.push(template.clone());
            Ok(template)
        })
        .await
    }

    pub async fn delete_template(&self, user: &UserId, id: u32) -> Result<MealTemplate> {
        self.update(user, |doc| {
            doc.remove_template(id)
                .ok_or_else(|| JournalError::not_found(format!("meal template {}", id)))
        })
        .await
    }

    pub async fn log_from_template(
        &self,
        user: &UserId,
        id: u32,
        now: NaiveDateTime,
    ) -> Result<MealEntry> {
        self.update(user, |doc| {
            let meal = doc
                .template(id)
                .map(|t| t.to_meal(now))
                .ok_or_else(|| JournalError::not_found(format!("meal template {}", id)))?;
            doc.push_meal(meal.clone());
            Ok(meal)
        })
        .await
    }

    pub async fn add_photo(
        &self,
        user: &UserId,
        input: PhotoInput,
        now: NaiveDateTime,
    ) -> Result<PhotoEntry> {
        let photo = input.validate(now)?;
        self.update(user, |doc| {
            doc.push_photo(photo.clone());
            Ok(photo)
        })
        .await
    }

    pub async fn export(&self, user: &UserId, now: NaiveDateTime) -> Result<Export> {
        Ok(Export {
            exported_at: now,
            version: "1.0",
            data: self.read(user).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn setup() -> (Journal, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let journal = Journal::new(DocumentStore::new(temp_dir.path()));
        (journal, temp_dir)
    }

    fn alice() -> UserId {
        UserId::parse("alice").unwrap()
    }

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn meal_input(calories: i64) -> MealInput {
        MealInput {
            calories,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_log_meal_persists_sorted() {
        let (journal, _temp) = setup();

        journal.log_meal(&alice(), meal_input(400), at(2, 9, 0)).await.unwrap();
        journal.log_meal(&alice(), meal_input(300), at(1, 8, 0)).await.unwrap();
        journal.log_meal(&alice(), meal_input(500), at(1, 12, 30)).await.unwrap();

        let doc = journal.read(&alice()).await.unwrap();
        let calories: Vec<u32> = doc.meals.iter().map(|m| m.calories).collect();
        assert_eq!(calories, vec![300, 500, 400]);
    }

    #[tokio::test]
    async fn test_invalid_meal_changes_nothing() {
        let (journal, _temp) = setup();
        journal.log_meal(&alice(), meal_input(400), at(1, 9, 0)).await.unwrap();

        let err = journal
            .log_meal(&alice(), meal_input(-20), at(1, 10, 0))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert_eq!(journal.read(&alice()).await.unwrap().meals.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_meal() {
        let (journal, _temp) = setup();
        journal.log_meal(&alice(), meal_input(100), at(1, 9, 0)).await.unwrap();
        journal.log_meal(&alice(), meal_input(200), at(1, 10, 0)).await.unwrap();

        let deleted = journal.delete_meal(&alice(), 0).await.unwrap();
        assert_eq!(deleted.calories, 100);

        let err = journal.delete_meal(&alice(), 5).await.unwrap_err();
        assert!(matches!(err, JournalError::NotFound(_)));
        assert_eq!(journal.read(&alice()).await.unwrap().meals.len(), 1);
    }

    #[tokio::test]
    async fn test_update_goals() {
        let (journal, _temp) = setup();
        let settings = journal
            .update_goals(
                &alice(),
                GoalUpdate {
                    calories: Some(1900),
                    onboarded: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(settings.daily_calorie_goal, 1900);
        assert!(journal.read(&alice()).await.unwrap().settings.onboarded);
    }

    #[tokio::test]
    async fn test_save_goal_plan_adopts_targets() {
        let (journal, _temp) = setup();
        let plan = GoalPlan {
            started_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            starting_weight: 225.0,
            goal_weight: 205.0,
            target_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            daily_calorie_goal: 2050,
            daily_protein_goal: Some(215),
        };

        let settings = journal
            .save_goal_plan(&alice(), plan.clone(), at(20, 9, 0))
            .await
            .unwrap();
        assert_eq!(settings.daily_calorie_goal, 2050);
        assert_eq!(settings.daily_protein_goal, 215);

        let doc = journal.read(&alice()).await.unwrap();
        assert_eq!(doc.goal_plan, Some(plan));
    }

    #[tokio::test]
    async fn test_clear_all_backs_up_first() {
        let (journal, _temp) = setup();
        journal.log_meal(&alice(), meal_input(700), at(1, 9, 0)).await.unwrap();
        journal
            .log_weight(
                &alice(),
                WeightInput {
                    weight: 220.0,
                    ..Default::default()
                },
                at(1, 7, 0),
            )
            .await
            .unwrap();

        let backup = journal.clear_all(&alice(), at(1, 20, 0)).await.unwrap();

        let cleared = journal.read(&alice()).await.unwrap();
        assert_eq!(cleared, UserDocument::default());

        let saved: UserDocument =
            serde_json::from_slice(&std::fs::read(backup).unwrap()).unwrap();
        assert_eq!(saved.meals.len(), 1);
        assert_eq!(saved.weights.len(), 1);
    }

    #[tokio::test]
    async fn test_templates() {
        let (journal, _temp) = setup();
        let template = journal
            .add_template(
                &alice(),
                TemplateInput {
                    name: "Chicken bowl".to_string(),
                    calories: 650,
                    protein: 55,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(template.id, 1);

        let meal = journal
            .log_from_template(&alice(), template.id, at(3, 12, 0))
            .await
            .unwrap();
        assert_eq!(meal.calories, 650);
        assert_eq!(meal.description, "Chicken bowl");

        assert!(journal.log_from_template(&alice(), 99, at(3, 12, 0)).await.is_err());
        journal.delete_template(&alice(), 1).await.unwrap();
        assert!(journal.delete_template(&alice(), 1).await.is_err());

        let doc = journal.read(&alice()).await.unwrap();
        assert_eq!(doc.meals.len(), 1);
        assert!(doc.meal_templates.is_empty());
    }

    #[tokio::test]
    async fn test_export() {
        let (journal, _temp) = setup();
        journal.log_meal(&alice(), meal_input(250), at(1, 9, 0)).await.unwrap();

        let export = journal.export(&alice(), at(2, 0, 0)).await.unwrap();
        assert_eq!(export.version, "1.0");
        assert_eq!(export.data.meals.len(), 1);
    }

    #[tokio::test]
    async fn test_unserialized_writes_lose_updates() {
        // Two load→mutate→save cycles that bypass the journal: the later
        // save silently discards the earlier one.
        let (journal, _temp) = setup();
        let store = journal.store();
        let user = alice();

        let mut first = store.load(&user).unwrap();
        let mut second = store.load(&user).unwrap();
        first.push_meal(meal_input(100).validate(at(1, 8, 0)).unwrap());
        second.push_meal(meal_input(200).validate(at(1, 9, 0)).unwrap());
        store.save(&user, &first).unwrap();
        store.save(&user, &second).unwrap();

        let doc = store.load(&user).unwrap();
        assert_eq!(doc.meals.len(), 1);
        assert_eq!(doc.meals[0].calories, 200);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_are_serialized() {
        let (journal, _temp) = setup();
        let journal = Arc::new(journal);

        let mut handles = Vec::new();
        for i in 0..32 {
            let journal = journal.clone();
            handles.push(tokio::spawn(async move {
                journal
                    .log_meal(&alice(), meal_input(i), at(1, 8, (i % 60) as u32))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let doc = journal.read(&alice()).await.unwrap();
        assert_eq!(doc.meals.len(), 32);
    }
}
