use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;

use super::weight::round1;
use crate::models::{UserDocument, WorkoutEntry};

/// The most recent performance of one lift.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestLift {
    pub name: String,
    pub weight: f64,
    pub reps: u32,
    pub estimated_1rm: f64,
    pub date: NaiveDate,
}

/// Latest performance per lift name, sorted by name.
pub fn latest_lifts(doc: &UserDocument) -> Vec<LatestLift> {
    let mut latest: BTreeMap<String, LatestLift> = BTreeMap::new();

    // Workouts are kept in (date, timestamp) order, so later ones win.
    for workout in &doc.workouts {
        for lift in &workout.lifts {
            latest.insert(
                lift.name.clone(),
                LatestLift {
                    name: lift.name.clone(),
                    weight: lift.weight,
                    reps: lift.reps,
                    estimated_1rm: round1(lift.estimated_1rm()),
                    date: workout.date,
                },
            );
        }
    }

    latest.into_values().collect()
}

/// Workouts dated within the last 7 days, oldest first.
pub fn workouts_this_week(doc: &UserDocument, now: NaiveDateTime) -> Vec<WorkoutEntry> {
    let today = now.date();
    let start = today - Duration::days(7);
    doc.workouts
        .iter()
        .filter(|w| w.date > start && w.date <= today)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Lift;

    fn workout(day: u32, lifts: Vec<Lift>) -> WorkoutEntry {
        WorkoutEntry {
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            timestamp: f64::from(day) * 86_400.0,
            lifts,
        }
    }

    fn doc() -> UserDocument {
        let mut doc = UserDocument::default();
        doc.push_workout(workout(
            2,
            vec![Lift::new("Squat", 185.0, 5), Lift::new("Bench", 135.0, 8)],
        ));
        doc.push_workout(workout(9, vec![Lift::new("Squat", 200.0, 5)]));
        doc
    }

    #[test]
    fn test_latest_lifts() {
        let lifts = latest_lifts(&doc());
        assert_eq!(lifts.len(), 2);

        assert_eq!(lifts[0].name, "Bench");
        assert_eq!(lifts[0].estimated_1rm, 171.0);

        let squat = &lifts[1];
        assert_eq!(squat.weight, 200.0);
        assert_eq!(squat.estimated_1rm, 233.3);
        assert_eq!(squat.date, NaiveDate::from_ymd_opt(2024, 5, 9).unwrap());
    }

    #[test]
    fn test_workouts_this_week() {
        let now = NaiveDate::from_ymd_opt(2024, 5, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let recent = workouts_this_week(&doc(), now);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].lifts[0].weight, 200.0);
    }
}
