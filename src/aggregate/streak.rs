use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::models::UserDocument;

/// Consecutive-day meal logging runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Streak {
    pub current: u32,
    pub longest: u32,
    pub logged_today: bool,
}

pub(crate) fn logged_dates(doc: &UserDocument) -> BTreeSet<NaiveDate> {
    doc.meals.iter().map(|m| m.date).collect()
}

/// Length of the longest run of consecutive dates in `dates`.
pub(crate) fn longest_run<'a>(dates: impl IntoIterator<Item = &'a NaiveDate>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;

    for &date in dates {
        run = match prev {
            Some(p) if date - p == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(date);
    }

    longest
}

/// Length of the run that ends at the last date in `dates`.
pub(crate) fn last_run<'a>(dates: impl IntoIterator<Item = &'a NaiveDate>) -> u32 {
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;

    for &date in dates {
        run = match prev {
            Some(p) if date - p == Duration::days(1) => run + 1,
            _ => 1,
        };
        prev = Some(date);
    }

    run
}

/// Counts consecutive logged days ending today. If today has no meals the
/// run may end yesterday instead; two missed days break it.
pub fn logging_streak(doc: &UserDocument, now: NaiveDateTime) -> Streak {
    let dates = logged_dates(doc);
    let today = now.date();
    let logged_today = dates.contains(&today);

    let mut day = if logged_today {
        today
    } else {
        today - Duration::days(1)
    };
    let mut current = 0;
    while dates.contains(&day) {
        current += 1;
        day -= Duration::days(1);
    }

    Streak {
        current,
        longest: longest_run(&dates),
        logged_today,
    }
}
