use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::models::{UserDocument, WeightEntry};

/// Weight of the chronologically last entry.
pub fn current_weight(doc: &UserDocument) -> Option<f64> {
    doc.weights
        .iter()
        .max_by_key(|w| w.recorded_at())
        .map(|w| w.weight_lb)
}

/// Last minus first reading among entries recorded in the trailing 7 days.
/// Zero when there are fewer than two such entries.
pub fn weekly_weight_change(doc: &UserDocument, now: NaiveDateTime) -> f64 {
    let cutoff = now - Duration::days(7);
    let mut recent: Vec<&WeightEntry> = doc
        .weights
        .iter()
        .filter(|w| {
            let at = w.recorded_at();
            at > cutoff && at <= now
        })
        .collect();
    recent.sort_by_key(|w| w.recorded_at());

    match (recent.first(), recent.last()) {
        (Some(first), Some(last)) if recent.len() >= 2 => last.weight_lb - first.weight_lb,
        _ => 0.0,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightStats {
    pub current: Option<f64>,
    pub starting: Option<f64>,
    pub change: f64,
    pub average: Option<f64>,
    pub entries: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeightHistory {
    pub history: Vec<WeightEntry>,
    pub stats: WeightStats,
}

/// Weight entries, optionally limited to the last `days` days, with stats.
pub fn weight_history(doc: &UserDocument, now: NaiveDateTime, days: Option<u32>) -> WeightHistory {
    let history: Vec<WeightEntry> = match days {
        Some(days) => {
            let cutoff = now
                .date()
                .checked_sub_signed(Duration::days(i64::from(days)))
                .unwrap_or(NaiveDate::MIN);
            doc.weights
                .iter()
                .filter(|w| w.date >= cutoff)
                .cloned()
                .collect()
        }
        None => doc.weights.clone(),
    };

    let current = history.last().map(|w| w.weight_lb);
    let starting = history.first().map(|w| w.weight_lb);
    let change = match (current, starting) {
        (Some(c), Some(s)) => round1(c - s),
        _ => 0.0,
    };
    let average = if history.is_empty() {
        None
    } else {
        Some(round1(
            history.iter().map(|w| w.weight_lb).sum::<f64>() / history.len() as f64,
        ))
    };

    WeightHistory {
        stats: WeightStats {
            current,
            starting,
            change,
            average,
            entries: history.len(),
        },
        history,
    }
}

pub(crate) fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
