//! Statistics derived from the completed trainings.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::CompletedTraining;

pub mod views;

pub use views::{DayView, StatsView};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrainingStats {
    pub total_trainings: usize,
    pub total_minutes: u64,
    pub total_completed_exercises: usize,
    pub current_streak: u32,
    pub best_streak: u32,
}

impl TrainingStats {
    pub fn from_trainings(trainings: &[CompletedTraining], today: NaiveDate) -> Self {
        Self {
            total_trainings: total_trainings(trainings),
            total_minutes: total_minutes(trainings),
            total_completed_exercises: total_completed_exercises(trainings),
            current_streak: current_streak(trainings, today),
            best_streak: best_streak(trainings),
        }
    }
}

pub fn total_trainings(trainings: &[CompletedTraining]) -> usize {
    trainings.len()
}

/// Whole minutes per training, summed. Each training is truncated on its own,
/// so 1.5 min + 2.5 min gives 3, not 4.
pub fn total_minutes(trainings: &[CompletedTraining]) -> u64 {
    trainings
        .iter()
        .map(|training| training.duration_ms / 1000 / 60)
        .sum()
}

pub fn total_completed_exercises(trainings: &[CompletedTraining]) -> usize {
    trainings
        .iter()
        .map(|training| training.made_exercise_ids.len())
        .sum()
}

pub fn trainings_on(trainings: &[CompletedTraining], date: NaiveDate) -> Vec<CompletedTraining> {
    trainings
        .iter()
        .filter(|training| training.date == date)
        .cloned()
        .collect()
}

fn training_days(trainings: &[CompletedTraining]) -> BTreeSet<NaiveDate> {
    trainings.iter().map(|training| training.date).collect()
}

/// Consecutive training days ending today, or yesterday while today has no
/// training yet.
pub fn current_streak(trainings: &[CompletedTraining], today: NaiveDate) -> u32 {
    let days = training_days(trainings);

    let mut cursor = if days.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) if days.contains(&yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut streak = 0;
    while days.contains(&cursor) {
        streak += 1;
        match cursor.pred_opt() {
            Some(previous) => cursor = previous,
            None => break,
        }
    }
    streak
}

/// Longest run of consecutive training days.
pub fn best_streak(trainings: &[CompletedTraining]) -> u32 {
    let mut best = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for day in training_days(trainings) {
        run = match previous.and_then(|p| p.succ_opt()) {
            Some(expected) if expected == day => run + 1,
            _ => 1,
        };
        best = best.max(run);
        previous = Some(day);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    fn training(date: NaiveDate, duration_ms: i64) -> CompletedTraining {
        CompletedTraining::new(0, duration_ms, vec![1, 2], vec![1, 2], date)
    }

    #[test]
    fn empty_collection_yields_zeros() {
        assert_eq!(
            TrainingStats::from_trainings(&[], day(1)),
            TrainingStats::default()
        );
    }

    #[test]
    fn minutes_truncate_per_training() {
        let trainings = vec![training(day(1), 90_000), training(day(1), 150_000)];
        assert_eq!(total_minutes(&trainings), 3);
        assert_eq!(total_trainings(&trainings), 2);
        assert_eq!(total_completed_exercises(&trainings), 4);
    }

    #[test]
    fn filters_by_day() {
        let trainings = vec![training(day(1), 1), training(day(2), 2), training(day(1), 3)];
        let first = trainings_on(&trainings, day(1));
        assert_eq!(first.len(), 2);
        assert!(trainings_on(&trainings, day(9)).is_empty());
    }

    #[test]
    fn streaks_count_consecutive_days() {
        let trainings: Vec<_> = [1, 2, 3, 5, 6, 6, 10, 11]
            .into_iter()
            .map(|d| training(day(d), 1))
            .collect();

        assert_eq!(best_streak(&trainings), 3);
        assert_eq!(current_streak(&trainings, day(11)), 2);
        // Today not trained yet, yesterday was.
        assert_eq!(current_streak(&trainings, day(12)), 2);
        assert_eq!(current_streak(&trainings, day(13)), 0);
        assert_eq!(current_streak(&trainings, day(6)), 2);
    }
}
