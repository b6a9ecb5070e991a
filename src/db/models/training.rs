//! Completed-training records and their presentation mapping.

use std::collections::HashSet;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A finished pass through the exercise catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTraining {
    /// Auto-assigned row id; `0` until the record has been inserted.
    pub id: i64,
    pub duration_ms: u64,
    pub start_time_ms: i64,
    pub end_time_ms: i64,
    pub made_exercise_ids: Vec<i64>,
    pub all_exercise_ids: Vec<i64>,
    pub progress: f32,
    pub date: NaiveDate,
}

impl CompletedTraining {
    /// Build an unsaved record, deriving `duration_ms` and `progress`.
    pub fn new(
        start_time_ms: i64,
        end_time_ms: i64,
        all_exercise_ids: Vec<i64>,
        made_exercise_ids: Vec<i64>,
        date: NaiveDate,
    ) -> Self {
        let duration_ms = end_time_ms.saturating_sub(start_time_ms).max(0) as u64;
        let progress = progress_ratio(made_exercise_ids.len(), all_exercise_ids.len());

        Self {
            id: 0,
            duration_ms,
            start_time_ms,
            end_time_ms,
            made_exercise_ids,
            all_exercise_ids,
            progress,
            date,
        }
    }

    /// Both id lists must be free of repeats, made ids must be a subset of all
    /// ids and `progress` must match their ratio.
    pub fn validate(&self) -> Result<()> {
        if let Some(id) = first_repeat(&self.all_exercise_ids) {
            bail!("exercise {id} appears more than once in the training");
        }
        if let Some(id) = first_repeat(&self.made_exercise_ids) {
            bail!("exercise {id} is marked as made more than once");
        }

        let all: HashSet<i64> = self.all_exercise_ids.iter().copied().collect();
        if let Some(stray) = self
            .made_exercise_ids
            .iter()
            .find(|id| !all.contains(id))
        {
            bail!("made exercise {stray} is not part of the training");
        }

        let expected = progress_ratio(self.made_exercise_ids.len(), self.all_exercise_ids.len());
        if (self.progress - expected).abs() > f32::EPSILON {
            bail!(
                "training progress {} does not match {}/{} exercises",
                self.progress,
                self.made_exercise_ids.len(),
                self.all_exercise_ids.len()
            );
        }

        Ok(())
    }
}

fn first_repeat(ids: &[i64]) -> Option<i64> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().find(|id| !seen.insert(*id))
}

fn progress_ratio(made: usize, all: usize) -> f32 {
    if all == 0 {
        0.0
    } else {
        made as f32 / all as f32
    }
}

/// Display-oriented view of a [`CompletedTraining`] with progress as a percentage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrainingInfo {
    pub id: i64,
    pub date: NaiveDate,
    pub progress: i32,
    pub time_start: i64,
    pub time_end: i64,
    pub duration: u64,
    pub all_exercises_id: Vec<i64>,
    pub made_exercises_id: Vec<i64>,
}

impl From<CompletedTraining> for TrainingInfo {
    fn from(training: CompletedTraining) -> Self {
        Self {
            id: training.id,
            date: training.date,
            progress: (training.progress * 100.0) as i32,
            time_start: training.start_time_ms,
            time_end: training.end_time_ms,
            duration: training.duration_ms,
            all_exercises_id: training.all_exercise_ids,
            made_exercises_id: training.made_exercise_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
    }

    #[test]
    fn new_derives_duration_and_progress() {
        let training = CompletedTraining::new(1_000, 91_000, vec![1, 2, 3, 4], vec![1, 3], day());
        assert_eq!(training.id, 0);
        assert_eq!(training.duration_ms, 90_000);
        assert!((training.progress - 0.5).abs() < f32::EPSILON);
        training.validate().unwrap();
    }

    #[test]
    fn empty_training_has_zero_progress() {
        let training = CompletedTraining::new(0, 0, vec![], vec![], day());
        assert_eq!(training.progress, 0.0);
        training.validate().unwrap();
    }

    #[test]
    fn validate_rejects_stray_made_ids() {
        let mut training = CompletedTraining::new(0, 10, vec![1, 2], vec![2], day());
        training.made_exercise_ids = vec![2, 7];
        training.progress = 1.0;
        assert!(training.validate().is_err());
    }

    #[test]
    fn validate_rejects_repeated_ids() {
        let mut repeated_made = CompletedTraining::new(0, 1, vec![1, 2], vec![1], day());
        repeated_made.made_exercise_ids = vec![1, 1];
        repeated_made.progress = 1.0;
        assert!(repeated_made.validate().is_err());

        let repeated_all = CompletedTraining::new(0, 1, vec![3, 3], vec![3], day());
        assert!(repeated_all.validate().is_err());

        let distinct = CompletedTraining::new(0, 1, vec![2, 1], vec![1], day());
        assert!(distinct.validate().is_ok());
    }

    #[test]
    fn validate_rejects_inconsistent_progress() {
        let mut training = CompletedTraining::new(0, 10, vec![1, 2], vec![1, 2], day());
        training.progress = 0.25;
        assert!(training.validate().is_err());
    }

    #[test]
    fn info_truncates_progress_percentage() {
        let training = CompletedTraining::new(0, 10, vec![1, 2, 3], vec![1, 2], day());
        let info = TrainingInfo::from(training);
        assert_eq!(info.progress, 66);
        assert_eq!(info.duration, 10);
    }
}
