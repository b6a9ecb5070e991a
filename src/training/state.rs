use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    catalog::{CatalogLoad, ExerciseInfo},
    db::CompletedTraining,
};

pub const NO_EXERCISES_MESSAGE: &str = "No exercises found";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TrainingStatus {
    #[default]
    Loading,
    InProgress,
    Completed,
    Error,
}

/// What finishing a training produced, shown on the success screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompletionSummary {
    pub duration_ms: u64,
    pub made_exercise_ids: Vec<i64>,
}

/// Result of a navigation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Moved,
    /// The last exercise was passed; the training must be saved.
    Finished,
    Unchanged,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrainingState {
    pub status: TrainingStatus,
    pub exercises: Vec<ExerciseInfo>,
    pub current_index: usize,
    pub current_exercise: Option<ExerciseInfo>,
    pub error: Option<String>,
    pub is_completed: bool,
    pub started_at_ms: i64,
    pub completed_training: Option<CompletionSummary>,
}

impl TrainingState {
    pub fn new(started_at_ms: i64) -> Self {
        Self {
            status: TrainingStatus::Loading,
            exercises: Vec::new(),
            current_index: 0,
            current_exercise: None,
            error: None,
            is_completed: false,
            started_at_ms,
            completed_training: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == TrainingStatus::Loading
    }

    /// Leave `Loading` according to the catalog outcome. Ignored once loaded.
    pub fn apply_catalog(&mut self, load: CatalogLoad) {
        if !self.is_loading() {
            return;
        }

        if let CatalogLoad::Failed(reason) = &load {
            self.fail(reason.clone());
            return;
        }

        let Some(first) = load.exercises().first().cloned() else {
            self.fail(NO_EXERCISES_MESSAGE);
            return;
        };
        self.exercises = load.exercises().to_vec();
        self.current_index = 0;
        self.current_exercise = Some(first);
        self.status = TrainingStatus::InProgress;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = TrainingStatus::Error;
        self.error = Some(message.into());
    }

    pub fn next(&mut self) -> Step {
        if self.status != TrainingStatus::InProgress {
            return Step::Unchanged;
        }

        if self.current_index + 1 < self.exercises.len() {
            self.select(self.current_index + 1);
            Step::Moved
        } else {
            self.status = TrainingStatus::Completed;
            self.is_completed = true;
            Step::Finished
        }
    }

    pub fn prev(&mut self) -> Step {
        if self.status != TrainingStatus::InProgress || self.current_index == 0 {
            return Step::Unchanged;
        }

        self.select(self.current_index - 1);
        Step::Moved
    }

    /// Restart from the first exercise with a fresh start time.
    pub fn reset(&mut self, now_ms: i64) -> Step {
        if !matches!(
            self.status,
            TrainingStatus::InProgress | TrainingStatus::Completed
        ) {
            return Step::Unchanged;
        }

        self.started_at_ms = now_ms;
        self.select(0);
        self.is_completed = false;
        self.status = TrainingStatus::InProgress;
        Step::Moved
    }

    pub fn exercise_ids(&self) -> Vec<i64> {
        self.exercises.iter().map(|exercise| exercise.id).collect()
    }

    /// Record for a training that ends at `end_ms` on `date`.
    ///
    /// Every catalog exercise counts as made; skipped exercises are not tracked.
    pub fn to_completed_training(&self, end_ms: i64, date: NaiveDate) -> CompletedTraining {
        let ids = self.exercise_ids();
        CompletedTraining::new(self.started_at_ms, end_ms, ids.clone(), ids, date)
    }

    fn select(&mut self, index: usize) {
        self.current_index = index;
        self.current_exercise = self.exercises.get(index).cloned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(id: i64) -> ExerciseInfo {
        ExerciseInfo {
            id,
            name: format!("E{id}"),
            description: String::new(),
            video_id: format!("video_{id}"),
            times_to_do: 1,
        }
    }

    fn loaded(count: i64) -> TrainingState {
        let mut state = TrainingState::new(1_000);
        state.apply_catalog(CatalogLoad::Loaded((1..=count).map(exercise).collect()));
        state
    }

    #[test]
    fn loading_success_selects_first_exercise() {
        let state = loaded(3);
        assert_eq!(state.status, TrainingStatus::InProgress);
        assert_eq!(state.current_index, 0);
        assert_eq!(state.current_exercise, Some(exercise(1)));
    }

    #[test]
    fn empty_and_failed_catalogs_become_errors() {
        let mut empty = TrainingState::new(0);
        empty.apply_catalog(CatalogLoad::Empty);
        assert_eq!(empty.status, TrainingStatus::Error);
        assert_eq!(empty.error.as_deref(), Some(NO_EXERCISES_MESSAGE));

        let mut failed = TrainingState::new(0);
        failed.apply_catalog(CatalogLoad::Failed("disk on fire".into()));
        assert_eq!(failed.status, TrainingStatus::Error);
        assert_eq!(failed.error.as_deref(), Some("disk on fire"));
        assert_eq!(failed.next(), Step::Unchanged);

        let mut loaded_but_empty = TrainingState::new(0);
        loaded_but_empty.apply_catalog(CatalogLoad::Loaded(Vec::new()));
        assert_eq!(loaded_but_empty.error.as_deref(), Some(NO_EXERCISES_MESSAGE));
    }

    #[test]
    fn new_state_starts_loading() {
        let state = TrainingState::new(0);
        assert_eq!(state.status, TrainingStatus::default());
        assert!(state.is_loading());
    }

    #[test]
    fn next_walks_then_finishes_on_last() {
        let mut state = loaded(3);
        assert_eq!(state.next(), Step::Moved);
        assert_eq!(state.next(), Step::Moved);
        assert_eq!(state.current_exercise, Some(exercise(3)));

        assert_eq!(state.next(), Step::Finished);
        assert!(state.is_completed);
        assert_eq!(state.status, TrainingStatus::Completed);
        assert_eq!(state.current_exercise, Some(exercise(3)));

        // A finished training is not finished twice.
        assert_eq!(state.next(), Step::Unchanged);
    }

    #[test]
    fn prev_at_first_exercise_is_a_noop() {
        let mut state = loaded(3);
        let before = state.clone();
        assert_eq!(state.prev(), Step::Unchanged);
        assert_eq!(state, before);

        state.next();
        assert_eq!(state.prev(), Step::Moved);
        assert_eq!(state.current_index, 0);
    }

    #[test]
    fn reset_after_completion_restores_first_exercise() {
        for walked in 1..=4 {
            let mut state = loaded(4);
            for _ in 0..walked {
                state.next();
            }
            assert_eq!(state.reset(9_000), Step::Moved);
            assert_eq!(state.current_exercise, Some(exercise(1)));
            assert!(!state.is_completed);
            assert_eq!(state.status, TrainingStatus::InProgress);
            assert_eq!(state.started_at_ms, 9_000);
        }
    }

    #[test]
    fn reset_while_loading_is_ignored() {
        let mut state = TrainingState::new(5);
        assert_eq!(state.reset(10), Step::Unchanged);
        assert!(state.is_loading());
        assert_eq!(state.started_at_ms, 5);
    }

    #[test]
    fn completed_training_marks_everything_made() {
        let mut state = loaded(3);
        for _ in 0..3 {
            state.next();
        }
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let training = state.to_completed_training(61_000, date);
        assert_eq!(training.all_exercise_ids, vec![1, 2, 3]);
        assert_eq!(training.made_exercise_ids, vec![1, 2, 3]);
        assert_eq!(training.progress, 1.0);
        assert_eq!(training.duration_ms, 60_000);
        assert_eq!(training.date, date);
    }
}
