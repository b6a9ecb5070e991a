use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{watch, Mutex},
    time,
};
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::{catalog::ExerciseRepository, db::CompletedTraining};
use crate::{log_debug, log_error, log_info};

use super::{
    repository::TrainingsRepository,
    state::{CompletionSummary, Step, TrainingState},
    Clock,
};

const ENABLE_LOGS: bool = true;

/// Drives one training: loads the catalog, moves between exercises and
/// saves the finished training.
///
/// Clones share state. Background work stops once the last clone is dropped.
#[derive(Clone)]
pub struct TrainingController {
    state: Arc<Mutex<TrainingState>>,
    publisher: Arc<watch::Sender<TrainingState>>,
    trainings: TrainingsRepository,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
    _cancel_on_drop: Arc<DropGuard>,
}

impl TrainingController {
    /// Start a training now and load the catalog after `load_delay`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        exercises: ExerciseRepository,
        trainings: TrainingsRepository,
        clock: Arc<dyn Clock>,
        load_delay: Duration,
    ) -> Self {
        let initial = TrainingState::new(clock.now_ms());
        let (publisher, _) = watch::channel(initial.clone());
        let cancel = CancellationToken::new();

        let controller = Self {
            state: Arc::new(Mutex::new(initial)),
            publisher: Arc::new(publisher),
            trainings,
            clock,
            _cancel_on_drop: Arc::new(cancel.clone().drop_guard()),
            cancel,
        };
        controller.spawn_load(exercises, load_delay);
        controller
    }

    /// Receiver that sees every published state, starting with the current one.
    pub fn subscribe(&self) -> watch::Receiver<TrainingState> {
        self.publisher.subscribe()
    }

    pub async fn state(&self) -> TrainingState {
        self.state.lock().await.clone()
    }

    /// Wait until the catalog load has finished one way or the other.
    pub async fn wait_loaded(&self) -> TrainingState {
        let mut receiver = self.subscribe();
        loop {
            {
                let state = receiver.borrow_and_update();
                if !state.is_loading() {
                    return state.clone();
                }
            }
            if receiver.changed().await.is_err() {
                return self.state().await;
            }
        }
    }

    pub async fn next_exercise(&self) -> TrainingState {
        let (snapshot, step) = {
            let mut state = self.state.lock().await;
            let step = state.next();
            if step == Step::Finished {
                let record = state.to_completed_training(self.clock.now_ms(), self.clock.today());
                state.completed_training = Some(CompletionSummary {
                    duration_ms: record.duration_ms,
                    made_exercise_ids: record.made_exercise_ids.clone(),
                });
                log_info!(
                    "Training finished after {} ms with {} exercises",
                    record.duration_ms,
                    record.all_exercise_ids.len()
                );
                self.spawn_save(record);
            }
            (state.clone(), step)
        };

        if step != Step::Unchanged {
            self.publish(&snapshot);
        }
        snapshot
    }

    pub async fn prev_exercise(&self) -> TrainingState {
        self.update(|state| state.prev()).await
    }

    /// Skipping moves on exactly like finishing the exercise.
    pub async fn skip_exercise(&self) -> TrainingState {
        self.next_exercise().await
    }

    pub async fn reset_training(&self) -> TrainingState {
        let now_ms = self.clock.now_ms();
        self.update(move |state| state.reset(now_ms)).await
    }

    async fn update<F>(&self, transition: F) -> TrainingState
    where
        F: FnOnce(&mut TrainingState) -> Step,
    {
        let (snapshot, step) = {
            let mut state = self.state.lock().await;
            let step = transition(&mut state);
            (state.clone(), step)
        };

        if step != Step::Unchanged {
            self.publish(&snapshot);
        }
        snapshot
    }

    fn publish(&self, snapshot: &TrainingState) {
        // Sent even without subscribers so late subscribers see the latest state.
        self.publisher.send_replace(snapshot.clone());
    }

    fn spawn_load(&self, exercises: ExerciseRepository, load_delay: Duration) {
        let state = self.state.clone();
        let publisher = self.publisher.clone();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            let load = tokio::select! {
                _ = cancel.cancelled() => {
                    log_debug!("Training dropped before the catalog loaded");
                    return;
                }
                load = async {
                    time::sleep(load_delay).await;
                    exercises.load_exercises().await
                } => load,
            };

            let snapshot = {
                let mut guard = state.lock().await;
                guard.apply_catalog(load);
                guard.clone()
            };
            publisher.send_replace(snapshot);
        });
    }

    fn spawn_save(&self, record: CompletedTraining) {
        let trainings = self.trainings.clone();
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    log_error!("Training dropped before the completed training was saved");
                }
                result = trainings.insert_training(&record) => match result {
                    Ok(id) => log_info!("Saved completed training {id}"),
                    Err(err) => log_error!("Failed to save completed training: {err:#}"),
                },
            }
        });
    }
}
