use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use tokio::sync::watch;

use super::{trainings_on, TrainingStats};
use crate::{
    db::{live::TaskGuard, CompletedTraining, LiveQuery, TrainingInfo},
    training::Clock,
};

/// [`TrainingStats`] recomputed whenever the stored trainings change.
#[derive(Clone)]
pub struct StatsView {
    stats: LiveQuery<TrainingStats>,
}

impl StatsView {
    /// `trainings` should be the full collection.
    pub fn new(mut trainings: LiveQuery<Vec<CompletedTraining>>, clock: Arc<dyn Clock>) -> Self {
        let initial = TrainingStats::from_trainings(&trainings.current(), clock.today());
        let (publisher, receiver) = watch::channel(initial);

        let handle = tokio::spawn(async move {
            while let Ok(all) = trainings.changed().await {
                let stats = TrainingStats::from_trainings(&all, clock.today());
                if publisher.send(stats).is_err() {
                    break;
                }
            }
        });

        Self {
            stats: LiveQuery::from_parts(receiver, TaskGuard::new(handle)),
        }
    }

    pub fn current(&self) -> TrainingStats {
        self.stats.current()
    }

    pub async fn changed(&mut self) -> Result<TrainingStats> {
        self.stats.changed().await
    }

    pub async fn wait_for<P>(&mut self, predicate: P) -> Result<TrainingStats>
    where
        P: FnMut(&TrainingStats) -> bool,
    {
        self.stats.wait_for(predicate).await
    }
}

/// Trainings of one selected day, ordered by start time.
///
/// Re-derived when the trainings change and when another day is selected.
pub struct DayView {
    selected: watch::Sender<NaiveDate>,
    trainings: LiveQuery<Vec<TrainingInfo>>,
}

impl DayView {
    pub fn new(mut all: LiveQuery<Vec<CompletedTraining>>, date: NaiveDate) -> Self {
        let (selected, mut dates) = watch::channel(date);
        let (publisher, receiver) = watch::channel(day_infos(&all.current(), date));

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = all.changed() => if changed.is_err() { break },
                    changed = dates.changed() => if changed.is_err() { break },
                }

                let date = *dates.borrow_and_update();
                if publisher.send(day_infos(&all.current(), date)).is_err() {
                    break;
                }
            }
        });

        Self {
            selected,
            trainings: LiveQuery::from_parts(receiver, TaskGuard::new(handle)),
        }
    }

    pub fn date(&self) -> NaiveDate {
        *self.selected.borrow()
    }

    pub fn select_date(&self, date: NaiveDate) {
        self.selected.send_replace(date);
    }

    pub fn current(&self) -> Vec<TrainingInfo> {
        self.trainings.current()
    }

    pub async fn changed(&mut self) -> Result<Vec<TrainingInfo>> {
        self.trainings.changed().await
    }

    pub async fn wait_for<P>(&mut self, predicate: P) -> Result<Vec<TrainingInfo>>
    where
        P: FnMut(&Vec<TrainingInfo>) -> bool,
    {
        self.trainings.wait_for(predicate).await
    }
}

fn day_infos(trainings: &[CompletedTraining], date: NaiveDate) -> Vec<TrainingInfo> {
    let mut day = trainings_on(trainings, date);
    day.sort_by_key(|training| (training.start_time_ms, training.id));
    day.into_iter().map(TrainingInfo::from).collect()
}
