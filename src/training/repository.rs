use anyhow::Result;
use chrono::NaiveDate;

use crate::db::{CompletedTraining, Database, LiveQuery};

/// Typed access to completed trainings.
#[derive(Clone)]
pub struct TrainingsRepository {
    db: Database,
}

impl TrainingsRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Trainings recorded on `date`, in no particular order.
    pub async fn trainings_by_date(
        &self,
        date: NaiveDate,
    ) -> Result<LiveQuery<Vec<CompletedTraining>>> {
        self.db.watch_trainings_by_date(date).await
    }

    pub async fn all_trainings(&self) -> Result<LiveQuery<Vec<CompletedTraining>>> {
        self.db.watch_all_trainings().await
    }

    pub async fn training_by_id(&self, id: i64) -> Result<LiveQuery<Option<CompletedTraining>>> {
        self.db.watch_training(id).await
    }

    pub async fn insert_training(&self, training: &CompletedTraining) -> Result<i64> {
        self.db.insert_training(training).await
    }

    pub async fn update_training(&self, training: &CompletedTraining) -> Result<bool> {
        self.db.update_training(training).await
    }

    pub async fn delete_training(&self, training: &CompletedTraining) -> Result<bool> {
        self.db.delete_training(training).await
    }
}
