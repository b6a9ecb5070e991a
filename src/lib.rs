//! Core of the Soundr speech trainer: exercise catalog, training flow,
//! local storage of trainings and reminders, and statistics.

pub mod catalog;
pub mod config;
pub mod db;
pub mod reminders;
pub mod settings;
pub mod stats;
pub mod training;
pub mod utils;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;

pub use catalog::{CatalogLoad, CatalogSource, ExerciseInfo, ExerciseRepository};
pub use config::AppConfig;
pub use db::{CompletedTraining, Database, LiveQuery, NotificationReminder, TrainingInfo};
pub use reminders::NotificationRepository;
pub use settings::{SettingsStore, UserSettings};
pub use stats::{DayView, StatsView, TrainingStats};
pub use training::{
    Clock, SystemClock, TrainingController, TrainingState, TrainingStatus, TrainingsRepository,
};

/// Everything a front end needs, opened from one [`AppConfig`].
#[derive(Clone)]
pub struct App {
    pub db: Database,
    pub trainings: TrainingsRepository,
    pub reminders: NotificationRepository,
    pub exercises: ExerciseRepository,
    pub settings: Arc<SettingsStore>,
    config: AppConfig,
    clock: Arc<dyn Clock>,
}

impl App {
    pub fn open(config: AppConfig) -> Result<Self> {
        Self::open_with_clock(config, Arc::new(SystemClock))
    }

    pub fn open_with_clock(config: AppConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        // Reads RUST_LOG; a logger installed by the host wins.
        utils::init_logging(config.log_level);

        std::fs::create_dir_all(&config.data_dir).with_context(|| {
            format!(
                "failed to create data directory {}",
                config.data_dir.display()
            )
        })?;

        let db = Database::new(config.database_path())?;
        let settings = SettingsStore::new(config.settings_path())?;
        let exercises = match &config.catalog_path {
            Some(path) => ExerciseRepository::new(CatalogSource::File(path.clone())),
            None => ExerciseRepository::bundled(),
        };

        log::info!("Soundr core ready in {}", config.data_dir.display());

        Ok(Self {
            trainings: TrainingsRepository::new(db.clone()),
            reminders: NotificationRepository::new(db.clone()),
            db,
            exercises,
            settings: Arc::new(settings),
            config,
            clock,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    /// Begin a new training. Must be called from within a Tokio runtime.
    pub fn start_training(&self) -> TrainingController {
        TrainingController::new(
            self.exercises.clone(),
            self.trainings.clone(),
            self.clock.clone(),
            self.config.load_delay,
        )
    }

    /// Trainings recorded today.
    pub async fn today_trainings(&self) -> Result<LiveQuery<Vec<CompletedTraining>>> {
        self.trainings.trainings_by_date(self.clock.today()).await
    }

    pub async fn stats(&self) -> Result<StatsView> {
        let all = self.trainings.all_trainings().await?;
        Ok(StatsView::new(all, self.clock.clone()))
    }

    pub async fn calendar(&self, date: NaiveDate) -> Result<DayView> {
        let all = self.trainings.all_trainings().await?;
        Ok(DayView::new(all, date))
    }
}
