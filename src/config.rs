use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use log::LevelFilter;

pub const DEFAULT_DATA_DIR: &str = "soundr-data";
pub const DATABASE_FILE: &str = "soundr.sqlite3";
pub const SETTINGS_FILE: &str = "settings.json";
pub const DEFAULT_LOAD_DELAY: Duration = Duration::from_millis(1000);

/// Where the app keeps its files and how it behaves at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    /// Catalog file; the bundled catalog is used when unset.
    pub catalog_path: Option<PathBuf>,
    /// Pause before the catalog is loaded into a new training.
    pub load_delay: Duration,
    pub log_level: LevelFilter,
}

impl AppConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            catalog_path: None,
            load_delay: DEFAULT_LOAD_DELAY,
            log_level: LevelFilter::Info,
        }
    }

    /// Read `SOUNDR_DATA_DIR`, `SOUNDR_CATALOG`, `SOUNDR_LOAD_DELAY_MS` and
    /// `SOUNDR_DEBUG`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new(
            std::env::var_os("SOUNDR_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
        );

        config.catalog_path = std::env::var_os("SOUNDR_CATALOG").map(PathBuf::from);

        if let Ok(raw) = std::env::var("SOUNDR_LOAD_DELAY_MS") {
            let millis: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("SOUNDR_LOAD_DELAY_MS is not a number: {raw}"))?;
            config.load_delay = Duration::from_millis(millis);
        }

        let debug_mode = std::env::var("SOUNDR_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if debug_mode {
            config.log_level = LevelFilter::Debug;
        }

        Ok(config)
    }

    pub fn with_catalog(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_path = Some(path.into());
        self
    }

    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }
}
