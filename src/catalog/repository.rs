use std::{path::PathBuf, sync::Arc};

use super::{parse_catalog, CatalogLoad, BUNDLED_CATALOG};
use crate::{log_error, log_info, log_warn};

const ENABLE_LOGS: bool = true;

/// Where the catalog document comes from.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    Bundled,
    File(PathBuf),
    Inline(Arc<str>),
}

/// Loads the exercise catalog. Never fails; problems come back as
/// [`CatalogLoad::Failed`].
#[derive(Debug, Clone)]
pub struct ExerciseRepository {
    source: CatalogSource,
}

impl ExerciseRepository {
    pub fn new(source: CatalogSource) -> Self {
        Self { source }
    }

    pub fn bundled() -> Self {
        Self::new(CatalogSource::Bundled)
    }

    pub fn from_json(json: impl Into<Arc<str>>) -> Self {
        Self::new(CatalogSource::Inline(json.into()))
    }

    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    pub async fn load_exercises(&self) -> CatalogLoad {
        let load = match &self.source {
            CatalogSource::Bundled => parse_catalog(BUNDLED_CATALOG),
            CatalogSource::Inline(json) => parse_catalog(json),
            CatalogSource::File(path) => match tokio::fs::read_to_string(path).await {
                Ok(json) => parse_catalog(&json),
                Err(err) => CatalogLoad::Failed(format!(
                    "failed to read exercise catalog {}: {err}",
                    path.display()
                )),
            },
        };

        match &load {
            CatalogLoad::Loaded(exercises) => {
                log_info!("Loaded {} exercises", exercises.len())
            }
            CatalogLoad::Empty => log_warn!("Exercise catalog is empty"),
            CatalogLoad::Failed(reason) => log_error!("Exercise catalog unavailable: {reason}"),
        }

        load
    }
}

impl Default for ExerciseRepository {
    fn default() -> Self {
        Self::bundled()
    }
}
