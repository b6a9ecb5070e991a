//! Exercise catalog: the ordered list of exercises a training walks through.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

pub mod repository;

pub use repository::{CatalogSource, ExerciseRepository};

/// Catalog shipped with the crate.
pub const BUNDLED_CATALOG: &str = include_str!("../../assets/exercises.json");

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseInfo {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Instructional video reference.
    pub video_id: String,
    /// Number of repetitions.
    pub times_to_do: u32,
}

/// Outcome of loading the catalog.
///
/// Keeps "nothing configured" apart from "could not load" so callers can
/// report the two differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogLoad {
    Loaded(Vec<ExerciseInfo>),
    Empty,
    Failed(String),
}

impl CatalogLoad {
    /// Exercises when loaded, otherwise an empty slice.
    pub fn exercises(&self) -> &[ExerciseInfo] {
        match self {
            CatalogLoad::Loaded(exercises) => exercises,
            CatalogLoad::Empty | CatalogLoad::Failed(_) => &[],
        }
    }
}

/// Decode a catalog document.
pub fn parse_catalog(json: &str) -> CatalogLoad {
    let exercises: Vec<ExerciseInfo> = match serde_json::from_str(json) {
        Ok(exercises) => exercises,
        Err(err) => return CatalogLoad::Failed(format!("malformed exercise catalog: {err}")),
    };

    if exercises.is_empty() {
        return CatalogLoad::Empty;
    }

    let mut seen = HashSet::with_capacity(exercises.len());
    for exercise in &exercises {
        if !seen.insert(exercise.id) {
            return CatalogLoad::Failed(format!("duplicate exercise id {}", exercise.id));
        }
    }

    CatalogLoad::Loaded(exercises)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_loads() {
        let load = parse_catalog(BUNDLED_CATALOG);
        assert!(matches!(load, CatalogLoad::Loaded(_)));
        let ids: Vec<i64> = load.exercises().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn reads_camel_case_fields() {
        let load = parse_catalog(
            r#"[{"id": 9, "name": "Hum", "description": "Hum softly",
                 "videoId": "hum", "timesToDo": 3}]"#,
        );
        assert_eq!(
            load,
            CatalogLoad::Loaded(vec![ExerciseInfo {
                id: 9,
                name: "Hum".into(),
                description: "Hum softly".into(),
                video_id: "hum".into(),
                times_to_do: 3,
            }])
        );
    }

    #[test]
    fn empty_and_failed_are_distinct() {
        assert_eq!(parse_catalog("[]"), CatalogLoad::Empty);
        assert!(matches!(parse_catalog("{not json"), CatalogLoad::Failed(_)));
        assert!(parse_catalog("[]").exercises().is_empty());
    }

    #[test]
    fn duplicate_ids_fail() {
        let load = parse_catalog(
            r#"[{"id": 1, "name": "a", "description": "", "videoId": "a", "timesToDo": 1},
                {"id": 1, "name": "b", "description": "", "videoId": "b", "timesToDo": 1}]"#,
        );
        assert_eq!(load, CatalogLoad::Failed("duplicate exercise id 1".into()));
    }
}
