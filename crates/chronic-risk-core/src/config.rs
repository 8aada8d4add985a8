//! Scorer configuration.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::Condition;

/// Environment variable overriding the artifact base directory.
pub const HOME_ENV: &str = "CHRONIC_RISK_HOME";

/// File names the artifact store looks for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArtifactFileNames {
    pub scaler: String,
    pub diabetes_model: String,
    pub heart_disease_model: String,
    pub stroke_model: String,
    pub preprocessor: String,
    pub combined_model: String,
}

impl Default for ArtifactFileNames {
    fn default() -> Self {
        Self {
            scaler: "scaler.json".into(),
            diabetes_model: "diabetes_model.json".into(),
            heart_disease_model: "heart_disease_model.json".into(),
            stroke_model: "stroke_model.json".into(),
            preprocessor: "preprocessor.json".into(),
            combined_model: "model.json".into(),
        }
    }
}

impl ArtifactFileNames {
    /// Per-condition classifier file.
    pub fn classifier(&self, condition: Condition) -> &str {
        match condition {
            Condition::Diabetes => &self.diabetes_model,
            Condition::HeartDisease => &self.heart_disease_model,
            Condition::Stroke => &self.stroke_model,
        }
    }
}

/// Configuration for the `RiskScorer`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScorerConfig {
    /// Directory the search directories are relative to
    pub base_dir: PathBuf,
    /// Search directories in priority order; an empty path means `base_dir` itself
    pub search_dirs: Vec<PathBuf>,
    /// Artifact file names
    pub files: ArtifactFileNames,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            search_dirs: vec![
                PathBuf::from("models"),
                PathBuf::from("artifacts"),
                PathBuf::new(),
            ],
            files: ArtifactFileNames::default(),
        }
    }
}

impl ScorerConfig {
    /// Defaults, with `base_dir` taken from `CHRONIC_RISK_HOME` when set.
    pub fn from_env() -> Self {
        match env::var_os(HOME_ENV) {
            Some(home) if !home.is_empty() => Self::with_base_dir(home),
            _ => Self::default(),
        }
    }

    /// Defaults rooted at `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Absolute search directories in priority order.
    pub fn candidate_dirs(&self) -> Vec<PathBuf> {
        self.search_dirs
            .iter()
            .map(|dir| resolve_dir(&self.base_dir, dir))
            .collect()
    }
}

fn resolve_dir(base: &Path, dir: &Path) -> PathBuf {
    if dir.as_os_str().is_empty() {
        base.to_path_buf()
    } else {
        base.join(dir)
    }
}
