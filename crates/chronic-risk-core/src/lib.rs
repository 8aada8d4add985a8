//! Chronic Risk Core Library
//!
//! Inference pipeline estimating diabetes, heart disease and stroke risk from
//! loosely-typed patient attributes.
//!
//! # Architecture
//!
//! ```text
//! PatientRecord (raw attributes)
//!        │
//!        ▼
//! ┌──────────────────┐   load once    ┌──────────────────────────────┐
//! │    RiskScorer    │ ─────────────▶ │        ArtifactStore         │
//! └────────┬─────────┘                │ models/ → artifacts/ → base  │
//!          │                          │ separate set, else combined  │
//!          ▼                          └──────────────┬───────────────┘
//!   Schema Reconciler  ◀── PreprocessingSchema ──────┘
//!   (match, derive, default)
//!          │ AlignedRow
//!          ▼
//!   Feature Encoder (scale numeric, drop-first indicators)
//!          │ EncodedMatrix
//!          ▼
//!   Inference Engine (3 binary models or 1 multi-output model)
//!          │ probabilities
//!          ▼
//!   RiskScores {diabetes, heart_disease, stroke} in [0, 100]
//! ```
//!
//! # Modules
//!
//! - [`artifacts`]: Artifact discovery, loading and validation
//! - [`config`]: Search directories and artifact file names
//! - [`reconcile`]: Aligns raw records with the fitted column set
//! - [`encoder`]: Numeric scaling and categorical indicator expansion
//! - [`inference`]: Classifier evaluation
//! - [`models`]: Domain types (PatientRecord, PreprocessingSchema, RiskScores, etc.)
//! - [`scorer`]: Pipeline orchestration and the artifact cache

pub mod artifacts;
pub mod config;
pub mod encoder;
pub mod inference;
pub mod models;
pub mod reconcile;
pub mod scorer;

// Re-export commonly used types
pub use artifacts::{ArtifactBundle, ArtifactError, ArtifactInfo, ArtifactMode, ArtifactStore};
pub use config::ScorerConfig;
pub use encoder::encode;
pub use inference::InferenceError;
pub use models::{
    AlignedRow, AlignmentReport, AttributeValue, Condition, EncodedMatrix, PatientRecord,
    PreprocessingSchema, Probabilities, RiskScores,
};
pub use reconcile::{align, normalize_key, Reconciler};
pub use scorer::{predict_risk, DetailedPrediction, RiskError, RiskResult, RiskScorer};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::collections::HashMap;
use std::sync::Arc;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ChronicRiskError {
    #[error("Artifacts not found: {0}")]
    ArtifactsNotFound(String),

    #[error("Artifact error: {0}")]
    ArtifactError(String),

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<ArtifactError> for ChronicRiskError {
    fn from(e: ArtifactError) -> Self {
        match e {
            ArtifactError::NotFound { .. } => ChronicRiskError::ArtifactsNotFound(e.to_string()),
            _ => ChronicRiskError::ArtifactError(e.to_string()),
        }
    }
}

impl From<InferenceError> for ChronicRiskError {
    fn from(e: InferenceError) -> Self {
        ChronicRiskError::InferenceError(e.to_string())
    }
}

impl From<RiskError> for ChronicRiskError {
    fn from(e: RiskError) -> Self {
        match e {
            RiskError::Artifact(e) => e.into(),
            RiskError::Inference(e) => e.into(),
        }
    }
}

impl From<serde_json::Error> for ChronicRiskError {
    fn from(e: serde_json::Error) -> Self {
        ChronicRiskError::InvalidInput(e.to_string())
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open a risk engine over the artifacts under `base_dir`, loading them eagerly.
#[uniffi::export]
pub fn open_engine(base_dir: String) -> Result<Arc<RiskEngine>, ChronicRiskError> {
    let scorer = RiskScorer::new(ScorerConfig::with_base_dir(base_dir));
    scorer.bundle()?;
    Ok(Arc::new(RiskEngine { scorer }))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe scorer wrapper for FFI.
#[derive(uniffi::Object)]
pub struct RiskEngine {
    scorer: RiskScorer,
}

#[uniffi::export]
impl RiskEngine {
    /// Score a record given as attribute name → text value.
    pub fn predict(
        &self,
        attributes: HashMap<String, String>,
    ) -> Result<FfiRiskResult, ChronicRiskError> {
        let record: PatientRecord = attributes.into_iter().collect();
        Ok(self.scorer.predict(&record)?.into())
    }

    /// Score a record given as a JSON object; returns the scores as JSON.
    pub fn predict_json(&self, record_json: String) -> Result<String, ChronicRiskError> {
        let record = PatientRecord::from_json(&record_json)?;
        let scores = self.scorer.predict(&record)?;
        Ok(serde_json::to_string(&scores)?)
    }

    /// Provenance of the loaded artifacts.
    pub fn artifact_info(&self) -> Result<FfiArtifactInfo, ChronicRiskError> {
        let bundle = self.scorer.bundle()?;
        Ok(bundle.info().clone().into())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe risk scores.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRiskResult {
    pub diabetes: f64,
    pub heart_disease: f64,
    pub stroke: f64,
}

impl From<RiskScores> for FfiRiskResult {
    fn from(scores: RiskScores) -> Self {
        Self {
            diabetes: scores.diabetes,
            heart_disease: scores.heart_disease,
            stroke: scores.stroke,
        }
    }
}

/// FFI-safe artifact provenance.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiArtifactInfo {
    pub mode: String,
    pub sources: Vec<String>,
    pub fingerprint: String,
    pub loaded_at: String,
}

impl From<ArtifactInfo> for FfiArtifactInfo {
    fn from(info: ArtifactInfo) -> Self {
        Self {
            mode: match info.mode {
                ArtifactMode::Separate => "separate".to_string(),
                ArtifactMode::Combined => "combined".to_string(),
            },
            sources: info
                .sources
                .into_iter()
                .map(|s| s.path.display().to_string())
                .collect(),
            fingerprint: info.fingerprint,
            loaded_at: info.loaded_at,
        }
    }
}
