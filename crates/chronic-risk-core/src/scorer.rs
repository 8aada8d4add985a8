//! Risk scorer: raw attributes in, per-condition scores out.

use std::sync::{Arc, Mutex, OnceLock};

use serde::Serialize;
use thiserror::Error;

use crate::artifacts::{ArtifactBundle, ArtifactError, ArtifactInfo, ArtifactStore};
use crate::config::ScorerConfig;
use crate::encoder::encode;
use crate::inference::{self, InferenceError};
use crate::models::{AlignmentReport, PatientRecord, RiskScores};
use crate::reconcile::Reconciler;

/// Scoring errors. Both variants propagate the component error unchanged.
#[derive(Error, Debug)]
pub enum RiskError {
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

pub type RiskResult<T> = Result<T, RiskError>;

/// Scores plus the diagnostics gathered on the way.
#[derive(Debug, Clone, Serialize)]
pub struct DetailedPrediction {
    pub scores: RiskScores,
    pub report: AlignmentReport,
    pub artifacts: ArtifactInfo,
}

/// Orchestrates the pipeline over a lazily loaded artifact bundle.
///
/// Artifacts load on first use and are shared read-only afterwards. A failed
/// load is not cached, so the next call retries.
pub struct RiskScorer {
    store: ArtifactStore,
    bundle: OnceLock<Arc<ArtifactBundle>>,
    load_guard: Mutex<()>,
}

impl RiskScorer {
    pub fn new(config: ScorerConfig) -> Self {
        Self {
            store: ArtifactStore::new(config),
            bundle: OnceLock::new(),
            load_guard: Mutex::new(()),
        }
    }

    /// Scorer configured from the environment.
    pub fn from_env() -> Self {
        Self::new(ScorerConfig::from_env())
    }

    /// Scorer over an already loaded bundle.
    pub fn with_bundle(config: ScorerConfig, bundle: ArtifactBundle) -> Self {
        let scorer = Self::new(config);
        let _ = scorer.bundle.set(Arc::new(bundle));
        scorer
    }

    /// The loaded bundle, loading it on first call.
    pub fn bundle(&self) -> RiskResult<Arc<ArtifactBundle>> {
        if let Some(bundle) = self.bundle.get() {
            return Ok(Arc::clone(bundle));
        }

        // Poisoning only means another loader panicked; the cache is still consistent.
        let _guard = self
            .load_guard
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(bundle) = self.bundle.get() {
            return Ok(Arc::clone(bundle));
        }

        let bundle = Arc::new(self.store.load()?);
        let _ = self.bundle.set(Arc::clone(&bundle));
        Ok(bundle)
    }

    /// Whether artifacts have been loaded.
    pub fn is_loaded(&self) -> bool {
        self.bundle.get().is_some()
    }

    /// Risk score per condition for one record.
    pub fn predict(&self, record: &PatientRecord) -> RiskResult<RiskScores> {
        let bundle = self.bundle()?;
        let reconciler = Reconciler::new(bundle.schema());
        let row = reconciler.align(record);
        let matrix = encode(&row, bundle.schema());
        let probabilities = inference::score(&matrix, &bundle)?;
        Ok(probabilities.to_scores())
    }

    /// Like [`predict`](Self::predict), also returning the alignment report and artifact provenance.
    pub fn predict_detailed(&self, record: &PatientRecord) -> RiskResult<DetailedPrediction> {
        let bundle = self.bundle()?;
        let (row, report) = Reconciler::new(bundle.schema()).align_with_report(record);
        let matrix = encode(&row, bundle.schema());
        let probabilities = inference::score(&matrix, &bundle)?;

        log::debug!(
            "Scored record: {} of {} columns defaulted",
            report.defaulted().count(),
            row.len()
        );

        Ok(DetailedPrediction {
            scores: probabilities.to_scores(),
            report,
            artifacts: bundle.info().clone(),
        })
    }
}

static DEFAULT_SCORER: OnceLock<RiskScorer> = OnceLock::new();

/// Score a record with the process-wide scorer configured from the environment.
pub fn predict_risk(record: &PatientRecord) -> RiskResult<RiskScores> {
    DEFAULT_SCORER
        .get_or_init(RiskScorer::from_env)
        .predict(record)
}
