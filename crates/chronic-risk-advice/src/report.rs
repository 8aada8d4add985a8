//! Risk report: scores plus recommendations, as returned to the request layer.

use chronic_risk_core::models::{PatientRecord, RiskScores};
use chronic_risk_core::{RiskResult, RiskScorer};
use serde::{Deserialize, Serialize};

use crate::recommendations;

/// `{"risks": {...}, "recommendations": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskReport {
    pub risks: RiskScores,
    pub recommendations: Vec<String>,
}

impl RiskReport {
    /// Assemble a report from already computed scores.
    pub fn new(risks: RiskScores, record: &PatientRecord) -> Self {
        Self {
            recommendations: recommendations(&risks, record),
            risks,
        }
    }

    /// Score `record` and attach recommendations.
    pub fn generate(scorer: &RiskScorer, record: &PatientRecord) -> RiskResult<Self> {
        let risks = scorer.predict(record)?;
        Ok(Self::new(risks, record))
    }
}
