//! Multi-output classifier: one binary estimator per target.

use serde::{Deserialize, Serialize};

use super::{check_width, Classifier, InferenceResult};

/// A single target's estimator and the classes it saw during fitting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetEstimator {
    /// Class labels seen at fit time; a single entry marks a degenerate fit
    pub classes: Vec<i64>,
    pub classifier: Classifier,
}

impl TargetEstimator {
    /// Class probabilities in `classes` order.
    fn predict_proba(&self, model: &str, row: &[f64]) -> InferenceResult<Vec<f64>> {
        check_width(model, self.classifier.n_features(), row.len())?;
        if self.classes.len() == 1 {
            return Ok(vec![1.0]);
        }
        let p = self.classifier.predict_proba(model, row)?;
        Ok(vec![1.0 - p, p])
    }
}

/// Combined classifier producing per-target probability arrays.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MultiOutputClassifier {
    /// Target names, informational only; targets are positional
    #[serde(default)]
    pub targets: Vec<String>,
    pub estimators: Vec<TargetEstimator>,
}

impl MultiOutputClassifier {
    /// Input width every estimator must agree on.
    pub fn n_features(&self) -> Option<usize> {
        self.estimators.first().map(|e| e.classifier.n_features())
    }

    /// Per-target class probabilities for a single row.
    pub fn predict_proba(&self, row: &[f64]) -> InferenceResult<Vec<Vec<f64>>> {
        self.estimators
            .iter()
            .enumerate()
            .map(|(i, estimator)| {
                let name = self
                    .targets
                    .get(i)
                    .map(String::as_str)
                    .unwrap_or("combined");
                estimator.predict_proba(name, row)
            })
            .collect()
    }

    /// Structural checks run once at load time.
    pub fn validate(&self) -> Result<(), String> {
        if self.estimators.is_empty() {
            return Err("combined model has no estimators".into());
        }
        for (i, estimator) in self.estimators.iter().enumerate() {
            if estimator.classes.is_empty() || estimator.classes.len() > 2 {
                return Err(format!(
                    "estimator {} has {} classes, expected 1 or 2",
                    i,
                    estimator.classes.len()
                ));
            }
            estimator
                .classifier
                .validate()
                .map_err(|e| format!("estimator {}: {}", i, e))?;
        }
        let widths: Vec<_> = self
            .estimators
            .iter()
            .map(|e| e.classifier.n_features())
            .collect();
        if widths.windows(2).any(|pair| pair[0] != pair[1]) {
            return Err(format!("estimators disagree on input width: {:?}", widths));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::{ConstantModel, InferenceError, LogisticModel};

    #[test]
    fn test_degenerate_target_yields_single_probability() {
        let model = MultiOutputClassifier {
            targets: vec!["diabetes".into(), "heart_disease".into()],
            estimators: vec![
                TargetEstimator {
                    classes: vec![0, 1],
                    classifier: Classifier::Logistic(LogisticModel {
                        coefficients: vec![0.0],
                        intercept: 0.0,
                    }),
                },
                TargetEstimator {
                    classes: vec![0],
                    classifier: Classifier::Constant(ConstantModel {
                        n_features: 1,
                        probability: 0.0,
                    }),
                },
            ],
        };
        assert!(model.validate().is_ok());
        assert_eq!(model.n_features(), Some(1));

        let outputs = model.predict_proba(&[4.0]).unwrap();
        assert_eq!(outputs, vec![vec![0.5, 0.5], vec![1.0]]);
    }

    fn degenerate(n_features: usize) -> TargetEstimator {
        TargetEstimator {
            classes: vec![1],
            classifier: Classifier::Constant(ConstantModel {
                n_features,
                probability: 1.0,
            }),
        }
    }

    #[test]
    fn test_all_degenerate_model_still_checks_width() {
        let model = MultiOutputClassifier {
            targets: vec![],
            estimators: vec![degenerate(4), degenerate(4), degenerate(4)],
        };
        assert!(model.validate().is_ok());
        assert_eq!(model.n_features(), Some(4));
        assert_eq!(
            model.predict_proba(&[0.0; 4]).unwrap(),
            vec![vec![1.0], vec![1.0], vec![1.0]]
        );

        let err = model.predict_proba(&[0.0; 6]).unwrap_err();
        assert_eq!(
            err,
            InferenceError::FeatureMismatch {
                model: "combined".into(),
                expected: 4,
                actual: 6
            }
        );
    }

    #[test]
    fn test_validate_rejects_mixed_widths() {
        let model = MultiOutputClassifier {
            targets: vec![],
            estimators: vec![degenerate(4), degenerate(5)],
        };
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty() {
        let model = MultiOutputClassifier {
            targets: vec![],
            estimators: vec![],
        };
        assert!(model.validate().is_err());
    }
}
