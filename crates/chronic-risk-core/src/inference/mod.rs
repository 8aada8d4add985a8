//! Inference engine.
//!
//! Pushes an encoded row through the loaded classifiers and extracts the
//! positive-class probability per condition.

mod classifier;
mod multi_output;

pub use classifier::*;
pub use multi_output::*;

use thiserror::Error;

use crate::artifacts::{ArtifactBundle, ModelSet};
use crate::models::{Condition, EncodedMatrix, Probabilities};

/// Inference errors. Both signal an artifact/schema mismatch and are not retryable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    #[error("Model {model} expects {expected} features, encoded row has {actual}")]
    FeatureMismatch {
        model: String,
        expected: usize,
        actual: usize,
    },

    #[error("Combined model has no output for {target} ({available} targets available)")]
    MissingTarget { target: Condition, available: usize },
}

pub type InferenceResult<T> = Result<T, InferenceError>;

/// Positive-class probability per condition for an encoded row.
pub fn score(matrix: &EncodedMatrix, bundle: &ArtifactBundle) -> InferenceResult<Probabilities> {
    let row = matrix.row();

    match bundle.models() {
        ModelSet::Separate { classifiers, .. } => Probabilities::try_from_fn(|condition| {
            classifiers
                .get(condition)
                .predict_proba(condition.as_str(), row)
        }),
        ModelSet::Combined { classifier, .. } => {
            if let Some(expected) = classifier.n_features() {
                check_width("combined", expected, row.len())?;
            }
            let outputs = classifier.predict_proba(row)?;
            Probabilities::try_from_fn(|condition| {
                let position = target_position(condition);
                outputs
                    .get(position)
                    .map(|classes| positive_class(classes))
                    .ok_or(InferenceError::MissingTarget {
                        target: condition,
                        available: outputs.len(),
                    })
            })
        }
    }
}

/// Output position of a condition in the combined model.
fn target_position(condition: Condition) -> usize {
    match condition {
        Condition::Diabetes => 0,
        Condition::HeartDisease => 1,
        Condition::Stroke => 2,
    }
}

/// Probability of the positive class; a single-class output is its own answer.
fn positive_class(classes: &[f64]) -> f64 {
    match classes {
        [only] => *only,
        [_, positive, ..] => *positive,
        [] => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_class() {
        assert_eq!(positive_class(&[0.3, 0.7]), 0.7);
        assert_eq!(positive_class(&[1.0]), 1.0);
        assert_eq!(positive_class(&[]), 0.0);
    }

    #[test]
    fn test_target_positions_follow_declared_order() {
        let positions: Vec<_> = Condition::ALL.iter().map(|c| target_position(*c)).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }
}
