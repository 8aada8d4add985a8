//! Binary classifiers loaded from JSON artifacts.
//!
//! Supported kinds:
//! - `logistic`: `p = σ(w·x + b)`
//! - `tree_ensemble`: gradient-boosted trees, `p = σ(logit(base_score) + Σ leaf)`
//! - `constant`: fixed probability, for degenerate fits

use serde::{Deserialize, Serialize};

use super::{InferenceError, InferenceResult};

fn default_base_score() -> f64 {
    0.5
}

/// A fitted binary classifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    Logistic(LogisticModel),
    TreeEnsemble(TreeEnsemble),
    Constant(ConstantModel),
}

/// Linear model on the encoded features.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogisticModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Additive ensemble of regression trees with a logistic link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TreeEnsemble {
    pub n_features: usize,
    /// Prior probability the margin starts from
    #[serde(default = "default_base_score")]
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

/// One regression tree; node 0 is the root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

/// A tree node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Node {
    Leaf {
        leaf: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        /// Child taken for NaN input; defaults to `left`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        missing: Option<usize>,
    },
}

/// Classifier that always answers the same probability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConstantModel {
    pub n_features: usize,
    pub probability: f64,
}

impl Classifier {
    /// Number of input features the classifier was fitted on.
    pub fn n_features(&self) -> usize {
        match self {
            Classifier::Logistic(m) => m.coefficients.len(),
            Classifier::TreeEnsemble(m) => m.n_features,
            Classifier::Constant(m) => m.n_features,
        }
    }

    /// Positive-class probability for a single row.
    ///
    /// `model` names the classifier in errors.
    pub fn predict_proba(&self, model: &str, row: &[f64]) -> InferenceResult<f64> {
        check_width(model, self.n_features(), row.len())?;

        let probability = match self {
            Classifier::Logistic(m) => {
                let margin: f64 = m
                    .coefficients
                    .iter()
                    .zip(row)
                    .map(|(w, x)| w * x)
                    .sum::<f64>()
                    + m.intercept;
                sigmoid(margin)
            }
            Classifier::TreeEnsemble(m) => {
                let margin = logit(m.base_score)
                    + m.trees.iter().map(|tree| tree.leaf_value(row)).sum::<f64>();
                sigmoid(margin)
            }
            Classifier::Constant(m) => m.probability,
        };

        Ok(probability)
    }

    /// Structural checks run once at load time.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Classifier::Logistic(m) => {
                if m.coefficients.is_empty() {
                    return Err("logistic model has no coefficients".into());
                }
                Ok(())
            }
            Classifier::TreeEnsemble(m) => {
                if !(m.base_score > 0.0 && m.base_score < 1.0) {
                    return Err(format!("base_score {} outside (0, 1)", m.base_score));
                }
                m.trees
                    .iter()
                    .enumerate()
                    .try_for_each(|(i, tree)| {
                        tree.validate(m.n_features)
                            .map_err(|e| format!("tree {}: {}", i, e))
                    })
            }
            Classifier::Constant(m) => {
                if !(0.0..=1.0).contains(&m.probability) {
                    return Err(format!("probability {} outside [0, 1]", m.probability));
                }
                Ok(())
            }
        }
    }
}

impl Tree {
    /// Walk from the root to a leaf.
    ///
    /// Terminates because `validate` guarantees children sit after their parent.
    fn leaf_value(&self, row: &[f64]) -> f64 {
        let mut position = 0;
        loop {
            match &self.nodes[position] {
                Node::Leaf { leaf } => return *leaf,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    missing,
                } => {
                    let x = row[*feature];
                    position = if x.is_nan() {
                        missing.unwrap_or(*left)
                    } else if x < *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("empty tree".into());
        }
        for (position, node) in self.nodes.iter().enumerate() {
            if let Node::Split {
                feature,
                left,
                right,
                missing,
                ..
            } = node
            {
                if *feature >= n_features {
                    return Err(format!(
                        "node {} splits on feature {} of {}",
                        position, feature, n_features
                    ));
                }
                for child in [Some(*left), Some(*right), *missing].into_iter().flatten() {
                    if child <= position || child >= self.nodes.len() {
                        return Err(format!("node {} has invalid child {}", position, child));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Fail when the encoded width differs from what the classifier was fitted on.
pub(crate) fn check_width(model: &str, expected: usize, actual: usize) -> InferenceResult<()> {
    if expected != actual {
        log::error!(
            "Feature width mismatch for {}: expected {} columns, got {}",
            model,
            expected,
            actual
        );
        return Err(InferenceError::FeatureMismatch {
            model: model.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}
