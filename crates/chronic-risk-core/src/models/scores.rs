//! Per-condition probabilities and risk scores.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The chronic conditions scored by the pipeline, in model target order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Diabetes,
    HeartDisease,
    Stroke,
}

impl Condition {
    /// All conditions in target order.
    pub const ALL: [Condition; 3] = [
        Condition::Diabetes,
        Condition::HeartDisease,
        Condition::Stroke,
    ];

    /// Wire name (`diabetes`, `heart_disease`, `stroke`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Diabetes => "diabetes",
            Condition::HeartDisease => "heart_disease",
            Condition::Stroke => "stroke",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per condition. Serializes as `{"diabetes", "heart_disease", "stroke"}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PerCondition<T> {
    pub diabetes: T,
    pub heart_disease: T,
    pub stroke: T,
}

impl<T> PerCondition<T> {
    /// Build from a function of the condition.
    pub fn from_fn(mut f: impl FnMut(Condition) -> T) -> Self {
        Self {
            diabetes: f(Condition::Diabetes),
            heart_disease: f(Condition::HeartDisease),
            stroke: f(Condition::Stroke),
        }
    }

    /// Build from a fallible function of the condition, stopping at the first error.
    pub fn try_from_fn<E>(mut f: impl FnMut(Condition) -> Result<T, E>) -> Result<Self, E> {
        Ok(Self {
            diabetes: f(Condition::Diabetes)?,
            heart_disease: f(Condition::HeartDisease)?,
            stroke: f(Condition::Stroke)?,
        })
    }

    pub fn get(&self, condition: Condition) -> &T {
        match condition {
            Condition::Diabetes => &self.diabetes,
            Condition::HeartDisease => &self.heart_disease,
            Condition::Stroke => &self.stroke,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PerCondition<U> {
        PerCondition {
            diabetes: f(&self.diabetes),
            heart_disease: f(&self.heart_disease),
            stroke: f(&self.stroke),
        }
    }

    /// Values paired with their condition, in target order.
    pub fn iter(&self) -> impl Iterator<Item = (Condition, &T)> {
        Condition::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

/// Positive-class probabilities in [0, 1].
pub type Probabilities = PerCondition<f64>;

/// Risk scores in [0, 100] with one decimal place.
pub type RiskScores = PerCondition<f64>;

/// Map a probability to a 0–100 score rounded to one decimal.
///
/// NaN maps to 0; infinities clamp to the nearest bound.
pub fn to_score(probability: f64) -> f64 {
    if probability.is_nan() {
        return 0.0;
    }
    (probability.clamp(0.0, 1.0) * 1000.0).round() / 10.0
}

impl Probabilities {
    /// Scale every probability to a risk score.
    pub fn to_scores(&self) -> RiskScores {
        self.map(|p| to_score(*p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_names() {
        let names: Vec<_> = Condition::ALL.iter().map(Condition::as_str).collect();
        assert_eq!(names, vec!["diabetes", "heart_disease", "stroke"]);
        assert_eq!(
            serde_json::to_string(&Condition::HeartDisease).unwrap(),
            "\"heart_disease\""
        );
    }

    #[test]
    fn test_to_score() {
        assert_eq!(to_score(0.0), 0.0);
        assert_eq!(to_score(1.0), 100.0);
        assert_eq!(to_score(0.73456), 73.5);
        assert_eq!(to_score(0.12341), 12.3);
    }

    #[test]
    fn test_to_score_non_finite() {
        assert_eq!(to_score(f64::NAN), 0.0);
        assert_eq!(to_score(f64::INFINITY), 100.0);
        assert_eq!(to_score(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_scores_serialize_with_condition_keys() {
        let probabilities = Probabilities {
            diabetes: 0.8123,
            heart_disease: 0.5,
            stroke: 0.02,
        };
        let json = serde_json::to_value(probabilities.to_scores()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"diabetes": 81.2, "heart_disease": 50.0, "stroke": 2.0})
        );
    }

    #[test]
    fn test_iter_in_target_order() {
        let scores = RiskScores::from_fn(|c| match c {
            Condition::Diabetes => 1.0,
            Condition::HeartDisease => 2.0,
            Condition::Stroke => 3.0,
        });
        let values: Vec<_> = scores.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }
}
