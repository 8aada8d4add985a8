//! Threshold rules mapping risk scores to recommendations.

use chronic_risk_core::models::{Condition, PatientRecord, RiskScores};
use chronic_risk_core::reconcile::RecordIndex;

/// Score above which a condition triggers its recommendations.
pub const RECOMMENDATION_THRESHOLD: f64 = 60.0;

/// Maximum number of recommendations returned.
pub const MAX_RECOMMENDATIONS: usize = 3;

/// BMI above which weight loss is recommended.
const OBESITY_BMI: f64 = 30.0;

/// Attribute gate on a single recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    Always,
    Obese,
    Smoker,
}

impl Gate {
    fn passes(&self, index: &RecordIndex<'_>) -> bool {
        match self {
            Gate::Always => true,
            Gate::Obese => index.number("bmi").is_some_and(|bmi| bmi > OBESITY_BMI),
            Gate::Smoker => index.number("smoking") == Some(1.0),
        }
    }
}

/// Recommendations per condition, in evaluation order.
const RULES: [(Condition, &[(&str, Gate)]); 3] = [
    (
        Condition::Diabetes,
        &[
            ("Reduce sugar & refined carbs", Gate::Always),
            ("Walk 30 min daily", Gate::Always),
            ("Aim to lose 5-7% body weight", Gate::Obese),
        ],
    ),
    (
        Condition::HeartDisease,
        &[
            ("Limit salt <2g/day", Gate::Always),
            ("Eat oats, nuts, and olive oil", Gate::Always),
            ("Quit smoking immediately", Gate::Smoker),
        ],
    ),
    (
        Condition::Stroke,
        &[
            ("Control blood pressure daily", Gate::Always),
            ("Manage stress with meditation", Gate::Always),
        ],
    ),
];

/// Up to three recommendations for the given scores.
///
/// Conditions are checked in diabetes, heart disease, stroke order and the
/// list is cut after the first three matches.
pub fn recommendations(scores: &RiskScores, record: &PatientRecord) -> Vec<String> {
    let index = RecordIndex::new(record);

    RULES
        .iter()
        .filter(|(condition, _)| *scores.get(*condition) > RECOMMENDATION_THRESHOLD)
        .flat_map(|(_, advice)| advice.iter())
        .filter(|(_, gate)| gate.passes(&index))
        .map(|(text, _)| text.to_string())
        .take(MAX_RECOMMENDATIONS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(diabetes: f64, heart_disease: f64, stroke: f64) -> RiskScores {
        RiskScores {
            diabetes,
            heart_disease,
            stroke,
        }
    }

    #[test]
    fn test_no_recommendations_below_threshold() {
        let record = PatientRecord::new().with("BMI", 35.0).with("Smoking", 1);
        assert!(recommendations(&scores(60.0, 12.5, 59.9), &record).is_empty());
    }

    #[test]
    fn test_diabetes_with_obesity() {
        let record = PatientRecord::new().with("BMI", 32.0);
        assert_eq!(
            recommendations(&scores(75.0, 80.0, 90.0), &record),
            vec![
                "Reduce sugar & refined carbs",
                "Walk 30 min daily",
                "Aim to lose 5-7% body weight",
            ]
        );
    }

    #[test]
    fn test_heart_disease_smoker_gate() {
        let smoker = PatientRecord::new().with("Smoking", "yes");
        assert_eq!(
            recommendations(&scores(10.0, 70.0, 10.0), &smoker),
            vec![
                "Limit salt <2g/day",
                "Eat oats, nuts, and olive oil",
                "Quit smoking immediately",
            ]
        );

        let non_smoker = PatientRecord::new().with("Smoking", 0);
        assert_eq!(recommendations(&scores(10.0, 70.0, 10.0), &non_smoker).len(), 2);
    }

    #[test]
    fn test_truncates_to_three() {
        let record = PatientRecord::new().with("BMI", 24.0);
        assert_eq!(
            recommendations(&scores(65.0, 10.0, 88.0), &record),
            vec![
                "Reduce sugar & refined carbs",
                "Walk 30 min daily",
                "Control blood pressure daily",
            ]
        );
    }

    #[test]
    fn test_missing_bmi_skips_weight_advice() {
        let record = PatientRecord::new();
        assert_eq!(recommendations(&scores(61.0, 0.0, 0.0), &record).len(), 2);
    }
}
