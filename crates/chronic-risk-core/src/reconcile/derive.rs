//! Derivation rules for columns the record does not carry directly.
//!
//! Rules are keyed by normalized column name and tried in order; the first
//! rule that produces a value wins.

use crate::models::AttributeValue;

use super::RecordIndex;

/// BMI bin edges (right-inclusive) and their labels.
const BMI_EDGES: [f64; 5] = [0.0, 18.5, 25.0, 30.0, 100.0];
const BMI_LABELS: [&str; 4] = ["Underweight", "Normal", "Overweight", "Obese"];

/// Age bin edges (right-inclusive) and their labels.
const AGE_EDGES: [f64; 4] = [0.0, 40.0, 60.0, 100.0];
const AGE_LABELS: [&str; 3] = ["Young", "Middle", "Senior"];

/// Placeholder HDL value the ratio is computed against.
// NOTE: not clinically validated; matches the serving-time feature the models were scored with.
const TC_HDL_DIVISOR: f64 = 50.0;

/// Which half of a `"systolic/diastolic"` reading to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressurePart {
    Systolic,
    Diastolic,
}

/// A known way of computing a column from other attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivationRule {
    /// Copy the value of another attribute (normalized key)
    Alias(&'static str),
    /// Split a combined `Blood_Pressure` reading
    BloodPressure(PressurePart),
    /// Bucket `BMI` into a category
    BmiCategory,
    /// Bucket `Age` into a group
    AgeGroup,
    /// `Cholesterol / 50`
    CholesterolRatio,
}

impl DerivationRule {
    /// Short rule name for alignment reports.
    pub fn describe(&self) -> String {
        match self {
            DerivationRule::Alias(source) => format!("alias:{}", source),
            DerivationRule::BloodPressure(PressurePart::Systolic) => "blood_pressure:systolic".into(),
            DerivationRule::BloodPressure(PressurePart::Diastolic) => "blood_pressure:diastolic".into(),
            DerivationRule::BmiCategory => "bmi_category".into(),
            DerivationRule::AgeGroup => "age_group".into(),
            DerivationRule::CholesterolRatio => "tc_hdl_ratio".into(),
        }
    }

    /// Apply the rule against the record, if its inputs are present.
    pub fn apply(&self, index: &RecordIndex<'_>) -> Option<AttributeValue> {
        match self {
            DerivationRule::Alias(source) => index.value(source).cloned(),
            DerivationRule::BloodPressure(part) => {
                let reading = index.value("bloodpressure")?.as_label();
                split_pressure(&reading, *part).map(AttributeValue::Number)
            }
            DerivationRule::BmiCategory => {
                let bmi = index.number("bmi")?;
                bucket(bmi, &BMI_EDGES, &BMI_LABELS).map(AttributeValue::from)
            }
            DerivationRule::AgeGroup => {
                let age = index.number("age")?;
                bucket(age, &AGE_EDGES, &AGE_LABELS).map(AttributeValue::from)
            }
            DerivationRule::CholesterolRatio => {
                let cholesterol = index.number("cholesterol")?;
                Some(AttributeValue::Number(cholesterol / TC_HDL_DIVISOR))
            }
        }
    }
}

/// Rules that can produce the column with normalized name `column_key`.
pub fn rules_for(column_key: &str) -> &'static [DerivationRule] {
    use DerivationRule::*;

    match column_key {
        "systolic" => &[Alias("systolicbp"), BloodPressure(PressurePart::Systolic)],
        "systolicbp" => &[Alias("systolic"), BloodPressure(PressurePart::Systolic)],
        "diastolic" => &[Alias("diastolicbp"), BloodPressure(PressurePart::Diastolic)],
        "diastolicbp" => &[Alias("diastolic"), BloodPressure(PressurePart::Diastolic)],
        "bmicategory" => &[BmiCategory],
        "agegroup" => &[AgeGroup],
        "tchdlratio" => &[CholesterolRatio],
        "physicalactivity" => &[Alias("activity")],
        "sleephours" => &[Alias("sleep")],
        "stresslevel" => &[Alias("stress")],
        _ => &[],
    }
}

/// Right-inclusive binning: `edges[i] < value <= edges[i + 1]` → `labels[i]`.
fn bucket(value: f64, edges: &[f64], labels: &[&'static str]) -> Option<&'static str> {
    edges
        .windows(2)
        .zip(labels)
        .find(|(bounds, _)| value > bounds[0] && value <= bounds[1])
        .map(|(_, label)| *label)
}

fn split_pressure(reading: &str, part: PressurePart) -> Option<f64> {
    let (systolic, diastolic) = reading.split_once('/')?;
    let raw = match part {
        PressurePart::Systolic => systolic,
        PressurePart::Diastolic => diastolic,
    };
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
