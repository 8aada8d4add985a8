//! Patient record models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Attributes the offline training job was fitted on, in training order.
///
/// Used as the column set when an artifact bundle carries no preprocessing schema.
pub const CANONICAL_ATTRIBUTES: [&str; 17] = [
    "Age",
    "Gender",
    "Glucose",
    "HbA1c",
    "Systolic",
    "Diastolic",
    "BMI",
    "Cholesterol",
    "Triglycerides",
    "Smoking",
    "Alcohol",
    "Physical_Activity",
    "Diet_Score",
    "Family_History",
    "Sleep_Hours",
    "Stress_Level",
    "TC_HDL_Ratio",
];

/// A single loosely-typed attribute value as it arrives from the request layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl AttributeValue {
    /// Interpret the value as a number for the given attribute.
    ///
    /// Labels known to the codebook (e.g. `"male"`, `"high"`) map to their code,
    /// other text must parse as a finite float.
    pub fn as_number(&self, attribute: &str) -> Option<f64> {
        match self {
            AttributeValue::Number(n) if n.is_finite() => Some(*n),
            AttributeValue::Number(_) => None,
            AttributeValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            AttributeValue::Text(text) => label_code(attribute, text).or_else(|| {
                text.trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
            }),
        }
    }

    /// Numeric coercion with the fallback used by the encoder: unparseable → 0.
    pub fn coerce_number(&self, attribute: &str) -> f64 {
        self.as_number(attribute).unwrap_or(0.0)
    }

    /// Render the value as a category label.
    pub fn as_label(&self) -> String {
        match self {
            AttributeValue::Text(text) => text.trim().to_string(),
            AttributeValue::Number(n) => format_number(*n),
            AttributeValue::Bool(b) => b.to_string(),
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Number(f64::from(value))
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Number(value as f64)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

/// Raw patient attributes for a single request.
///
/// JSON `null` values are dropped on deserialization so they reconcile like
/// absent attributes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(
    from = "BTreeMap<String, Option<AttributeValue>>",
    into = "BTreeMap<String, AttributeValue>"
)]
pub struct PatientRecord {
    attributes: BTreeMap<String, AttributeValue>,
}

impl From<PatientRecord> for BTreeMap<String, AttributeValue> {
    fn from(record: PatientRecord) -> Self {
        record.attributes
    }
}

impl From<BTreeMap<String, Option<AttributeValue>>> for PatientRecord {
    fn from(raw: BTreeMap<String, Option<AttributeValue>>) -> Self {
        Self {
            attributes: raw
                .into_iter()
                .filter_map(|(name, value)| value.map(|v| (name, v)))
                .collect(),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for PatientRecord
where
    K: Into<String>,
    V: Into<AttributeValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            attributes: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl PatientRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a record from a JSON object.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace an attribute.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Remove an attribute, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        self.attributes.remove(name)
    }

    /// Exact-name lookup.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Attributes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Attribute names in key order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

/// Label codes used by the cleaning step of the training job.
fn codes_for(attribute: &str) -> &'static [(&'static str, f64)] {
    match crate::reconcile::normalize_key(attribute).as_str() {
        "gender" | "sex" => &[("male", 1.0), ("female", 0.0)],
        "smoking" => &[("yes", 1.0), ("former", 1.0), ("no", 0.0)],
        "alcohol" => &[
            ("yes", 1.0),
            ("occasional", 1.0),
            ("regular", 1.0),
            ("no", 0.0),
        ],
        "familyhistory" => &[("yes", 1.0), ("no", 0.0)],
        "physicalactivity" | "activity" | "stresslevel" | "stress" => {
            &[("low", 0.0), ("moderate", 1.0), ("high", 2.0)]
        }
        _ => &[],
    }
}

/// Code for a categorical label of `attribute`, case-insensitive.
pub fn label_code(attribute: &str, label: &str) -> Option<f64> {
    let label = label.trim();
    codes_for(attribute)
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(label))
        .map(|(_, code)| *code)
}

/// Labels of `attribute` carrying `code`, in codebook order.
pub fn code_labels(attribute: &str, code: f64) -> impl Iterator<Item = &'static str> {
    codes_for(attribute)
        .iter()
        .filter(move |(_, c)| *c == code)
        .map(|(label, _)| *label)
}

/// Render a number the way a fitted vocabulary spells it (`1`, not `1.0`).
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
