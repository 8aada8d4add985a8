//! Column-name normalization.
//!
//! Handles:
//! - Case folding (`BMI` → `bmi`)
//! - Separator removal (`Physical Activity`, `physical_activity`, `Physical-Activity` → `physicalactivity`)

use std::collections::HashMap;

use strsim::jaro_winkler;

use crate::models::{AttributeValue, PatientRecord};

/// Minimum Jaro-Winkler similarity for a record key to be reported as a likely misspelling.
const SUGGESTION_THRESHOLD: f64 = 0.85;

/// Normalize a column or attribute name for matching.
///
/// Applied once to schema columns when the schema is built and once to each
/// record key per request, so every spelling variant meets at the same key.
pub fn normalize_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Normalized view over a record's keys.
pub struct RecordIndex<'r> {
    record: &'r PatientRecord,
    /// normalized key → (original key, value)
    by_key: HashMap<String, (&'r str, &'r AttributeValue)>,
}

impl<'r> RecordIndex<'r> {
    /// Index a record. When several keys normalize identically the
    /// lexicographically first one wins.
    pub fn new(record: &'r PatientRecord) -> Self {
        let mut by_key = HashMap::with_capacity(record.len());
        for (name, value) in record.iter() {
            by_key.entry(normalize_key(name)).or_insert((name, value));
        }
        Self { record, by_key }
    }

    /// Exact-name lookup.
    pub fn exact(&self, name: &str) -> Option<&'r AttributeValue> {
        self.record.get(name)
    }

    /// Lookup by normalized key, returning the original key as well.
    pub fn normalized(&self, key: &str) -> Option<(&'r str, &'r AttributeValue)> {
        self.by_key.get(key).copied()
    }

    /// Value under a normalized key.
    pub fn value(&self, key: &str) -> Option<&'r AttributeValue> {
        self.normalized(key).map(|(_, value)| value)
    }

    /// Numeric value under a normalized key.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.normalized(key)
            .and_then(|(name, value)| value.as_number(name))
    }

    /// Closest record key to a normalized column key, if any is similar enough.
    pub fn closest_key(&self, key: &str) -> Option<&'r str> {
        self.by_key
            .iter()
            .map(|(normalized, (original, _))| (jaro_winkler(key, normalized), *original))
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| {
                a.0.partial_cmp(&b.0)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| b.1.cmp(a.1))
            })
            .map(|(_, original)| original)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("Physical_Activity"), "physicalactivity");
        assert_eq!(normalize_key("physical activity"), "physicalactivity");
        assert_eq!(normalize_key("Physical-Activity"), "physicalactivity");
        assert_eq!(normalize_key("PhysicalActivity"), "physicalactivity");
        assert_eq!(normalize_key("TC_HDL_Ratio"), "tchdlratio");
        assert_eq!(normalize_key("HbA1c"), "hba1c");
        assert_eq!(normalize_key("  BMI "), "bmi");
    }

    #[test]
    fn test_index_lookup() {
        let record = PatientRecord::new()
            .with("physical activity", "low")
            .with("Age", 55);
        let index = RecordIndex::new(&record);

        assert!(index.exact("Physical_Activity").is_none());
        let (source, value) = index.normalized("physicalactivity").unwrap();
        assert_eq!(source, "physical activity");
        assert_eq!(value, &AttributeValue::Text("low".into()));
        assert_eq!(index.number("age"), Some(55.0));
        assert_eq!(index.number("physicalactivity"), Some(0.0));
    }

    #[test]
    fn test_first_key_wins_on_collision() {
        let record = PatientRecord::new().with("bmi", 30).with("BMI", 25);
        let index = RecordIndex::new(&record);

        // "BMI" sorts before "bmi"
        assert_eq!(index.normalized("bmi").unwrap().0, "BMI");
    }

    #[test]
    fn test_closest_key() {
        let record = PatientRecord::new()
            .with("Glucoze", 120)
            .with("Age", 40);
        let index = RecordIndex::new(&record);

        assert_eq!(index.closest_key("glucose"), Some("Glucoze"));
        assert_eq!(index.closest_key("triglycerides"), None);
    }
}
