//! Aligned rows and encoded matrices.

use serde::{Deserialize, Serialize};

use super::{AttributeValue, PatientRecord};

/// A patient record reshaped to the expected column set, one cell per column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlignedRow {
    cells: Vec<(String, AttributeValue)>,
}

impl AlignedRow {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, column: &str, value: AttributeValue) {
        self.cells.push((column.to_string(), value));
    }

    /// Value of an expected column.
    pub fn get(&self, column: &str) -> Option<&AttributeValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Cells in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Column names in schema order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// View the row as a record keyed by the expected column names.
    pub fn to_record(&self) -> PatientRecord {
        self.cells.iter().cloned().collect()
    }
}

/// How a single expected column was filled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Resolution {
    /// Record key equals the column name
    Exact,
    /// Record key matched after key normalization
    Normalized { source: String },
    /// Value computed by a derivation rule
    Derived { rule: String },
    /// Nothing usable; default substituted
    Defaulted,
}

/// Per-column account of an alignment, in schema order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AlignmentReport {
    pub entries: Vec<(String, Resolution)>,
}

impl AlignmentReport {
    pub(crate) fn record(&mut self, column: &str, resolution: Resolution) {
        self.entries.push((column.to_string(), resolution));
    }

    /// Resolution of one column.
    pub fn resolution(&self, column: &str) -> Option<&Resolution> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, r)| r)
    }

    /// Columns that fell back to a default.
    pub fn defaulted(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, r)| matches!(r, Resolution::Defaulted))
            .map(|(name, _)| name.as_str())
    }

    /// True when no column needed a default.
    pub fn is_complete(&self) -> bool {
        self.defaulted().next().is_none()
    }
}

/// A single encoded row as the classifiers consume it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EncodedMatrix {
    values: Vec<f64>,
}

impl EncodedMatrix {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Number of feature columns.
    pub fn width(&self) -> usize {
        self.values.len()
    }

    /// The single row.
    pub fn row(&self) -> &[f64] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aligned_row_lookup() {
        let mut row = AlignedRow::with_capacity(2);
        row.push("Age", AttributeValue::Number(55.0));
        row.push("Gender", AttributeValue::Text("male".into()));

        assert_eq!(row.len(), 2);
        assert_eq!(row.get("Gender"), Some(&AttributeValue::Text("male".into())));
        assert!(row.get("gender").is_none());

        let record = row.to_record();
        assert_eq!(record.get("Age"), Some(&AttributeValue::Number(55.0)));
    }

    #[test]
    fn test_report_defaulted() {
        let mut report = AlignmentReport::default();
        report.record("Age", Resolution::Exact);
        report.record("Diet_Score", Resolution::Defaulted);
        report.record(
            "BMI_Category",
            Resolution::Derived {
                rule: "bmi_bins".into(),
            },
        );

        assert!(!report.is_complete());
        assert_eq!(report.defaulted().collect::<Vec<_>>(), vec!["Diet_Score"]);
        assert_eq!(report.resolution("Age"), Some(&Resolution::Exact));
    }
}
