//! Schema reconciler for patient records.
//!
//! Pipeline per expected column: Exact match → Normalized match → Derivation → Default
//!
//! Alignment never fails. A column that cannot be resolved gets the numeric
//! default `0` or the reference category of its vocabulary.

mod derive;
mod normalizer;

pub use derive::*;
pub use normalizer::*;

use crate::models::{
    code_labels, AlignedRow, AlignmentReport, AttributeValue, CategoricalColumn, ColumnKind,
    PatientRecord, PreprocessingSchema, Resolution,
};

/// Aligns records against one preprocessing schema.
pub struct Reconciler<'a> {
    schema: &'a PreprocessingSchema,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler for a schema.
    pub fn new(schema: &'a PreprocessingSchema) -> Self {
        Self { schema }
    }

    /// Align a record to the schema's expected column set.
    pub fn align(&self, record: &PatientRecord) -> AlignedRow {
        self.align_with_report(record).0
    }

    /// Align a record and report how each column was resolved.
    pub fn align_with_report(&self, record: &PatientRecord) -> (AlignedRow, AlignmentReport) {
        let index = RecordIndex::new(record);
        let mut row = AlignedRow::with_capacity(self.schema.column_count());
        let mut report = AlignmentReport::default();

        for (column, key) in self.schema.keyed_columns() {
            let name = column.name();
            let (value, resolution) = match resolve(&index, name, key) {
                Some((value, resolution)) => (fit_value(column, value), resolution),
                None => {
                    match index.closest_key(key) {
                        Some(suggestion) => log::debug!(
                            "Column {} unresolved, using default (closest record key: {})",
                            name,
                            suggestion
                        ),
                        None => log::debug!("Column {} unresolved, using default", name),
                    }
                    (default_value(column), Resolution::Defaulted)
                }
            };
            row.push(name, value);
            report.record(name, resolution);
        }

        (row, report)
    }
}

/// Align `record` against `schema`.
pub fn align(record: &PatientRecord, schema: &PreprocessingSchema) -> AlignedRow {
    Reconciler::new(schema).align(record)
}

/// Find a value for one column: exact name, normalized name, then derivation rules.
fn resolve(
    index: &RecordIndex<'_>,
    name: &str,
    key: &str,
) -> Option<(AttributeValue, Resolution)> {
    if let Some(value) = index.exact(name) {
        return Some((value.clone(), Resolution::Exact));
    }

    if let Some((source, value)) = index.normalized(key) {
        return Some((
            value.clone(),
            Resolution::Normalized {
                source: source.to_string(),
            },
        ));
    }

    rules_for(key).iter().find_map(|rule| {
        rule.apply(index).map(|value| {
            (
                value,
                Resolution::Derived {
                    rule: rule.describe(),
                },
            )
        })
    })
}

/// Shape a resolved value for its column kind.
fn fit_value(column: ColumnKind<'_>, value: AttributeValue) -> AttributeValue {
    match column {
        ColumnKind::Numeric(_) => value,
        ColumnKind::Categorical(categorical) => fit_category(categorical, &value)
            .map(AttributeValue::from)
            .unwrap_or_else(|| AttributeValue::Text(value.as_label())),
    }
}

/// Match a value against a fitted vocabulary, returning the fitted spelling.
///
/// Numeric codes (e.g. `Gender: 1`) are translated through the label codebook.
fn fit_category(column: &CategoricalColumn, value: &AttributeValue) -> Option<String> {
    if let Some(category) = column.find_category(&value.as_label()) {
        return Some(category.to_string());
    }

    let code = value.as_number(&column.name)?;
    code_labels(&column.name, code)
        .find_map(|label| column.find_category(label))
        .map(str::to_string)
}

fn default_value(column: ColumnKind<'_>) -> AttributeValue {
    match column {
        ColumnKind::Numeric(_) => AttributeValue::Number(0.0),
        ColumnKind::Categorical(categorical) => {
            AttributeValue::Text(categorical.reference_category().to_string())
        }
    }
}
