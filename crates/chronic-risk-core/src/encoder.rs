//! Feature encoder.
//!
//! Reproduces the fitted column transformer:
//! - numeric columns: coerce, then `(x - mean) / scale`
//! - categorical columns: drop-first indicators, one per non-reference category
//!
//! The numeric block always precedes the categorical block.

use crate::models::{AlignedRow, AttributeValue, EncodedMatrix, PreprocessingSchema};

/// Encode an aligned row against the schema it was aligned to.
///
/// Pure function of its inputs. A column absent from the row encodes like its
/// default (numeric 0, reference category).
pub fn encode(row: &AlignedRow, schema: &PreprocessingSchema) -> EncodedMatrix {
    let mut values = Vec::with_capacity(schema.encoded_width());

    for column in schema.numeric_columns() {
        let raw = row
            .get(&column.name)
            .map(|value| value.coerce_number(&column.name))
            .unwrap_or(0.0);
        values.push(column.transform(raw));
    }

    for column in schema.categorical_columns() {
        let label = row.get(&column.name).map(AttributeValue::as_label);
        for category in column.indicator_categories() {
            let active = label
                .as_deref()
                .is_some_and(|l| l.eq_ignore_ascii_case(category));
            values.push(if active { 1.0 } else { 0.0 });
        }
    }

    EncodedMatrix::new(values)
}
