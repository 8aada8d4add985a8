//! Preprocessing schema resolved from the loaded artifacts.
//!
//! The schema is built once when artifacts load and never mutated afterwards.
//! Column order is numeric block first, categorical block second, which is the
//! order the fitted column transformer emits.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::reconcile::normalize_key;

/// Schema construction errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("Categorical column {0} has an empty vocabulary")]
    EmptyVocabulary(String),

    #[error("Reference category {reference} is not in the vocabulary of {column}")]
    UnknownReference { column: String, reference: String },
}

/// A numeric column and its fitted affine scaling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NumericColumn {
    pub name: String,
    pub mean: f64,
    pub scale: f64,
}

impl NumericColumn {
    /// Column passed through unscaled.
    pub fn identity(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mean: 0.0,
            scale: 1.0,
        }
    }

    /// Apply `(x - mean) / scale`; a zero-variance column keeps scale 1.
    ///
    /// A result that overflows to a non-finite value encodes as 0, the same
    /// fallback unparseable input gets.
    pub fn transform(&self, x: f64) -> f64 {
        let scale = if self.scale == 0.0 { 1.0 } else { self.scale };
        let scaled = (x - self.mean) / scale;
        if scaled.is_finite() {
            scaled
        } else {
            0.0
        }
    }
}

/// A categorical column with its fitted vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoricalColumn {
    pub name: String,
    /// Categories in fitted order
    pub categories: Vec<String>,
    /// Index of the dropped (reference) category
    pub reference: usize,
}

impl CategoricalColumn {
    /// Drop-first vocabulary: the first fitted category is the reference.
    pub fn drop_first(name: impl Into<String>, categories: Vec<String>) -> Self {
        Self {
            name: name.into(),
            categories,
            reference: 0,
        }
    }

    /// The category encoded implicitly as all-zero.
    pub fn reference_category(&self) -> &str {
        &self.categories[self.reference]
    }

    /// Categories that get an indicator column, in fitted order.
    pub fn indicator_categories(&self) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != self.reference)
            .map(|(_, c)| c.as_str())
    }

    /// Number of indicator columns this column expands to.
    pub fn indicator_count(&self) -> usize {
        self.categories.len() - 1
    }

    /// Case-insensitive vocabulary lookup, returning the fitted spelling.
    pub fn find_category(&self, label: &str) -> Option<&str> {
        let label = label.trim();
        self.categories
            .iter()
            .find(|c| c.eq_ignore_ascii_case(label))
            .map(String::as_str)
    }
}

/// Borrowed view of one expected column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnKind<'a> {
    Numeric(&'a NumericColumn),
    Categorical(&'a CategoricalColumn),
}

impl<'a> ColumnKind<'a> {
    pub fn name(&self) -> &'a str {
        match *self {
            ColumnKind::Numeric(c) => &c.name,
            ColumnKind::Categorical(c) => &c.name,
        }
    }
}

/// Ordered expected column set plus the fitted transform parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessingSchema {
    numeric: Vec<NumericColumn>,
    categorical: Vec<CategoricalColumn>,
    /// normalized column names in `columns()` order
    keys: Vec<String>,
    /// normalized column name → position in `columns()`
    lookup: HashMap<String, usize>,
    passthrough: bool,
}

impl PreprocessingSchema {
    /// Build and validate a schema.
    pub fn new(
        numeric: Vec<NumericColumn>,
        categorical: Vec<CategoricalColumn>,
    ) -> Result<Self, SchemaError> {
        for column in &categorical {
            if column.categories.is_empty() {
                return Err(SchemaError::EmptyVocabulary(column.name.clone()));
            }
            if column.reference >= column.categories.len() {
                return Err(SchemaError::UnknownReference {
                    column: column.name.clone(),
                    reference: column.reference.to_string(),
                });
            }
        }

        let mut keys = Vec::with_capacity(numeric.len() + categorical.len());
        let mut lookup = HashMap::new();
        let names = numeric
            .iter()
            .map(|c| c.name.as_str())
            .chain(categorical.iter().map(|c| c.name.as_str()));
        for (position, name) in names.enumerate() {
            let key = normalize_key(name);
            if lookup.insert(key.clone(), position).is_some() {
                return Err(SchemaError::DuplicateColumn(name.to_string()));
            }
            keys.push(key);
        }

        Ok(Self {
            numeric,
            categorical,
            keys,
            lookup,
            passthrough: false,
        })
    }

    /// All-numeric, unscaled schema over `columns`.
    ///
    /// Used when the artifact bundle carries no preprocessing information.
    pub fn passthrough<S: AsRef<str>>(columns: &[S]) -> Result<Self, SchemaError> {
        let numeric = columns
            .iter()
            .map(|c| NumericColumn::identity(c.as_ref()))
            .collect();
        let mut schema = Self::new(numeric, Vec::new())?;
        schema.passthrough = true;
        Ok(schema)
    }

    /// True when this schema stands in for missing preprocessing artifacts.
    pub fn is_passthrough(&self) -> bool {
        self.passthrough
    }

    pub fn numeric_columns(&self) -> &[NumericColumn] {
        &self.numeric
    }

    pub fn categorical_columns(&self) -> &[CategoricalColumn] {
        &self.categorical
    }

    /// Expected columns in encoding order.
    pub fn columns(&self) -> impl Iterator<Item = ColumnKind<'_>> {
        self.numeric
            .iter()
            .map(ColumnKind::Numeric)
            .chain(self.categorical.iter().map(ColumnKind::Categorical))
    }

    /// Expected columns paired with their normalized names.
    pub fn keyed_columns(&self) -> impl Iterator<Item = (ColumnKind<'_>, &str)> {
        self.columns().zip(self.keys.iter().map(String::as_str))
    }

    /// Expected column names in encoding order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns().map(|c| c.name())
    }

    /// Number of expected (pre-encoding) columns.
    pub fn column_count(&self) -> usize {
        self.numeric.len() + self.categorical.len()
    }

    /// Look up a column by exact name or normalized name.
    pub fn column(&self, name: &str) -> Option<ColumnKind<'_>> {
        let position = *self.lookup.get(&normalize_key(name))?;
        if position < self.numeric.len() {
            Some(ColumnKind::Numeric(&self.numeric[position]))
        } else {
            Some(ColumnKind::Categorical(
                &self.categorical[position - self.numeric.len()],
            ))
        }
    }

    /// Width of the encoded matrix this schema produces.
    pub fn encoded_width(&self) -> usize {
        self.numeric.len()
            + self
                .categorical
                .iter()
                .map(CategoricalColumn::indicator_count)
                .sum::<usize>()
    }
}
