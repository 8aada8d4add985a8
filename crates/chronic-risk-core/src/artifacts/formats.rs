//! On-disk preprocessing artifact formats.

use serde::{Deserialize, Serialize};

use crate::models::{CategoricalColumn, NumericColumn, PreprocessingSchema, SchemaError};

/// Fitted standard scaler over the full feature list (`scaler.json`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StandardScaler {
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// All-numeric schema in fitted feature order.
    pub fn to_schema(&self) -> Result<PreprocessingSchema, String> {
        let numeric = numeric_columns(&self.feature_names, &self.mean, &self.scale)?;
        if numeric.is_empty() {
            return Err("scaler has no features".into());
        }
        PreprocessingSchema::new(numeric, Vec::new()).map_err(|e| e.to_string())
    }
}

/// Numeric block of the combined preprocessor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NumericBlock {
    pub columns: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// One fitted categorical column of the combined preprocessor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoricalBlock {
    pub column: String,
    pub categories: Vec<String>,
    /// `"first"` (default) or the name of the dropped category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop: Option<String>,
}

/// Combined column transformer (`preprocessor.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ColumnPreprocessor {
    #[serde(default)]
    pub numeric: NumericBlock,
    #[serde(default)]
    pub categorical: Vec<CategoricalBlock>,
}

impl ColumnPreprocessor {
    /// Schema with the numeric block first and categorical columns in fitted order.
    pub fn to_schema(&self) -> Result<PreprocessingSchema, String> {
        let numeric = numeric_columns(&self.numeric.columns, &self.numeric.mean, &self.numeric.scale)?;
        let categorical = self
            .categorical
            .iter()
            .map(CategoricalBlock::to_column)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())?;

        if numeric.is_empty() && categorical.is_empty() {
            return Err("preprocessor declares no columns".into());
        }
        PreprocessingSchema::new(numeric, categorical).map_err(|e| e.to_string())
    }
}

impl CategoricalBlock {
    fn to_column(&self) -> Result<CategoricalColumn, SchemaError> {
        let reference = match self.drop.as_deref() {
            None | Some("first") => 0,
            Some(name) => self
                .categories
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| SchemaError::UnknownReference {
                    column: self.column.clone(),
                    reference: name.to_string(),
                })?,
        };
        Ok(CategoricalColumn {
            name: self.column.clone(),
            categories: self.categories.clone(),
            reference,
        })
    }
}

fn numeric_columns(
    names: &[String],
    mean: &[f64],
    scale: &[f64],
) -> Result<Vec<NumericColumn>, String> {
    if names.len() != mean.len() || names.len() != scale.len() {
        return Err(format!(
            "numeric block has {} columns, {} means and {} scales",
            names.len(),
            mean.len(),
            scale.len()
        ));
    }
    Ok(names
        .iter()
        .zip(mean.iter().zip(scale))
        .map(|(name, (mean, scale))| NumericColumn {
            name: name.clone(),
            mean: *mean,
            scale: *scale,
        })
        .collect())
}
