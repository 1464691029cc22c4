use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::scalers::{RobustScaler, StandardScaler};
use super::target_encoder::{category_keys, TargetEncoder};
use super::PreprocessError;
use crate::models::columns::{
    default_expected_columns, GEO_COLUMNS, LOG_COLUMNS, PROVINCE, ROBUST_COLUMNS,
};
use crate::models::{Column, Frame};

/// Everything the pipeline learned at training time.
///
/// Optional stages are `None` when the training data did not allow fitting
/// them (for example no `province` column). A missing stage is skipped at
/// transform time, except that a present `province` column still becomes 0.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessorState {
    #[serde(default)]
    pub log_cols: Vec<String>,
    /// Holds the fitted columns too; see [`PreprocessorState::robust_cols`].
    #[serde(default)]
    pub robust_scaler: Option<RobustScaler>,
    #[serde(default)]
    pub province_encoder: Option<TargetEncoder>,
    #[serde(default)]
    pub province_scaler: Option<StandardScaler>,
    #[serde(default)]
    pub geo_scaler: Option<StandardScaler>,
    #[serde(default = "default_expected_columns")]
    pub expected_columns: Vec<String>,
}

/// Model-ready rows in `expected_columns` order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    values: Vec<f64>,
}

impl FeatureMatrix {
    /// Build a matrix from row vectors, each `columns.len()` long.
    pub fn from_rows(columns: Vec<String>, rows: &[Vec<f64>]) -> Result<Self, PreprocessError> {
        let width = columns.len();
        let mut values = Vec::with_capacity(rows.len() * width);
        for row in rows {
            if row.len() != width {
                return Err(PreprocessError::InvalidState(format!(
                    "row has {} values but {} columns",
                    row.len(),
                    width
                )));
            }
            values.extend_from_slice(row);
        }
        Ok(Self { columns, values })
    }

    /// Copy of the given rows, in the order given.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let mut values = Vec::with_capacity(indices.len() * self.columns.len());
        for &i in indices {
            values.extend_from_slice(self.row(i));
        }
        Self {
            columns: self.columns.clone(),
            values,
        }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn rows(&self) -> usize {
        if self.columns.is_empty() {
            0
        } else {
            self.values.len() / self.columns.len()
        }
    }

    pub fn row(&self, index: usize) -> &[f64] {
        let width = self.columns.len();
        &self.values[index * width..(index + 1) * width]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.rows()).map(move |i| self.row(i))
    }

    /// Value of a named column in a given row.
    pub fn get(&self, row: usize, column: &str) -> Option<f64> {
        let idx = self.columns.iter().position(|c| c == column)?;
        Some(self.row(row)[idx])
    }
}

impl PreprocessorState {
    /// Fit every stage on a labelled training frame, transforming it in place.
    ///
    /// `labels` holds `is_fire` per row (0 or 1) and is only used by the
    /// province encoder.
    pub fn fit(frame: &mut Frame, labels: &[f64]) -> Result<Self, PreprocessError> {
        if frame.len() != labels.len() {
            return Err(PreprocessError::LabelMismatch {
                rows: frame.len(),
                labels: labels.len(),
            });
        }

        let mut state = PreprocessorState {
            log_cols: LOG_COLUMNS.iter().map(|c| c.to_string()).collect(),
            robust_scaler: None,
            province_encoder: None,
            province_scaler: None,
            geo_scaler: None,
            expected_columns: Vec::new(),
        };

        // 1. log1p
        state.apply_log(frame);

        // 2. robust scaling over the candidate columns actually present
        let robust_cols: Vec<String> = ROBUST_COLUMNS
            .iter()
            .filter(|c| frame.numeric(c).is_some())
            .map(|c| c.to_string())
            .collect();
        if !robust_cols.is_empty() {
            let scaler = RobustScaler::fit(frame, &robust_cols)?;
            scaler.transform(frame)?;
            state.robust_scaler = Some(scaler);
        }

        // 3-4. target-encode province, then standardize the encoding
        if let Some(column) = frame.column(PROVINCE) {
            let keys = category_keys(column);
            let encoder = TargetEncoder::fit(&keys, labels)?;
            let encoded: Vec<f64> = keys
                .iter()
                .map(|k| encoder.encode(k).unwrap_or(encoder.target_mean))
                .collect();
            state.province_scaler = Some(StandardScaler::fit_values(PROVINCE, &encoded)?);
            state.province_encoder = Some(encoder);
            state.apply_province(frame);
        }

        // 5. lat/lon
        let geo_cols: Vec<String> = GEO_COLUMNS.iter().map(|c| c.to_string()).collect();
        let geo = StandardScaler::fit(frame, &geo_cols)?;
        geo.transform(frame)?;
        state.geo_scaler = Some(geo);

        state.expected_columns = frame.column_names().to_vec();
        Ok(state)
    }

    /// Apply the persisted stages to `frame` without refitting.
    pub fn apply(&self, frame: &mut Frame) -> Result<(), PreprocessError> {
        self.apply_log(frame);
        if let Some(scaler) = &self.robust_scaler {
            scaler.transform(frame)?;
        }
        self.apply_province(frame);
        if let Some(scaler) = &self.geo_scaler {
            scaler.transform(frame)?;
        }
        Ok(())
    }

    /// Apply all stages, then reindex to `expected_columns`.
    pub fn transform(&self, frame: &mut Frame) -> Result<FeatureMatrix, PreprocessError> {
        self.apply(frame)?;
        self.reindex(frame)
    }

    /// Select `expected_columns` in order; absent columns become 0.0.
    ///
    /// Must run after every other stage: it defines what the model sees.
    pub fn reindex(&self, frame: &Frame) -> Result<FeatureMatrix, PreprocessError> {
        let rows = frame.len();
        let width = self.expected_columns.len();
        let mut values = vec![0.0; rows * width];

        for (j, name) in self.expected_columns.iter().enumerate() {
            match frame.column(name) {
                None => {}
                Some(Column::Numeric(col)) => {
                    for (i, v) in col.iter().enumerate() {
                        values[i * width + j] = *v;
                    }
                }
                Some(Column::Text(_)) => {
                    return Err(PreprocessError::NonNumericColumn(name.clone()));
                }
            }
        }

        Ok(FeatureMatrix {
            columns: self.expected_columns.clone(),
            values,
        })
    }

    /// Columns the robust scaler was fit on (empty when it was not fit).
    pub fn robust_cols(&self) -> &[String] {
        self.robust_scaler
            .as_ref()
            .map(|s| s.columns.as_slice())
            .unwrap_or(&[])
    }

    fn apply_log(&self, frame: &mut Frame) {
        for name in &self.log_cols {
            if let Some(values) = frame.numeric_mut(name) {
                for v in values.iter_mut() {
                    *v = v.ln_1p();
                }
            }
        }
    }

    /// Encode then standardize `province`. Any row whose category was not
    /// seen at fit time, or every row when a stage is missing, becomes 0.0.
    fn apply_province(&self, frame: &mut Frame) {
        let Some(column) = frame.column(PROVINCE) else {
            return;
        };

        let values = match (&self.province_encoder, &self.province_scaler) {
            (Some(encoder), Some(scaler)) => category_keys(column)
                .iter()
                .map(|k| {
                    encoder
                        .encode(k)
                        .map(|e| scaler.scale_value(0, e))
                        .unwrap_or(0.0)
                })
                .collect(),
            _ => vec![0.0; frame.len()],
        };
        frame.set_numeric(PROVINCE, values);
    }

    /// Read a persisted state. Fails when the file is absent or malformed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PreprocessError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| PreprocessError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let state: PreprocessorState = serde_json::from_str(&content)?;
        state.validate()?;
        Ok(state)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PreprocessError> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| PreprocessError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Structural checks on a deserialized state.
    pub fn validate(&self) -> Result<(), PreprocessError> {
        if self.expected_columns.is_empty() {
            return Err(PreprocessError::InvalidState(
                "expected_columns is empty".to_string(),
            ));
        }
        if let Some(s) = &self.robust_scaler {
            s.validate()?;
        }
        if let Some(s) = &self.province_scaler {
            s.validate("province_scaler")?;
            if s.columns.len() != 1 {
                return Err(PreprocessError::InvalidState(
                    "province_scaler must have exactly one column".to_string(),
                ));
            }
        }
        if let Some(s) = &self.geo_scaler {
            s.validate("geo_scaler")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod pipeline_tests;
