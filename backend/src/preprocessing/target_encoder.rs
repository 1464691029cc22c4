//! Smoothed target encoding for a single categorical column.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::PreprocessError;
use crate::models::Column;

/// Category -> positive-label rate, shrunk toward the global mean.
///
/// Shrinkage uses the empirical-Bayes weight
/// `λ = σ²·n / (σ²·n + σ²_cat)`, where `σ²` is the label variance over the
/// whole training set and `σ²_cat` the variance inside the category. Small or
/// noisy categories lean toward `target_mean`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetEncoder {
    pub target_mean: f64,
    pub encodings: BTreeMap<String, f64>,
}

impl TargetEncoder {
    pub fn fit(categories: &[String], labels: &[f64]) -> Result<Self, PreprocessError> {
        if categories.is_empty() {
            return Err(PreprocessError::EmptyColumn("province".to_string()));
        }
        if categories.len() != labels.len() {
            return Err(PreprocessError::LabelMismatch {
                rows: categories.len(),
                labels: labels.len(),
            });
        }

        let n = labels.len() as f64;
        let target_mean = labels.iter().sum::<f64>() / n;
        let target_var = labels
            .iter()
            .map(|y| (y - target_mean) * (y - target_mean))
            .sum::<f64>()
            / n;

        let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for (cat, y) in categories.iter().zip(labels) {
            groups.entry(cat.as_str()).or_default().push(*y);
        }

        let encodings = groups
            .into_iter()
            .map(|(cat, ys)| {
                let count = ys.len() as f64;
                let mean = ys.iter().sum::<f64>() / count;
                let var = ys.iter().map(|y| (y - mean) * (y - mean)).sum::<f64>() / count;
                let lambda = target_var * count / (target_var * count + var);
                let encoded = if lambda.is_nan() {
                    target_mean
                } else {
                    lambda * mean + (1.0 - lambda) * target_mean
                };
                (cat.to_string(), encoded)
            })
            .collect();

        Ok(Self {
            target_mean,
            encodings,
        })
    }

    /// Encoding for a category seen during fit; `None` otherwise.
    pub fn encode(&self, category: &str) -> Option<f64> {
        self.encodings.get(category).copied()
    }
}

/// Category keys for a column: text as-is, numbers in their shortest form.
pub(crate) fn category_keys(column: &Column) -> Vec<String> {
    match column {
        Column::Text(values) => values.clone(),
        Column::Numeric(values) => values.iter().map(|v| v.to_string()).collect(),
    }
}
