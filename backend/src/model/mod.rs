//! Fire/no-fire classifier.
//!
//! The serving path only depends on [`RiskModel`]; the gradient-boosted
//! implementation lives in [`classifier`] together with its training routine.

pub mod classifier;
pub mod metrics;

pub use classifier::{scale_pos_weight, GbdtRiskModel, TrainingParams};
pub use metrics::{evaluate, ClassificationMetrics};

use crate::preprocessing::FeatureMatrix;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to access model file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed model file: {0}")]
    Format(#[from] serde_json::Error),

    #[error("model expects features {expected:?} but received {found:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("training set has {rows} rows but {labels} labels")]
    LabelMismatch { rows: usize, labels: usize },
}

/// A trained binary classifier producing `P(is_fire = 1)` per row.
pub trait RiskModel: Send + Sync {
    /// Feature order the model was trained on.
    fn feature_names(&self) -> &[String];

    /// Probability of fire for every row of `features`.
    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<f64>, ModelError>;

    /// Fail unless `columns` is exactly the training feature order.
    fn check_features(&self, columns: &[String]) -> Result<(), ModelError> {
        if self.feature_names() != columns {
            return Err(ModelError::FeatureMismatch {
                expected: self.feature_names().to_vec(),
                found: columns.to_vec(),
            });
        }
        Ok(())
    }
}
