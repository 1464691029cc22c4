//! Offline training: CSV -> features -> fitted preprocessor -> classifier.
//!
//! ```text
//! load_csv ──► prepare ──► [holdout_split] ──► PreprocessorState::fit ──► GbdtRiskModel::train
//!                                                     │                          │
//!                                             preprocessor.json         fire_risk_model.json
//! ```

pub mod dataset;

use std::path::Path;

pub use dataset::{holdout_split, load_csv, prepare, read_csv};

use crate::features::FeatureError;
use crate::model::{evaluate, ClassificationMetrics, GbdtRiskModel, ModelError, RiskModel, TrainingParams};
use crate::models::Frame;
use crate::preprocessing::{PreprocessError, PreprocessorState};

pub const MODEL_FILE: &str = "fire_risk_model.json";
pub const PREPROCESSOR_FILE: &str = "preprocessor.json";

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read training data {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse training CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error("training data has no `is_fire` column")]
    MissingLabel,

    #[error("`is_fire` column is not numeric")]
    NonNumericLabel,
}

#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Fitted artifacts plus the optional hold-out score.
#[derive(Debug)]
pub struct TrainedArtifacts {
    pub preprocessor: PreprocessorState,
    pub model: GbdtRiskModel,
    pub holdout: Option<ClassificationMetrics>,
}

impl TrainedArtifacts {
    /// Write both artifacts into `dir` under their standard file names.
    pub fn save(&self, dir: &Path) -> Result<(), TrainingError> {
        self.preprocessor.save(dir.join(PREPROCESSOR_FILE))?;
        self.model.save(dir.join(MODEL_FILE))?;
        Ok(())
    }
}

/// Fit the preprocessor and classifier on a prepared frame.
///
/// With `holdout_every >= 2`, every n-th row is held back, scored after
/// training and excluded from fitting.
pub fn fit(
    frame: Frame,
    labels: Vec<f64>,
    params: &TrainingParams,
    holdout_every: usize,
) -> Result<TrainedArtifacts, TrainingError> {
    let (train_idx, test_idx) = holdout_split(frame.len(), holdout_every);
    let (mut train_frame, train_labels, test) = if test_idx.is_empty() {
        (frame, labels, None)
    } else {
        let pick = |idx: &[usize]| idx.iter().map(|&i| labels[i]).collect::<Vec<f64>>();
        let test = (frame.take_rows(&test_idx), pick(&test_idx));
        (frame.take_rows(&train_idx), pick(&train_idx), Some(test))
    };

    let preprocessor = PreprocessorState::fit(&mut train_frame, &train_labels)?;
    let features = preprocessor.reindex(&train_frame)?;
    let model = GbdtRiskModel::train(&features, &train_labels, params)?;

    let holdout = match test {
        Some((mut test_frame, test_labels)) => {
            let test_features = preprocessor.transform(&mut test_frame)?;
            let probs = model.predict_proba(&test_features)?;
            let metrics = evaluate(&probs, &test_labels, 0.5);
            log::info!(
                "Hold-out ({} rows): accuracy {:.4}, precision {:.4}, recall {:.4}, F1 {:.4}",
                metrics.support,
                metrics.accuracy,
                metrics.precision,
                metrics.recall,
                metrics.f1
            );
            Some(metrics)
        }
        None => None,
    };

    Ok(TrainedArtifacts {
        preprocessor,
        model,
        holdout,
    })
}

/// Load a CSV, prepare it, and fit everything.
pub fn train_from_csv(
    path: &Path,
    params: &TrainingParams,
    holdout_every: usize,
) -> Result<TrainedArtifacts, TrainingError> {
    let raw = load_csv(path)?;
    log::info!("Read {} rows from {}", raw.len(), path.display());
    let (frame, labels) = prepare(raw)?;
    fit(frame, labels, params, holdout_every)
}
