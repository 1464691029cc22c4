//! Gradient-boosted trees via the `gbdt` crate.
//!
//! The crate works in `f32` and expects labels of `+1`/`-1` for the
//! `LogLikelyhood` loss; prediction already returns a probability.

use std::fmt;
use std::fs;
use std::path::Path;

use gbdt::config::Config;
use gbdt::decision_tree::Data;
use gbdt::gradient_boost::GBDT;
use serde::{Deserialize, Serialize};

use super::{ModelError, RiskModel};
use crate::preprocessing::FeatureMatrix;

/// Boosting hyper-parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingParams {
    pub iterations: usize,
    pub learning_rate: f64,
    pub max_depth: u32,
    pub min_leaf_size: usize,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            iterations: 500,
            learning_rate: 0.1,
            max_depth: 6,
            min_leaf_size: 1,
        }
    }
}

/// On-disk model file: the trees plus the feature order they expect.
#[derive(Serialize, Deserialize)]
struct ModelArtifact {
    feature_names: Vec<String>,
    gbdt: GBDT,
}

pub struct GbdtRiskModel {
    feature_names: Vec<String>,
    model: GBDT,
}

impl fmt::Debug for GbdtRiskModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GbdtRiskModel")
            .field("feature_names", &self.feature_names)
            .finish_non_exhaustive()
    }
}

/// Weight applied to positive rows: negatives / positives, or 1.0 without positives.
pub fn scale_pos_weight(labels: &[f64]) -> f64 {
    let positives = labels.iter().filter(|y| **y > 0.5).count();
    let negatives = labels.len() - positives;
    if positives == 0 {
        1.0
    } else {
        negatives as f64 / positives as f64
    }
}

fn to_f32(row: &[f64]) -> Vec<f32> {
    row.iter().map(|v| *v as f32).collect()
}

impl GbdtRiskModel {
    /// Train on preprocessed rows with 0/1 labels.
    pub fn train(
        features: &FeatureMatrix,
        labels: &[f64],
        params: &TrainingParams,
    ) -> Result<Self, ModelError> {
        if features.rows() == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }
        if features.rows() != labels.len() {
            return Err(ModelError::LabelMismatch {
                rows: features.rows(),
                labels: labels.len(),
            });
        }

        let pos_weight = scale_pos_weight(labels);
        log::info!(
            "Training GBDT on {} rows x {} features (scale_pos_weight = {:.3})",
            features.rows(),
            features.width(),
            pos_weight
        );

        let mut cfg = Config::new();
        cfg.set_feature_size(features.width());
        cfg.set_max_depth(params.max_depth);
        cfg.set_iterations(params.iterations);
        cfg.set_shrinkage(params.learning_rate as f32);
        cfg.set_loss("LogLikelyhood");
        cfg.set_debug(false);
        cfg.set_training_optimization_level(2);
        cfg.set_min_leaf_size(params.min_leaf_size);

        let mut data: Vec<Data> = features
            .iter_rows()
            .zip(labels)
            .map(|(row, &y)| {
                let (label, weight) = if y > 0.5 {
                    (1.0_f32, pos_weight as f32)
                } else {
                    (-1.0_f32, 1.0_f32)
                };
                Data::new_training_data(to_f32(row), weight, label, None)
            })
            .collect();

        let mut model = GBDT::new(&cfg);
        model.fit(&mut data);

        Ok(Self {
            feature_names: features.columns.clone(),
            model,
        })
    }

    /// Load a model file. Fails when the file is absent or malformed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let artifact: ModelArtifact = serde_json::from_str(&content)?;
        Ok(Self {
            feature_names: artifact.feature_names,
            model: artifact.gbdt,
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        let path = path.as_ref();
        let artifact = ModelArtifactRef {
            feature_names: &self.feature_names,
            gbdt: &self.model,
        };
        let content = serde_json::to_string(&artifact)?;
        fs::write(path, content).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

#[derive(Serialize)]
struct ModelArtifactRef<'a> {
    feature_names: &'a [String],
    gbdt: &'a GBDT,
}

impl RiskModel for GbdtRiskModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<f64>, ModelError> {
        self.check_features(&features.columns)?;
        if features.rows() == 0 {
            return Ok(Vec::new());
        }
        let data: Vec<Data> = features
            .iter_rows()
            .map(|row| Data::new_test_data(to_f32(row), None))
            .collect();
        Ok(self
            .model
            .predict(&data)
            .into_iter()
            .map(|p| f64::from(p).clamp(0.0, 1.0))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (FeatureMatrix, Vec<f64>) {
        let columns = vec!["a".to_string(), "b".to_string()];
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            let x = i as f64;
            rows.push(vec![x, 1.0]);
            labels.push(if i >= 10 { 1.0 } else { 0.0 });
        }
        (FeatureMatrix::from_rows(columns, &rows).unwrap(), labels)
    }

    fn small_params() -> TrainingParams {
        TrainingParams {
            iterations: 20,
            learning_rate: 0.3,
            max_depth: 3,
            min_leaf_size: 1,
        }
    }

    #[test]
    fn test_scale_pos_weight() {
        assert_eq!(scale_pos_weight(&[0.0, 0.0, 0.0, 1.0]), 3.0);
        assert_eq!(scale_pos_weight(&[0.0, 0.0]), 1.0);
        assert_eq!(scale_pos_weight(&[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_train_and_predict_probabilities() {
        let (features, labels) = separable();
        let model = GbdtRiskModel::train(&features, &labels, &small_params()).unwrap();
        let probs = model.predict_proba(&features).unwrap();

        assert_eq!(probs.len(), 20);
        assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
        assert!(probs[19] > probs[0]);
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let (features, labels) = separable();
        let model = GbdtRiskModel::train(&features, &labels, &small_params()).unwrap();
        let one = features.select_rows(&[15]);
        assert_eq!(
            model.predict_proba(&one).unwrap(),
            model.predict_proba(&one).unwrap()
        );
    }

    #[test]
    fn test_save_and_load_round_trip_predictions() {
        let (features, labels) = separable();
        let model = GbdtRiskModel::train(&features, &labels, &small_params()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fire_risk_model.json");
        model.save(&path).unwrap();

        let loaded = GbdtRiskModel::load(&path).unwrap();
        assert_eq!(loaded.feature_names(), model.feature_names());
        assert_eq!(
            loaded.predict_proba(&features).unwrap(),
            model.predict_proba(&features).unwrap()
        );
    }

    #[test]
    fn test_feature_mismatch_is_rejected() {
        let (features, labels) = separable();
        let model = GbdtRiskModel::train(&features, &labels, &small_params()).unwrap();
        let other = FeatureMatrix::from_rows(vec!["b".into(), "a".into()], &[vec![1.0, 2.0]])
            .unwrap();
        assert!(matches!(
            model.predict_proba(&other),
            Err(ModelError::FeatureMismatch { .. })
        ));
    }

    #[test]
    fn test_train_rejects_empty_and_mismatched() {
        let empty = FeatureMatrix::from_rows(vec!["a".into()], &[]).unwrap();
        assert!(matches!(
            GbdtRiskModel::train(&empty, &[], &small_params()),
            Err(ModelError::EmptyTrainingSet)
        ));

        let (features, _) = separable();
        assert!(matches!(
            GbdtRiskModel::train(&features, &[1.0], &small_params()),
            Err(ModelError::LabelMismatch { rows: 20, labels: 1 })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = GbdtRiskModel::load("/nonexistent/model.json").unwrap_err();
        assert!(matches!(err, ModelError::Io { .. }));
    }
}
