//! Hold-out evaluation of a binary classifier.

use serde::Serialize;

/// Confusion-matrix summary at a fixed decision threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Score `probabilities` against 0/1 `labels`; a row is predicted positive
/// when its probability is strictly above `threshold`. Undefined ratios are 0.
pub fn evaluate(probabilities: &[f64], labels: &[f64], threshold: f64) -> ClassificationMetrics {
    let (mut tp, mut fp, mut tn, mut fn_) = (0usize, 0usize, 0usize, 0usize);
    for (p, y) in probabilities.iter().zip(labels) {
        match (*p > threshold, *y > 0.5) {
            (true, true) => tp += 1,
            (true, false) => fp += 1,
            (false, false) => tn += 1,
            (false, true) => fn_ += 1,
        }
    }

    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    let support = tp + fp + tn + fn_;
    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    ClassificationMetrics {
        accuracy: ratio(tp + tn, support),
        precision,
        recall,
        f1,
        support,
    }
}
