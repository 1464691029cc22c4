//! Probability -> risk tier mapping.

use serde::{Deserialize, Serialize};

/// Above this probability a location is flagged as fire.
pub const FIRE_THRESHOLD: f64 = 0.5;
/// Above this probability the tier is [`RiskLevel::High`].
pub const HIGH_RISK_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// Tier for an unrounded probability. Both thresholds are strict.
    pub fn classify(probability: f64) -> Self {
        if probability > HIGH_RISK_THRESHOLD {
            RiskLevel::High
        } else if probability > FIRE_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Round to 4 decimals for responses.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Scored outcome as returned to clients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub probability: f64,
    pub risk_level: RiskLevel,
    pub is_fire: bool,
}

impl RiskAssessment {
    /// Build from the raw model output. Tier and flag use the unrounded value.
    pub fn from_probability(probability: f64) -> Self {
        Self {
            probability: round4(probability),
            risk_level: RiskLevel::classify(probability),
            is_fire: probability > FIRE_THRESHOLD,
        }
    }
}
