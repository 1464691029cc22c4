//! Fitted preprocessing applied identically at training and serving time.
//!
//! # Stage order
//!
//! ```text
//! log1p ──► robust scale ──► target encode province ──► standardize province ──► standardize lat/lon ──► reindex
//! ```
//!
//! [`PreprocessorState::fit`] fits each stage on the output of the previous
//! one and applies it with the same code that [`PreprocessorState::transform`]
//! uses later, so the two modes cannot drift apart.

pub mod pipeline;
pub mod scalers;
pub mod target_encoder;

pub use pipeline::{FeatureMatrix, PreprocessorState};
pub use scalers::{RobustScaler, StandardScaler};
pub use target_encoder::TargetEncoder;

/// Errors raised while fitting, applying or persisting the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    #[error("required column `{0}` is missing")]
    MissingColumn(String),

    #[error("column `{0}` is not numeric")]
    NonNumericColumn(String),

    #[error("column `{0}` has no finite values to fit on")]
    EmptyColumn(String),

    #[error("training table has {rows} rows but {labels} labels")]
    LabelMismatch { rows: usize, labels: usize },

    #[error("invalid preprocessor state: {0}")]
    InvalidState(String),

    #[error("failed to access preprocessor file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed preprocessor file: {0}")]
    Format(#[from] serde_json::Error),
}
