//! Configuration error taxonomy for a verification run
//!
//! Anything here stops the run before a rule executes. Per-feature anomalies are
//! not errors, they are the `ErrorRecord` output of the rules.

use crate::network::GeometryKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("layer '{name}' not found")]
    LayerNotFound { name: String },

    #[error("layer '{layer}' has geometry kind {found}, expected {expected}")]
    GeometryKindMismatch {
        layer: String,
        expected: GeometryKind,
        found: GeometryKind,
    },

    #[error("feature {feature_id} in layer '{layer}' is not a {expected} geometry")]
    MixedGeometry {
        layer: String,
        feature_id: i64,
        expected: GeometryKind,
    },

    #[error("tolerance must be a finite non-negative number, got {0}")]
    InvalidTolerance(f64),

    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("JSON error: {source} (path: {path})")]
    Json {
        source: serde_json::Error,
        path: PathBuf,
    },

    #[error("continuity model failed: {0}")]
    Model(String),
}

pub type Result<T> = std::result::Result<T, VerifyError>;
