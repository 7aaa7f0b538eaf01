//! Error types for artifact loading, feature engineering and inference.

use thiserror::Error;

/// Every failure the scorer can report. None of them are retried; the shell
/// renders the message and keeps accepting uploads.
#[derive(Error, Debug)]
pub enum ChurnError {
    /// Network or HTTP failure while fetching an artifact
    #[error("failed to retrieve artifact from {source_id}: {reason}")]
    ArtifactRetrieval { source_id: String, reason: String },

    /// Payload could not be decoded, or decoded into inconsistent parameters
    #[error("failed to decode artifact from {source_id}: {reason}")]
    ArtifactDecode { source_id: String, reason: String },

    /// Artifact decoded fine but does not provide the expected capability
    #[error("artifact from {source_id} is a {found}, expected a {expected}")]
    ArtifactTypeMismatch {
        source_id: String,
        expected: &'static str,
        found: String,
    },

    /// Artifacts are individually valid but do not fit together
    #[error("incompatible artifacts: {0}")]
    IncompatibleArtifacts(String),

    /// Empty, absent or malformed input batch
    #[error("invalid input: {0}")]
    Input(String),

    /// Scaling or feature selection rejected the shaped input
    #[error("transform failed: {0}")]
    Transform(String),

    /// Classifier invocation failed
    #[error("prediction failed: {0}")]
    Prediction(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ChurnError {
    /// True for the startup-fatal artifact categories.
    pub fn is_artifact_error(&self) -> bool {
        matches!(
            self,
            ChurnError::ArtifactRetrieval { .. }
                | ChurnError::ArtifactDecode { .. }
                | ChurnError::ArtifactTypeMismatch { .. }
                | ChurnError::IncompatibleArtifacts(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ChurnError>;
