//! Inference: engineered batch → scaled → selected → classified → labels.

mod pipeline;

pub use pipeline::{ChurnPipeline, Pipeline};

use crate::error::{ChurnError, Result};
use crate::report::ClassificationReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-row outcome. The classifier was trained with 0 = churned, 1 = retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prediction {
    Churned,
    Retained,
}

impl Prediction {
    pub fn from_class(class: i64) -> Result<Self> {
        match class {
            0 => Ok(Prediction::Churned),
            1 => Ok(Prediction::Retained),
            other => Err(ChurnError::Prediction(format!(
                "classifier returned unknown class {}",
                other
            ))),
        }
    }

    /// Ground-truth label as found in uploads: the name or the class number.
    pub fn parse_label(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "churned" | "0" => Some(Prediction::Churned),
            "retained" | "1" => Some(Prediction::Retained),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Prediction::Churned => "churned",
            Prediction::Retained => "retained",
        }
    }
}

impl std::fmt::Display for Prediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of scoring one upload.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredBatch {
    pub batch_id: Uuid,
    pub scored_at: DateTime<Utc>,
    /// Same order as the input rows
    pub predictions: Vec<Prediction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ClassificationReport>,
}

impl ScoredBatch {
    pub fn churned(&self) -> usize {
        self.predictions
            .iter()
            .filter(|p| **p == Prediction::Churned)
            .count()
    }

    pub fn retained(&self) -> usize {
        self.predictions.len() - self.churned()
    }
}
