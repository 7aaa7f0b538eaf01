//! Fitted model artifacts and the two capabilities the pipeline needs from
//! them: `transform` (scaler, selector) and `predict` (classifier).
//!
//! Artifacts are JSON exports of externally trained objects, tagged by `kind`.

mod classifier;
mod scaler;
mod selector;

pub use classifier::LogisticRegression;
pub use scaler::{MinMaxScaler, Scaler, StandardScaler};
pub use selector::{LinearEstimator, SelectFromModel};

use crate::error::Result;
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// A fitted column transform.
pub trait Transform {
    /// Column names seen at fit time, when the exporter recorded them.
    fn feature_names_in(&self) -> Option<&[String]>;
    fn n_features_in(&self) -> usize;
    fn n_features_out(&self) -> usize;

    /// Names of the output columns; column-wise transforms pass names through.
    fn feature_names_out(&self) -> Option<Vec<String>> {
        self.feature_names_in().map(<[String]>::to_vec)
    }

    fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>>;
}

/// A fitted classifier producing one class label per row.
pub trait Predict {
    fn feature_names_in(&self) -> Option<&[String]>;
    fn n_features_in(&self) -> usize;
    fn predict(&self, x: ArrayView2<f64>) -> Result<Vec<i64>>;
}

/// Conversion from a decoded artifact into one capability, plus the internal
/// consistency checks that must pass before it is used.
pub trait Capability: Sized {
    /// Human name used in diagnostics.
    const NAME: &'static str;

    /// Hands the artifact back when it is the wrong kind.
    fn from_artifact(artifact: Artifact) -> std::result::Result<Self, Artifact>;

    fn validate(&self) -> std::result::Result<(), String>;
}

/// Any artifact this scorer understands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Artifact {
    StandardScaler(StandardScaler),
    MinMaxScaler(MinMaxScaler),
    SelectFromModel(SelectFromModel),
    LogisticRegression(LogisticRegression),
}

impl Artifact {
    pub fn kind(&self) -> &'static str {
        match self {
            Artifact::StandardScaler(_) => "standard_scaler",
            Artifact::MinMaxScaler(_) => "min_max_scaler",
            Artifact::SelectFromModel(_) => "select_from_model",
            Artifact::LogisticRegression(_) => "logistic_regression",
        }
    }
}

/// Shared checks for optional fit-time names.
fn check_names(names: Option<&[String]>, expected: usize) -> std::result::Result<(), String> {
    match names {
        Some(n) if n.len() != expected => Err(format!(
            "{} feature names recorded for {} features",
            n.len(),
            expected
        )),
        _ => Ok(()),
    }
}

fn check_finite(label: &str, values: &[f64]) -> std::result::Result<(), String> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(format!("{} contains non-finite values", label))
    }
}
