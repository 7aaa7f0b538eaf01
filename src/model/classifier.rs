//! Binary logistic regression.

use super::{check_finite, check_names, Artifact, Capability, Predict};
use crate::error::{ChurnError, Result};
use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coef: Vec<f64>,
    pub intercept: f64,
    /// `classes[1]` is predicted when the decision value is positive
    #[serde(default = "default_classes")]
    pub classes: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names_in: Option<Vec<String>>,
}

fn default_classes() -> Vec<i64> {
    vec![0, 1]
}

impl LogisticRegression {
    /// Signed distance from the decision boundary, per row.
    pub fn decision_function(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.coef.len() {
            return Err(ChurnError::Prediction(format!(
                "X has {} features, but LogisticRegression is expecting {} features as input",
                x.ncols(),
                self.coef.len()
            )));
        }
        if let Some((row, _)) = x
            .outer_iter()
            .enumerate()
            .find(|(_, r)| r.iter().any(|v| !v.is_finite()))
        {
            return Err(ChurnError::Prediction(format!(
                "row {} contains a missing or infinite feature value",
                row + 1
            )));
        }
        let coef = ArrayView1::from(&self.coef[..]);
        Ok(x.dot(&coef) + self.intercept)
    }
}

impl Predict for LogisticRegression {
    fn feature_names_in(&self) -> Option<&[String]> {
        self.feature_names_in.as_deref()
    }

    fn n_features_in(&self) -> usize {
        self.coef.len()
    }

    fn predict(&self, x: ArrayView2<f64>) -> Result<Vec<i64>> {
        let (negative, positive) = match self.classes.as_slice() {
            &[negative, positive] => (negative, positive),
            other => {
                return Err(ChurnError::Prediction(format!(
                    "binary classifier needs 2 classes, found {}",
                    other.len()
                )))
            }
        };
        let scores = self.decision_function(x)?;
        Ok(scores
            .iter()
            .map(|&z| if z > 0.0 { positive } else { negative })
            .collect())
    }
}

impl Capability for LogisticRegression {
    const NAME: &'static str = "classifier";

    fn from_artifact(artifact: Artifact) -> std::result::Result<Self, Artifact> {
        match artifact {
            Artifact::LogisticRegression(m) => Ok(m),
            other => Err(other),
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.coef.is_empty() {
            return Err("classifier has no coefficients".to_string());
        }
        if self.classes.len() != 2 {
            return Err(format!(
                "binary classifier needs 2 classes, found {}",
                self.classes.len()
            ));
        }
        check_finite("coef", &self.coef)?;
        check_finite("intercept", &[self.intercept])?;
        check_names(self.feature_names_in.as_deref(), self.coef.len())
    }
}
