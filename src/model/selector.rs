//! Model-driven feature selection: the fitted sparse linear model and the
//! selector built on it travel together as one artifact.

use super::{check_finite, check_names, Artifact, Capability, Transform};
use crate::error::{ChurnError, Result};
use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Fitted linear model whose coefficient magnitudes drive selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearEstimator {
    pub coef: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

/// Keeps columns whose `|coef| >= threshold`, optionally capped to the
/// `max_features` largest (ties keep the earlier column).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectFromModel {
    pub estimator: LinearEstimator,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_features: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names_in: Option<Vec<String>>,
}

/// Threshold used for L1-penalised estimators.
fn default_threshold() -> f64 {
    1e-5
}

impl SelectFromModel {
    /// Boolean mask over input columns.
    pub fn support(&self) -> Vec<bool> {
        let scores: Vec<f64> = self.estimator.coef.iter().map(|c| c.abs()).collect();
        let mut mask = vec![self.max_features.is_none(); scores.len()];
        if let Some(k) = self.max_features {
            let mut order: Vec<usize> = (0..scores.len()).collect();
            order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
            for &i in order.iter().take(k) {
                mask[i] = true;
            }
        }
        for (m, s) in mask.iter_mut().zip(&scores) {
            if *s < self.threshold {
                *m = false;
            }
        }
        mask
    }

    pub fn selected_indices(&self) -> Vec<usize> {
        self.support()
            .iter()
            .enumerate()
            .filter_map(|(i, &keep)| keep.then_some(i))
            .collect()
    }

    /// Names of the retained columns, when fit-time names were recorded and
    /// cover every coefficient.
    pub fn selected_names(&self) -> Option<Vec<String>> {
        let names = self.feature_names_in.as_ref()?;
        self.selected_indices()
            .into_iter()
            .map(|i| names.get(i).cloned())
            .collect()
    }
}

impl Transform for SelectFromModel {
    fn feature_names_in(&self) -> Option<&[String]> {
        self.feature_names_in.as_deref()
    }

    fn n_features_in(&self) -> usize {
        self.estimator.coef.len()
    }

    fn n_features_out(&self) -> usize {
        self.selected_indices().len()
    }

    fn feature_names_out(&self) -> Option<Vec<String>> {
        self.selected_names()
    }

    fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features_in() {
            return Err(ChurnError::Transform(format!(
                "X has {} features, but SelectFromModel is expecting {} features as input",
                x.ncols(),
                self.n_features_in()
            )));
        }
        Ok(x.select(Axis(1), &self.selected_indices()))
    }
}

impl Capability for SelectFromModel {
    const NAME: &'static str = "feature selector";

    fn from_artifact(artifact: Artifact) -> std::result::Result<Self, Artifact> {
        match artifact {
            Artifact::SelectFromModel(s) => Ok(s),
            other => Err(other),
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let n = self.estimator.coef.len();
        if n == 0 {
            return Err("selector estimator has no coefficients".to_string());
        }
        check_finite("estimator coef", &self.estimator.coef)?;
        if !self.threshold.is_finite() {
            return Err("selection threshold is not finite".to_string());
        }
        if let Some(k) = self.max_features {
            if k == 0 || k > n {
                return Err(format!("max_features {} outside 1..={}", k, n));
            }
        }
        check_names(self.feature_names_in.as_deref(), n)?;
        if self.support().iter().all(|keep| !keep) {
            return Err("no features were selected".to_string());
        }
        Ok(())
    }
}
