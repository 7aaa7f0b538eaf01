//! Per-class precision / recall / F1 against the optional ground-truth column.

use crate::error::{ChurnError, Result};
use crate::inference::Prediction;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub label: Prediction,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Precision / recall / F1 averaged over the reported classes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

impl AverageMetrics {
    /// Unweighted mean over classes.
    fn macro_avg(classes: &[ClassMetrics]) -> Self {
        let n = classes.len().max(1) as f64;
        let mean = |f: fn(&ClassMetrics) -> f64| classes.iter().map(f).sum::<f64>() / n;
        Self {
            precision: mean(|m| m.precision),
            recall: mean(|m| m.recall),
            f1: mean(|m| m.f1),
            support: classes.iter().map(|m| m.support).sum(),
        }
    }

    /// Mean weighted by each class's support.
    fn weighted_avg(classes: &[ClassMetrics]) -> Self {
        let support: usize = classes.iter().map(|m| m.support).sum();
        let mean = |f: fn(&ClassMetrics) -> f64| {
            if support == 0 {
                0.0
            } else {
                classes.iter().map(|m| f(m) * m.support as f64).sum::<f64>() / support as f64
            }
        };
        Self {
            precision: mean(|m| m.precision),
            recall: mean(|m| m.recall),
            f1: mean(|m| m.f1),
            support,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    /// Classes seen in either the labels or the predictions
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    /// Rows that carried a label
    pub labelled: usize,
}

impl ClassificationReport {
    /// Rows with an empty label are left out. Returns `None` when no row is
    /// labelled; an unrecognised label is an input error.
    pub fn from_labels<S: AsRef<str>>(
        truth: &[S],
        predicted: &[Prediction],
    ) -> Result<Option<Self>> {
        if truth.len() != predicted.len() {
            return Err(ChurnError::Input(format!(
                "{} labels for {} predictions",
                truth.len(),
                predicted.len()
            )));
        }
        let mut pairs = Vec::with_capacity(truth.len());
        for (row, (t, &p)) in truth.iter().zip(predicted).enumerate() {
            let t = t.as_ref().trim();
            if t.is_empty() {
                continue;
            }
            let actual = Prediction::parse_label(t).ok_or_else(|| {
                ChurnError::Input(format!("row {}: unrecognised label {:?}", row + 1, t))
            })?;
            pairs.push((actual, p));
        }
        if pairs.is_empty() {
            return Ok(None);
        }

        let correct = pairs.iter().filter(|(a, p)| a == p).count();
        let classes: Vec<ClassMetrics> = [Prediction::Churned, Prediction::Retained]
            .into_iter()
            .filter(|&label| pairs.iter().any(|&(a, p)| a == label || p == label))
            .map(|label| class_metrics(label, &pairs))
            .collect();
        Ok(Some(Self {
            accuracy: correct as f64 / pairs.len() as f64,
            macro_avg: AverageMetrics::macro_avg(&classes),
            weighted_avg: AverageMetrics::weighted_avg(&classes),
            classes,
            labelled: pairs.len(),
        }))
    }
}

fn class_metrics(label: Prediction, pairs: &[(Prediction, Prediction)]) -> ClassMetrics {
    let tp = pairs.iter().filter(|(a, p)| *a == label && *p == label).count();
    let predicted = pairs.iter().filter(|(_, p)| *p == label).count();
    let support = pairs.iter().filter(|(a, _)| *a == label).count();
    let ratio = |n: usize, d: usize| if d == 0 { 0.0 } else { n as f64 / d as f64 };
    let precision = ratio(tp, predicted);
    let recall = ratio(tp, support);
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };
    ClassMetrics {
        label,
        precision,
        recall,
        f1,
        support,
    }
}
