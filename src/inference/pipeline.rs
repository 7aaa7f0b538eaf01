//! The fixed inference pipeline, built once from verified artifacts and shared
//! read-only by every request.

use super::{Prediction, ScoredBatch};
use crate::artifacts::{ArtifactSet, Verified};
use crate::error::{ChurnError, Result};
use crate::features::columns::{DURATION_MINUTES_DRIVES, N_DAYS_AFTER_ONBOARDING, SCALED};
use crate::features::{read_batch, FeatureEngineer, Frame};
use crate::model::{LogisticRegression, Predict, Scaler, SelectFromModel, Transform};
use crate::report::ClassificationReport;
use chrono::Utc;
use std::io::Read;
use tracing::info;
use uuid::Uuid;

const DAYS_PER_YEAR: f64 = 365.0;
const MINUTES_PER_DAY: f64 = 60.0 * 24.0;

/// Generic over the three capabilities so any scaler, selector or classifier
/// that provides them slots in.
pub struct Pipeline<S = Scaler, F = SelectFromModel, C = LogisticRegression> {
    engineer: FeatureEngineer,
    scaler: Verified<S>,
    selector: Verified<F>,
    classifier: Verified<C>,
}

/// The pipeline over the artifact kinds this scorer ships with.
pub type ChurnPipeline = Pipeline<Scaler, SelectFromModel, LogisticRegression>;

impl ChurnPipeline {
    pub fn from_artifacts(engineer: FeatureEngineer, artifacts: ArtifactSet) -> Result<Self> {
        Self::new(
            engineer,
            artifacts.scaler,
            artifacts.selector,
            artifacts.classifier,
        )
    }
}

impl<S: Transform, F: Transform, C: Predict> Pipeline<S, F, C> {
    /// Checks that the artifacts fit together before any batch is scored.
    pub fn new(
        engineer: FeatureEngineer,
        scaler: Verified<S>,
        selector: Verified<F>,
        classifier: Verified<C>,
    ) -> Result<Self> {
        if scaler.n_features_in() != SCALED.len() {
            return Err(ChurnError::IncompatibleArtifacts(format!(
                "scaler from {} expects {} columns, pipeline scales {}",
                scaler.source(),
                scaler.n_features_in(),
                SCALED.len()
            )));
        }
        if let Some(names) = scaler.feature_names_in() {
            if names.iter().map(String::as_str).ne(SCALED.iter().copied()) {
                return Err(ChurnError::IncompatibleArtifacts(format!(
                    "scaler from {} was fitted on {:?}, pipeline scales {:?}",
                    scaler.source(),
                    names,
                    SCALED
                )));
            }
        }
        if selector.n_features_out() != classifier.n_features_in() {
            return Err(ChurnError::IncompatibleArtifacts(format!(
                "selector from {} keeps {} features, classifier from {} expects {}",
                selector.source(),
                selector.n_features_out(),
                classifier.source(),
                classifier.n_features_in()
            )));
        }
        if let (Some(kept), Some(expected)) =
            (selector.feature_names_out(), classifier.feature_names_in())
        {
            if kept.as_slice() != expected {
                return Err(ChurnError::IncompatibleArtifacts(format!(
                    "selector from {} keeps {:?}, classifier from {} was fitted on {:?}",
                    selector.source(),
                    kept,
                    classifier.source(),
                    expected
                )));
            }
        }
        Ok(Self {
            engineer,
            scaler,
            selector,
            classifier,
        })
    }

    /// Score an already engineered batch. Either every row gets a prediction
    /// or the whole batch fails.
    pub fn score(&self, engineered: &Frame) -> Result<Vec<Prediction>> {
        let mut frame = engineered.clone();
        frame.map_column(N_DAYS_AFTER_ONBOARDING, |d| d / DAYS_PER_YEAR)?;
        frame.map_column(DURATION_MINUTES_DRIVES, |m| m / MINUTES_PER_DAY)?;

        let block = frame.select(&SCALED).map_err(|c| {
            ChurnError::Transform(format!("column `{}` required for scaling is missing", c))
        })?;
        let scaled = self.scaler.transform(block.view())?;
        frame.assign(&SCALED, &scaled)?;

        let x = match self.selector.feature_names_in() {
            Some(names) => frame.select(names).map_err(|c| {
                ChurnError::Transform(format!(
                    "selector was fitted with column `{}`, which the batch lacks",
                    c
                ))
            })?,
            None => frame.values().clone(),
        };
        let selected = self.selector.transform(x.view())?;

        let classes = self.classifier.predict(selected.view())?;
        if classes.len() != frame.n_rows() {
            return Err(ChurnError::Prediction(format!(
                "classifier returned {} labels for {} rows",
                classes.len(),
                frame.n_rows()
            )));
        }
        classes.into_iter().map(Prediction::from_class).collect()
    }

    /// Engineer then score a raw batch.
    pub fn predict(&self, raw: &Frame) -> Result<Vec<Prediction>> {
        let engineered = self.engineer.engineer(raw)?;
        self.score(&engineered.frame)
    }

    /// Full upload path: parse CSV, score, and grade against ground truth
    /// when the upload carries it.
    pub fn score_csv<R: Read>(&self, reader: R) -> Result<ScoredBatch> {
        let batch_id = Uuid::new_v4();
        let raw = read_batch(reader, self.engineer.config())?;
        let predictions = self.predict(&raw.frame)?;
        let report = match raw.labels {
            Some(labels) => ClassificationReport::from_labels(&labels, &predictions)?,
            None => None,
        };
        let scored = ScoredBatch {
            batch_id,
            scored_at: Utc::now(),
            predictions,
            report,
        };
        info!(
            batch_id = %scored.batch_id,
            rows = scored.predictions.len(),
            churned = scored.churned(),
            retained = scored.retained(),
            "batch scored"
        );
        Ok(scored)
    }
}
