//! Waze churn scorer: upload a CSV of user activity, get a churned/retained
//! label per row from a pretrained scaler → selector → classifier pipeline.
//!
//! Modular structure:
//! - [`artifacts`] — One-shot retrieval and verification of fitted artifacts
//! - [`model`] — Scaler, selector and classifier artifacts behind `Transform`/`Predict`
//! - [`features`] — CSV batches, batch medians, segmentation and ratio features
//! - [`inference`] — The fixed scoring pipeline and its output
//! - [`report`] — Classification report against uploaded ground truth
//! - [`shell`] — Upload form HTTP server
//! - [`logging`] — Structured logging

pub mod artifacts;
pub mod config;
pub mod error;
pub mod features;
pub mod inference;
pub mod logging;
pub mod model;
pub mod report;
pub mod shell;

pub use artifacts::{ArtifactLoader, ArtifactSet, Verified};
pub use config::ChurnConfig;
pub use error::{ChurnError, Result};
pub use features::{FeatureEngineer, Frame};
pub use inference::{ChurnPipeline, Pipeline, Prediction, ScoredBatch};
pub use logging::StructuredLogger;
