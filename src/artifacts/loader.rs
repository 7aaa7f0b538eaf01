//! One-shot artifact retrieval at startup: remote over blocking HTTP GET, or
//! from a local file. A single attempt per artifact.

use super::Verified;
use crate::config::ArtifactsConfig;
use crate::error::{ChurnError, Result};
use crate::model::{Capability, LogisticRegression, Scaler, SelectFromModel};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSource {
    Remote(String),
    Local(PathBuf),
}

impl ArtifactSource {
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            ArtifactSource::Remote(s.to_string())
        } else {
            ArtifactSource::Local(PathBuf::from(s))
        }
    }
}

impl std::fmt::Display for ArtifactSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactSource::Remote(url) => f.write_str(url),
            ArtifactSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// The three fitted objects the pipeline runs on.
#[derive(Debug, Clone)]
pub struct ArtifactSet {
    pub scaler: Verified<Scaler>,
    pub selector: Verified<SelectFromModel>,
    pub classifier: Verified<LogisticRegression>,
}

/// Wraps a blocking HTTP client, which owns a runtime of its own: create and
/// drop the loader outside async code.
pub struct ArtifactLoader {
    client: reqwest::blocking::Client,
}

impl ArtifactLoader {
    pub fn new(config: &ArtifactsConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
            .build()
            .map_err(|e| ChurnError::Config(format!("HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Raw bytes of one artifact.
    pub fn fetch(&self, source: &ArtifactSource) -> Result<Vec<u8>> {
        let retrieval = |reason: String| ChurnError::ArtifactRetrieval {
            source_id: source.to_string(),
            reason,
        };
        match source {
            ArtifactSource::Local(path) => std::fs::read(path).map_err(|e| retrieval(e.to_string())),
            ArtifactSource::Remote(url) => {
                let res = self
                    .client
                    .get(url)
                    .send()
                    .map_err(|e| retrieval(e.to_string()))?;
                let status = res.status();
                if !status.is_success() {
                    return Err(retrieval(format!("HTTP {}", status)));
                }
                let body = res.bytes().map_err(|e| retrieval(e.to_string()))?;
                Ok(body.to_vec())
            }
        }
    }

    pub fn load<T: Capability>(&self, source: &str) -> Result<Verified<T>> {
        let source = ArtifactSource::parse(source);
        let bytes = self.fetch(&source)?;
        let verified = Verified::<T>::decode(&bytes, &source.to_string())?;
        info!(source = %source, capability = T::NAME, bytes = bytes.len(), "artifact loaded");
        Ok(verified)
    }

    /// Scaler, selector, classifier, in that order; stops at the first failure.
    pub fn load_all(&self, config: &ArtifactsConfig) -> Result<ArtifactSet> {
        Ok(ArtifactSet {
            scaler: self.load(&config.scaler)?,
            selector: self.load(&config.selector)?,
            classifier: self.load(&config.classifier)?,
        })
    }
}
