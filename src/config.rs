//! Scorer configuration: where the fitted artifacts live, how uploads are read,
//! where the upload form listens, and logging.

use crate::error::{ChurnError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Env var naming the JSON config file.
pub const CONFIG_PATH_ENV: &str = "WAZE_CHURN_CONFIG_PATH";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChurnConfig {
    /// Fitted scaler / selector / classifier locations
    pub artifacts: ArtifactsConfig,
    /// Input column handling
    pub features: FeaturesConfig,
    /// Upload form server
    pub server: ServerConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// URL (`http://`, `https://`) or local path of the fitted scaler
    pub scaler: String,
    /// Paired model + selector artifact
    pub selector: String,
    /// Fitted logistic regression
    pub classifier: String,
    /// Per-request timeout for remote artifacts (seconds)
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Columns dropped before any numeric work
    pub identifier_columns: Vec<String>,
    /// Optional ground-truth column, captured for the report and never scored
    pub label_column: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            scaler: "artifacts/scaler.json".to_string(),
            selector: "artifacts/lasso_model_and_selector.json".to_string(),
            classifier: "artifacts/logistic_regression_model.json".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            identifier_columns: vec!["ID".to_string(), "device".to_string()],
            label_column: "label".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8501".to_string(),
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl ChurnConfig {
    /// Load from JSON file if present; otherwise return default. A file that
    /// exists but does not parse is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        serde_json::from_str(&data)
            .map_err(|e| ChurnError::Config(format!("{}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let c = ChurnConfig::load(Path::new("does-not-exist.json")).unwrap();
        assert_eq!(c.features.identifier_columns, vec!["ID", "device"]);
        assert_eq!(c.features.label_column, "label");
        assert_eq!(c.artifacts.timeout_secs, 30);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("churn.json");
        std::fs::write(
            &path,
            r#"{"artifacts": {"scaler": "https://example.org/scaler.json"}, "log": {"json": true}}"#,
        )
        .unwrap();
        let c = ChurnConfig::load(&path).unwrap();
        assert_eq!(c.artifacts.scaler, "https://example.org/scaler.json");
        assert_eq!(c.artifacts.classifier, "artifacts/logistic_regression_model.json");
        assert!(c.log.json);
        assert_eq!(c.log.level, "info");
    }

    #[test]
    fn malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("churn.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(ChurnConfig::load(&path), Err(ChurnError::Config(_))));
    }
}
