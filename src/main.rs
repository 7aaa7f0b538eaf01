//! Waze churn scorer entrypoint. Loads the three fitted artifacts once, then
//! either scores the CSV named on the command line and prints the result
//! table, or serves the upload form.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use waze_churn::{
    artifacts::ArtifactLoader,
    config::{ChurnConfig, CONFIG_PATH_ENV},
    features::FeatureEngineer,
    inference::ChurnPipeline,
    logging::StructuredLogger,
    shell::{self, AppState},
    ChurnError,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The loader and its blocking HTTP client are dropped here, before any
/// async runtime starts.
fn load_pipeline(config: &ChurnConfig) -> Result<ChurnPipeline, ChurnError> {
    let loader = ArtifactLoader::new(&config.artifacts)?;
    let artifacts = loader.load_all(&config.artifacts)?;
    ChurnPipeline::from_artifacts(FeatureEngineer::new(config.features.clone()), artifacts)
}

fn run_once(pipeline: &ChurnPipeline, path: &Path) -> Result<(), BoxError> {
    let file = std::fs::File::open(path)?;
    let scored = pipeline.score_csv(file)?;

    let mut out = csv::Writer::from_writer(std::io::stdout().lock());
    out.write_record(["Predicted"])?;
    for p in &scored.predictions {
        out.write_record([p.as_str()])?;
    }
    out.flush()?;

    if let Some(report) = &scored.report {
        info!(
            accuracy = report.accuracy,
            labelled = report.labelled,
            "classification report"
        );
    }
    Ok(())
}

fn main() -> Result<(), BoxError> {
    let config_path = std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("churn.json"));
    let config = ChurnConfig::load(&config_path)?;

    StructuredLogger::init(&config.log);
    info!(config = %config_path.display(), "waze churn scorer starting");

    let pipeline = load_pipeline(&config).map_err(|e| {
        if e.is_artifact_error() {
            error!(error = %e, "artifact load failed; not scoring");
        } else {
            error!(error = %e, "startup failed");
        }
        e
    })?;

    if let Some(input) = std::env::args_os().nth(1) {
        return run_once(&pipeline, Path::new(&input));
    }

    let state = Arc::new(AppState { pipeline });
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(shell::serve(state, &config.server))?;
    info!("waze churn scorer stopping");
    Ok(())
}
