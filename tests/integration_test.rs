//! Integration tests: artifact files on disk → loader → pipeline → scored
//! batches, plus the upload form router.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use waze_churn::{
    artifacts::ArtifactLoader,
    config::{ArtifactsConfig, FeaturesConfig},
    features::FeatureEngineer,
    inference::{ChurnPipeline, Prediction},
    shell::{self, AppState},
    ChurnError,
};

const ENGINEERED_COLUMNS: [&str; 16] = [
    "sessions",
    "drives",
    "total_sessions",
    "n_days_after_onboarding",
    "total_navigations_fav1",
    "total_navigations_fav2",
    "driven_km_drives",
    "duration_minutes_drives",
    "activity_days",
    "driving_days",
    "engagement_level",
    "day_level",
    "activity_ratio",
    "avg_distance_per_drive",
    "engagement_ratio",
    "avg_navigations_fav",
];

const USERS_CSV: &str = "\
ID,label,sessions,drives,total_sessions,n_days_after_onboarding,total_navigations_fav1,total_navigations_fav2,driven_km_drives,duration_minutes_drives,activity_days,driving_days,device
0,retained,283,226,296.75,2276,208,0,2628.8,1985.77,28,19,Android
1,retained,133,107,326.90,1225,19,64,13715.92,3160.47,13,11,iPhone
2,churned,114,95,135.52,2651,0,0,3059.14,1610.74,14,8,Android
3,retained,49,40,67.59,15,322,7,913.59,587.20,7,3,iPhone
";

const USERS_CSV_NO_IDS: &str = "\
label,sessions,drives,total_sessions,n_days_after_onboarding,total_navigations_fav1,total_navigations_fav2,driven_km_drives,duration_minutes_drives,activity_days,driving_days
retained,283,226,296.75,2276,208,0,2628.8,1985.77,28,19
retained,133,107,326.90,1225,19,64,13715.92,3160.47,13,11
churned,114,95,135.52,2651,0,0,3059.14,1610.74,14,8
retained,49,40,67.59,15,322,7,913.59,587.20,7,3
";

fn selector_coef() -> Vec<f64> {
    // keeps total_sessions, activity_days, activity_ratio
    let mut coef = vec![0.0; ENGINEERED_COLUMNS.len()];
    coef[2] = 0.2;
    coef[8] = 0.4;
    coef[12] = 0.1;
    coef
}

fn write(dir: &Path, name: &str, value: serde_json::Value) -> String {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_vec_pretty(&value).unwrap()).unwrap();
    path.to_string_lossy().into_owned()
}

/// Retained iff activity_days > 15.
fn fixture() -> (TempDir, ArtifactsConfig) {
    let dir = tempfile::tempdir().unwrap();
    let scaler = write(
        dir.path(),
        "scaler.json",
        json!({
            "kind": "standard_scaler",
            "mean": [0.0, 0.0, 0.0, 0.0],
            "scale": [1.0, 1.0, 1.0, 1.0],
            "feature_names_in": ["total_navigations_fav1", "total_navigations_fav2", "total_sessions", "driven_km_drives"]
        }),
    );
    let selector = write(
        dir.path(),
        "selector.json",
        json!({
            "kind": "select_from_model",
            "estimator": { "coef": selector_coef(), "intercept": 0.3 },
            "feature_names_in": ENGINEERED_COLUMNS
        }),
    );
    let classifier = write(
        dir.path(),
        "classifier.json",
        json!({
            "kind": "logistic_regression",
            "coef": [0.0, 0.5, 0.0],
            "intercept": -7.5,
            "classes": [0, 1]
        }),
    );
    let config = ArtifactsConfig {
        scaler,
        selector,
        classifier,
        timeout_secs: 5,
    };
    (dir, config)
}

fn build(config: &ArtifactsConfig) -> Result<ChurnPipeline, ChurnError> {
    let loader = ArtifactLoader::new(config)?;
    let artifacts = loader.load_all(config)?;
    ChurnPipeline::from_artifacts(FeatureEngineer::new(FeaturesConfig::default()), artifacts)
}

#[test]
fn scores_every_row_in_order() {
    let (_dir, config) = fixture();
    let pipeline = build(&config).unwrap();
    let scored = pipeline.score_csv(USERS_CSV.as_bytes()).unwrap();
    assert_eq!(
        scored.predictions,
        vec![
            Prediction::Retained,
            Prediction::Churned,
            Prediction::Churned,
            Prediction::Churned
        ]
    );
    assert_eq!(scored.churned(), 3);
    assert_eq!(scored.retained(), 1);
}

#[test]
fn report_grades_against_label_column() {
    let (_dir, config) = fixture();
    let pipeline = build(&config).unwrap();
    let report = pipeline
        .score_csv(USERS_CSV.as_bytes())
        .unwrap()
        .report
        .expect("label column present");
    assert_eq!(report.labelled, 4);
    assert_eq!(report.accuracy, 0.5);
}

#[test]
fn rescoring_is_idempotent() {
    let (_dir, config) = fixture();
    let pipeline = build(&config).unwrap();
    let a = pipeline.score_csv(USERS_CSV.as_bytes()).unwrap();
    let b = pipeline.score_csv(USERS_CSV.as_bytes()).unwrap();
    assert_eq!(a.predictions, b.predictions);
    assert_ne!(a.batch_id, b.batch_id);
}

#[test]
fn identifier_columns_do_not_change_predictions() {
    let (_dir, config) = fixture();
    let pipeline = build(&config).unwrap();
    let with_ids = pipeline.score_csv(USERS_CSV.as_bytes()).unwrap();
    let without = pipeline.score_csv(USERS_CSV_NO_IDS.as_bytes()).unwrap();
    assert_eq!(with_ids.predictions, without.predictions);
}

#[test]
fn selector_matches_columns_by_name() {
    let (_dir, config) = fixture();
    let pipeline = build(&config).unwrap();
    let reordered = "\
driving_days,activity_days,duration_minutes_drives,driven_km_drives,total_navigations_fav2,total_navigations_fav1,n_days_after_onboarding,total_sessions,drives,sessions
19,28,1985.77,2628.8,0,208,2276,296.75,226,283
11,13,3160.47,13715.92,64,19,1225,326.90,107,133
8,14,1610.74,3059.14,0,0,2651,135.52,95,114
3,7,587.20,913.59,7,322,15,67.59,40,49
";
    let a = pipeline.score_csv(USERS_CSV.as_bytes()).unwrap();
    let b = pipeline.score_csv(reordered.as_bytes()).unwrap();
    assert_eq!(a.predictions, b.predictions);
    assert!(b.report.is_none());
}

#[test]
fn empty_batch_is_input_error() {
    let (_dir, config) = fixture();
    let pipeline = build(&config).unwrap();
    let header_only = USERS_CSV.lines().next().unwrap();
    let err = pipeline.score_csv(header_only.as_bytes()).unwrap_err();
    assert!(matches!(err, ChurnError::Input(_)));
}

#[test]
fn network_failure_stops_startup() {
    let (_dir, mut config) = fixture();
    config.scaler = "http://127.0.0.1:1/scaler.json".to_string();
    let err = build(&config).err().expect("startup must fail");
    assert!(matches!(err, ChurnError::ArtifactRetrieval { .. }));
}

#[test]
fn wrong_artifact_kind_detected_at_load() {
    let (_dir, mut config) = fixture();
    config.selector = config.classifier.clone();
    let err = build(&config).err().expect("startup must fail");
    match err {
        ChurnError::ArtifactTypeMismatch { expected, found, .. } => {
            assert_eq!(expected, "feature selector");
            assert_eq!(found, "logistic_regression");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn classifier_width_checked_against_selector() {
    let (dir, mut config) = fixture();
    config.classifier = write(
        dir.path(),
        "narrow.json",
        json!({ "kind": "logistic_regression", "coef": [1.0, 1.0], "intercept": 0.0 }),
    );
    let err = build(&config).err().expect("startup must fail");
    assert!(matches!(err, ChurnError::IncompatibleArtifacts(_)));
}

#[test]
fn classifier_names_checked_against_selected_columns() {
    let (dir, mut config) = fixture();
    config.classifier = write(
        dir.path(),
        "renamed.json",
        json!({
            "kind": "logistic_regression",
            "coef": [0.0, 0.5, 0.0],
            "intercept": -7.5,
            "feature_names_in": ["drives", "day_level", "activity_ratio"]
        }),
    );
    let err = build(&config).err().expect("startup must fail");
    match err {
        ChurnError::IncompatibleArtifacts(msg) => assert!(msg.contains("day_level"), "{}", msg),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn classifier_names_matching_selection_accepted() {
    let (dir, mut config) = fixture();
    config.classifier = write(
        dir.path(),
        "named.json",
        json!({
            "kind": "logistic_regression",
            "coef": [0.0, 0.5, 0.0],
            "intercept": -7.5,
            "feature_names_in": ["total_sessions", "activity_days", "activity_ratio"]
        }),
    );
    let scored = build(&config)
        .unwrap()
        .score_csv(USERS_CSV.as_bytes())
        .unwrap();
    assert_eq!(scored.retained(), 1);
}

#[test]
fn positional_selector_width_mismatch_discards_batch() {
    let (dir, mut config) = fixture();
    let mut coef = selector_coef();
    coef.pop();
    config.selector = write(
        dir.path(),
        "positional.json",
        json!({ "kind": "select_from_model", "estimator": { "coef": coef } }),
    );
    let pipeline = build(&config).unwrap();
    let err = pipeline.score_csv(USERS_CSV.as_bytes()).unwrap_err();
    assert!(matches!(err, ChurnError::Transform(_)));
}

fn multipart(csv: &str) -> Request<Body> {
    let body = format!(
        "--XBOUNDARY\r\nContent-Disposition: form-data; name=\"file\"; filename=\"users.csv\"\r\nContent-Type: text/csv\r\n\r\n{}\r\n--XBOUNDARY--\r\n",
        csv
    );
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "multipart/form-data; boundary=XBOUNDARY")
        .body(Body::from(body))
        .unwrap()
}

/// Built from sync code: the loader's blocking client must not be dropped
/// inside the runtime that drives the router.
fn app(config: &ArtifactsConfig) -> axum::Router {
    let state = Arc::new(AppState {
        pipeline: build(config).unwrap(),
    });
    shell::router(state, 1 << 20)
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

async fn body_string(resp: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(resp.into_body(), 1 << 20).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[test]
fn upload_form_renders_predictions() {
    let (_dir, config) = fixture();
    let app = app(&config);

    block_on(async move {
        let resp = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_string(resp).await.contains("name=\"file\""));

        let resp = app.oneshot(multipart(USERS_CSV)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_string(resp).await;
        assert_eq!(html.matches("<td>retained</td>").count(), 1);
        assert_eq!(html.matches("<td>churned</td>").count(), 3);
        assert!(html.contains("Classification Report"));
        assert!(html.contains("weighted avg"));
    });
}

#[test]
fn json_endpoint_returns_scored_batch() {
    let (_dir, config) = fixture();
    let app = app(&config);
    let mut req = multipart(USERS_CSV_NO_IDS);
    *req.uri_mut() = "/api/predict".parse().unwrap();

    let resp = block_on(app.oneshot(req)).unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&block_on(body_string(resp))).unwrap();
    assert_eq!(
        json["predictions"],
        json!(["retained", "churned", "churned", "churned"])
    );
    assert_eq!(json["report"]["accuracy"], 0.5);
}

#[test]
fn bad_upload_reports_error_and_server_keeps_going() {
    let (_dir, config) = fixture();
    let app = app(&config);

    block_on(async move {
        let resp = app
            .clone()
            .oneshot(multipart("sessions,drives\n1,2\n"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_string(resp).await.contains("missing required column"));

        let resp = app.oneshot(multipart(USERS_CSV)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    });
}
