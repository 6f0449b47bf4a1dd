//! Integration test: train on normal traffic, persist, reload, score attack lines.

use log_anomaly::{
    config::{AppConfig, DetectionConfig, TrainingConfig},
    detect::{detect, Detection, Detector},
    features::{extract, to_features},
    model::Autoencoder,
    scaler::MinMaxScaler,
    storage::{ArtifactPair, ArtifactStore},
    train::{train, Trainer},
    Error, DEFAULT_THRESHOLD,
};
use ndarray::Array2;
use std::path::Path;

const TRAIN_LOGS: [&str; 10] = [
    r#"192.168.1.1 - - [22/Jul/2024:10:00:00 +0900] "GET /index.html HTTP/1.1" 200 1543"#,
    r#"192.168.1.2 - - [22/Jul/2024:10:00:01 +0900] "GET /css/style.css HTTP/1.1" 200 567"#,
    r#"192.168.1.3 - - [22/Jul/2024:10:00:02 +0900] "GET /js/main.js HTTP/1.1" 200 876"#,
    r#"192.168.1.1 - - [22/Jul/2024:10:00:03 +0900] "POST /login.php HTTP/1.1" 200 123"#,
    r#"192.168.1.3 - - [22/Jul/2024:10:03:15 +0900] "POST /subscribe HTTP/1.1" 200 50"#,
    r#"192.168.1.4 - - [22/Jul/2024:10:01:05 +0900] "GET /products/item?id=1 HTTP/1.1" 200 980"#,
    r#"192.168.1.5 - - [22/Jul/2024:10:02:15 +0900] "GET /images/pic.jpg HTTP/1.1" 200 12345"#,
    r#"192.168.1.1 - - [22/Jul/2024:10:03:05 +0900] "GET /about.html HTTP/1.1" 200 1300"#,
    r#"192.168.1.2 - - [22/Jul/2024:10:03:10 +0900] "GET /contact.html HTTP/1.1" 200 1400"#,
    r#"192.168.1.4 - - [22/Jul/2024:10:03:20 +0900] "GET /favicon.ico HTTP/1.1" 200 1500"#,
];

const XSS: &str = r#"203.0.113.45 - - [23/Jul/2024:11:02:10 +0900] "GET /search?q=<script>window.location='http://hacker.com'</script>" 200 1100"#;
const NORMAL: &str = r#"192.168.1.10 - - [23/Jul/2024:11:00:00 +0900] "GET /index.html HTTP/1.1" 200 1543"#;
const SQLI: &str = r#"203.0.113.48 - - [23/Jul/2024:11:05:00 +0900] "GET /?id=1%27%20UNION%20SELECT%20username,password%20FROM%20users-- HTTP/1.1" 500 210"#;

fn training_config() -> TrainingConfig {
    TrainingConfig {
        seed: Some(7),
        ..TrainingConfig::default()
    }
}

fn trained() -> ArtifactPair {
    let (pair, report) = Trainer::new(training_config()).unwrap().train(TRAIN_LOGS).unwrap();
    assert_eq!(report.total, 10);
    assert_eq!(report.normal, 10);
    pair
}

fn score(pair: &ArtifactPair, line: &str) -> Detection {
    let mut results: Vec<Detection> = detect([line], pair, DEFAULT_THRESHOLD).unwrap().collect();
    assert_eq!(results.len(), 1);
    results.remove(0)
}

#[test]
fn config_load_default() {
    let c = AppConfig::load(Path::new("nonexistent.json")).unwrap();
    assert_eq!(c.detection.threshold, 0.1);
    assert_eq!(c.training.epochs, 50);
    assert_eq!(c.training.batch_size, 16);
    assert_eq!(c.training.learning_rate, 0.01);
    assert_eq!(c.training.validation_split, 0.2);
}

#[test]
fn feature_extraction_is_deterministic() {
    let a = to_features(&extract(SQLI).unwrap());
    let b = to_features(&extract(SQLI).unwrap());
    assert_eq!(a, b);
    assert_eq!(a.status_code(), 500.0);
}

#[test]
fn empty_training_input_fails() {
    assert!(matches!(train(Vec::<String>::new()), Err(Error::EmptyDataset { .. })));
    assert!(matches!(train(["garbage", "more garbage"]), Err(Error::EmptyDataset { .. })));
}

#[test]
fn training_without_normal_status_fails() {
    let lines = [
        r#"10.0.0.1 - - [23/Jul/2024:11:01:00 +0900] "GET /admin/dashboard HTTP/1.1" 404 45"#,
        r#"203.0.113.47 - - [23/Jul/2024:11:04:00 +0900] "POST /api/v1/users HTTP/1.1" 401 88"#,
    ];
    assert!(matches!(train(lines), Err(Error::EmptyDataset { .. })));
}

#[test]
fn script_injection_is_anomalous() {
    let pair = trained();
    let d = score(&pair, XSS);
    assert!(d.is_anomalous, "error {}", d.error);
}

#[test]
fn training_shaped_request_is_normal() {
    let pair = trained();
    let d = score(&pair, NORMAL);
    assert!(!d.is_anomalous, "error {}", d.error);
}

#[test]
fn default_training_separates_injection_from_normal() {
    let pair = train(TRAIN_LOGS).unwrap();
    let normal = score(&pair, NORMAL);
    let xss = score(&pair, XSS);
    assert!(!normal.is_anomalous, "normal error {}", normal.error);
    assert!(xss.is_anomalous, "xss error {}", xss.error);
}

#[test]
fn sql_injection_scores_well_above_normal() {
    let pair = trained();
    let normal = score(&pair, NORMAL);
    let sqli = score(&pair, SQLI);
    assert!(sqli.error > DEFAULT_THRESHOLD);
    assert!(sqli.error > normal.error * 2.0);
    assert!(sqli.is_anomalous);
}

#[test]
fn results_keep_order_and_drop_malformed_lines() {
    let pair = trained();
    let lines = [NORMAL, "not a log line", XSS, "", SQLI];
    let detections = detect(lines, &pair, DEFAULT_THRESHOLD).unwrap();
    assert_eq!(detections.summary().scored, 3);
    assert_eq!(detections.summary().skipped, 1);
    let requests: Vec<String> = detections.map(|d| d.request().to_string()).collect();
    assert_eq!(
        requests,
        vec![
            "GET /index.html HTTP/1.1".to_string(),
            extract(XSS).unwrap().request_line,
            extract(SQLI).unwrap().request_line,
        ]
    );
}

#[test]
fn error_equal_to_threshold_is_normal() {
    let pair = trained();
    let error = score(&pair, XSS).error;
    let at = detect([XSS], &pair, error).unwrap().next().unwrap();
    assert_eq!(at.error, error);
    assert!(!at.is_anomalous);
    let below = detect([XSS], &pair, error * 0.999).unwrap().next().unwrap();
    assert!(below.is_anomalous);
}

#[test]
fn empty_detection_input_yields_nothing() {
    let pair = trained();
    let detections = detect(["junk"], &pair, DEFAULT_THRESHOLD).unwrap();
    assert_eq!(detections.len(), 0);
}

#[test]
fn detector_rejects_wider_feature_matrix() {
    let pair = trained();
    let detector = Detector::new(&pair, DetectionConfig::default()).unwrap();
    let fabricated = Array2::<f32>::zeros((2, 4));
    assert!(matches!(
        detector.score_matrix(fabricated.view()),
        Err(Error::DimensionMismatch { expected: 3, found: 4 })
    ));
}

#[test]
fn detect_rejects_pair_of_other_width() {
    let scaler = MinMaxScaler::fit(Array2::<f32>::ones((2, 4)).view()).unwrap();
    let pair = ArtifactPair::new(Autoencoder::build(4), scaler).unwrap();
    let err = detect([NORMAL], &pair, DEFAULT_THRESHOLD).err().unwrap();
    assert!(matches!(err, Error::DimensionMismatch { expected: 4, found: 3 }));
}

#[test]
fn persisted_pair_scores_identically() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::in_dir(dir.path().join("models"));
    let pair = trained();
    store.save(&pair).unwrap();
    let loaded = store.load().unwrap();

    let lines = [NORMAL, XSS, SQLI];
    let before: Vec<f32> = detect(lines, &pair, DEFAULT_THRESHOLD).unwrap().map(|d| d.error).collect();
    let after: Vec<f32> = detect(lines, &loaded, DEFAULT_THRESHOLD).unwrap().map(|d| d.error).collect();
    assert_eq!(before, after);
}

#[test]
fn loading_without_training_reports_missing_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let err = ArtifactStore::in_dir(dir.path()).load().unwrap_err();
    assert!(matches!(err, Error::ArtifactNotFound { ref paths } if paths.len() == 2));
}

#[test]
fn seeded_training_is_reproducible() {
    let a = trained();
    let b = trained();
    assert_ne!(a.run_id(), b.run_id());
    assert_eq!(a.model(), b.model());
    assert_eq!(a.scaler(), b.scaler());
}

#[test]
fn history_tracks_holdout_loss() {
    let (_, report) = Trainer::new(training_config()).unwrap().train(TRAIN_LOGS).unwrap();
    assert_eq!(report.history.loss.len(), 50);
    assert_eq!(report.history.val_loss.len(), 50);
    assert!(report.history.final_loss().unwrap() < report.history.loss[0]);
}
