//! log-anomaly entrypoint: train a model/scaler pair from an access log, or
//! score an access log against a stored pair and print flagged lines as ndjson.

use clap::{Parser, Subcommand};
use log_anomaly::{
    config::AppConfig,
    detect::Detector,
    logging::{AnomalyLine, StructuredLogger},
    storage::ArtifactStore,
    train::Trainer,
};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "log-anomaly", version, about = "Flag anomalous HTTP access-log lines")]
struct Cli {
    /// JSON config file (defaults to $LOG_ANOMALY_CONFIG or config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fit scaler and autoencoder on a log file and store the pair
    Train {
        log_file: PathBuf,
        /// Artifact directory (overrides config)
        model_dir: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Score a log file against the stored pair
    Detect {
        log_file: PathBuf,
        /// Artifact directory (overrides config)
        model_dir: Option<PathBuf>,
        /// Reconstruction-error cutoff (overrides config)
        #[arg(long)]
        threshold: Option<f32>,
        /// Print every scored line, not only anomalies
        #[arg(long)]
        all: bool,
    },
}

fn read_lines(path: &Path) -> std::io::Result<Vec<String>> {
    let file = std::fs::File::open(path)?;
    BufReader::new(file).lines().collect()
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .or_else(|| std::env::var("LOG_ANOMALY_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("config.json"));
    let mut config = AppConfig::load(&config_path)?;

    StructuredLogger::init(&config.log);

    match cli.command {
        Command::Train {
            log_file,
            model_dir,
            seed,
        } => {
            if let Some(dir) = model_dir {
                config.artifacts.dir = dir;
            }
            if seed.is_some() {
                config.training.seed = seed;
            }
            info!(log_file = %log_file.display(), "training");
            let lines = read_lines(&log_file)?;
            let (pair, report) = Trainer::new(config.training.clone())?.train(&lines)?;
            ArtifactStore::new(&config.artifacts).save(&pair)?;
            info!(
                run_id = %pair.run_id(),
                total = report.total,
                normal = report.normal,
                "model trained"
            );
        }
        Command::Detect {
            log_file,
            model_dir,
            threshold,
            all,
        } => {
            if let Some(dir) = model_dir {
                config.artifacts.dir = dir;
            }
            if let Some(t) = threshold {
                config.detection.threshold = t;
            }
            config.detection.report_all |= all;
            let pair = ArtifactStore::new(&config.artifacts).load()?;
            let lines = read_lines(&log_file)?;
            let report_all = config.detection.report_all;
            let detector = Detector::new(&pair, config.detection.clone())?;
            let detections = detector.detect(&lines)?;
            let summary = detections.summary();

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            for d in detections.filter(|d| report_all || d.is_anomalous) {
                StructuredLogger::emit_json(&AnomalyLine::from_detection(&d), &mut out)?;
            }
            info!(
                scored = summary.scored,
                anomalies = summary.anomalies,
                threshold = summary.threshold,
                "scan finished"
            );
        }
    }
    Ok(())
}
