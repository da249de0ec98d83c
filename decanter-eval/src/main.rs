// decanter-eval/src/main.rs
//
// decanter-eval: score a DECANTeR detection run.
//
// Usage:
//   decanter-eval --alerts alerts.jsonl --benign benign.jsonl \
//                 --training-index training_ts.json --testing-index testing_ts.json
//   decanter-eval --alerts alerts.jsonl --format json --output ./artifacts
//
// Prints fingerprint/request stats and the four confusion matrices, then
// writes the true-positive timestamp artifacts to --output.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use decanter_eval::config::SimilarityConfig;
use decanter_eval::eval::report;
use decanter_eval::{dataset, DecanterSimilarity, EvaluationEngine};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name    = "decanter-eval",
    about   = "Confusion-matrix evaluation and retraining simulation for DECANTeR fingerprints",
    version = env!("CARGO_PKG_VERSION"),
)]
struct Cli {
    #[arg(long, help = "JSONL fingerprints the detector flagged, in detection order")]
    alerts: PathBuf,

    #[arg(long, help = "JSONL fingerprints the detector let through")]
    benign: Option<PathBuf>,

    #[arg(long, help = "JSON map fingerprint id -> training timestamps")]
    training_index: Option<PathBuf>,

    #[arg(long, help = "JSON map fingerprint id -> testing timestamps")]
    testing_index: Option<PathBuf>,

    #[arg(long, default_value = ".", help = "Directory for the timestamp artifacts")]
    output: PathBuf,

    #[arg(long, help = "JSON file overriding the similarity thresholds")]
    similarity_config: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "markdown")]
    format: Format,
}

#[derive(Clone, ValueEnum)]
enum Format {
    Markdown,
    Json,
}

// ── Main ──────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env()
            .add_directive("decanter_eval=info".parse()?))
        .with_writer(std::io::stderr)
        .compact().init();

    let cli = Cli::parse();

    let sim_cfg = match &cli.similarity_config {
        Some(path) => SimilarityConfig::from_json_file(path)?,
        None       => SimilarityConfig::default(),
    };
    info!(
        "Similarity thresholds: background={} browser={} avg_size_error={}%",
        sim_cfg.background_threshold, sim_cfg.browser_threshold, sim_cfg.avg_size_error_pct
    );

    let input = dataset::load_input(
        &cli.alerts,
        cli.benign.as_deref(),
        cli.training_index.as_deref(),
        cli.testing_index.as_deref(),
    ).await?;

    let engine = EvaluationEngine::new(input, &DecanterSimilarity::new(sim_cfg))?;

    match cli.format {
        Format::Markdown => report::print_markdown(&engine),
        Format::Json     => println!("{}", serde_json::to_string_pretty(&report::to_json(&engine))?),
    }

    // Metrics are already out; a failed audit trail only changes the exit code.
    match engine.persist_alert_timestamps(&cli.output) {
        Ok(paths) => {
            info!("Training timestamps: {}", paths.training.display());
            info!("Testing timestamps:  {}", paths.testing.display());
            Ok(())
        }
        Err(e) => {
            error!("Timestamp artifacts not written: {}", e);
            Err(e.into())
        }
    }
}
