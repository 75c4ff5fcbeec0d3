//! CLI for running a verification pass over a network snapshot
//!
//! Usage:
//!   cargo run --release --bin verify_network -- <network.json> [options]
//!
//! The report (error records, rule-7 status, network length) is written as JSON
//! to stdout or to `--output`.

use anyhow::Context;
use clap::Parser;
use network_verifier::network::InMemoryStore;
use network_verifier::verify::{
    reference_designations, run_verification, ContinuityModel, PrecomputedContinuity,
    VerifierConfig,
};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "verify_network", about = "Topology and attribute checks for a distribution network")]
struct Args {
    /// Network snapshot (JSON layers)
    network: PathBuf,

    /// Verifier configuration (JSON); defaults apply to anything omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Snapping tolerance in coordinate units
    #[arg(long)]
    tolerance: Option<f64>,

    /// Reference trunk-line designation for the continuity check
    #[arg(long)]
    designation: Option<String>,

    /// Precomputed continuity model output (JSON with `points` and `lines` layers)
    #[arg(long)]
    continuity: Option<PathBuf>,

    /// Write the report here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Evaluate rules 1-6 in parallel
    #[arg(long)]
    parallel: bool,

    /// Print the available designations and exit
    #[arg(long)]
    list_designations: bool,

    #[arg(long, short)]
    verbose: bool,
}

fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Stderr subscriber; `RUST_LOG` wins over `--verbose` when set
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = match &args.config {
        Some(path) => VerifierConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => VerifierConfig::default(),
    };
    if let Some(tolerance) = args.tolerance {
        config.tolerance = tolerance;
    }
    if args.parallel {
        config.parallel = true;
    }

    let start = Instant::now();
    let store = InMemoryStore::from_json_file(&args.network)
        .with_context(|| format!("Failed to load network {}", args.network.display()))?;
    tracing::info!(
        "[CLI] Loaded {} in {:?}",
        args.network.display(),
        start.elapsed()
    );

    if args.list_designations {
        match reference_designations(&store, &config) {
            Some(names) => names.iter().for_each(|n| println!("{n}")),
            None => anyhow::bail!("layer '{}' not found", config.layers.designations),
        }
        return Ok(());
    }

    let model = match &args.continuity {
        Some(path) => Some(
            PrecomputedContinuity::from_json_file(path)
                .with_context(|| format!("Failed to load continuity output {}", path.display()))?,
        ),
        None => None,
    };

    let report = run_verification(
        &store,
        &config,
        args.designation.as_deref(),
        model.as_ref().map(|m| m as &dyn ContinuityModel),
    )?;

    let json = serde_json::to_string_pretty(&report)?;
    match &args.output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))?,
        None => println!("{json}"),
    }

    tracing::info!(
        "[CLI] {} point errors, {} line errors, continuity: {:?}",
        report.point_errors.len(),
        report.line_errors.len(),
        report.continuity
    );
    Ok(())
}
