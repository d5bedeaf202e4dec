// ─────────────────────────────────────────────────────────────────────
// Figure of Equilibrium — Command-Line Driver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! `figure` runs one configured sweep and prints the JSON report.
//!
//! ```bash
//! figure --config configs/maclaurin.json
//! figure --config configs/ring.json --output ring.json --snapshots ring.npz
//! ```

mod npz;

use anyhow::Context;
use clap::Parser;
use figure_core::basis::Basis;
use figure_core::equilibrium::FigureSolver;
use figure_core::observer::NullObserver;
use figure_core::sweep::{Sweep, SweepReport};
use figure_types::config::FigureConfig;
use npz::NpzSink;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Equilibrium figures of rotating self-gravitating bodies
#[derive(Parser, Debug)]
#[command(name = "figure")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Sweep configuration (JSON)
    #[arg(short, long)]
    config: String,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Stream solver checkpoints and retained figures into this .npz file
    #[arg(long)]
    snapshots: Option<String>,

    /// Logging verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn run(cfg: &FigureConfig, snapshots: Option<&str>) -> anyhow::Result<SweepReport> {
    let grid = cfg.create_grid()?;
    let (max_n, max_m) = cfg.spectral.mode_counts(cfg.domain.max_aspect_ratio);
    let basis = Basis::build(&grid, max_n, max_m, cfg.spectral.integration_resolution);
    let solver = FigureSolver::new(&grid, &basis, cfg.solver.clone())?;
    let sweep = Sweep::from_config(cfg)?;

    let Some(path) = snapshots else {
        return Ok(sweep.run(&solver, &mut NullObserver, None));
    };

    let mut sink = NpzSink::create(path)?;
    let report = sweep.run(&solver, &mut sink, None);
    for (step, record) in report.records.iter().enumerate() {
        sink.add_record(step, record)?;
    }
    let arrays = sink.finish()?;
    info!(arrays, path, "snapshots written");
    Ok(report)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&cli.log_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("figure v{}", env!("CARGO_PKG_VERSION"));

    let cfg = FigureConfig::from_file(&cli.config)
        .with_context(|| format!("loading config '{}'", cli.config))?;
    info!(name = %cfg.name, mode = ?cfg.sweep.mode, "config loaded");

    let report = run(&cfg, cli.snapshots.as_deref())?;
    info!(
        records = report.records.len(),
        converged = report.converged().count(),
        skipped = report.skipped.len(),
        "sweep finished"
    );
    if let Some(threshold) = report.collapse_threshold() {
        info!(threshold, "rings stop collapsing");
    }

    let json = serde_json::to_string_pretty(&report)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing report '{path}'"))?;
            info!(path = %path, "report written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
