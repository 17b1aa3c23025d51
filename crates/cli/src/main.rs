//! biasgrid CLI - station bias ratios onto the gridMET reference grid

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use biasgrid_algorithms::interpolation::{InterpolationMethod, InterpolationParams};
use biasgrid_algorithms::reference::{resolution_meters, CELL_SIZE};
use biasgrid_algorithms::statistics::MergeOutcome;
use biasgrid_algorithms::workflow::{run, RunConfig, RunSummary, DEFAULT_BUFFER};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "biasgrid")]
#[command(
    author,
    version,
    about = "Interpolate station bias ratios and average them over gridMET cells",
    long_about = None
)]
struct Cli {
    /// Station summary CSV (<var>_summary_comp.csv)
    #[arg(short, long)]
    input: PathBuf,

    /// Sub-directory for rasters under the method directory
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Grid buffer around the stations, in gridMET cells
    #[arg(short, long, default_value_t = DEFAULT_BUFFER)]
    buffer: u32,

    /// Raster resolution as a fraction of a gridMET cell (0.1 = 400 m)
    #[arg(short, long, default_value = "0.1")]
    scale: f64,

    /// inverse_dist, or an RBF kernel: multiquadric, inverse, gaussian,
    /// linear, cubic, quintic, thin_plate
    #[arg(short, long, default_value = "linear")]
    function: String,

    /// Smoothing (default: 10 for inverse_dist, -0.001 for RBF)
    #[arg(long, allow_hyphen_values = true)]
    smooth: Option<f64>,

    /// IDW power (default: 3)
    #[arg(short, long)]
    power: Option<f64>,

    /// Rebuild the grid layer even if it exists
    #[arg(long)]
    overwrite_grid: bool,

    /// gridMET cell catalog (gridmet_cell_data.csv)
    #[arg(short, long = "gridmet-meta")]
    gridmet_meta: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> Result<RunConfig> {
        let method = InterpolationMethod::from_name(&self.function, self.smooth, self.power)
            .context("Invalid interpolation function")?;

        let mut config = RunConfig::new(&self.input);
        config.out_subdir = self.out_dir.clone();
        config.buffer = self.buffer;
        config.overwrite_grid = self.overwrite_grid;
        config.catalog = self.gridmet_meta.clone();
        config.interpolation = InterpolationParams {
            scale_factor: self.scale,
            cell_size: CELL_SIZE,
            method,
        };
        Ok(config)
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn report(summary: &RunSummary, elapsed: std::time::Duration) {
    println!("Grid: {:?}", summary.grid);
    for (column, path) in &summary.rasters {
        println!("{} saved to: {}", column, path.display());
    }
    for (column, outcome) in &summary.merges {
        let what = match outcome {
            MergeOutcome::Created => "summary created",
            MergeOutcome::Appended => "appended to summary",
            MergeOutcome::AlreadyPresent => "already in summary",
        };
        println!("  {}: {}", column, what);
    }
    if !summary.skipped.is_empty() {
        println!("Skipped (insufficient data): {}", summary.skipped.join(", "));
    }
    for (column, reason) in &summary.failed {
        println!("Failed {}: {}", column, reason);
    }
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = cli.config()?;
    info!(
        "{} at {} m, buffer {} cells",
        config.interpolation.method,
        resolution_meters(config.interpolation.scale_factor),
        config.buffer
    );

    let pb = spinner("Interpolating and aggregating...");
    let start = Instant::now();
    let result = run(&config);
    pb.finish_and_clear();
    let summary = result
        .with_context(|| format!("Failed to process {}", config.input.display()))?;

    report(&summary, start.elapsed());
    Ok(())
}
