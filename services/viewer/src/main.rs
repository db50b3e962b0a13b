//! Daymet Tmax heatmap viewer.
//!
//! Overlays one year of Daymet daily maximum temperature with prison
//! facilities, their buffer zones and the largest cities:
//! - Tile/year selection from a lookup table
//! - Remote NetCDF download with an in-process cache
//! - PNG figures with a fixed layer order
//! - Interactive shell or one-shot rendering

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use viewer::pipeline::CycleOutcome;
use viewer::shell::parse_selection;
use viewer::{Shell, Viewer, ViewerConfig, NO_DATA_MESSAGE};
use viewer_common::TileId;

#[derive(Parser, Debug)]
#[command(name = "heatmap-viewer")]
#[command(about = "Daymet Tmax heatmap viewer for prison facilities")]
struct Args {
    /// Configuration file
    #[arg(long, env = "VIEWER_CONFIG", default_value = "config/viewer.yaml")]
    config: PathBuf,

    /// Log level (used when RUST_LOG is not set)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Year to show first
    #[arg(long)]
    year: Option<i32>,

    /// Tiles to show first, comma separated, or "all"
    #[arg(long)]
    tiles: Option<String>,

    /// Directory for rendered figures
    #[arg(long, env = "VIEWER_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Figure width in pixels
    #[arg(long)]
    width: Option<u32>,

    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Interactive shell (default)
    Shell,
    /// Render the selection once and exit
    Render,
    /// List years and tiles in the lookup table
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args);

    info!(config = %args.config.display(), "Starting heatmap viewer");

    let mut config = ViewerConfig::load(&args.config)?;
    if let Some(dir) = &args.output_dir {
        config.output.dir = dir.clone();
    }
    if let Some(width) = args.width {
        config.render.width = width;
    }
    let selection = match &args.tiles {
        Some(text) => parse_selection(text).map_err(anyhow::Error::msg)?,
        None => None,
    };

    netcdf_parser::silence_hdf5_errors();

    let viewer = match Viewer::from_config(&config) {
        Ok(viewer) => viewer,
        Err(e) => {
            error!(error = %e, "Failed to load viewer inputs");
            return Err(e.context("Startup failed"));
        }
    };

    match args.command.unwrap_or(Mode::Shell) {
        Mode::Shell => {
            let mut shell = Shell::new(viewer, args.year, selection);
            let mut stdout = std::io::stdout();
            shell
                .run(BufReader::new(tokio::io::stdin()), &mut stdout)
                .await?;
        }
        Mode::Render => {
            let shell = Shell::new(viewer, args.year, selection);
            render_once(shell.viewer(), shell.year(), shell.selection()).await?;
        }
        Mode::List => {
            let index = viewer.index();
            let years: Vec<String> = index.years().iter().map(|y| y.to_string()).collect();
            let tiles: Vec<String> = index.tiles().iter().map(|t| t.to_string()).collect();
            println!("years: {}", years.join(" "));
            println!("tiles: {}", tiles.join(" "));
        }
    }

    Ok(())
}

fn init_tracing(args: &Args) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);

    if args.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn render_once(viewer: &Viewer, year: i32, tiles: &[TileId]) -> Result<()> {
    let report = viewer
        .render_cycle(year, tiles)
        .await
        .with_context(|| format!("Render failed for year {}", year))?;

    for warning in &report.warnings {
        eprintln!("warning: {}", warning);
    }
    match report.outcome {
        CycleOutcome::Rendered { path, points } => {
            println!("Rendered {} points to {}", points, path.display())
        }
        CycleOutcome::NoData => println!("{}", NO_DATA_MESSAGE),
    }
    Ok(())
}
