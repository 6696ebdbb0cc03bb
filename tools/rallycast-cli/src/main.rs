//! Rallycast CLI — Command-line interface for tennis event detection.
//!
//! Usage:
//!   rallycast analyze <PATH>           Detect events in a detection stream
//!   rallycast calibrate <X,Y> x4       Check a court calibration
//!   rallycast info <PATH>              Show detection stream information
//!   rallycast merge <PATH>             Collapse repeats in an event log

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rallycast_common::config::AppConfig;
use rallycast_match_model::geometry::Coord;

mod commands;

#[derive(Parser)]
#[command(
    name = "rallycast",
    about = "Gameplay event detection for tennis broadcasts",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run event detection over a detection stream
    Analyze {
        /// Path to the detection stream (.jsonl)
        path: PathBuf,

        /// Output event log path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Frame rate override (defaults to the stream header)
        #[arg(long)]
        fps: Option<u32>,

        /// Pipeline config file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write every event without merging consecutive repeats
        #[arg(long)]
        raw: bool,
    },

    /// Check four court corners and show the resulting mapping
    Calibrate {
        /// Corners as x,y in order: top-left, top-right, bottom-right, bottom-left
        #[arg(
            num_args = 4,
            required = true,
            allow_hyphen_values = true,
            value_parser = parse_coord
        )]
        corners: Vec<Coord>,
    },

    /// Show detection stream information
    Info {
        /// Path to the detection stream (.jsonl)
        path: PathBuf,
    },

    /// Collapse consecutive repeats in an existing event log
    Merge {
        /// Path to the event log (.json)
        path: PathBuf,

        /// Output path (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_coord(s: &str) -> Result<Coord, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got `{s}`"))?;
    let x: f64 = x
        .trim()
        .parse()
        .map_err(|e| format!("bad x in `{s}`: {e}"))?;
    let y: f64 = y
        .trim()
        .parse()
        .map_err(|e| format!("bad y in `{s}`: {e}"))?;
    Ok(Coord::new(x, y))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let app_config = AppConfig::load();

    // Initialize logging
    let mut logging = app_config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    rallycast_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Analyze {
            path,
            output,
            fps,
            config,
            raw,
        } => commands::analyze::run(&app_config, path, output, fps, config, raw),
        Commands::Calibrate { corners } => commands::calibrate::run(&corners),
        Commands::Info { path } => commands::info::run(path),
        Commands::Merge { path, output } => commands::merge::run(path, output),
    }
}
