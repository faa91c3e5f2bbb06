//! Overmapper CLI - Command-line interface
//!
//! Renders the explored-map visibility of one save directory into a PNG.

mod error;
mod logging;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use overmapper::config::{
    DEFAULT_LEVEL, DEFAULT_MAX_PIXELS, DEFAULT_SCALE, DEFAULT_TILE_HEIGHT, DEFAULT_TILE_WIDTH,
};
use overmapper::{Compositor, MapConfig, RegionIndex};
use tracing::{info, warn};

use crate::error::{CliError, EXIT_USAGE};

/// Render explored-map visibility from per-region save fragments.
#[derive(Debug, Parser)]
#[command(name = "overmapper", version, about)]
struct Cli {
    /// Save directory holding the `#<identity>.seen.<x>.<y>` fragments
    save_path: PathBuf,

    /// Output PNG file
    output: PathBuf,

    /// Region width in tiles
    #[arg(long, default_value_t = DEFAULT_TILE_WIDTH)]
    mapx: u32,

    /// Region height in tiles
    #[arg(long, default_value_t = DEFAULT_TILE_HEIGHT)]
    mapy: u32,

    /// Pixels per tile edge
    #[arg(long, default_value_t = DEFAULT_SCALE)]
    scale: u32,

    /// Vertical level to render
    #[arg(long, default_value_t = DEFAULT_LEVEL, allow_negative_numbers = true)]
    level: i32,

    /// Decode fragments in parallel before drawing
    #[arg(long)]
    parallel: bool,

    /// Refuse to render a map larger than this many pixels
    #[arg(long, default_value_t = DEFAULT_MAX_PIXELS)]
    max_pixels: u64,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Build and validate the render configuration from the flags.
    fn map_config(&self) -> Result<MapConfig, CliError> {
        let config = MapConfig::default()
            .with_grid(self.mapx, self.mapy)
            .with_scale(self.scale)
            .with_level(self.level)
            .with_parallel(self.parallel)
            .with_max_pixels(self.max_pixels);

        config
            .validate()
            .map_err(|e| CliError::Usage(e.to_string()))?;

        Ok(config)
    }
}

/// Exit code for an argument parsing outcome. Help and version are not
/// failures.
fn parse_exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => EXIT_USAGE,
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = cli.map_config()?;

    info!(save_path = %cli.save_path.display(), "Scanning save directory");
    let index = RegionIndex::build(&cli.save_path)?;
    info!(identity = %index.identity(), fragments = index.len(), "Subject found");

    println!("{} - drawing...", index);
    let (canvas, report) = Compositor::new(config).render_with_report(&index)?;

    if !report.is_clean() {
        warn!(
            missing_level = report.missing_level.len(),
            truncated = report.truncated.len(),
            "Some regions did not decode cleanly"
        );
    }

    println!("Saving...");
    output::write_png(&canvas, &cli.output)?;

    info!(
        output = %cli.output.display(),
        width = canvas.width(),
        height = canvas.height(),
        "Map saved"
    );

    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(parse_exit_code(e.kind()));
        }
    };

    logging::init(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
