//! Hexdice - Development Tools
//!
//! # Usage
//!
//! ```bash
//! # Print a seeded standard map
//! cargo run -p hexdice_tools -- generate --seed 42
//!
//! # Export a small map to RON
//! cargo run -p hexdice_tools -- generate --config small.ron --output map.ron
//!
//! # Batch statistics over 1000 seeds
//! cargo run -p hexdice_tools -- batch --count 1000 --json --output results/batch.json
//!
//! # Check a seed reproduces
//! cargo run -p hexdice_tools -- verify --seed 7 --runs 5
//!
//! # Validate a saved map
//! cargo run -p hexdice_tools -- validate map.ron
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use hexdice_core::map_generation::generate_seeded;
use hexdice_tools::{
    batch::{run_batch, BatchConfig},
    error::Result,
    io::{self, resolve_config, ConfigOverrides},
    render::{render_map, AsciiConfig},
    validate::{validate_map_file, verify_seed},
};

#[derive(Parser)]
#[command(name = "hexdice-tools")]
#[command(about = "Development tools for hex territory map generation")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Map parameters shared by generating commands.
#[derive(Args, Debug, Clone)]
struct MapArgs {
    /// RON or JSON config file (defaults to the standard preset)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Grid width in cells
    #[arg(long)]
    width: Option<u32>,

    /// Grid height in cells
    #[arg(long)]
    height: Option<u32>,

    /// Maximum number of territories
    #[arg(short, long)]
    territories: Option<u16>,

    /// Number of players (2-8)
    #[arg(short, long)]
    players: Option<u8>,

    /// Average dice per territory (1-8)
    #[arg(short, long)]
    dice: Option<u8>,

    /// Core territory size
    #[arg(long)]
    base_size: Option<u32>,

    /// Territory size variance (0.0-1.0)
    #[arg(long)]
    variance: Option<f32>,

    /// Attempts before giving up
    #[arg(long)]
    attempts: Option<u32>,
}

impl MapArgs {
    fn overrides(&self, seed: Option<u64>) -> ConfigOverrides {
        ConfigOverrides {
            width: self.width,
            height: self.height,
            max_territories: self.territories,
            player_count: self.players,
            average_dice: self.dice,
            base_territory_size: self.base_size,
            size_variance: self.variance,
            seed,
            max_attempts: self.attempts,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one map and print it or write it to a file
    Generate {
        #[command(flatten)]
        map: MapArgs,

        /// Random seed (fresh entropy when omitted)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Write the map to a .ron or .json file instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Disable ANSI colors in the printed map
        #[arg(long)]
        no_color: bool,
    },

    /// Generate many maps in parallel and report statistics
    Batch {
        #[command(flatten)]
        map: MapArgs,

        /// Number of maps to generate
        #[arg(short = 'n', long, default_value = "100")]
        count: u32,

        /// First seed
        #[arg(long, default_value = "0")]
        seed_start: u64,

        /// Worker threads (0 = rayon default)
        #[arg(long, default_value = "0")]
        threads: usize,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Save full results to a .ron or .json file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Regenerate a seed several times and compare fingerprints
    Verify {
        #[command(flatten)]
        map: MapArgs,

        /// Seed to verify
        #[arg(short, long)]
        seed: u64,

        /// Number of runs
        #[arg(short, long, default_value = "5")]
        runs: usize,
    },

    /// Validate a saved map file
    Validate {
        /// Path to a .ron or .json map
        path: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn generate(map: &MapArgs, seed: Option<u64>, output: Option<&Path>, no_color: bool) -> Result<()> {
    let config = resolve_config(map.config.as_deref(), &map.overrides(seed))?;
    let generated = generate_seeded(&config)?;

    match output {
        Some(path) => {
            io::save(&generated, path)?;
            info!(path = %path.display(), seed = ?generated.seed, "Wrote map");
        }
        None => {
            let ascii = AsciiConfig {
                use_color: !no_color,
                ..AsciiConfig::default()
            };
            print!("{}", render_map(&generated, &ascii));
        }
    }
    Ok(())
}

fn batch(map: &MapArgs, batch: BatchConfig, json: bool, output: Option<&Path>) -> Result<()> {
    let config = resolve_config(map.config.as_deref(), &map.overrides(None))?;
    let results = run_batch(BatchConfig { map: config, ..batch });

    if json {
        println!("{}", serde_json::to_string_pretty(&results.summary)?);
    } else {
        print!("{}", results.to_text());
    }
    if let Some(path) = output {
        results.save(path)?;
        info!(path = %path.display(), "Saved batch results");
    }
    Ok(())
}

fn verify(map: &MapArgs, seed: u64, runs: usize) -> Result<bool> {
    let config = resolve_config(map.config.as_deref(), &map.overrides(Some(seed)))?;
    let report = verify_seed(&config, seed, runs)?;
    if report.is_deterministic() {
        info!(seed, runs, "Seed is deterministic");
    } else {
        error!(seed, hashes = ?report.hashes, "Seed produced different maps");
    }
    Ok(report.is_deterministic())
}

fn validate(path: &Path) -> Result<bool> {
    let report = validate_map_file(path)?;
    for violation in &report.violations {
        println!("violation: {violation}");
    }
    if let Some(imbalance) = &report.distribution {
        println!("note: {imbalance}");
    }
    println!(
        "{}: {} territories, {} violations",
        path.display(),
        report.territories,
        report.violations.len()
    );
    Ok(report.is_valid())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match cli.command {
        Commands::Generate {
            map,
            seed,
            output,
            no_color,
        } => generate(&map, seed, output.as_deref(), no_color).map(|()| true),
        Commands::Batch {
            map,
            count,
            seed_start,
            threads,
            json,
            output,
        } => {
            let config = BatchConfig {
                map_count: count,
                seed_start,
                parallel: threads,
                ..BatchConfig::default()
            };
            batch(&map, config, json, output.as_deref()).map(|()| true)
        }
        Commands::Verify { map, seed, runs } => verify(&map, seed, runs),
        Commands::Validate { path } => validate(&path),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
