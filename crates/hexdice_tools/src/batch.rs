//! Batch map generation for statistics.
//!
//! Generates many maps over consecutive seeds in parallel using rayon and
//! aggregates territory, dice and retry statistics.

use std::fmt::Write;
use std::path::Path;
use std::time::Instant;

use hexdice_core::map_generation::{generate_seeded, GeneratedMap, MapConfig};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::io;

/// Configuration for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Map configuration; its seed is replaced per map.
    pub map: MapConfig,
    /// Number of maps to generate.
    pub map_count: u32,
    /// First seed; map `i` uses `seed_start + i`.
    pub seed_start: u64,
    /// Maximum parallel generations (0 = use rayon default).
    pub parallel: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            map: MapConfig::standard(),
            map_count: 100,
            seed_start: 0,
            parallel: 0,
        }
    }
}

impl BatchConfig {
    /// Create config for `map_count` maps of the given kind.
    pub fn new(map: MapConfig, map_count: u32) -> Self {
        Self {
            map,
            map_count,
            ..Default::default()
        }
    }

    /// Set seed start.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }
}

/// Statistics for one generated map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSummary {
    /// Seed used.
    pub seed: u64,
    /// Surviving territories.
    pub territories: usize,
    /// Attempt that succeeded.
    pub attempts: u32,
    /// Dice on the board.
    pub total_dice: u32,
    /// Extra dice skipped during allocation.
    pub skipped_dice: u32,
    /// Territories whose outline could not be traced.
    pub border_overruns: usize,
    /// Largest connected group of any player.
    pub largest_group: usize,
}

impl MapSummary {
    /// Summarize a generated map.
    pub fn from_map(seed: u64, map: &GeneratedMap) -> Self {
        Self {
            seed,
            territories: map.territory_count(),
            attempts: map.attempts,
            total_dice: map.territories.total_dice(),
            skipped_dice: map.dice.skipped,
            border_overruns: map.border_overruns.len(),
            largest_group: map
                .players
                .iter()
                .map(|p| p.largest_connected_group)
                .max()
                .unwrap_or(0),
        }
    }
}

/// Aggregate statistics across a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Maps generated successfully.
    pub generated: usize,
    /// Fewest territories on a map.
    pub min_territories: usize,
    /// Most territories on a map.
    pub max_territories: usize,
    /// Mean territories per map.
    pub mean_territories: f64,
    /// Mean attempts per map.
    pub mean_attempts: f64,
    /// Maps that needed more than one attempt.
    pub retried: usize,
    /// Extra dice skipped across all maps.
    pub skipped_dice: u64,
    /// Border overruns across all maps.
    pub border_overruns: usize,
}

impl BatchSummary {
    /// Aggregate per-map summaries.
    pub fn from_maps(maps: &[MapSummary]) -> Self {
        if maps.is_empty() {
            return Self::default();
        }
        let n = maps.len() as f64;
        Self {
            generated: maps.len(),
            min_territories: maps.iter().map(|m| m.territories).min().unwrap_or(0),
            max_territories: maps.iter().map(|m| m.territories).max().unwrap_or(0),
            mean_territories: maps.iter().map(|m| m.territories as f64).sum::<f64>() / n,
            mean_attempts: maps.iter().map(|m| f64::from(m.attempts)).sum::<f64>() / n,
            retried: maps.iter().filter(|m| m.attempts > 1).count(),
            skipped_dice: maps.iter().map(|m| u64::from(m.skipped_dice)).sum(),
            border_overruns: maps.iter().map(|m| m.border_overruns).sum(),
        }
    }
}

/// Error during a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    /// Map index.
    pub map_index: u32,
    /// Seed used.
    pub seed: u64,
    /// Error message.
    pub message: String,
}

/// Results from a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used.
    pub config: BatchConfig,
    /// Individual map statistics, in seed order.
    pub maps: Vec<MapSummary>,
    /// Aggregate summary.
    pub summary: BatchSummary,
    /// Total runtime.
    pub duration_seconds: f64,
    /// Errors encountered.
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to a RON or JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        io::save(self, path)
    }

    /// Load results from a RON or JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        io::load(path)
    }

    /// Human-readable report.
    pub fn to_text(&self) -> String {
        let s = &self.summary;
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Batch: {} maps ({}x{}, {} players), seeds {}..{}",
            self.config.map_count,
            self.config.map.width,
            self.config.map.height,
            self.config.map.player_count,
            self.config.seed_start,
            self.config
                .seed_start
                .wrapping_add(u64::from(self.config.map_count))
        );
        let _ = writeln!(out, "  generated:        {}", s.generated);
        let _ = writeln!(out, "  failed:           {}", self.errors.len());
        let _ = writeln!(
            out,
            "  territories:      {}..{} (mean {:.2})",
            s.min_territories, s.max_territories, s.mean_territories
        );
        let _ = writeln!(
            out,
            "  attempts:         mean {:.2}, {} retried",
            s.mean_attempts, s.retried
        );
        let _ = writeln!(out, "  skipped dice:     {}", s.skipped_dice);
        let _ = writeln!(out, "  border overruns:  {}", s.border_overruns);
        let _ = writeln!(out, "  duration:         {:.2}s", self.duration_seconds);
        out
    }
}

fn generate_one(config: &BatchConfig, index: u32) -> std::result::Result<MapSummary, BatchError> {
    let seed = config.seed_start.wrapping_add(u64::from(index));
    let map_config = config.map.clone().with_seed(seed);
    match generate_seeded(&map_config) {
        Ok(map) => Ok(MapSummary::from_map(seed, &map)),
        Err(e) => {
            warn!(index, seed, error = %e, "Map generation failed");
            Err(BatchError {
                map_index: index,
                seed,
                message: e.to_string(),
            })
        }
    }
}

/// Run a batch of generations.
pub fn run_batch(config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    info!(
        maps = config.map_count,
        seed_start = config.seed_start,
        "Starting batch run"
    );

    let run = || -> Vec<std::result::Result<MapSummary, BatchError>> {
        (0..config.map_count)
            .into_par_iter()
            .map(|i| generate_one(&config, i))
            .collect()
    };

    let results = if config.parallel > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel)
            .build()
        {
            Ok(pool) => pool.install(run),
            Err(e) => {
                warn!(error = %e, "Could not build thread pool, using default");
                run()
            }
        }
    } else {
        run()
    };

    let (maps, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(std::result::Result::is_ok);
    let maps: Vec<MapSummary> = maps.into_iter().filter_map(std::result::Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(std::result::Result::err).collect();

    let summary = BatchSummary::from_maps(&maps);
    let duration_seconds = start.elapsed().as_secs_f64();

    debug!(?summary, "Batch summary");
    info!(
        generated = maps.len(),
        failed = errors.len(),
        "Batch complete in {:.1}s",
        duration_seconds
    );

    BatchResults {
        config,
        maps,
        summary,
        duration_seconds,
        errors,
    }
}
