//! Map validation and determinism verification.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

use hexdice_core::invariants::{check_fair_distribution, check_invariants, InvariantViolation};
use hexdice_core::map_generation::{generate_seeded, GeneratedMap, MapConfig};
use tracing::{info, warn};

use crate::error::Result;
use crate::io;

/// Outcome of validating a map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Territories on the map.
    pub territories: usize,
    /// Structural violations.
    pub violations: Vec<InvariantViolation>,
    /// Ownership imbalance, if any. Expected after play, not after generation.
    pub distribution: Option<InvariantViolation>,
}

impl ValidationReport {
    /// Whether the map has no structural violations.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Run the invariant checker over a loaded map.
pub fn validate_map(map: &GeneratedMap) -> ValidationReport {
    let violations = check_invariants(map);
    for violation in &violations {
        warn!(%violation, "Invariant violated");
    }
    ValidationReport {
        territories: map.territory_count(),
        violations,
        distribution: check_fair_distribution(map),
    }
}

/// Load a RON or JSON map file and validate it.
pub fn validate_map_file(path: &Path) -> Result<ValidationReport> {
    let map = io::load_map(path)?;
    let report = validate_map(&map);
    info!(
        path = %path.display(),
        territories = report.territories,
        violations = report.violations.len(),
        "Validated map"
    );
    Ok(report)
}

/// Stable hash of a map's serialized form.
pub fn fingerprint(map: &GeneratedMap) -> Result<u64> {
    let json = serde_json::to_string(map)?;
    let mut hasher = DefaultHasher::new();
    json.hash(&mut hasher);
    Ok(hasher.finish())
}

/// Outcome of regenerating one seed several times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    /// Seed checked.
    pub seed: u64,
    /// Fingerprint of each run.
    pub hashes: Vec<u64>,
}

impl VerifyReport {
    /// Whether every run produced the same map.
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }
}

/// Regenerate `config` with `seed` `runs` times and compare fingerprints.
pub fn verify_seed(config: &MapConfig, seed: u64, runs: usize) -> Result<VerifyReport> {
    let config = config.clone().with_seed(seed);
    let hashes = (0..runs)
        .map(|_| fingerprint(&generate_seeded(&config)?))
        .collect::<Result<Vec<u64>>>()?;
    Ok(VerifyReport { seed, hashes })
}
