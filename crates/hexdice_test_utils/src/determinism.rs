//! Determinism testing utilities.
//!
//! Provides a harness for verifying that map generation and reinforcement
//! produce identical results given identical seeds.
//!
//! # Testing Strategy
//!
//! A map is fully determined by its configuration and the RNG stream fed to
//! the generator. Sources of non-determinism include:
//!
//! - **Unseeded RNGs**: `generate_seeded` falls back to fresh entropy when
//!   the config has no seed. Tests always set one.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Territory adjacency uses `BTreeSet` and all scans run in index order.
//!
//! - **Thread scheduling**: Each generation owns its RNG, so parallel runs
//!   must still agree.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual phases (growth, tracing, dice)
//! 2. **Property tests**: Random configs must still produce deterministic maps
//! 3. **Integration tests**: Full maps plus reinforcement turns are reproducible
//! 4. **Parallel tests**: N generations on N threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use hexdice_core::map_generation::{generate_map, generate_seeded, GeneratedMap, MapConfig};
use hexdice_core::player::PlayerId;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps applied after setup.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic run).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Generation is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a scenario multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the scenario
/// * `steps` - Number of steps to apply per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
///
/// # Example
///
/// ```ignore
/// use hexdice_test_utils::determinism::{verify_determinism, TurnScenario};
///
/// let result = verify_determinism(
///     5,  // Run 5 times
///     20, // 20 reinforcement turns each
///     || TurnScenario::new(&MapConfig::small().with_seed(7)),
///     TurnScenario::step,
///     TurnScenario::fingerprint,
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Generate the same seeded map several times and compare fingerprints.
///
/// # Panics
///
/// Panics if `config` has no seed.
pub fn verify_map_determinism(config: &MapConfig, runs: usize) -> DeterminismResult {
    assert!(config.seed.is_some(), "determinism checks need a seeded config");
    verify_determinism(runs, 0, || generate_seeded(config), |_| {}, generation_fingerprint)
}

/// Compare two scenario runs step-by-step, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs never differ, `Some(step)` for the first step whose
/// hashes disagree (0 = right after setup).
pub fn find_first_divergence<S, Setup, Step, HashFn>(
    setup: Setup,
    steps: u64,
    step: Step,
    hash: HashFn,
) -> Option<u64>
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut a = setup();
    let mut b = setup();

    if hash(&a) != hash(&b) {
        return Some(0);
    }

    for n in 1..=steps {
        step(&mut a);
        step(&mut b);

        if hash(&a) != hash(&b) {
            debug!(step = n, "Runs diverged");
            return Some(n);
        }
    }

    None
}

/// Result of parallel generation runs.
#[derive(Debug, Clone)]
pub struct ParallelGenerationResult {
    /// Fingerprint from each generation.
    pub hashes: Vec<u64>,
    /// Number of generations run.
    pub runs: usize,
}

impl ParallelGenerationResult {
    /// Check if all generations produced identical maps.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all generations matched.
    ///
    /// # Panics
    ///
    /// Panics if generations produced different fingerprints.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel generations diverged!\n\
                 Runs: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.runs,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Generate `runs` maps from the same config on scoped threads.
///
/// # Panics
///
/// Panics if a generation thread panics.
pub fn run_parallel_generations(config: &MapConfig, runs: usize) -> ParallelGenerationResult {
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..runs)
            .map(|_| s.spawn(|| generation_fingerprint(&generate_seeded(config))))
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("generation thread panicked"))
            .collect()
    });

    ParallelGenerationResult { hashes, runs }
}

/// Verify that a RON round-trip preserves a map exactly.
pub fn verify_serialization_roundtrip(map: &GeneratedMap) -> bool {
    let Ok(text) = ron::to_string(map) else {
        return false;
    };
    let Ok(restored) = ron::from_str::<GeneratedMap>(&text) else {
        return false;
    };
    map_fingerprint(map) == map_fingerprint(&restored) && *map == restored
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Hash everything that defines a map's game state.
///
/// Covers cells, territory shape data, ownership, dice, players and turn
/// order. The config and attempt count are left out.
pub fn map_fingerprint(map: &GeneratedMap) -> u64 {
    let mut hasher = DefaultHasher::new();
    map.grid.width().hash(&mut hasher);
    map.grid.height().hash(&mut hasher);
    map.cells.hash(&mut hasher);

    for territory in map.territories.iter() {
        territory.id.hash(&mut hasher);
        territory.size.hash(&mut hasher);
        territory.owner.hash(&mut hasher);
        territory.dice.hash(&mut hasher);
        territory.center.hash(&mut hasher);
        territory.adjacency.hash(&mut hasher);
        for step in &territory.border {
            step.cell.hash(&mut hasher);
            step.direction.hash(&mut hasher);
        }
    }

    for player in map.players.iter() {
        player.id.hash(&mut hasher);
        player.largest_connected_group.hash(&mut hasher);
        player.territory_count.hash(&mut hasher);
        player.dice_total.hash(&mut hasher);
        player.stock.hash(&mut hasher);
    }

    map.turn_order.hash(&mut hasher);
    hasher.finish()
}

/// Fingerprint a generation result; errors hash by their message.
pub fn generation_fingerprint(result: &hexdice_core::error::Result<GeneratedMap>) -> u64 {
    match result {
        Ok(map) => map_fingerprint(map),
        Err(e) => compute_hash(&e.to_string()),
    }
}

/// A generated map plus the RNG driving its reinforcement turns.
#[derive(Debug, Clone)]
pub struct TurnScenario {
    /// Map being played.
    pub map: GeneratedMap,
    /// RNG for dice placement.
    pub rng: ChaCha8Rng,
    /// Turns played so far.
    pub turn: usize,
}

impl TurnScenario {
    /// Generate a map from a seeded RNG and keep the RNG for later turns.
    ///
    /// # Panics
    ///
    /// Panics if the config is unseeded or generation fails.
    pub fn new(config: &MapConfig) -> Self {
        let seed = config.seed.expect("turn scenarios need a seeded config");
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let map = generate_map(config, &mut rng).expect("scenario map should generate");
        Self { map, rng, turn: 0 }
    }

    /// Player whose turn is next.
    pub fn current_player(&self) -> PlayerId {
        self.map.turn_order[self.turn % self.map.turn_order.len()]
    }

    /// Reinforce the current player and advance the turn.
    ///
    /// # Panics
    ///
    /// Panics if reinforcement fails.
    pub fn step(&mut self) {
        let player = self.current_player();
        self.map
            .reinforce(player, &mut self.rng)
            .expect("reinforcement should succeed");
        self.turn += 1;
    }

    /// Fingerprint of the current map state.
    pub fn fingerprint(&self) -> u64 {
        map_fingerprint(&self.map)
    }
}

/// Proptest strategies for map generation testing.
///
/// These strategies generate random but reproducible configurations for
/// property-based testing.
pub mod strategies {
    use hexdice_core::map_generation::{MapConfig, MAX_PLAYERS, MIN_TERRITORY_SIZE};
    use proptest::prelude::*;

    /// Generate grid dimensions large enough for a few territories.
    ///
    /// Range: 12 to 40 cells per side
    pub fn arb_grid_dims() -> impl Strategy<Value = (u32, u32)> {
        (12u32..=40, 12u32..=40)
    }

    /// Generate a valid player count.
    pub fn arb_player_count() -> impl Strategy<Value = u8> {
        2u8..=MAX_PLAYERS
    }

    /// Generate a valid average dice value.
    pub fn arb_average_dice() -> impl Strategy<Value = u8> {
        1u8..=8
    }

    /// Generate an RNG seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }

    /// Generate a valid, seeded map configuration.
    ///
    /// Territory limits stay within the grid capacity; generation may still
    /// fail when too few territories survive for the player count.
    pub fn arb_map_config() -> impl Strategy<Value = MapConfig> {
        arb_grid_dims().prop_flat_map(|(width, height)| {
            let capacity = ((width * height) as usize / (MIN_TERRITORY_SIZE + 1)).min(40) as u16;
            (
                1u16..=capacity,
                arb_player_count(),
                arb_average_dice(),
                3u32..=12,
                0.0f32..=0.5,
                arb_seed(),
            )
                .prop_map(move |(max_territories, player_count, average_dice, base, variance, seed)| {
                    MapConfig {
                        width,
                        height,
                        max_territories,
                        player_count,
                        average_dice,
                        base_territory_size: base,
                        size_variance: variance,
                        seed: Some(seed),
                        max_attempts: 4,
                    }
                })
        })
    }

    /// Generate a small preset config with a random seed and player count.
    pub fn arb_small_config() -> impl Strategy<Value = MapConfig> {
        (arb_seed(), arb_player_count(), arb_average_dice()).prop_map(|(seed, players, dice)| {
            MapConfig::small()
                .with_seed(seed)
                .with_players(players)
                .with_average_dice(dice)
        })
    }
}
