//! Procedural territory map generation.
//!
//! Generates playable maps with:
//! - Irregular territories grown by percolation on a hex grid
//! - Single-cell gaps absorbed, undersized territories discarded
//! - Border-biased centers, bounding boxes and outlines for rendering
//! - Symmetric adjacency between territories
//! - Balanced ownership and dice across players

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::border::{first_boundary_edge, trace_border};
use crate::connectivity;
use crate::dice::{self, DiceAllocation, Reinforcement};
use crate::distribution::{distribute_territories, shuffled_turn_order};
use crate::error::{GameError, Result};
use crate::hex::HexGrid;
use crate::percolation::{grow_territory, GrowthState, MIN_GROWTH_SIZE};
use crate::player::{PlayerId, PlayerTable};
use crate::territory::{BoundingBox, Territory, TerritoryId, TerritoryTable, MAX_DICE, MIN_DICE};

/// Territories with this many cells or fewer are discarded.
pub const MIN_TERRITORY_SIZE: usize = 5;

/// Maximum number of players.
pub const MAX_PLAYERS: u8 = 8;

/// Distance penalty for center candidates on the territory edge.
const EDGE_PENALTY: u32 = 4;

/// Map configuration for procedural generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Map width in cells.
    pub width: u32,
    /// Map height in cells.
    pub height: u32,
    /// Upper bound on territories grown (ids `1..=max_territories`).
    pub max_territories: u16,
    /// Number of players sharing the map.
    pub player_count: u8,
    /// Average dice per territory after allocation.
    pub average_dice: u8,
    /// Core cells grown per territory before the surrounding ring.
    pub base_territory_size: u32,
    /// Relative jitter on the core size (0.0 = fixed, 1.0 = up to ±100%).
    pub size_variance: f32,
    /// Random seed for deterministic generation (`None` = fresh entropy).
    pub seed: Option<u64>,
    /// Generation attempts before giving up.
    pub max_attempts: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 28,
            height: 32,
            max_territories: 31,
            player_count: 7,
            average_dice: 3,
            base_territory_size: 8,
            size_variance: 0.0,
            seed: None,
            max_attempts: 8,
        }
    }
}

impl MapConfig {
    /// Create a small 20x15 map for four players.
    #[must_use]
    pub fn small() -> Self {
        Self {
            width: 20,
            height: 15,
            max_territories: 16,
            player_count: 4,
            ..Default::default()
        }
    }

    /// Create the standard 28x32 map for seven players.
    #[must_use]
    pub fn standard() -> Self {
        Self::default()
    }

    /// Set the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the number of players.
    #[must_use]
    pub const fn with_players(mut self, player_count: u8) -> Self {
        self.player_count = player_count;
        self
    }

    /// Set the territory limit.
    #[must_use]
    pub const fn with_max_territories(mut self, max_territories: u16) -> Self {
        self.max_territories = max_territories;
        self
    }

    /// Set the average dice per territory.
    #[must_use]
    pub const fn with_average_dice(mut self, average_dice: u8) -> Self {
        self.average_dice = average_dice;
        self
    }

    /// Set the core territory size.
    #[must_use]
    pub const fn with_base_territory_size(mut self, size: u32) -> Self {
        self.base_territory_size = size;
        self
    }

    /// Set size variance.
    #[must_use]
    pub fn with_size_variance(mut self, variance: f32) -> Self {
        self.size_variance = variance.clamp(0.0, 1.0);
        self
    }

    /// Total number of cells.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Most territories the grid can hold above the minimum size.
    #[must_use]
    pub const fn territory_capacity(&self) -> usize {
        self.cell_count() / (MIN_TERRITORY_SIZE + 1)
    }

    /// Check every field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] describing the first bad field.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(GameError::InvalidConfig(msg));

        if self.width == 0 || self.height == 0 {
            return invalid(format!(
                "grid dimensions must be positive, got {}x{}",
                self.width, self.height
            ));
        }
        if self.max_territories == 0 || usize::from(self.max_territories) > self.territory_capacity() {
            return invalid(format!(
                "max_territories must be between 1 and {} for a {}x{} grid, got {}",
                self.territory_capacity(),
                self.width,
                self.height,
                self.max_territories
            ));
        }
        if self.player_count < 2 || self.player_count > MAX_PLAYERS {
            return invalid(format!(
                "player_count must be between 2 and {MAX_PLAYERS}, got {}",
                self.player_count
            ));
        }
        if !(MIN_DICE..=MAX_DICE).contains(&self.average_dice) {
            return invalid(format!(
                "average_dice must be between {MIN_DICE} and {MAX_DICE}, got {}",
                self.average_dice
            ));
        }
        if (self.base_territory_size as usize) < MIN_GROWTH_SIZE {
            return invalid(format!(
                "base_territory_size must be at least {MIN_GROWTH_SIZE}, got {}",
                self.base_territory_size
            ));
        }
        if !(0.0..=1.0).contains(&self.size_variance) {
            return invalid(format!(
                "size_variance must be between 0 and 1, got {}",
                self.size_variance
            ));
        }
        if self.max_attempts == 0 {
            return invalid("max_attempts must be at least 1".to_string());
        }
        Ok(())
    }

    /// Randomized core size for the next territory.
    pub fn target_size<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let base = self.base_territory_size as f32;
        let jitter = if self.size_variance > 0.0 {
            rng.gen_range(-self.size_variance..=self.size_variance)
        } else {
            0.0
        };
        ((base * (1.0 + jitter)).round().max(0.0) as usize).max(MIN_GROWTH_SIZE)
    }
}

/// Generated map data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedMap {
    /// Map configuration used.
    pub config: MapConfig,
    /// Seed the RNG was built from, when generated through [`generate_seeded`].
    pub seed: Option<u64>,
    /// Attempt that produced this map (1-based).
    pub attempts: u32,
    /// Hex grid geometry.
    pub grid: HexGrid,
    /// Territory per cell (row-major, [`TerritoryId::NONE`] = sea).
    pub cells: Vec<TerritoryId>,
    /// Territory table.
    pub territories: TerritoryTable,
    /// Player table.
    pub players: PlayerTable,
    /// Turn order for the game.
    pub turn_order: Vec<PlayerId>,
    /// Initial dice allocation summary.
    pub dice: DiceAllocation,
    /// Territories whose outline could not be traced.
    pub border_overruns: Vec<TerritoryId>,
}

impl GeneratedMap {
    /// Territory id of a cell.
    #[must_use]
    pub fn cell_territory(&self, cell: usize) -> TerritoryId {
        self.cells.get(cell).copied().unwrap_or(TerritoryId::NONE)
    }

    /// Territory covering grid coordinates (x, y).
    #[must_use]
    pub fn territory_at(&self, x: u32, y: u32) -> Option<&Territory> {
        let cell = self.grid.index(x, y)?;
        self.territories.get(self.cells[cell]).filter(|t| t.exists())
    }

    /// Number of territories that survived generation.
    #[must_use]
    pub fn territory_count(&self) -> usize {
        self.territories.count()
    }

    /// Recompute `player`'s largest connected group.
    pub fn recompute_connectivity(&mut self, player: PlayerId) -> Result<usize> {
        connectivity::recompute(&self.territories, &mut self.players, player)
    }

    /// Recompute connectivity and holdings for every player.
    pub fn refresh_players(&mut self) {
        connectivity::recompute_all(&self.territories, &mut self.players);
        self.players.refresh_holdings(&self.territories);
    }

    /// Hand a territory to `new_owner` and update both players' statistics.
    ///
    /// Dice are left untouched; the caller settles them.
    pub fn transfer_territory(&mut self, id: TerritoryId, new_owner: PlayerId) -> Result<()> {
        self.players.check(new_owner)?;
        let previous = self.territories.set_owner(id, Some(new_owner))?;
        self.recompute_connectivity(new_owner)?;
        if let Some(previous) = previous {
            self.recompute_connectivity(previous)?;
        }
        self.players.refresh_holdings(&self.territories);
        Ok(())
    }

    /// End-of-turn reinforcement for `player`.
    pub fn reinforce<R: Rng + ?Sized>(&mut self, player: PlayerId, rng: &mut R) -> Result<Reinforcement> {
        dice::reinforce(&mut self.territories, &mut self.players, player, rng)
    }
}

/// Generate a map from `config.seed` (or fresh entropy when unset).
///
/// The seed actually used is stored in [`GeneratedMap::seed`].
///
/// # Errors
///
/// See [`generate_map`].
pub fn generate_seeded(config: &MapConfig) -> Result<GeneratedMap> {
    let seed = config.seed.unwrap_or_else(rand::random);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut map = generate_map(config, &mut rng)?;
    map.seed = Some(seed);
    Ok(map)
}

/// Generate a map with the injected RNG.
///
/// Each attempt draws a fresh priority permutation from `rng`; failed
/// attempts are retried up to `config.max_attempts` times.
///
/// # Errors
///
/// Returns [`GameError::InvalidConfig`] for a bad configuration and
/// [`GameError::GenerationFailure`] once every attempt has failed.
pub fn generate_map<R: Rng + ?Sized>(config: &MapConfig, rng: &mut R) -> Result<GeneratedMap> {
    config.validate()?;
    let grid = HexGrid::new(config.width, config.height)?;

    let map = retry_attempts(config.max_attempts, |_| {
        let mut state = GrowthState::new(&grid, rng);
        state.mark_seed(rng.gen_range(0..grid.cell_count()));
        assemble(config, &grid, state, rng)
    })?;
    info!(
        territories = map.territory_count(),
        attempt = map.attempts,
        seed = ?config.seed,
        width = config.width,
        height = config.height,
        "Generated map"
    );
    Ok(map)
}

/// Run `attempt` until it succeeds or `max_attempts` generation failures
/// have been seen. Other errors end the loop at once.
fn retry_attempts<F>(max_attempts: u32, mut attempt: F) -> Result<GeneratedMap>
where
    F: FnMut(u32) -> Result<GeneratedMap>,
{
    let mut last_reason = String::new();
    for number in 1..=max_attempts {
        match attempt(number) {
            Ok(mut map) => {
                map.attempts = number;
                return Ok(map);
            }
            Err(GameError::GenerationFailure { reason, .. }) => {
                warn!(attempt = number, %reason, "Map generation attempt failed, retrying");
                last_reason = reason;
            }
            Err(e) => return Err(e),
        }
    }

    Err(GameError::GenerationFailure {
        attempts: max_attempts,
        reason: last_reason,
    })
}

/// One generation attempt, growing from the seeds already marked in `state`.
fn assemble<R: Rng + ?Sized>(
    config: &MapConfig,
    grid: &HexGrid,
    state: GrowthState,
    rng: &mut R,
) -> Result<GeneratedMap> {
    let mut cells = grow_territories(config, grid, state, rng)?;
    fill_gaps(grid, &mut cells);

    let mut territories = TerritoryTable::new(config.max_territories);
    let surviving = discard_small_territories(&mut cells, &mut territories);
    if surviving == 0 {
        return Err(GameError::GenerationFailure {
            attempts: 1,
            reason: format!("no territory exceeded {MIN_TERRITORY_SIZE} cells"),
        });
    }
    if surviving < usize::from(config.player_count) {
        return Err(GameError::GenerationFailure {
            attempts: 1,
            reason: format!(
                "only {surviving} territories for {} players",
                config.player_count
            ),
        });
    }

    analyze_shapes(grid, &cells, &mut territories);
    let border_overruns = trace_borders(grid, &cells, &mut territories);

    let turn_order = shuffled_turn_order(config.player_count, rng);
    distribute_territories(&mut territories, config.player_count, PlayerId::new(0), rng)?;
    let dice = dice::allocate_dice(&mut territories, config.player_count, config.average_dice, rng)?;

    let mut players = PlayerTable::new(config.player_count);
    connectivity::recompute_all(&territories, &mut players);
    players.refresh_holdings(&territories);

    let map = GeneratedMap {
        config: config.clone(),
        seed: config.seed,
        attempts: 1,
        grid: grid.clone(),
        cells,
        territories,
        players,
        turn_order,
        dice,
        border_overruns,
    };

    #[cfg(feature = "debug-validation")]
    for violation in crate::invariants::check_generated(&map) {
        warn!(%violation, "Generated map violates invariant");
    }

    Ok(map)
}

/// Grow territories until seeds run out or the limit is reached.
fn grow_territories<R: Rng + ?Sized>(
    config: &MapConfig,
    grid: &HexGrid,
    mut state: GrowthState,
    rng: &mut R,
) -> Result<Vec<TerritoryId>> {
    let mut next_id: u16 = 1;
    let mut failures = 0usize;
    while next_id <= config.max_territories {
        let Some(seed) = state.next_seed() else {
            break;
        };
        let target = config.target_size(rng);
        match grow_territory(grid, &mut state, seed, target, TerritoryId::new(next_id)) {
            Ok(size) => {
                debug!(territory = next_id, seed, target, size, "Placed territory");
                next_id += 1;
            }
            Err(GameError::GrowthFailure { reached, .. }) => {
                debug!(seed, reached, "Growth failed, discarding seed");
                state.discard_seed(seed);
                failures += 1;
            }
            Err(e) => return Err(e),
        }
    }

    if next_id == 1 {
        return Err(GameError::GenerationFailure {
            attempts: 1,
            reason: format!("no territory could be grown ({failures} failed seeds)"),
        });
    }

    debug!(placed = next_id - 1, failures, "Growth pass complete");
    Ok(state.into_cells())
}

/// Absorb unclaimed cells whose neighbors all belong to one territory.
pub fn fill_gaps(grid: &HexGrid, cells: &mut [TerritoryId]) -> usize {
    let mut filled = 0;
    for cell in 0..cells.len() {
        if !cells[cell].is_none() {
            continue;
        }

        let mut owner: Option<TerritoryId> = None;
        let mut uniform = true;
        for neighbor in grid.adjacent(cell) {
            let t = cells[neighbor];
            if t.is_none() || owner.is_some_and(|o| o != t) {
                uniform = false;
                break;
            }
            owner = Some(t);
        }

        if let (true, Some(t)) = (uniform, owner) {
            cells[cell] = t;
            filled += 1;
        }
    }
    filled
}

/// Record territory sizes and discard those at or below [`MIN_TERRITORY_SIZE`].
///
/// Returns the number of surviving territories.
pub fn discard_small_territories(cells: &mut [TerritoryId], territories: &mut TerritoryTable) -> usize {
    let mut sizes = vec![0usize; territories.slot_count()];
    for t in cells.iter().filter(|t| !t.is_none()) {
        if let Some(size) = sizes.get_mut(t.index()) {
            *size += 1;
        }
    }

    let mut surviving = 0;
    for territory in territories.slots_mut() {
        let size = sizes.get(territory.id.index()).copied().unwrap_or(0);
        territory.size = if size > MIN_TERRITORY_SIZE { size } else { 0 };
        if territory.size > 0 {
            surviving += 1;
        } else if size > 0 {
            debug!(territory = territory.id.0, size, "Discarded small territory");
        }
    }

    for t in cells.iter_mut() {
        if !t.is_none() && !territories.get(*t).is_some_and(Territory::exists) {
            *t = TerritoryId::NONE;
        }
    }
    surviving
}

/// Compute bounding boxes, border-biased centers and adjacency in one scan.
pub fn analyze_shapes(grid: &HexGrid, cells: &[TerritoryId], territories: &mut TerritoryTable) {
    for (cell, &t) in cells.iter().enumerate() {
        let (x, y) = grid.coords(cell);
        if let Some(territory) = territories.get_mut(t) {
            match territory.bounding_box.as_mut() {
                Some(bbox) => bbox.include(x, y),
                None => territory.bounding_box = Some(BoundingBox::point(x, y)),
            }
        }
    }

    let mut best: Vec<Option<u32>> = vec![None; territories.slot_count()];
    for (cell, &t) in cells.iter().enumerate() {
        let Some((cx, cy)) = territories
            .get(t)
            .and_then(|territory| territory.bounding_box)
            .map(|bbox| bbox.midpoint())
        else {
            continue;
        };

        let (x, y) = grid.coords(cell);
        let mut score = x.abs_diff(cx) + y.abs_diff(cy);
        let mut on_edge = false;
        for neighbor in grid.adjacent(cell) {
            let other = cells[neighbor];
            if other != t {
                on_edge = true;
                territories.connect(t, other);
            }
        }
        if on_edge {
            score += EDGE_PENALTY;
        }

        let slot = &mut best[t.index()];
        if slot.map_or(true, |current| score < current) {
            *slot = Some(score);
            if let Some(territory) = territories.get_mut(t) {
                territory.center = Some(cell);
            }
        }
    }
}

/// Trace every territory outline; returns the territories that overran.
fn trace_borders(grid: &HexGrid, cells: &[TerritoryId], territories: &mut TerritoryTable) -> Vec<TerritoryId> {
    let ids: Vec<TerritoryId> = territories.iter().map(|t| t.id).collect();
    let mut overruns = Vec::new();
    for id in ids {
        let Some(start) = first_boundary_edge(grid, cells, id) else {
            continue;
        };
        match trace_border(grid, cells, start) {
            Ok(outline) => {
                if let Some(territory) = territories.get_mut(id) {
                    territory.border = outline;
                }
            }
            Err(e) => {
                warn!(territory = id.0, error = %e, "Could not trace territory border");
                overruns.push(id);
            }
        }
    }
    overruns
}
