//! Randomized region growing ("percolation").
//!
//! Every cell carries a priority number taken from a shuffled permutation of
//! all cell indices. Growth always claims the frontier cell with the lowest
//! priority, which yields irregular shapes while staying fully deterministic
//! for a given permutation.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::trace;

use crate::error::{GameError, Result};
use crate::hex::HexGrid;
use crate::territory::TerritoryId;

/// Smallest target size a growth will accept.
pub const MIN_GROWTH_SIZE: usize = 3;

/// Cell assignments and seed bookkeeping shared by successive growths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrowthState {
    /// Territory id per cell ([`TerritoryId::NONE`] = unclaimed).
    cells: Vec<TerritoryId>,
    /// Priority number per cell; a permutation of `0..cell_count`.
    priority: Vec<u32>,
    /// Cells available as seeds for the next territory.
    seed_candidates: Vec<bool>,
}

impl GrowthState {
    /// Create an empty state with a freshly shuffled priority permutation.
    pub fn new<R: Rng + ?Sized>(grid: &HexGrid, rng: &mut R) -> Self {
        let mut priority: Vec<u32> = (0..grid.cell_count() as u32).collect();
        priority.shuffle(rng);
        Self::with_priority(priority)
    }

    /// Create an empty state from an explicit priority table.
    #[must_use]
    pub fn with_priority(priority: Vec<u32>) -> Self {
        let cell_count = priority.len();
        Self {
            cells: vec![TerritoryId::NONE; cell_count],
            priority,
            seed_candidates: vec![false; cell_count],
        }
    }

    /// Territory assignment per cell.
    #[must_use]
    pub fn cells(&self) -> &[TerritoryId] {
        &self.cells
    }

    /// Consume the state, keeping only the cell assignments.
    #[must_use]
    pub fn into_cells(self) -> Vec<TerritoryId> {
        self.cells
    }

    /// Priority number of a cell.
    #[must_use]
    pub fn priority(&self, cell: usize) -> u32 {
        self.priority[cell]
    }

    /// Whether a cell has not been claimed by any territory.
    #[must_use]
    pub fn is_unclaimed(&self, cell: usize) -> bool {
        self.cells[cell].is_none()
    }

    /// Make a cell available as a growth seed.
    pub fn mark_seed(&mut self, cell: usize) {
        self.seed_candidates[cell] = true;
    }

    /// Withdraw a cell from the seed candidates.
    pub fn discard_seed(&mut self, cell: usize) {
        self.seed_candidates[cell] = false;
    }

    /// The unclaimed seed candidate with the lowest priority.
    #[must_use]
    pub fn next_seed(&self) -> Option<usize> {
        (0..self.cells.len())
            .filter(|&cell| self.seed_candidates[cell] && self.is_unclaimed(cell))
            .min_by_key(|&cell| self.priority[cell])
    }
}

/// Grow territory `id` from `seed`, claiming up to `target_size` core cells
/// plus the ring of unclaimed cells around them.
///
/// Neighbors of the ring become seed candidates for later territories.
/// Returns the number of cells claimed.
///
/// # Errors
///
/// Returns [`GameError::GrowthFailure`] if fewer than [`MIN_GROWTH_SIZE`]
/// cells could be claimed. All cells and seed marks set by this call are
/// rolled back first.
pub fn grow_territory(
    grid: &HexGrid,
    state: &mut GrowthState,
    seed: usize,
    target_size: usize,
    id: TerritoryId,
) -> Result<usize> {
    let target = target_size.max(MIN_GROWTH_SIZE);
    let mut claimed: Vec<usize> = Vec::with_capacity(target * 3);
    let mut in_frontier = vec![false; grid.cell_count()];
    let mut frontier: BinaryHeap<Reverse<(u32, usize)>> = BinaryHeap::new();

    if !state.is_unclaimed(seed) {
        return Err(GameError::GrowthFailure {
            territory: id,
            seed,
            reached: 0,
            required: MIN_GROWTH_SIZE,
        });
    }

    let mut current = seed;
    loop {
        state.cells[current] = id;
        claimed.push(current);

        for neighbor in grid.adjacent(current) {
            if !in_frontier[neighbor] {
                in_frontier[neighbor] = true;
                frontier.push(Reverse((state.priority[neighbor], neighbor)));
            }
        }

        if claimed.len() >= target {
            break;
        }

        let next = std::iter::from_fn(|| frontier.pop())
            .map(|Reverse((_, cell))| cell)
            .find(|&cell| state.is_unclaimed(cell));
        match next {
            Some(cell) => current = cell,
            None => break,
        }
    }
    let core = claimed.len();

    // Close the ring: claim every remaining unclaimed frontier cell and
    // offer its neighbors as seeds for the next territory.
    let mut new_seeds = Vec::new();
    for cell in 0..grid.cell_count() {
        if !in_frontier[cell] || !state.is_unclaimed(cell) {
            continue;
        }
        state.cells[cell] = id;
        claimed.push(cell);
        for neighbor in grid.adjacent(cell) {
            if !state.seed_candidates[neighbor] {
                state.seed_candidates[neighbor] = true;
                new_seeds.push(neighbor);
            }
        }
    }

    if claimed.len() < MIN_GROWTH_SIZE {
        for &cell in &claimed {
            state.cells[cell] = TerritoryId::NONE;
        }
        for &cell in &new_seeds {
            state.seed_candidates[cell] = false;
        }
        return Err(GameError::GrowthFailure {
            territory: id,
            seed,
            reached: claimed.len(),
            required: MIN_GROWTH_SIZE,
        });
    }

    trace!(
        territory = id.0,
        seed,
        core,
        total = claimed.len(),
        "Grew territory"
    );
    Ok(claimed.len())
}
