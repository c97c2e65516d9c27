//! Test fixtures and helpers.
//!
//! Pre-built territory graphs and painted grids for consistent testing.

use hexdice_core::hex::HexGrid;
use hexdice_core::player::{PlayerId, PlayerTable};
use hexdice_core::territory::{Territory, TerritoryId, TerritoryTable};

/// Shorthand for a territory id.
#[must_use]
pub const fn tid(id: u16) -> TerritoryId {
    TerritoryId::new(id)
}

/// Shorthand for a player id.
#[must_use]
pub const fn pid(id: u8) -> PlayerId {
    PlayerId::new(id)
}

/// Builder for small territory graphs with explicit adjacency.
///
/// Territories get a nominal size so they count as existing; no grid is
/// involved.
#[derive(Debug, Default)]
pub struct TerritoryGraphBuilder {
    territories: Vec<Territory>,
    edges: Vec<(u16, u16)>,
}

impl TerritoryGraphBuilder {
    /// Start an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a territory owned by `owner` with one die.
    #[must_use]
    pub fn territory(self, id: u16, owner: u8) -> Self {
        self.territory_with_dice(id, owner, 1)
    }

    /// Add a territory owned by `owner` holding `dice`.
    #[must_use]
    pub fn territory_with_dice(mut self, id: u16, owner: u8, dice: u8) -> Self {
        self.territories.push(Territory {
            size: 8,
            owner: Some(pid(owner)),
            dice,
            ..Territory::empty(tid(id))
        });
        self
    }

    /// Connect two territories both ways.
    #[must_use]
    pub fn edge(mut self, a: u16, b: u16) -> Self {
        self.edges.push((a, b));
        self
    }

    /// Connect consecutive ids in `chain`.
    #[must_use]
    pub fn chain(mut self, chain: &[u16]) -> Self {
        self.edges.extend(chain.windows(2).map(|w| (w[0], w[1])));
        self
    }

    /// Build the territory table.
    #[must_use]
    pub fn build(self) -> TerritoryTable {
        let mut territories = self.territories;
        for (a, b) in self.edges {
            for territory in &mut territories {
                if territory.id == tid(a) {
                    territory.adjacency.insert(tid(b));
                } else if territory.id == tid(b) {
                    territory.adjacency.insert(tid(a));
                }
            }
        }
        TerritoryTable::from_territories(territories)
    }
}

/// Player 0 owns a connected group of 3 and a separate group of 2;
/// player 1 owns the two territories splitting them.
///
/// Chain: 1-2-3-(6)-4-5-(7)
#[must_use]
pub fn split_groups() -> TerritoryTable {
    TerritoryGraphBuilder::new()
        .territory(1, 0)
        .territory(2, 0)
        .territory(3, 0)
        .territory(4, 0)
        .territory(5, 0)
        .territory(6, 1)
        .territory(7, 1)
        .chain(&[1, 2, 3, 6, 4, 5, 7])
        .build()
}

/// Player table sized for `count` players with fresh statistics.
#[must_use]
pub fn players(count: u8) -> PlayerTable {
    PlayerTable::new(count)
}

/// A sea-filled cell array with the given coordinates painted as `id`.
///
/// # Panics
///
/// Panics if a coordinate is off the grid.
#[must_use]
pub fn paint(grid: &HexGrid, coords: &[(u32, u32)], id: TerritoryId) -> Vec<TerritoryId> {
    let mut cells = vec![TerritoryId::NONE; grid.cell_count()];
    paint_into(grid, &mut cells, coords, id);
    cells
}

/// Paint coordinates into an existing cell array.
///
/// # Panics
///
/// Panics if a coordinate is off the grid.
pub fn paint_into(grid: &HexGrid, cells: &mut [TerritoryId], coords: &[(u32, u32)], id: TerritoryId) {
    for &(x, y) in coords {
        let cell = grid.index(x, y).expect("painted coordinate off grid");
        cells[cell] = id;
    }
}

/// Coordinates of a `w` x `h` block with its top-left corner at (x, y).
#[must_use]
pub fn block(x: u32, y: u32, w: u32, h: u32) -> Vec<(u32, u32)> {
    (y..y + h).flat_map(|row| (x..x + w).map(move |col| (col, row))).collect()
}
