//! Hexagonal grid in offset coordinates.
//!
//! Cells are stored in row-major order (`index = y * width + x`). Odd rows
//! are shifted half a cell to the right, so the x offset of the four
//! diagonal neighbors depends on row parity. Neighbor indices are computed
//! once at construction and cached per cell.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Largest grid accepted, in cells.
pub const MAX_CELLS: usize = u16::MAX as usize;

const NO_NEIGHBORS: [Option<usize>; 6] = [None; 6];

/// One of the six hex edge directions, clockwise from upper-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Upper-right neighbor (0).
    UpperRight,
    /// Right neighbor (1).
    Right,
    /// Lower-right neighbor (2).
    LowerRight,
    /// Lower-left neighbor (3).
    LowerLeft,
    /// Left neighbor (4).
    Left,
    /// Upper-left neighbor (5).
    UpperLeft,
}

impl Direction {
    /// All directions in clockwise order.
    pub const ALL: [Self; 6] = [
        Self::UpperRight,
        Self::Right,
        Self::LowerRight,
        Self::LowerLeft,
        Self::Left,
        Self::UpperLeft,
    ];

    /// Direction for an index, wrapping modulo 6.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % 6]
    }

    /// Numeric index `0..6`.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Next direction clockwise.
    #[must_use]
    pub const fn rotate_cw(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Next direction counter-clockwise.
    #[must_use]
    pub const fn rotate_ccw(self) -> Self {
        Self::from_index(self.index() + 5)
    }

    /// The direction pointing back across the same edge.
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// Column/row offset for this direction on a row of the given parity.
    const fn offset(self, odd_row: bool) -> (i64, i64) {
        let parity = if odd_row { 1 } else { 0 };
        match self {
            Self::UpperRight => (parity, -1),
            Self::Right => (1, 0),
            Self::LowerRight => (parity, 1),
            Self::LowerLeft => (parity - 1, 1),
            Self::Left => (-1, 0),
            Self::UpperLeft => (parity - 1, -1),
        }
    }
}

/// Serialized form of a [`HexGrid`]: only the dimensions are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct GridShape {
    width: u32,
    height: u32,
}

/// Hexagonal grid with a cached neighbor table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridShape", into = "GridShape")]
pub struct HexGrid {
    /// Grid width in cells.
    width: u32,
    /// Grid height in cells.
    height: u32,
    /// Neighbor indices per cell, indexed by [`Direction::index`].
    neighbors: Vec<[Option<usize>; 6]>,
}

impl HexGrid {
    /// Create a grid and precompute every cell's neighbors.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] if either dimension is zero or
    /// the grid holds more than [`MAX_CELLS`] cells.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GameError::InvalidConfig(format!(
                "grid dimensions must be positive, got {width}x{height}"
            )));
        }

        let cell_count = u64::from(width) * u64::from(height);
        if cell_count > MAX_CELLS as u64 {
            return Err(GameError::InvalidConfig(format!(
                "grid {width}x{height} exceeds {MAX_CELLS} cells"
            )));
        }
        let cell_count = cell_count as usize;
        let neighbors = (0..cell_count)
            .map(|cell| Direction::ALL.map(|dir| compute_neighbor(width, height, cell, dir)))
            .collect();

        Ok(Self {
            width,
            height,
            neighbors,
        })
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Convert (x, y) to a cell index, or `None` if out of bounds.
    #[must_use]
    pub fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some((y as usize) * (self.width as usize) + (x as usize))
        } else {
            None
        }
    }

    /// Convert a cell index to (x, y).
    #[must_use]
    pub const fn coords(&self, cell: usize) -> (u32, u32) {
        let width = self.width as usize;
        ((cell % width) as u32, (cell / width) as u32)
    }

    /// Neighbor of `cell` in `dir`, or `None` at the grid boundary.
    #[must_use]
    #[inline]
    pub fn neighbor(&self, cell: usize, dir: Direction) -> Option<usize> {
        self.neighbors.get(cell).and_then(|n| n[dir.index()])
    }

    /// All six neighbors of `cell`, indexed by direction.
    ///
    /// A cell outside the grid has no neighbors.
    #[must_use]
    #[inline]
    pub fn neighbors(&self, cell: usize) -> &[Option<usize>; 6] {
        self.neighbors.get(cell).unwrap_or(&NO_NEIGHBORS)
    }

    /// Iterate the in-bounds neighbors of `cell`.
    pub fn adjacent(&self, cell: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbors(cell).iter().flatten().copied()
    }
}

impl TryFrom<GridShape> for HexGrid {
    type Error = GameError;

    fn try_from(shape: GridShape) -> Result<Self> {
        Self::new(shape.width, shape.height)
    }
}

impl From<HexGrid> for GridShape {
    fn from(grid: HexGrid) -> Self {
        Self {
            width: grid.width,
            height: grid.height,
        }
    }
}

/// Neighbor of `cell` in `dir` on a `width × height` grid.
///
/// Pure function backing the cached table in [`HexGrid`].
#[must_use]
pub fn compute_neighbor(width: u32, height: u32, cell: usize, dir: Direction) -> Option<usize> {
    let w = i64::from(width);
    let h = i64::from(height);
    let x = (cell as i64) % w;
    let y = (cell as i64) / w;
    if y >= h {
        return None;
    }

    let (dx, dy) = dir.offset(y % 2 == 1);
    let nx = x + dx;
    let ny = y + dy;
    if nx < 0 || ny < 0 || nx >= w || ny >= h {
        return None;
    }
    Some((ny * w + nx) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_rotation() {
        assert_eq!(Direction::UpperRight.rotate_cw(), Direction::Right);
        assert_eq!(Direction::UpperLeft.rotate_cw(), Direction::UpperRight);
        assert_eq!(Direction::UpperRight.rotate_ccw(), Direction::UpperLeft);
        assert_eq!(Direction::Left.opposite(), Direction::Right);
        assert_eq!(Direction::LowerLeft.opposite(), Direction::UpperRight);
        for dir in Direction::ALL {
            assert_eq!(dir.rotate_cw().rotate_ccw(), dir);
            assert_eq!(Direction::from_index(dir.index()), dir);
        }
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(HexGrid::new(0, 5).is_err());
        assert!(HexGrid::new(5, 0).is_err());
    }

    #[test]
    fn test_oversized_grid_rejected() {
        assert!(HexGrid::new(255, 257).is_ok());
        assert!(matches!(
            HexGrid::new(100_000, 100_000),
            Err(GameError::InvalidConfig(_))
        ));
        assert!(HexGrid::new(u32::MAX, u32::MAX).is_err());
    }

    #[test]
    fn test_out_of_range_cell_has_no_neighbors() {
        let grid = HexGrid::new(4, 4).unwrap();
        assert_eq!(grid.neighbors(16), &[None; 6]);
        assert_eq!(grid.adjacent(99).count(), 0);
        assert_eq!(grid.neighbor(16, Direction::Left), None);
    }

    #[test]
    fn test_even_row_neighbors() {
        let grid = HexGrid::new(5, 5).unwrap();
        // (2, 2): even row, diagonals lean left
        let cell = grid.index(2, 2).unwrap();
        let n = grid.neighbors(cell);
        assert_eq!(n[Direction::UpperRight.index()], grid.index(2, 1));
        assert_eq!(n[Direction::Right.index()], grid.index(3, 2));
        assert_eq!(n[Direction::LowerRight.index()], grid.index(2, 3));
        assert_eq!(n[Direction::LowerLeft.index()], grid.index(1, 3));
        assert_eq!(n[Direction::Left.index()], grid.index(1, 2));
        assert_eq!(n[Direction::UpperLeft.index()], grid.index(1, 1));
    }

    #[test]
    fn test_odd_row_neighbors() {
        let grid = HexGrid::new(5, 5).unwrap();
        // (2, 1): odd row, diagonals lean right
        let cell = grid.index(2, 1).unwrap();
        let n = grid.neighbors(cell);
        assert_eq!(n[Direction::UpperRight.index()], grid.index(3, 0));
        assert_eq!(n[Direction::Right.index()], grid.index(3, 1));
        assert_eq!(n[Direction::LowerRight.index()], grid.index(3, 2));
        assert_eq!(n[Direction::LowerLeft.index()], grid.index(2, 2));
        assert_eq!(n[Direction::Left.index()], grid.index(1, 1));
        assert_eq!(n[Direction::UpperLeft.index()], grid.index(2, 0));
    }

    #[test]
    fn test_corner_has_sentinels() {
        let grid = HexGrid::new(4, 4).unwrap();
        let n = grid.neighbors(0);
        assert_eq!(n[Direction::UpperRight.index()], None);
        assert_eq!(n[Direction::UpperLeft.index()], None);
        assert_eq!(n[Direction::Left.index()], None);
        assert_eq!(n[Direction::LowerLeft.index()], None);
        assert_eq!(n[Direction::Right.index()], Some(1));
        assert_eq!(n[Direction::LowerRight.index()], Some(4));
        assert_eq!(grid.adjacent(0).count(), 2);
    }

    #[test]
    fn test_neighbor_relation_is_symmetric() {
        let grid = HexGrid::new(7, 6).unwrap();
        for cell in 0..grid.cell_count() {
            for dir in Direction::ALL {
                if let Some(n) = grid.neighbor(cell, dir) {
                    assert_eq!(grid.neighbor(n, dir.opposite()), Some(cell));
                }
            }
        }
    }

    #[test]
    fn test_coords_roundtrip() {
        let grid = HexGrid::new(6, 3).unwrap();
        assert_eq!(grid.coords(13), (1, 2));
        assert_eq!(grid.index(1, 2), Some(13));
        assert_eq!(grid.index(6, 0), None);
    }
}
