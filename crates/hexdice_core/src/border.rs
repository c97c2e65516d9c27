//! Territory outline tracing.
//!
//! Produces the ordered list of boundary edges of a territory, each as the
//! inside cell plus the direction it faces out of. Renderers turn the list
//! into a polygon.

use crate::error::{GameError, Result};
use crate::hex::{Direction, HexGrid};
use crate::territory::{BorderStep, TerritoryId};

/// Safety bound on the number of steps in one trace.
pub const MAX_BORDER_STEPS: usize = 100;

/// Whether the edge of `cell` facing `dir` separates it from a different
/// territory or the map boundary.
#[must_use]
pub fn is_boundary_edge(grid: &HexGrid, cells: &[TerritoryId], cell: usize, dir: Direction) -> bool {
    grid.neighbor(cell, dir)
        .map_or(true, |n| cells.get(n) != cells.get(cell))
}

/// First boundary edge of `territory` in cell scan order.
#[must_use]
pub fn first_boundary_edge(
    grid: &HexGrid,
    cells: &[TerritoryId],
    territory: TerritoryId,
) -> Option<BorderStep> {
    cells
        .iter()
        .enumerate()
        .filter(|&(_, &t)| t == territory)
        .find_map(|(cell, _)| {
            Direction::ALL
                .into_iter()
                .find(|&dir| is_boundary_edge(grid, cells, cell, dir))
                .map(|dir| BorderStep::new(cell, dir))
        })
}

/// Trace the outline of the territory containing `start.cell`.
///
/// Wall-following walk: rotate clockwise; when the neighbor in the new
/// direction belongs to the same territory, step into it and turn back two
/// directions. Every state visited is a boundary edge.
///
/// # Errors
///
/// Returns [`GameError::BoundaryTraceOverrun`] if `start` is not a boundary
/// edge or the walk does not close within [`MAX_BORDER_STEPS`].
pub fn trace_border(grid: &HexGrid, cells: &[TerritoryId], start: BorderStep) -> Result<Vec<BorderStep>> {
    trace_border_bounded(grid, cells, start, MAX_BORDER_STEPS)
}

/// [`trace_border`] with an explicit step bound.
pub fn trace_border_bounded(
    grid: &HexGrid,
    cells: &[TerritoryId],
    start: BorderStep,
    limit: usize,
) -> Result<Vec<BorderStep>> {
    let territory = cells.get(start.cell).copied().unwrap_or(TerritoryId::NONE);
    if territory.is_none() || !is_boundary_edge(grid, cells, start.cell, start.direction) {
        return Err(GameError::BoundaryTraceOverrun {
            territory,
            limit: 0,
        });
    }

    let mut outline = vec![start];
    let mut cell = start.cell;
    let mut dir = start.direction;

    for _ in 0..limit {
        dir = dir.rotate_cw();
        if let Some(next) = grid.neighbor(cell, dir) {
            if cells.get(next) == Some(&territory) {
                cell = next;
                dir = dir.rotate_ccw().rotate_ccw();
            }
        }

        let step = BorderStep::new(cell, dir);
        if step == start {
            return Ok(outline);
        }
        outline.push(step);
    }

    Err(GameError::BoundaryTraceOverrun { territory, limit })
}
