//! Structural checks over a generated map.
//!
//! Used by tests, the `validate` tool and (with the `debug-validation`
//! feature) by the generator itself.

use thiserror::Error;

use crate::map_generation::{GeneratedMap, MIN_TERRITORY_SIZE};
use crate::player::PlayerId;
use crate::territory::{TerritoryId, MAX_DICE, MIN_DICE};

/// A broken map invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// The cell array does not match the grid.
    #[error("cell array has {actual} entries, grid has {expected} cells")]
    CellCount {
        /// Grid cell count.
        expected: usize,
        /// Length of the cell array.
        actual: usize,
    },

    /// A territory stored in a slot other than its own id.
    #[error("slot {slot} holds territory {id}")]
    MisplacedId {
        /// Slot index in the table.
        slot: usize,
        /// Id recorded in the territory.
        id: TerritoryId,
    },

    /// A cell points at a territory that does not exist.
    #[error("cell {cell} belongs to missing territory {territory}")]
    OrphanCell {
        /// Cell index.
        cell: usize,
        /// Referenced territory.
        territory: TerritoryId,
    },

    /// Recorded size differs from the number of cells.
    #[error("territory {territory} records size {recorded} but covers {actual} cells")]
    SizeMismatch {
        /// Territory.
        territory: TerritoryId,
        /// Size stored in the table.
        recorded: usize,
        /// Cells counted in the cell array.
        actual: usize,
    },

    /// A territory at or below the minimum size survived.
    #[error("territory {territory} has only {size} cells")]
    Undersized {
        /// Territory.
        territory: TerritoryId,
        /// Its size.
        size: usize,
    },

    /// A territory lists itself as a neighbor.
    #[error("territory {0} is adjacent to itself")]
    SelfAdjacent(TerritoryId),

    /// Adjacency recorded one way only.
    #[error("territory {from} lists {to} as adjacent but not the reverse")]
    AsymmetricAdjacency {
        /// Territory holding the edge.
        from: TerritoryId,
        /// Territory missing the reverse edge.
        to: TerritoryId,
    },

    /// Adjacency to a discarded or unknown territory.
    #[error("territory {from} is adjacent to missing territory {to}")]
    AdjacentToMissing {
        /// Territory holding the edge.
        from: TerritoryId,
        /// Missing territory.
        to: TerritoryId,
    },

    /// Dice outside `1..=8`.
    #[error("territory {territory} holds {dice} dice")]
    DiceOutOfRange {
        /// Territory.
        territory: TerritoryId,
        /// Dice count.
        dice: u8,
    },

    /// A territory without an owner.
    #[error("territory {0} has no owner")]
    Unowned(TerritoryId),

    /// An owner outside the player table.
    #[error("territory {territory} is owned by unknown player {owner}")]
    UnknownOwner {
        /// Territory.
        territory: TerritoryId,
        /// Recorded owner.
        owner: PlayerId,
    },

    /// A territory whose center cell lies outside it.
    #[error("territory {0} has no center inside its cells")]
    MisplacedCenter(TerritoryId),

    /// Largest connected group exceeds the territories held.
    #[error("player {player} reports a group of {group} but owns {owned} territories")]
    GroupExceedsHoldings {
        /// Player.
        player: PlayerId,
        /// Stored largest connected group.
        group: usize,
        /// Territories owned.
        owned: usize,
    },

    /// Territory counts per player differ by more than one.
    #[error("territory counts range from {min} to {max} across players")]
    UnbalancedDistribution {
        /// Fewest territories held by a player.
        min: usize,
        /// Most territories held by a player.
        max: usize,
    },
}

/// Check invariants that hold for any map, including one mid-game.
#[must_use]
pub fn check_invariants(map: &GeneratedMap) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();

    if map.cells.len() != map.grid.cell_count() {
        violations.push(InvariantViolation::CellCount {
            expected: map.grid.cell_count(),
            actual: map.cells.len(),
        });
        return violations;
    }

    let mut sizes = vec![0usize; map.territories.slot_count()];
    for (cell, &t) in map.cells.iter().enumerate() {
        if t.is_none() {
            continue;
        }
        match (map.territories.get(t), sizes.get_mut(t.index())) {
            (Some(territory), Some(size)) if territory.exists() => *size += 1,
            _ => violations.push(InvariantViolation::OrphanCell { cell, territory: t }),
        }
    }

    for (slot, territory) in map.territories.slots() {
        let id = territory.id;
        if id.index() != slot {
            violations.push(InvariantViolation::MisplacedId { slot, id });
            continue;
        }
        let actual = sizes[slot];
        if territory.size != actual {
            violations.push(InvariantViolation::SizeMismatch {
                territory: id,
                recorded: territory.size,
                actual,
            });
        }
        if territory.size <= MIN_TERRITORY_SIZE {
            violations.push(InvariantViolation::Undersized {
                territory: id,
                size: territory.size,
            });
        }

        for &other in &territory.adjacency {
            if other == id {
                violations.push(InvariantViolation::SelfAdjacent(id));
                continue;
            }
            match map.territories.get(other) {
                Some(neighbor) if neighbor.exists() => {
                    if !neighbor.is_adjacent(id) {
                        violations.push(InvariantViolation::AsymmetricAdjacency { from: id, to: other });
                    }
                }
                _ => violations.push(InvariantViolation::AdjacentToMissing { from: id, to: other }),
            }
        }

        if !(MIN_DICE..=MAX_DICE).contains(&territory.dice) {
            violations.push(InvariantViolation::DiceOutOfRange {
                territory: id,
                dice: territory.dice,
            });
        }

        match territory.owner {
            None => violations.push(InvariantViolation::Unowned(id)),
            Some(owner) if map.players.check(owner).is_err() => {
                violations.push(InvariantViolation::UnknownOwner { territory: id, owner });
            }
            Some(_) => {}
        }

        let centered = territory
            .center
            .is_some_and(|cell| map.cells.get(cell) == Some(&id));
        if !centered {
            violations.push(InvariantViolation::MisplacedCenter(id));
        }
    }

    for player in map.players.iter() {
        let owned = map.territories.owned_by(player.id).count();
        if player.largest_connected_group > owned {
            violations.push(InvariantViolation::GroupExceedsHoldings {
                player: player.id,
                group: player.largest_connected_group,
                owned,
            });
        }
    }

    violations
}

/// Check that territory counts per player differ by at most one.
///
/// Only meaningful right after generation.
#[must_use]
pub fn check_fair_distribution(map: &GeneratedMap) -> Option<InvariantViolation> {
    let counts: Vec<usize> = map
        .players
        .ids()
        .map(|p| map.territories.owned_by(p).count())
        .collect();
    let min = counts.iter().copied().min()?;
    let max = counts.iter().copied().max()?;
    (max - min > 1).then_some(InvariantViolation::UnbalancedDistribution { min, max })
}

/// All checks that hold for a freshly generated map.
#[must_use]
pub fn check_generated(map: &GeneratedMap) -> Vec<InvariantViolation> {
    let mut violations = check_invariants(map);
    violations.extend(check_fair_distribution(map));
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map_generation::{generate_map, MapConfig};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn small_map(seed: u64) -> GeneratedMap {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        generate_map(&MapConfig::small(), &mut rng).unwrap()
    }

    #[test]
    fn test_generated_map_is_clean() {
        for seed in [1, 2, 3, 99, 2024] {
            let map = small_map(seed);
            assert_eq!(check_generated(&map), Vec::new(), "seed {seed}");
        }
    }

    #[test]
    fn test_detects_asymmetric_adjacency() {
        let mut map = small_map(5);
        let (a, b) = map
            .territories
            .iter()
            .find_map(|t| t.adjacency.iter().next().map(|&b| (t.id, b)))
            .unwrap();
        map.territories.get_mut(b).unwrap().adjacency.remove(&a);

        let violations = check_invariants(&map);
        assert!(violations.contains(&InvariantViolation::AsymmetricAdjacency { from: a, to: b }));
    }

    #[test]
    fn test_detects_dice_and_owner_problems() {
        let mut map = small_map(6);
        let id = map.territories.iter().next().unwrap().id;
        let territory = map.territories.get_mut(id).unwrap();
        territory.dice = 9;
        territory.owner = None;

        let violations = check_invariants(&map);
        assert!(violations.contains(&InvariantViolation::DiceOutOfRange { territory: id, dice: 9 }));
        assert!(violations.contains(&InvariantViolation::Unowned(id)));
    }

    #[test]
    fn test_detects_unbalanced_distribution() {
        let mut map = small_map(7);
        let ids: Vec<TerritoryId> = map.territories.iter().map(|t| t.id).collect();
        for id in ids {
            map.territories.set_owner(id, Some(PlayerId::new(0))).unwrap();
        }
        assert!(check_invariants(&map)
            .iter()
            .all(|v| !matches!(v, InvariantViolation::Unowned(_))));
        assert!(matches!(
            check_fair_distribution(&map),
            Some(InvariantViolation::UnbalancedDistribution { min: 0, .. })
        ));
    }

    #[test]
    fn test_detects_misplaced_id() {
        let mut map = small_map(5);
        let id = map.territories.iter().next().unwrap().id;
        map.territories.get_mut(id).unwrap().id = TerritoryId::new(500);

        let violations = check_invariants(&map);
        assert!(violations.contains(&InvariantViolation::MisplacedId {
            slot: id.index(),
            id: TerritoryId::new(500),
        }));
    }

    #[test]
    fn test_detects_orphan_cells() {
        let mut map = small_map(8);
        let cell = map.cells.iter().position(|t| !t.is_none()).unwrap();
        map.cells[cell] = TerritoryId::new(map.config.max_territories + 1);
        assert!(check_invariants(&map)
            .iter()
            .any(|v| matches!(v, InvariantViolation::OrphanCell { .. })));
    }
}
