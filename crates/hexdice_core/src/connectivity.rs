//! Connected-group analysis over a player's territories.
//!
//! The largest group of mutually adjacent territories a player owns drives
//! reinforcement, so it is recomputed from scratch after every ownership
//! change. Territory counts are small (tens), which keeps a full recompute
//! cheap.

use tracing::trace;

use crate::error::Result;
use crate::player::{PlayerId, PlayerTable};
use crate::territory::{Territory, TerritoryTable};

/// Disjoint-set forest with path compression and union by size.
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    /// Create `n` singleton sets.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    /// Representative of the set containing `x`.
    ///
    /// Iterative: one pass to find the root, a second to point every
    /// visited node straight at it.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Merge the sets containing `a` and `b`. Returns `false` if already joined.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }

        let (big, small) = if self.size[ra] >= self.size[rb] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parent[small] = big;
        self.size[big] += self.size[small];
        true
    }

    /// Size of the set containing `x`.
    pub fn set_size(&mut self, x: usize) -> usize {
        let root = self.find(x);
        self.size[root]
    }
}

/// Size of `player`'s largest connected group of owned territories.
///
/// Pure read of ownership and adjacency. Returns 0 if the player owns
/// nothing.
#[must_use]
pub fn largest_connected_group(territories: &TerritoryTable, player: PlayerId) -> usize {
    let owned: Vec<(usize, &Territory)> = territories
        .slots()
        .filter(|(_, t)| t.owner == Some(player))
        .collect();
    if owned.is_empty() {
        return 0;
    }

    let mut sets = DisjointSet::new(territories.slot_count());
    for &(slot, territory) in &owned {
        for &other in &territory.adjacency {
            let owned_other = territories
                .get(other)
                .is_some_and(|t| t.exists() && t.owner == Some(player));
            if owned_other {
                sets.union(slot, other.index());
            }
        }
    }

    owned
        .into_iter()
        .map(|(slot, _)| sets.set_size(slot))
        .max()
        .unwrap_or(0)
}

/// Recompute and store `player`'s largest connected group.
///
/// # Errors
///
/// Returns [`crate::error::GameError::UnknownPlayer`] for an out-of-range id.
pub fn recompute(
    territories: &TerritoryTable,
    players: &mut PlayerTable,
    player: PlayerId,
) -> Result<usize> {
    players.check(player)?;
    let largest = largest_connected_group(territories, player);
    players.get_mut(player)?.largest_connected_group = largest;
    trace!(player = player.0, largest, "Recomputed connected group");
    Ok(largest)
}

/// Recompute the largest connected group for every player.
pub fn recompute_all(territories: &TerritoryTable, players: &mut PlayerTable) {
    let ids: Vec<PlayerId> = players.ids().collect();
    for player in ids {
        let largest = largest_connected_group(territories, player);
        if let Ok(record) = players.get_mut(player) {
            record.largest_connected_group = largest;
        }
    }
}
