//! Players and per-player statistics.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::territory::TerritoryTable;

/// Maximum reinforcement dice a player can hold in stock.
pub const MAX_STOCK: u32 = 64;

/// Unique identifier for players (`0..player_count`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Index into a [`PlayerTable`].
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Player state relevant to the map engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Player id.
    pub id: PlayerId,
    /// Territory count of the largest connected group.
    ///
    /// Written only by [`crate::connectivity::recompute`].
    pub largest_connected_group: usize,
    /// Territories currently owned.
    pub territory_count: usize,
    /// Dice across all owned territories.
    pub dice_total: u32,
    /// Reinforcement dice waiting for a free territory.
    pub stock: u32,
}

impl Player {
    /// Create a new player with no holdings.
    #[must_use]
    pub const fn new(id: PlayerId) -> Self {
        Self {
            id,
            largest_connected_group: 0,
            territory_count: 0,
            dice_total: 0,
            stock: 0,
        }
    }
}

/// All players in a game, indexed by [`PlayerId`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTable {
    players: Vec<Player>,
}

impl PlayerTable {
    /// Create `count` players with ids `0..count`.
    #[must_use]
    pub fn new(count: u8) -> Self {
        Self {
            players: (0..count).map(|id| Player::new(PlayerId::new(id))).collect(),
        }
    }

    /// Number of players.
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether the table has no players.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Fail with [`GameError::UnknownPlayer`] unless `player` is in range.
    pub fn check(&self, player: PlayerId) -> Result<()> {
        if player.index() < self.players.len() {
            Ok(())
        } else {
            Err(GameError::UnknownPlayer {
                player,
                player_count: self.players.len(),
            })
        }
    }

    /// Look up a player.
    pub fn get(&self, player: PlayerId) -> Result<&Player> {
        self.check(player)?;
        Ok(&self.players[player.index()])
    }

    /// Look up a player mutably.
    pub fn get_mut(&mut self, player: PlayerId) -> Result<&mut Player> {
        self.check(player)?;
        Ok(&mut self.players[player.index()])
    }

    /// Iterate players in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    /// All player ids in order.
    pub fn ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().map(|p| p.id)
    }

    /// Refresh territory and dice totals from the territory table.
    ///
    /// Does not touch `largest_connected_group`.
    pub fn refresh_holdings(&mut self, territories: &TerritoryTable) {
        for player in &mut self.players {
            player.territory_count = territories.owned_by(player.id).count();
            player.dice_total = territories.dice_owned_by(player.id);
        }
    }
}
