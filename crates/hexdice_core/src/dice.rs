//! Initial dice placement and end-of-turn reinforcement.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::connectivity;
use crate::error::{GameError, Result};
use crate::player::{PlayerId, PlayerTable, MAX_STOCK};
use crate::territory::{TerritoryId, TerritoryTable, MAX_DICE, MIN_DICE};

/// Summary of an initial dice allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiceAllocation {
    /// One die per existing territory.
    pub base: u32,
    /// Extra dice the allocation tried to place.
    pub requested: u32,
    /// Extra dice actually placed.
    pub placed: u32,
    /// Extra dice dropped because their player had no territory below the cap.
    pub skipped: u32,
}

impl DiceAllocation {
    /// Dice on the board after allocation.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.base + self.placed
    }
}

/// Outcome of one reinforcement step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reinforcement {
    /// Dice earned this turn (largest connected group).
    pub earned: u32,
    /// Dice placed on territories.
    pub placed: u32,
    /// Dice left in stock afterwards.
    pub stock: u32,
}

fn eligible(territories: &TerritoryTable, player: PlayerId) -> Vec<TerritoryId> {
    territories
        .owned_by(player)
        .filter(|t| t.dice < MAX_DICE)
        .map(|t| t.id)
        .collect()
}

/// Place starting dice.
///
/// Every existing territory gets one die; then
/// `territory_count * (average_dice - 1)` extra dice are dealt round-robin
/// over players, each to a random territory of that player below the cap.
/// A die whose player has no eligible territory is skipped rather than
/// handed to someone else, keeping dice counts player-local.
///
/// # Errors
///
/// Returns [`GameError::InvalidConfig`] if `player_count` is zero or
/// `average_dice` is outside `1..=8`.
pub fn allocate_dice<R: Rng + ?Sized>(
    territories: &mut TerritoryTable,
    player_count: u8,
    average_dice: u8,
    rng: &mut R,
) -> Result<DiceAllocation> {
    if player_count == 0 {
        return Err(GameError::InvalidConfig(
            "cannot allocate dice to zero players".to_string(),
        ));
    }
    if !(MIN_DICE..=MAX_DICE).contains(&average_dice) {
        return Err(GameError::InvalidConfig(format!(
            "average dice must be between {MIN_DICE} and {MAX_DICE}, got {average_dice}"
        )));
    }

    for territory in territories.iter_mut() {
        territory.dice = MIN_DICE;
    }

    let count = territories.count() as u32;
    let mut allocation = DiceAllocation {
        base: count,
        requested: count * u32::from(average_dice - 1),
        ..DiceAllocation::default()
    };

    let mut player = 0u8;
    for _ in 0..allocation.requested {
        let candidates = eligible(territories, PlayerId::new(player));
        match candidates.choose(rng) {
            Some(&id) => {
                if let Some(territory) = territories.get_mut(id) {
                    territory.dice += 1;
                }
                allocation.placed += 1;
            }
            None => allocation.skipped += 1,
        }
        player = (player + 1) % player_count;
    }

    debug!(
        base = allocation.base,
        placed = allocation.placed,
        skipped = allocation.skipped,
        "Allocated dice"
    );
    Ok(allocation)
}

/// End-of-turn reinforcement for `player`.
///
/// The player earns dice equal to their largest connected group (recomputed
/// here), added to stock up to [`MAX_STOCK`]. Stock is then placed one die at
/// a time on random owned territories below the cap.
///
/// # Errors
///
/// Returns [`GameError::UnknownPlayer`] for an out-of-range id.
pub fn reinforce<R: Rng + ?Sized>(
    territories: &mut TerritoryTable,
    players: &mut PlayerTable,
    player: PlayerId,
    rng: &mut R,
) -> Result<Reinforcement> {
    let earned = connectivity::recompute(territories, players, player)? as u32;

    let record = players.get_mut(player)?;
    record.stock = (record.stock + earned).min(MAX_STOCK);

    let mut placed = 0;
    while record.stock > 0 {
        let candidates = eligible(territories, player);
        let Some(&id) = candidates.choose(rng) else {
            break;
        };
        if let Some(territory) = territories.get_mut(id) {
            territory.dice += 1;
        }
        record.stock -= 1;
        placed += 1;
    }

    let stock = record.stock;
    players.refresh_holdings(territories);
    debug!(player = player.0, earned, placed, stock, "Reinforced");
    Ok(Reinforcement {
        earned,
        placed,
        stock,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::territory::Territory;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn owned(id: u16, owner: u8) -> Territory {
        Territory {
            size: 6,
            owner: Some(PlayerId::new(owner)),
            dice: 1,
            ..Territory::empty(TerritoryId::new(id))
        }
    }

    #[test]
    fn test_allocation_totals() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut territories = TerritoryTable::from_territories(
            (1..=12).map(|id| owned(id, (id % 4) as u8)).collect(),
        );
        let allocation = allocate_dice(&mut territories, 4, 3, &mut rng).unwrap();

        assert_eq!(allocation.base, 12);
        assert_eq!(allocation.requested, 24);
        assert_eq!(allocation.placed + allocation.skipped, 24);
        assert_eq!(territories.total_dice(), allocation.total());
        assert!(territories.iter().all(|t| (MIN_DICE..=MAX_DICE).contains(&t.dice)));
        // 3 territories per player can absorb 21 dice each: nothing skipped
        assert_eq!(allocation.skipped, 0);
    }

    #[test]
    fn test_full_player_dice_are_skipped_not_redistributed() {
        // Player 0 holds a single territory, player 1 holds three.
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut territories = TerritoryTable::from_territories(vec![
            owned(1, 0),
            owned(2, 1),
            owned(3, 1),
            owned(4, 1),
        ]);
        let allocation = allocate_dice(&mut territories, 2, 8, &mut rng).unwrap();

        // 28 extra dice alternate players: 14 each. Player 0 can take 7.
        assert_eq!(allocation.requested, 28);
        assert_eq!(allocation.skipped, 7);
        assert_eq!(allocation.placed, 21);
        assert_eq!(territories.existing(TerritoryId::new(1)).unwrap().dice, 8);
        assert_eq!(territories.dice_owned_by(PlayerId::new(1)), 3 + 14);
    }

    #[test]
    fn test_players_without_territories_skip_their_turns() {
        // 200 seats, only players 0 and 1 hold land.
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut territories = TerritoryTable::from_territories(vec![owned(1, 0), owned(2, 1)]);
        let allocation = allocate_dice(&mut territories, 200, 2, &mut rng).unwrap();

        assert_eq!(allocation.requested, 2);
        assert_eq!(allocation.placed, 2);
        assert_eq!(territories.dice_owned_by(PlayerId::new(0)), 2);
        assert_eq!(territories.dice_owned_by(PlayerId::new(1)), 2);
    }

    #[test]
    fn test_average_one_places_only_base() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut territories = TerritoryTable::from_territories(vec![owned(1, 0), owned(2, 1)]);
        territories.set_dice(TerritoryId::new(1), 5).unwrap();
        let allocation = allocate_dice(&mut territories, 2, 1, &mut rng).unwrap();
        assert_eq!(allocation.total(), 2);
        assert_eq!(territories.existing(TerritoryId::new(1)).unwrap().dice, 1);
    }

    #[test]
    fn test_invalid_average() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut territories = TerritoryTable::from_territories(vec![owned(1, 0)]);
        assert!(allocate_dice(&mut territories, 2, 0, &mut rng).is_err());
        assert!(allocate_dice(&mut territories, 2, 9, &mut rng).is_err());
        assert!(allocate_dice(&mut territories, 0, 3, &mut rng).is_err());
    }

    #[test]
    fn test_reinforce_uses_largest_group() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut territories = TerritoryTable::from_territories(vec![
            owned(1, 0),
            owned(2, 0),
            owned(3, 0),
            owned(4, 1),
        ]);
        territories.connect(TerritoryId::new(1), TerritoryId::new(2));
        territories.connect(TerritoryId::new(2), TerritoryId::new(3));
        let mut players = PlayerTable::new(2);

        let result = reinforce(&mut territories, &mut players, PlayerId::new(0), &mut rng).unwrap();
        assert_eq!(result.earned, 3);
        assert_eq!(result.placed, 3);
        assert_eq!(result.stock, 0);
        assert_eq!(territories.dice_owned_by(PlayerId::new(0)), 6);
        assert_eq!(players.get(PlayerId::new(0)).unwrap().dice_total, 6);
    }

    #[test]
    fn test_reinforce_overflow_goes_to_stock() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut territories = TerritoryTable::from_territories(vec![owned(1, 0), owned(2, 0)]);
        territories.connect(TerritoryId::new(1), TerritoryId::new(2));
        territories.set_dice(TerritoryId::new(1), 8).unwrap();
        territories.set_dice(TerritoryId::new(2), 7).unwrap();
        let mut players = PlayerTable::new(2);

        let result = reinforce(&mut territories, &mut players, PlayerId::new(0), &mut rng).unwrap();
        assert_eq!(result.earned, 2);
        assert_eq!(result.placed, 1);
        assert_eq!(result.stock, 1);
        assert_eq!(players.get(PlayerId::new(0)).unwrap().stock, 1);
    }

    #[test]
    fn test_stock_is_capped() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut territories = TerritoryTable::from_territories(vec![owned(1, 0)]);
        territories.set_dice(TerritoryId::new(1), 8).unwrap();
        let mut players = PlayerTable::new(2);
        players.get_mut(PlayerId::new(0)).unwrap().stock = MAX_STOCK;

        let result = reinforce(&mut territories, &mut players, PlayerId::new(0), &mut rng).unwrap();
        assert_eq!(result.stock, MAX_STOCK);
    }

    #[test]
    fn test_reinforce_unknown_player() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut territories = TerritoryTable::from_territories(vec![owned(1, 0)]);
        let mut players = PlayerTable::new(2);
        assert!(reinforce(&mut territories, &mut players, PlayerId::new(5), &mut rng).is_err());
    }
}
