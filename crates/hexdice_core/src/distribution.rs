//! Territory ownership distribution.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::error::{GameError, Result};
use crate::player::PlayerId;
use crate::territory::{TerritoryId, TerritoryTable};

/// Assign every existing territory to a player.
///
/// Players take turns starting at `first`; on each turn a uniformly random
/// unowned territory is handed out. Territory counts per player therefore
/// differ by at most one, while the choice of territories stays random.
///
/// # Errors
///
/// Returns [`GameError::InvalidConfig`] if `player_count` is zero and
/// [`GameError::UnknownPlayer`] if `first` is out of range.
pub fn distribute_territories<R: Rng + ?Sized>(
    territories: &mut TerritoryTable,
    player_count: u8,
    first: PlayerId,
    rng: &mut R,
) -> Result<()> {
    if player_count == 0 {
        return Err(GameError::InvalidConfig(
            "cannot distribute territories to zero players".to_string(),
        ));
    }
    if first.0 >= player_count {
        return Err(GameError::UnknownPlayer {
            player: first,
            player_count: usize::from(player_count),
        });
    }

    for territory in territories.iter_mut() {
        territory.owner = None;
    }

    let mut unowned: Vec<TerritoryId> = territories.iter().map(|t| t.id).collect();
    let mut player = first.0;
    while !unowned.is_empty() {
        let pick = rng.gen_range(0..unowned.len());
        let id = unowned.swap_remove(pick);
        if let Some(territory) = territories.get_mut(id) {
            territory.owner = Some(PlayerId::new(player));
        }
        player = (player + 1) % player_count;
    }

    debug!(
        territories = territories.count(),
        players = player_count,
        "Distributed territories"
    );
    Ok(())
}

/// Random turn order over all players.
pub fn shuffled_turn_order<R: Rng + ?Sized>(player_count: u8, rng: &mut R) -> Vec<PlayerId> {
    let mut order: Vec<PlayerId> = (0..player_count).map(PlayerId::new).collect();
    order.shuffle(rng);
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::territory::Territory;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn table(count: u16) -> TerritoryTable {
        TerritoryTable::from_territories(
            (1..=count)
                .map(|id| Territory {
                    size: 8,
                    dice: 1,
                    ..Territory::empty(TerritoryId::new(id))
                })
                .collect(),
        )
    }

    fn counts(territories: &TerritoryTable, players: u8) -> Vec<usize> {
        (0..players)
            .map(|p| territories.owned_by(PlayerId::new(p)).count())
            .collect()
    }

    #[test]
    fn test_every_territory_owned_and_balanced() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for (count, players) in [(13u16, 4u8), (16, 4), (31, 7), (5, 2)] {
            let mut territories = table(count);
            distribute_territories(&mut territories, players, PlayerId::new(0), &mut rng)
                .unwrap();

            assert!(territories.iter().all(|t| t.owner.is_some()));
            let per_player = counts(&territories, players);
            let max = per_player.iter().max().unwrap();
            let min = per_player.iter().min().unwrap();
            assert!(max - min <= 1, "unbalanced {per_player:?}");
            assert_eq!(per_player.iter().sum::<usize>(), count as usize);
        }
    }

    #[test]
    fn test_first_player_gets_the_extra() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut territories = table(5);
        distribute_territories(&mut territories, 4, PlayerId::new(2), &mut rng).unwrap();
        assert_eq!(counts(&territories, 4), vec![1, 1, 2, 1]);
    }

    #[test]
    fn test_discarded_slots_stay_unowned() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut territories = TerritoryTable::from_territories(vec![
            Territory {
                size: 7,
                dice: 1,
                ..Territory::empty(TerritoryId::new(1))
            },
            Territory::empty(TerritoryId::new(2)),
        ]);
        distribute_territories(&mut territories, 2, PlayerId::new(0), &mut rng).unwrap();
        assert_eq!(
            territories.get(TerritoryId::new(1)).unwrap().owner,
            Some(PlayerId::new(0))
        );
        assert_eq!(territories.get(TerritoryId::new(2)).unwrap().owner, None);
    }

    #[test]
    fn test_invalid_players() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut territories = table(3);
        assert!(matches!(
            distribute_territories(&mut territories, 3, PlayerId::new(3), &mut rng),
            Err(GameError::UnknownPlayer { .. })
        ));
        assert!(matches!(
            distribute_territories(&mut territories, 0, PlayerId::new(0), &mut rng),
            Err(GameError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_player_ids_stay_below_count() {
        // More players than territories: every owner is a distinct id.
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut territories = table(31);
        distribute_territories(&mut territories, u8::MAX, PlayerId::new(250), &mut rng).unwrap();

        let mut owners: Vec<u8> = territories.iter().map(|t| t.owner.unwrap().0).collect();
        owners.sort_unstable();
        owners.dedup();
        assert_eq!(owners.len(), 31);
        assert!(owners.iter().all(|&p| p < u8::MAX));
        assert!(owners.contains(&254));
        assert!(owners.contains(&0));
    }

    #[test]
    fn test_turn_order_is_permutation() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut order = shuffled_turn_order(7, &mut rng);
        order.sort();
        assert_eq!(order, (0..7).map(PlayerId::new).collect::<Vec<_>>());
    }
}
