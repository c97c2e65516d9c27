//! End-to-end map generation tests for hexdice_core.
//!
//! These tests run the full pipeline and check the properties every
//! playable map must have.

use hexdice_core::connectivity::largest_connected_group;
use hexdice_core::invariants::{check_generated, check_invariants};
use hexdice_core::map_generation::{generate_map, generate_seeded, GeneratedMap, MapConfig, MIN_TERRITORY_SIZE};
use hexdice_core::territory::{MAX_DICE, MIN_DICE};
use hexdice_test_utils::determinism::strategies::{arb_map_config, arb_small_config};
use hexdice_test_utils::determinism::{map_fingerprint, verify_map_determinism};
use hexdice_test_utils::proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn small(seed: u64) -> GeneratedMap {
    let config = MapConfig {
        average_dice: 3,
        ..MapConfig::small().with_seed(seed)
    };
    generate_seeded(&config).expect("small map should generate")
}

// =============================================================================
// End-to-end scenario: 20x15 grid, 16 territories, 4 players, 3 dice
// =============================================================================

mod scenario {
    use super::*;

    #[test]
    fn test_territory_count_in_range() {
        for seed in [1, 7, 42, 1234, 98765] {
            let map = small(seed);
            let count = map.territory_count();
            assert!((10..=16).contains(&count), "seed {seed}: {count} territories");
        }
    }

    #[test]
    fn test_ownership_is_balanced() {
        for seed in [3, 8, 21] {
            let map = small(seed);
            let counts: Vec<usize> = map.players.iter().map(|p| p.territory_count).collect();
            let min = counts.iter().min().unwrap();
            let max = counts.iter().max().unwrap();
            assert!(max - min <= 1, "seed {seed}: {counts:?}");
            assert_eq!(counts.iter().sum::<usize>(), map.territory_count());
        }
    }

    #[test]
    fn test_total_dice_is_three_per_territory() {
        // Every player holds at least two territories, so no extra die is skipped.
        for seed in [5, 13, 77] {
            let map = small(seed);
            assert_eq!(map.dice.skipped, 0);
            assert_eq!(map.territories.total_dice(), map.territory_count() as u32 * 3);
            assert_eq!(map.dice.total(), map.territories.total_dice());
        }
    }

    #[test]
    fn test_map_passes_all_checks() {
        let map = small(2024);
        assert_eq!(check_generated(&map), Vec::new());
        assert!(map.border_overruns.is_empty());
    }

    #[test]
    fn test_players_start_connected_consistently() {
        let map = small(31);
        for player in map.players.iter() {
            assert_eq!(
                player.largest_connected_group,
                largest_connected_group(&map.territories, player.id)
            );
            assert!(player.largest_connected_group >= 1);
        }
    }
}

// =============================================================================
// Battle-style updates
// =============================================================================

mod updates {
    use super::*;
    use hexdice_core::player::PlayerId;

    #[test]
    fn test_capture_then_recompute() {
        let mut map = small(55);
        let target = map
            .territories
            .iter()
            .find(|t| t.owner != Some(PlayerId::new(0)))
            .map(|t| (t.id, t.owner))
            .unwrap();
        let (id, defender) = target;
        let defender = defender.unwrap();

        map.territories.set_owner(id, Some(PlayerId::new(0))).unwrap();
        map.territories.set_dice(id, 1).unwrap();
        let attacker_group = map.recompute_connectivity(PlayerId::new(0)).unwrap();
        let defender_group = map.recompute_connectivity(defender).unwrap();

        assert_eq!(
            attacker_group,
            largest_connected_group(&map.territories, PlayerId::new(0))
        );
        assert_eq!(
            defender_group,
            largest_connected_group(&map.territories, defender)
        );
        map.refresh_players();
        assert_eq!(check_invariants(&map), Vec::new());
    }

    #[test]
    fn test_reinforcement_keeps_dice_in_range() {
        let mut map = small(60);
        let mut rng = ChaCha8Rng::seed_from_u64(60);
        for turn in 0..40 {
            let player = map.turn_order[turn % map.turn_order.len()];
            map.reinforce(player, &mut rng).unwrap();
        }
        assert!(map
            .territories
            .iter()
            .all(|t| (MIN_DICE..=MAX_DICE).contains(&t.dice)));
        assert_eq!(check_invariants(&map), Vec::new());
    }
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_seeded_generation_is_deterministic() {
    verify_map_determinism(&MapConfig::small().with_seed(404), 3).assert_deterministic();
    verify_map_determinism(&MapConfig::standard().with_seed(405), 2).assert_deterministic();
}

#[test]
fn test_injected_rng_matches_seeded_entry_point() {
    let config = MapConfig::standard().with_seed(9);
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let injected = generate_map(&config, &mut rng).unwrap();
    let seeded = generate_seeded(&config).unwrap();
    assert_eq!(map_fingerprint(&injected), map_fingerprint(&seeded));
}

// =============================================================================
// Property tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Any valid config either fails cleanly or yields a map with no violations.
    #[test]
    fn prop_generated_maps_hold_invariants(config in arb_map_config()) {
        match generate_seeded(&config) {
            Ok(map) => {
                prop_assert_eq!(check_generated(&map), Vec::new());
                prop_assert!(map.territory_count() >= usize::from(config.player_count));
                prop_assert!(map.territory_count() <= usize::from(config.max_territories));
            }
            Err(e) => prop_assert!(e.is_recoverable(), "unexpected error {e}"),
        }
    }

    /// Territories are connected regions larger than the minimum size.
    #[test]
    fn prop_territories_are_connected(config in arb_small_config()) {
        let map = generate_seeded(&config).unwrap();
        for territory in map.territories.iter() {
            prop_assert!(territory.size > MIN_TERRITORY_SIZE);
            let Some(start) = territory.center else {
                return Err(TestCaseError::fail("territory without center"));
            };

            let mut seen = vec![false; map.cells.len()];
            let mut stack = vec![start];
            seen[start] = true;
            let mut reached = 0;
            while let Some(cell) = stack.pop() {
                reached += 1;
                for n in map.grid.adjacent(cell) {
                    if !seen[n] && map.cells[n] == territory.id {
                        seen[n] = true;
                        stack.push(n);
                    }
                }
            }
            prop_assert_eq!(reached, territory.size);
        }
    }

    /// Dice totals match the allocation summary.
    #[test]
    fn prop_dice_totals_match(config in arb_small_config()) {
        let map = generate_seeded(&config).unwrap();
        let extra = u32::from(config.average_dice - 1) * map.territory_count() as u32;
        prop_assert_eq!(map.dice.requested, extra);
        prop_assert_eq!(map.dice.placed + map.dice.skipped, extra);
        prop_assert_eq!(map.territories.total_dice(), map.dice.total());
    }
}
