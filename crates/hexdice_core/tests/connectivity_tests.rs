//! Connectivity, border and dice tests on hand-built fixtures.

use hexdice_core::border::{first_boundary_edge, is_boundary_edge, trace_border};
use hexdice_core::connectivity::{largest_connected_group, recompute, recompute_all};
use hexdice_core::dice::allocate_dice;
use hexdice_core::hex::{Direction, HexGrid};
use hexdice_test_utils::fixtures::{block, paint, paint_into, pid, players, split_groups, tid, TerritoryGraphBuilder};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

mod connectivity {
    use super::*;

    #[test]
    fn test_three_plus_two_returns_three() {
        let table = split_groups();
        assert_eq!(largest_connected_group(&table, pid(0)), 3);
    }

    #[test]
    fn test_capture_joins_groups() {
        let mut table = split_groups();
        let mut stats = players(2);
        recompute_all(&table, &mut stats);
        assert_eq!(stats.get(pid(0)).unwrap().largest_connected_group, 3);

        // Player 0 takes the territory between its two groups.
        table.set_owner(tid(6), Some(pid(0))).unwrap();
        assert_eq!(recompute(&table, &mut stats, pid(0)).unwrap(), 6);
        assert_eq!(recompute(&table, &mut stats, pid(1)).unwrap(), 1);
    }

    #[test]
    fn test_player_without_territories() {
        let table = TerritoryGraphBuilder::new()
            .territory(1, 0)
            .territory(2, 0)
            .edge(1, 2)
            .build();
        assert_eq!(largest_connected_group(&table, pid(1)), 0);
    }

    #[test]
    fn test_ring_of_territories() {
        let table = TerritoryGraphBuilder::new()
            .territory(1, 2)
            .territory(2, 2)
            .territory(3, 2)
            .territory(4, 2)
            .chain(&[1, 2, 3, 4, 1])
            .build();
        assert_eq!(largest_connected_group(&table, pid(2)), 4);
    }
}

mod borders {
    use super::*;

    #[test]
    fn test_compact_patch_closes_quickly() {
        let grid = HexGrid::new(10, 10).unwrap();
        let cells = paint(&grid, &block(3, 4, 3, 2), tid(1));
        let start = first_boundary_edge(&grid, &cells, tid(1)).unwrap();
        let outline = trace_border(&grid, &cells, start).unwrap();
        assert!(outline.len() <= 24);
        assert!(outline
            .iter()
            .all(|s| is_boundary_edge(&grid, &cells, s.cell, s.direction)));
    }

    #[test]
    fn test_neighboring_territories_share_edges() {
        let grid = HexGrid::new(10, 10).unwrap();
        let mut cells = paint(&grid, &block(1, 1, 3, 3), tid(1));
        paint_into(&grid, &mut cells, &block(4, 1, 3, 3), tid(2));

        let a = trace_border(&grid, &cells, first_boundary_edge(&grid, &cells, tid(1)).unwrap()).unwrap();
        let b = trace_border(&grid, &cells, first_boundary_edge(&grid, &cells, tid(2)).unwrap()).unwrap();

        // Every edge of A facing B has a mirrored edge in B's outline.
        for step in &a {
            if let Some(n) = grid.neighbor(step.cell, step.direction) {
                if cells[n] == tid(2) {
                    assert!(b
                        .iter()
                        .any(|s| s.cell == n && s.direction == step.direction.opposite()));
                }
            }
        }
        assert!(a.iter().any(|s| s.direction == Direction::Right));
    }
}

mod dice {
    use super::*;

    #[test]
    fn test_dice_stay_player_local() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let mut table = TerritoryGraphBuilder::new()
            .territory(1, 0)
            .territory(2, 1)
            .territory(3, 1)
            .territory(4, 1)
            .chain(&[1, 2, 3, 4])
            .build();
        let allocation = allocate_dice(&mut table, 2, 8, &mut rng).unwrap();

        assert_eq!(allocation.skipped, 7);
        assert_eq!(table.dice_owned_by(pid(0)), 8);
        assert_eq!(table.dice_owned_by(pid(1)), 17);
    }
}
