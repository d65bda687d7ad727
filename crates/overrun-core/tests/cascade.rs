//! Engine-level properties: determinism, termination and state bounds.

use overrun_core::{Game, Phase, SeatConfig};
use overrun_protocol::{snapshot_hash, Density, GameConfig};
use proptest::prelude::*;

fn computer_seats(count: u8) -> Vec<SeatConfig> {
    (0..count).map(|_| SeatConfig::computer()).collect()
}

#[test]
fn identical_seeds_play_identical_games() {
    let config = GameConfig::new(3, 6, Density::Medium);

    let mut first = Game::new_hosted(config, &computer_seats(3), 2024).unwrap();
    let mut second = Game::new_hosted(config, &computer_seats(3), 2024).unwrap();

    let moves_a = first.start();
    let moves_b = second.start();

    assert_eq!(moves_a, moves_b);
    assert_eq!(
        snapshot_hash(&first.snapshot()).unwrap(),
        snapshot_hash(&second.snapshot()).unwrap()
    );
    assert_eq!(
        first.winner().map(|p| p.color),
        second.winner().map(|p| p.color)
    );
}

#[test]
fn replaying_the_move_list_reproduces_the_board() {
    let config = GameConfig::new(3, 6, Density::Sparse);
    let seats = computer_seats(3);

    let mut host = Game::new_hosted(config, &seats, 7).unwrap();
    let dealt = host.snapshot();
    let applied = host.start();
    assert_eq!(host.phase(), Phase::Ended);

    // A non-authoritative copy starts from the dealt board and replays
    // the host's move list in order.
    let mut follower = Game::from_snapshot(config, &seats, &dealt).unwrap();
    assert!(follower.start().is_empty());

    for mv in &applied {
        let (replayed, follow_on) = follower
            .replay(mv.field)
            .unwrap_or_else(|| panic!("move {} was refused", mv.num));
        assert_eq!(replayed.actor, mv.actor);
        assert_eq!(replayed.num, mv.num);
        assert!(follow_on.is_empty());
    }

    assert_eq!(
        snapshot_hash(&follower.snapshot()).unwrap(),
        snapshot_hash(&host.snapshot()).unwrap()
    );
    assert_eq!(
        follower.winner().map(|p| p.color),
        host.winner().map(|p| p.color)
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any seedable game plays to a winner with every cell back under
    /// its overflow bound and ownership fully consistent.
    #[test]
    fn games_terminate_with_consistent_state(
        seed in any::<u64>(),
        size in 4u32..9,
        players in 2u8..5,
        density_pick in 0u8..3,
    ) {
        let density = match density_pick {
            0 => Density::Sparse,
            1 => Density::Medium,
            _ => Density::Dense,
        };
        let config = GameConfig::new(players, size, density);
        prop_assume!(config.validate().is_ok());

        let mut game = Game::new_local(config, &computer_seats(players), seed).unwrap();
        let applied = game.start();

        prop_assert_eq!(game.phase(), Phase::Ended);
        prop_assert!(game.winner().is_some());
        prop_assert_eq!(game.remaining().len(), 1);
        prop_assert!(!applied.is_empty());

        for field in game.board().iter() {
            prop_assert_eq!(field.owner.is_some(), field.value > 0);
            if field.owner.is_some() {
                prop_assert!(field.value <= field.neighbor_count());
            }
        }
        for player in game.players() {
            for &id in &player.fields {
                prop_assert_eq!(game.board().get(id).unwrap().owner, Some(player.color));
            }
            let owned = game
                .board()
                .iter()
                .filter(|f| f.owner == Some(player.color))
                .count();
            prop_assert_eq!(owned, player.fields.len());
        }
    }

    /// Dealt boards respect the density table and the placement bound.
    #[test]
    fn seeded_boards_are_within_placement_bounds(
        seed in any::<u64>(),
        size in 4u32..10,
        players in 2u8..5,
    ) {
        let config = GameConfig::new(players, size, Density::Sparse);
        prop_assume!(config.validate().is_ok());

        let game = Game::new_local(config, &computer_seats(players), seed).unwrap();
        let values = overrun_core::seeding_values(size, Density::Sparse);

        for player in game.players() {
            prop_assert_eq!(player.fields.len(), values.len());
            for &id in &player.fields {
                let field = game.board().get(id).unwrap();
                prop_assert!(field.value < field.neighbor_count());
            }
        }
    }
}
