//! End-to-end checks of the tick dynamics on small hand-built caves.
//!
//! Maps are written as hidden cell ids: 0 agent, 1 empty, 2 dirt, 3 stone,
//! 5 diamond, 7/8 exit, 10 firefly up, 14 butterfly up, 18 brick, 19 steel,
//! 20 magic wall, 23 blob, 27/29 red gate/key, 39 nut, 41 bomb, 46 orange
//! right.

use engine::{GameState, Params, RewardFlags};
use glam::ivec2;
use pretty_assertions::assert_eq;
use quickcheck_macros::quickcheck;
use world::{Action, Element, Heading, KeyColor};

fn map(max_steps: i64, gems: u32, rows: &[&[i64]]) -> String {
    let cols = rows[0].len();
    let mut s = format!("{},{},{},{}", cols, rows.len(), max_steps, gems);
    for row in rows {
        assert_eq!(row.len(), cols);
        s.push('\n');
        let line: Vec<String> = row.iter().map(|i| i.to_string()).collect();
        s.push_str(&line.join(","));
    }
    s
}

fn state(max_steps: i64, gems: u32, rows: &[&[i64]]) -> GameState {
    GameState::new(&map(max_steps, gems, rows), &Params::default()).unwrap()
}

#[test]
fn stone_falls_and_lands() {
    let mut s = state(
        100,
        0,
        &[
            &[19, 19, 19, 19, 19],
            &[19, 0, 3, 1, 19],
            &[19, 1, 1, 1, 19],
            &[19, 1, 1, 1, 19],
            &[19, 1, 1, 1, 19],
            &[19, 19, 18, 19, 19],
        ],
    );
    let id = s.board().id(ivec2(2, 1));

    s.apply_action(Action::None);
    assert_eq!(s.board().element(ivec2(2, 2)), Element::StoneFalling);
    s.apply_action(Action::None);
    assert_eq!(s.board().element(ivec2(2, 3)), Element::StoneFalling);
    s.apply_action(Action::None);
    assert_eq!(s.board().element(ivec2(2, 4)), Element::StoneFalling);
    s.apply_action(Action::None);
    assert_eq!(s.board().element(ivec2(2, 4)), Element::Stone);
    // The stone kept its identity through the whole drop.
    assert_eq!(s.board().id(ivec2(2, 4)), id);
}

#[test]
fn stone_rolls_off_a_rounded_pile() {
    // Stone on a stone, empty space to both sides; it rolls left first.
    let mut s = state(
        100,
        0,
        &[
            &[19, 19, 19, 19, 19],
            &[19, 1, 3, 1, 19],
            &[19, 1, 3, 1, 19],
            &[19, 19, 19, 19, 19],
            &[19, 0, 1, 1, 19],
            &[19, 19, 19, 19, 19],
        ],
    );
    s.apply_action(Action::None);
    assert_eq!(s.board().element(ivec2(2, 1)), Element::Empty);
    assert_eq!(s.board().element(ivec2(1, 1)), Element::StoneFalling);
    assert_eq!(s.board().element(ivec2(2, 2)), Element::Stone);
}

#[test]
fn magic_wall_transmutes_a_stone() {
    let mut s = state(
        100,
        0,
        &[
            &[19, 19, 19, 19, 19],
            &[19, 0, 3, 1, 19],
            &[19, 1, 1, 1, 19],
            &[19, 19, 20, 19, 19],
            &[19, 1, 1, 1, 19],
            &[19, 19, 18, 19, 19],
        ],
    );
    s.apply_action(Action::None);
    assert_eq!(s.board().element(ivec2(2, 2)), Element::StoneFalling);

    s.apply_action(Action::None);
    // The stone is consumed above the wall and a falling diamond appears
    // below it; the wall switches on.
    assert_eq!(s.board().element(ivec2(2, 2)), Element::Empty);
    assert_eq!(s.board().element(ivec2(2, 3)), Element::WallMagicOn);
    assert_eq!(s.board().element(ivec2(2, 4)), Element::DiamondFalling);

    s.apply_action(Action::None);
    assert_eq!(s.board().element(ivec2(2, 4)), Element::Diamond);
    assert_eq!(s.board().element(ivec2(2, 3)), Element::WallMagicOn);
}

#[test]
fn blocked_magic_wall_acts_as_plain_wall() {
    // No empty cell below the wall, so nothing passes through and the wall
    // stays dormant.
    let mut s = state(
        100,
        0,
        &[
            &[19, 19, 19, 19, 19],
            &[19, 0, 3, 1, 19],
            &[19, 1, 1, 1, 19],
            &[19, 19, 20, 19, 19],
            &[19, 19, 18, 19, 19],
        ],
    );
    s.apply_action(Action::None);
    s.apply_action(Action::None);
    assert_eq!(s.board().element(ivec2(2, 2)), Element::Stone);
    assert_eq!(s.board().element(ivec2(2, 3)), Element::WallMagicDormant);
}

#[test]
fn key_opens_every_gate_of_its_color() {
    let mut s = state(
        100,
        0,
        &[
            &[19, 19, 19, 19, 19, 19, 19],
            &[19, 1, 1, 1, 1, 1, 19],
            &[19, 0, 2, 29, 1, 27, 19],
            &[19, 1, 1, 1, 1, 27, 19],
            &[19, 19, 19, 19, 19, 19, 19],
        ],
    );
    s.apply_action(Action::Right);
    assert_eq!(
        s.board().element(ivec2(5, 2)),
        Element::GateClosed(KeyColor::Red)
    );

    s.apply_action(Action::Right);
    assert!(s.reward_signal().contains(RewardFlags::COLLECT_KEY));
    assert_eq!(s.gems_collected(), 0);
    assert_eq!(
        s.board().element(ivec2(5, 2)),
        Element::GateOpen(KeyColor::Red)
    );
    assert_eq!(
        s.board().element(ivec2(5, 3)),
        Element::GateOpen(KeyColor::Red)
    );
}

#[test]
fn agent_teleports_through_an_open_gate() {
    let mut s = state(
        100,
        0,
        &[
            &[19, 19, 19, 19, 19],
            &[19, 0, 28, 1, 19],
            &[19, 19, 19, 19, 19],
        ],
    );
    let agent_id = s.board().id(ivec2(1, 1));
    s.apply_action(Action::Right);
    assert!(s.reward_signal().contains(RewardFlags::WALK_THROUGH_GATE));
    assert_eq!(s.board().element(ivec2(1, 1)), Element::Empty);
    assert_eq!(
        s.board().element(ivec2(2, 1)),
        Element::GateOpen(KeyColor::Red)
    );
    assert_eq!(s.board().element(ivec2(3, 1)), Element::Agent);
    assert_eq!(s.board().id(ivec2(3, 1)), agent_id);
}

#[test]
fn gate_with_a_blocked_far_side_stays_shut() {
    let mut s = state(
        100,
        0,
        &[
            &[19, 19, 19, 19, 19],
            &[19, 0, 28, 18, 19],
            &[19, 19, 19, 19, 19],
        ],
    );
    s.apply_action(Action::Right);
    assert!(s.reward_signal().is_empty());
    assert_eq!(s.board().element(ivec2(1, 1)), Element::Agent);
}

#[test]
fn bomb_chain_explosion_and_cleanup() {
    let mut s = state(
        100,
        0,
        &[
            &[19, 19, 19, 19, 19],
            &[19, 0, 3, 1, 19],
            &[19, 1, 1, 1, 19],
            &[19, 2, 41, 2, 19],
            &[19, 2, 41, 2, 19],
            &[19, 19, 19, 19, 19],
        ],
    );
    s.apply_action(Action::None);
    assert_eq!(s.board().element(ivec2(2, 2)), Element::StoneFalling);

    s.apply_action(Action::None);
    // The falling stone sets off the first bomb, which chains into the one
    // below; everything consumable in the blast turns into explosions.
    for pos in [
        ivec2(2, 3),
        ivec2(2, 4),
        ivec2(2, 2),
        ivec2(1, 3),
        ivec2(3, 3),
        ivec2(1, 4),
        ivec2(3, 4),
        ivec2(1, 2),
        ivec2(3, 2),
    ] {
        assert_eq!(s.board().element(pos), Element::ExplosionEmpty);
    }
    assert!(!s.is_terminal());

    s.apply_action(Action::None);
    for pos in [ivec2(2, 3), ivec2(2, 4), ivec2(2, 2)] {
        assert_eq!(s.board().element(pos), Element::Empty);
    }
}

#[test]
fn falling_stone_cracks_a_nut() {
    let mut s = state(
        100,
        0,
        &[
            &[19, 19, 19, 19, 19],
            &[19, 0, 3, 1, 19],
            &[19, 19, 1, 19, 19],
            &[19, 19, 39, 19, 19],
            &[19, 19, 19, 19, 19],
        ],
    );
    s.apply_action(Action::None);
    assert_eq!(s.board().element(ivec2(2, 2)), Element::StoneFalling);

    s.apply_action(Action::None);
    assert!(s.reward_signal().contains(RewardFlags::NUT_TO_DIAMOND));
    assert_eq!(s.board().element(ivec2(2, 3)), Element::Diamond);
    assert_eq!(s.board().element(ivec2(2, 2)), Element::StoneFalling);

    s.apply_action(Action::None);
    // Resting on the fresh diamond, the stone settles.
    assert_eq!(s.board().element(ivec2(2, 2)), Element::Stone);
}

#[test]
fn crushed_butterfly_yields_diamonds() {
    let mut s = state(
        100,
        0,
        &[
            &[19, 19, 19, 19, 19, 19],
            &[19, 0, 1, 3, 1, 19],
            &[19, 2, 2, 1, 2, 19],
            &[19, 2, 2, 14, 2, 19],
            &[19, 2, 2, 2, 2, 19],
            &[19, 19, 19, 19, 19, 19],
        ],
    );
    s.apply_action(Action::None);
    s.apply_action(Action::None);
    assert_eq!(s.board().element(ivec2(3, 3)), Element::ExplosionDiamond);

    s.apply_action(Action::None);
    assert!(s
        .reward_signal()
        .contains(RewardFlags::BUTTERFLY_TO_DIAMOND));
    assert_eq!(s.board().element(ivec2(3, 3)), Element::Diamond);
    assert_eq!(s.board().element(ivec2(2, 3)), Element::Diamond);
}

#[test]
fn falling_diamond_does_not_set_off_bombs() {
    let mut s = state(
        100,
        0,
        &[
            &[19, 19, 19, 19, 19],
            &[19, 0, 5, 1, 19],
            &[19, 19, 1, 19, 19],
            &[19, 19, 41, 19, 19],
            &[19, 19, 19, 19, 19],
        ],
    );
    s.apply_action(Action::None);
    s.apply_action(Action::None);
    assert_eq!(s.board().element(ivec2(2, 2)), Element::Diamond);
    assert_eq!(s.board().element(ivec2(2, 3)), Element::Bomb);
}

#[test]
fn pushing_a_stone_into_empty_space() {
    let mut s = state(
        100,
        0,
        &[
            &[19, 19, 19, 19, 19],
            &[19, 0, 3, 1, 19],
            &[19, 2, 2, 2, 19],
            &[19, 19, 19, 19, 19],
        ],
    );
    let stone_id = s.board().id(ivec2(2, 1));
    s.apply_action(Action::Right);
    assert_eq!(s.board().element(ivec2(2, 1)), Element::Agent);
    // Dirt below the far cell, so the stone arrives stationary.
    assert_eq!(s.board().element(ivec2(3, 1)), Element::Stone);
    assert_eq!(s.board().id(ivec2(3, 1)), stone_id);
}

#[test]
fn pushed_stone_with_a_drop_arrives_falling() {
    let mut s = state(
        100,
        0,
        &[
            &[19, 19, 19, 19, 19],
            &[19, 0, 3, 1, 19],
            &[19, 2, 2, 1, 19],
            &[19, 19, 19, 19, 19],
        ],
    );
    s.apply_action(Action::Right);
    assert_eq!(s.board().element(ivec2(3, 1)), Element::StoneFalling);
}

#[test]
fn pushing_against_a_wall_is_a_noop() {
    let mut s = state(
        100,
        0,
        &[
            &[19, 19, 19, 19, 19],
            &[19, 0, 3, 19, 19],
            &[19, 19, 19, 19, 19],
        ],
    );
    let before = s.observation();
    s.apply_action(Action::Right);
    assert_eq!(s.observation(), before);
    assert_eq!(s.board().element(ivec2(1, 1)), Element::Agent);
    assert_eq!(s.board().element(ivec2(2, 1)), Element::Stone);
}

#[test]
fn walking_into_steel_is_a_noop() {
    let mut s = state(
        100,
        0,
        &[&[19, 19, 19], &[19, 0, 19], &[19, 19, 19]],
    );
    for a in [Action::Up, Action::Right, Action::Down, Action::Left] {
        s.apply_action(a);
        assert_eq!(s.board().element(ivec2(1, 1)), Element::Agent);
    }
}

#[test]
fn boxed_in_firefly_spins_in_place() {
    let mut s = state(
        100,
        0,
        &[
            &[19, 19, 19, 19, 19],
            &[19, 10, 19, 1, 19],
            &[19, 19, 19, 0, 19],
            &[19, 19, 19, 19, 19],
        ],
    );
    s.apply_action(Action::None);
    assert_eq!(
        s.board().element(ivec2(1, 1)),
        Element::Firefly(Heading::Right)
    );
    s.apply_action(Action::None);
    assert_eq!(
        s.board().element(ivec2(1, 1)),
        Element::Firefly(Heading::Down)
    );
    s.apply_action(Action::None);
    assert_eq!(
        s.board().element(ivec2(1, 1)),
        Element::Firefly(Heading::Left)
    );
}

#[test]
fn grounded_bomb_explodes_after_one_fall() {
    let mut s = state(
        100,
        0,
        &[
            &[19, 19, 19, 19, 19, 19],
            &[19, 1, 41, 1, 0, 19],
            &[19, 19, 1, 19, 1, 19],
            &[19, 19, 18, 19, 19, 19],
        ],
    );
    s.apply_action(Action::None);
    assert_eq!(s.board().element(ivec2(2, 2)), Element::BombFalling);

    s.apply_action(Action::None);
    assert_eq!(s.board().element(ivec2(2, 2)), Element::ExplosionEmpty);
    // The brick under it was consumed by the blast.
    assert_eq!(s.board().element(ivec2(2, 3)), Element::ExplosionEmpty);
    assert!(!s.is_terminal());
}

#[test]
fn cornered_orange_blows_up_next_to_the_agent() {
    let mut s = state(
        100,
        0,
        &[
            &[19, 19, 19, 19],
            &[19, 46, 19, 19],
            &[19, 0, 1, 19],
            &[19, 19, 19, 19],
        ],
    );
    s.apply_action(Action::None);
    assert!(s.reward_signal().contains(RewardFlags::AGENT_DIES));
    assert!(s.is_terminal());
    assert!(!s.is_solution());
    assert_eq!(s.legal_actions(), Vec::<Action>::new());
}

#[test]
fn enclosed_blob_collapses_into_a_diamond() {
    let mut s = state(
        100,
        0,
        &[
            &[19, 19, 19, 19, 19],
            &[19, 23, 19, 0, 19],
            &[19, 19, 19, 19, 19],
        ],
    );
    s.apply_action(Action::None);
    assert_eq!(s.board().element(ivec2(1, 1)), Element::Blob);
    s.apply_action(Action::None);
    assert_eq!(s.board().element(ivec2(1, 1)), Element::Diamond);
}

#[test]
fn oversized_blob_collapses_into_stones() {
    let params = Params {
        blob_max_percentage: 0.0,
        blob_chance: 0,
        ..Params::default()
    };
    let text = map(
        100,
        0,
        &[
            &[19, 19, 19, 19, 19],
            &[19, 23, 2, 0, 19],
            &[19, 19, 19, 19, 19],
        ],
    );
    let mut s = GameState::new(&text, &params).unwrap();
    // The dirt neighbor keeps the blob from reading as enclosed, and the
    // zero size budget marks it oversized at end of scan.
    s.apply_action(Action::None);
    assert_eq!(s.board().element(ivec2(1, 1)), Element::Blob);
    s.apply_action(Action::None);
    assert_eq!(s.board().element(ivec2(1, 1)), Element::Stone);
}

// Busy cave used by the property tests: stones, diamonds, a bomb, a nut, a
// blob, an orange, a firefly, a butterfly, and a magic wall.
const BUSY: &[&[i64]] = &[
    &[19, 19, 19, 19, 19, 19, 19, 19],
    &[19, 0, 2, 3, 5, 2, 41, 19],
    &[19, 2, 23, 2, 3, 1, 39, 19],
    &[19, 1, 43, 2, 20, 1, 2, 19],
    &[19, 5, 2, 13, 2, 2, 1, 19],
    &[19, 3, 1, 2, 14, 2, 2, 19],
    &[19, 2, 2, 2, 2, 2, 2, 19],
    &[19, 19, 19, 19, 19, 19, 19, 19],
];

fn actions(seq: &[u8]) -> Vec<Action> {
    seq.iter()
        .take(40)
        .map(|&b| Action::try_from(b as usize % 5).unwrap())
        .collect()
}

#[quickcheck]
fn same_seed_same_trajectory(seq: Vec<u8>) -> bool {
    let text = map(1000, 2, BUSY);
    let params = Params {
        rng_seed: 7,
        ..Params::default()
    };
    let mut a = GameState::new(&text, &params).unwrap();
    let mut b = GameState::new(&text, &params).unwrap();
    for action in actions(&seq) {
        a.apply_action(action);
        b.apply_action(action);
        if a.observation() != b.observation() || a.digest() != b.digest() {
            return false;
        }
    }
    true
}

#[quickcheck]
fn gems_collected_never_decreases(seq: Vec<u8>) -> bool {
    let text = map(1000, 2, BUSY);
    let mut s = GameState::new(&text, &Params::default()).unwrap();
    let mut gems = 0;
    for action in actions(&seq) {
        s.apply_action(action);
        if s.gems_collected() < gems {
            return false;
        }
        gems = s.gems_collected();
    }
    true
}

#[quickcheck]
fn exactly_one_channel_per_cell(seq: Vec<u8>) -> bool {
    let text = map(1000, 2, BUSY);
    let mut s = GameState::new(&text, &Params::default()).unwrap();
    for action in actions(&seq) {
        s.apply_action(action);
    }
    let obs = s.observation();
    let (channels, rows, cols) = obs.shape();
    for r in 0..rows {
        for c in 0..cols {
            let set = (0..channels)
                .filter(|&ch| obs.get(ch, r, c) != 0.0)
                .count();
            if set != 1 {
                return false;
            }
        }
    }
    true
}

#[quickcheck]
fn live_ids_stay_unique(seq: Vec<u8>) -> bool {
    let text = map(1000, 2, BUSY);
    let params = Params {
        obs_show_ids: true,
        ..Params::default()
    };
    let mut s = GameState::new(&text, &params).unwrap();
    for action in actions(&seq) {
        s.apply_action(action);
    }
    let mut ids = Vec::new();
    for pos in s.board().scan_order() {
        let cell = s.board().cell(pos);
        if !cell.kind.is_background() {
            ids.push(cell.id);
        }
    }
    let count = ids.len();
    ids.sort_unstable();
    ids.dedup();
    ids.len() == count
}
