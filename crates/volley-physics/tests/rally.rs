//! Long-running properties of the simulation, driven by seeded RNGs.

use rand::SeedableRng;
use rand::rngs::StdRng;
use volley_physics::{Ball, PhysicsConfig, Score, Slot, advance, serve};

fn run<F>(seed: u64, ticks: usize, paddles: [f64; 2], mut check: F)
where
    F: FnMut(&Ball, &Ball, &Score, &Score, Option<Slot>),
{
    let cfg = PhysicsConfig::default();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut ball = serve(&cfg, &mut rng);
    let mut score = Score::default();

    for _ in 0..ticks {
        let before = ball;
        let score_before = score;
        let events = advance(&mut ball, paddles, &mut score, &cfg, &mut rng);
        check(&before, &ball, &score_before, &score, events.scored);
        if events.winner.is_some() {
            score = Score::default();
        }
    }
}

#[test]
fn test_advance_top_wall_scenario() {
    let cfg = PhysicsConfig::default();
    let mut rng = StdRng::seed_from_u64(3);
    let mut ball = Ball { x: 400.0, y: 0.0, vx: 4.0, vy: -0.1 };
    let mut score = Score::default();

    advance(&mut ball, [300.0, 300.0], &mut score, &cfg, &mut rng);

    assert!(ball.vy > 0.0);
    assert_eq!(ball.y, 0.0);
}

#[test]
fn test_advance_speed_stays_in_range_for_many_seeds() {
    let cfg = PhysicsConfig::default();
    for seed in 0..20 {
        run(seed, 3_000, [300.0, 300.0], |_, after, _, _, _| {
            for v in [after.vx, after.vy] {
                assert!(
                    v.abs() >= cfg.min_speed && v.abs() <= cfg.max_speed,
                    "seed {seed}: speed {v} out of range"
                );
            }
        });
    }
}

#[test]
fn test_advance_scores_only_when_ball_leaves_court() {
    let cfg = PhysicsConfig::default();
    for seed in 0..20 {
        run(seed, 3_000, [300.0, 300.0], |before, after, s0, s1, scored| {
            let crossed_left = before.x + before.vx < 0.0;
            let crossed_right = before.x + before.vx > cfg.field_width;
            match scored {
                Some(Slot::Two) => {
                    assert!(crossed_left, "seed {seed}: slot two scored without a left exit");
                    assert_eq!(s1.slot2, s0.slot2 + 1);
                }
                Some(Slot::One) => {
                    assert!(crossed_right, "seed {seed}: slot one scored without a right exit");
                    assert_eq!(s1.slot1, s0.slot1 + 1);
                }
                None => {
                    assert!(after.x >= 0.0 && after.x <= cfg.field_width);
                    assert_eq!(s0, s1);
                }
            }
            if scored.is_some() {
                assert_eq!(after.x, cfg.field_width / 2.0);
                assert_eq!(after.y, cfg.field_height / 2.0);
            }
        });
    }
}

#[test]
fn test_advance_same_seed_replays_identically() {
    let cfg = PhysicsConfig::default();
    let play = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut ball = serve(&cfg, &mut rng);
        let mut score = Score::default();
        for _ in 0..1_000 {
            advance(&mut ball, [250.0, 350.0], &mut score, &cfg, &mut rng);
        }
        (ball, score)
    };
    assert_eq!(play(11), play(11));
}
