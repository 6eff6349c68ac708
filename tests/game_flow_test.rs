//! Drives whole runs through the public API: input, ticks, cues and rendering.

use flappy_term::pixels::Screen;
use flappy_term::render::render;
use flappy_term::{Config, Cue, GameState, Phase};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Flaps just before the bird's box would sink into the next bottom barrier.
fn autopilot(game: &mut GameState, rng: &mut StdRng) {
    let bird = game.bird().rect();
    let floor = game
        .pipes()
        .iter()
        .find(|p| p.right() >= bird.x)
        .map_or(650.0, |p| p.bottom().y);
    if bird.bottom() + game.bird().dy >= floor - 5.0 {
        game.primary_action(rng);
    }
}

/// Stops flapping and ticks until the bird crashes, returning every cue.
fn crash(game: &mut GameState, rng: &mut StdRng) -> Vec<Cue> {
    let mut cues = Vec::new();
    for _ in 0..200 {
        if game.phase() == Phase::GameOver {
            break;
        }
        cues.extend(game.tick(rng));
    }
    cues
}

#[test]
fn test_full_run_scores_and_restarts() {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut game = GameState::new(Config::default());
    assert_eq!(game.phase(), Phase::Menu);

    game.primary_action(&mut rng);
    assert_eq!(game.phase(), Phase::Playing);
    assert_eq!(game.pipes().len(), 1);

    let mut score_cues = 0;
    for _ in 0..600 {
        autopilot(&mut game, &mut rng);
        let before = game.score();
        let cues = game.tick(&mut rng);
        score_cues += cues.iter().filter(|c| **c == Cue::Score).count() as u32;
        assert!(game.score() >= before);
        assert!(game.score() - before <= 1);
        if game.phase() == Phase::GameOver {
            break;
        }
    }
    assert_eq!(score_cues, game.score());
    assert!(game.score() > 0, "autopilot should clear at least one pipe");

    crash(&mut game, &mut rng);
    assert_eq!(game.phase(), Phase::GameOver);
    let best = game.high_score();
    assert!(best >= score_cues);

    game.primary_action(&mut rng);
    assert_eq!(game.phase(), Phase::Playing);
    assert_eq!(game.score(), 0);
    assert_eq!(game.high_score(), best);
    assert_eq!(game.pipes().len(), 1);
}

#[test]
fn test_celebration_plays_once_per_game_over() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut game = GameState::new(Config::default());
    game.primary_action(&mut rng);

    let mut cues = crash(&mut game, &mut rng);
    assert_eq!(game.phase(), Phase::GameOver);
    for _ in 0..30 {
        cues.extend(game.tick(&mut rng));
    }
    assert_eq!(cues, vec![Cue::Hit, Cue::Celebration]);
}

#[test]
fn test_pipes_leave_in_spawn_order() {
    let mut rng = StdRng::seed_from_u64(11);
    // Every gap spans 50..650, so the autopilot never touches a barrier.
    let cfg = Config {
        pipe_gap: 600.0,
        gap_center_min: 350,
        gap_center_max: 350,
        ..Config::default()
    };
    let mut game = GameState::new(cfg);
    game.primary_action(&mut rng);
    for _ in 0..240 {
        autopilot(&mut game, &mut rng);
        game.tick(&mut rng);
        let xs: Vec<f64> = game.pipes().iter().map(|p| p.x).collect();
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
        assert!(game.pipes().iter().all(|p| p.right() > 0.0));
    }
    assert_eq!(game.phase(), Phase::Playing);
    assert!(game.score() >= 3);
}

#[test]
fn test_every_phase_renders_to_terminal() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut game = GameState::new(Config::default());
    let mut screen = Screen::new(80, 30, 450.0, 700.0);

    for step in 0..3 {
        render(&game, &mut screen);
        let mut out = Vec::new();
        screen.present(&mut out).unwrap();
        assert!(!out.is_empty(), "empty frame at step {step}");

        match game.phase() {
            Phase::Menu => game.primary_action(&mut rng),
            Phase::Playing => {
                crash(&mut game, &mut rng);
            }
            Phase::GameOver => {}
        }
    }
    assert_eq!(game.phase(), Phase::GameOver);
}
