//! Game state and the per-frame tick.
//!
//! Everything here is deterministic given an `Rng`, so the whole state
//! machine can be driven from tests without a terminal.

use log::{debug, info};
use rand::Rng;

use crate::config::Config;
use crate::geom::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Menu,
    Playing,
    GameOver,
}

/// Feedback a tick asks the host to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Hit,
    Score,
    Celebration,
}

/// What the bird ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Ceiling,
    Ground,
    Pipe,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bird {
    x: f64,
    pub y: f64,
    pub dy: f64,
    width: f64,
    height: f64,
}

impl Bird {
    fn new(cfg: &Config) -> Self {
        Self {
            x: cfg.bird_x,
            y: cfg.screen_height / 2.0,
            dy: 0.0,
            width: cfg.bird_width,
            height: cfg.bird_height,
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// A top and bottom barrier sharing one column, with a gap between them.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    pub x: f64,
    pub gap_center: f64,
    pub scored: bool,
    width: f64,
    gap: f64,
    floor: f64,
}

impl Pipe {
    pub fn new(x: f64, gap_center: f64, cfg: &Config) -> Self {
        Self {
            x,
            gap_center,
            scored: false,
            width: cfg.pipe_width,
            gap: cfg.pipe_gap,
            floor: cfg.screen_height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> Rect {
        let h = (self.gap_center - self.gap / 2.0).max(0.0);
        Rect::new(self.x, 0.0, self.width, h)
    }

    pub fn bottom(&self) -> Rect {
        let y = self.gap_center + self.gap / 2.0;
        Rect::new(self.x, y, self.width, (self.floor - y).max(0.0))
    }
}

pub struct GameState {
    cfg: Config,
    phase: Phase,
    bird: Bird,
    /// Bird `y` at the start of the current tick.
    prev_y: f64,
    pipes: Vec<Pipe>,
    score: u32,
    high_score: u32,
}

impl GameState {
    pub fn new(cfg: Config) -> Self {
        let bird = Bird::new(&cfg);
        Self {
            prev_y: bird.y,
            bird,
            cfg,
            phase: Phase::Menu,
            pipes: Vec::new(),
            score: 0,
            high_score: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn bird(&self) -> &Bird {
        &self.bird
    }

    #[cfg(test)]
    pub(crate) fn bird_mut(&mut self) -> &mut Bird {
        &mut self.bird
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    #[cfg(test)]
    pub(crate) fn pipes_mut(&mut self) -> &mut Vec<Pipe> {
        &mut self.pipes
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// The single player input: start, flap, or restart depending on phase.
    pub fn primary_action<R: Rng>(&mut self, rng: &mut R) {
        match self.phase {
            Phase::Menu | Phase::GameOver => self.start(rng),
            Phase::Playing => self.bird.dy = self.cfg.impulse,
        }
    }

    fn start<R: Rng>(&mut self, rng: &mut R) {
        self.bird = Bird::new(&self.cfg);
        self.prev_y = self.bird.y;
        self.score = 0;
        self.pipes.clear();
        let pipe = self.new_pipe(rng);
        self.pipes.push(pipe);
        self.phase = Phase::Playing;
        info!("run started (best {})", self.high_score);
    }

    fn spawn_x(&self) -> f64 {
        self.cfg.screen_width + self.cfg.spawn_lead
    }

    fn new_pipe<R: Rng>(&self, rng: &mut R) -> Pipe {
        let center = rng.gen_range(self.cfg.gap_center_min..=self.cfg.gap_center_max);
        debug!("spawning pipe with gap center {center}");
        Pipe::new(self.spawn_x(), f64::from(center), &self.cfg)
    }

    /// Advances one frame. Only the Playing phase changes state.
    pub fn tick<R: Rng>(&mut self, rng: &mut R) -> Vec<Cue> {
        let mut cues = Vec::new();
        if self.phase != Phase::Playing {
            return cues;
        }

        self.prev_y = self.bird.y;
        self.bird.dy += self.cfg.gravity;
        self.bird.y += self.bird.dy;

        self.advance_pipes();
        self.spawn_pipes(rng);

        if let Some(hit) = self.check_collision() {
            self.phase = Phase::GameOver;
            self.high_score = self.high_score.max(self.score);
            info!(
                "game over ({hit:?}): score {}, best {}",
                self.score, self.high_score
            );
            cues.push(Cue::Hit);
            cues.push(Cue::Celebration);
            return cues;
        }

        self.update_score(&mut cues);
        cues
    }

    fn advance_pipes(&mut self) {
        for pipe in &mut self.pipes {
            pipe.x -= self.cfg.pipe_speed;
        }
        self.pipes.retain(|p| p.right() > 0.0);
    }

    fn spawn_pipes<R: Rng>(&mut self, rng: &mut R) {
        if self.cfg.pipe_spacing <= 0.0 {
            return;
        }
        let threshold = self.spawn_x() - self.cfg.pipe_spacing;
        let due = self.pipes.last().is_none_or(|p| p.x <= threshold);
        if due {
            let pipe = self.new_pipe(rng);
            self.pipes.push(pipe);
        }
    }

    /// Returns the first thing the bird is touching, if any.
    ///
    /// Screen bounds are tested against the span the bird swept this tick,
    /// so a bird that starts a tick on the boundary counts as a hit.
    pub fn check_collision(&self) -> Option<Hit> {
        let top = self.prev_y.min(self.bird.y);
        let bottom = self.prev_y.max(self.bird.y) + self.bird.height;
        if top <= 0.0 {
            return Some(Hit::Ceiling);
        }
        if bottom >= self.cfg.screen_height {
            return Some(Hit::Ground);
        }

        let bird = self.bird.rect();
        self.pipes
            .iter()
            .any(|p| bird.overlaps(&p.top()) || bird.overlaps(&p.bottom()))
            .then_some(Hit::Pipe)
    }

    fn update_score(&mut self, cues: &mut Vec<Cue>) {
        for pipe in &mut self.pipes {
            if !pipe.scored && pipe.right() < self.bird.x {
                pipe.scored = true;
                self.score += 1;
                debug!("scored, now {}", self.score);
                cues.push(Cue::Score);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn playing(cfg: Config) -> (GameState, StdRng) {
        let mut rng = rng();
        let mut game = GameState::new(cfg);
        game.primary_action(&mut rng);
        (game, rng)
    }

    fn single_shot() -> Config {
        Config {
            pipe_spacing: 0.0,
            ..Config::default()
        }
    }

    /// Keeps the bird at its start height for the next tick.
    fn hover(game: &mut GameState) {
        let gravity = game.cfg.gravity;
        let bird = game.bird_mut();
        bird.y = 350.0;
        bird.dy = -gravity;
    }

    #[test]
    fn test_starts_in_menu() {
        let game = GameState::new(Config::default());
        assert_eq!(game.phase(), Phase::Menu);
        assert!(game.pipes().is_empty());
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_menu_tick_is_inert() {
        let mut game = GameState::new(Config::default());
        let cues = game.tick(&mut rng());
        assert!(cues.is_empty());
        assert_eq!(game.bird().y, 350.0);
        assert_eq!(game.phase(), Phase::Menu);
    }

    #[test]
    fn test_primary_action_starts_run() {
        let (game, _) = playing(Config::default());
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.pipes().len(), 1);
        assert_eq!(game.bird().x(), 50.0);
        assert_eq!(game.bird().y, 350.0);
        assert_eq!(game.bird().dy, 0.0);
    }

    #[test]
    fn test_first_pipe_spawns_off_right_edge() {
        let (game, _) = playing(Config::default());
        let pipe = &game.pipes()[0];
        assert_eq!(pipe.x, 500.0);
        assert!((200.0..=400.0).contains(&pipe.gap_center));
        assert_eq!(pipe.gap_center.fract(), 0.0);
        assert!(!pipe.scored);
    }

    #[test]
    fn test_pipe_rectangles() {
        let pipe = Pipe::new(100.0, 300.0, &Config::default());
        assert_eq!(pipe.top(), Rect::new(100.0, 0.0, 120.0, 210.0));
        assert_eq!(pipe.bottom(), Rect::new(100.0, 390.0, 120.0, 310.0));
    }

    #[test]
    fn test_gravity_accumulates() {
        let (mut game, mut rng) = playing(Config::default());
        let mut last_dy = game.bird().dy;
        for _ in 0..10 {
            game.tick(&mut rng);
            assert_eq!(game.bird().dy, last_dy + 0.25);
            last_dy = game.bird().dy;
        }
        assert_eq!(game.bird().y, 350.0 + 0.25 * 55.0);
    }

    #[test]
    fn test_flap_overrides_velocity() {
        let (mut game, mut rng) = playing(Config::default());
        game.bird_mut().dy = 3.5;
        game.primary_action(&mut rng);
        assert_eq!(game.bird().dy, -7.0);
        game.bird_mut().dy = -20.0;
        game.primary_action(&mut rng);
        assert_eq!(game.bird().dy, -7.0);
        assert_eq!(game.phase(), Phase::Playing);
    }

    #[test]
    fn test_bird_x_is_fixed() {
        let (mut game, mut rng) = playing(Config::default());
        for _ in 0..20 {
            game.primary_action(&mut rng);
            game.tick(&mut rng);
        }
        assert_eq!(game.bird().x(), 50.0);
    }

    #[test]
    fn test_ceiling_ends_run() {
        let (mut game, mut rng) = playing(Config::default());
        game.score = 3;
        game.high_score = 1;
        game.bird_mut().y = 0.0;
        game.bird_mut().dy = 0.0;

        let cues = game.tick(&mut rng);

        assert_eq!(game.check_collision(), Some(Hit::Ceiling));
        assert_eq!(game.phase(), Phase::GameOver);
        assert_eq!(game.high_score(), 3);
        assert_eq!(cues, vec![Cue::Hit, Cue::Celebration]);
    }

    #[test]
    fn test_ground_ends_run() {
        let (mut game, mut rng) = playing(Config::default());
        game.bird_mut().y = 660.0;
        game.tick(&mut rng);
        assert_eq!(game.phase(), Phase::GameOver);
        assert_eq!(game.check_collision(), Some(Hit::Ground));
    }

    #[test]
    fn test_high_score_keeps_maximum() {
        let (mut game, mut rng) = playing(Config::default());
        game.high_score = 9;
        game.score = 4;
        game.bird_mut().y = 0.0;
        game.tick(&mut rng);
        assert_eq!(game.high_score(), 9);
    }

    #[test]
    fn test_pipe_collision() {
        let (mut game, _) = playing(single_shot());
        // Gap 410..590, bird box 350..395 sits in the top barrier.
        game.pipes_mut()[0] = Pipe::new(60.0, 500.0, &game.cfg);
        assert_eq!(game.check_collision(), Some(Hit::Pipe));
    }

    #[test]
    fn test_no_collision_inside_gap() {
        let (mut game, _) = playing(single_shot());
        // Gap 282.5..462.5 contains the bird box 350..395.
        game.pipes_mut()[0] = Pipe::new(60.0, 372.5, &game.cfg);
        assert_eq!(game.check_collision(), None);
    }

    #[test]
    fn test_bottom_edge_of_bird_hits_bottom_barrier() {
        let (mut game, _) = playing(single_shot());
        // Bottom barrier starts at 380; bird spans 350..395.
        game.pipes_mut()[0] = Pipe::new(60.0, 290.0, &game.cfg);
        assert_eq!(game.check_collision(), Some(Hit::Pipe));
    }

    #[test]
    fn test_pipe_scores_once() {
        let (mut game, mut rng) = playing(single_shot());
        game.pipes_mut()[0] = Pipe::new(-69.0, 372.5, &game.cfg);

        hover(&mut game);
        let cues = game.tick(&mut rng);
        assert_eq!(cues, vec![Cue::Score]);
        assert_eq!(game.score(), 1);
        assert!(game.pipes()[0].scored);

        for _ in 0..5 {
            hover(&mut game);
            assert!(game.tick(&mut rng).is_empty());
        }
        assert_eq!(game.score(), 1);
    }

    #[test]
    fn test_pipe_not_scored_while_overlapping_bird() {
        let (mut game, mut rng) = playing(single_shot());
        // Trailing edge lands exactly on bird.x after one tick.
        game.pipes_mut()[0] = Pipe::new(-64.0, 372.5, &game.cfg);
        hover(&mut game);
        game.tick(&mut rng);
        assert_eq!(game.score(), 0);
        hover(&mut game);
        game.tick(&mut rng);
        assert_eq!(game.score(), 1);
    }

    #[test]
    fn test_pipe_pruned_once_fully_off_screen() {
        let (mut game, mut rng) = playing(single_shot());
        game.pipes_mut()[0] = Pipe::new(-114.0, 372.5, &game.cfg);
        hover(&mut game);
        game.tick(&mut rng);
        assert!(game.pipes().is_empty());
    }

    #[test]
    fn test_pipe_kept_while_partly_visible() {
        let (mut game, mut rng) = playing(single_shot());
        game.pipes_mut()[0] = Pipe::new(-113.0, 372.5, &game.cfg);
        hover(&mut game);
        game.tick(&mut rng);
        assert_eq!(game.pipes().len(), 1);
        assert_eq!(game.pipes()[0].right(), 1.0);
    }

    #[test]
    fn test_single_shot_never_respawns() {
        let (mut game, mut rng) = playing(single_shot());
        game.pipes_mut()[0].gap_center = 372.5;
        for _ in 0..150 {
            hover(&mut game);
            game.tick(&mut rng);
            assert!(game.pipes().len() <= 1);
        }
        assert_eq!(game.phase(), Phase::Playing);
        assert!(game.pipes().is_empty());
        assert_eq!(game.score(), 1);
    }

    #[test]
    fn test_distance_spawning() {
        let (mut game, mut rng) = playing(Config::default());
        for _ in 0..44 {
            game.tick(&mut rng);
        }
        assert_eq!(game.pipes().len(), 1);
        game.tick(&mut rng);
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.pipes().len(), 2);
        assert_eq!(game.pipes()[0].x, 230.0);
        assert_eq!(game.pipes()[1].x, 500.0);
    }

    #[test]
    fn test_game_over_is_inert_until_input() {
        let (mut game, mut rng) = playing(Config::default());
        game.bird_mut().y = 0.0;
        game.tick(&mut rng);
        let y = game.bird().y;
        for _ in 0..3 {
            assert!(game.tick(&mut rng).is_empty());
        }
        assert_eq!(game.bird().y, y);
        assert_eq!(game.phase(), Phase::GameOver);
    }

    #[test]
    fn test_restart_resets_run() {
        let (mut game, mut rng) = playing(Config::default());
        game.score = 5;
        game.bird_mut().y = 0.0;
        game.bird_mut().dy = -3.0;
        game.tick(&mut rng);
        assert_eq!(game.phase(), Phase::GameOver);

        game.primary_action(&mut rng);

        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.score(), 0);
        assert_eq!(game.high_score(), 5);
        assert_eq!(game.bird().y, 350.0);
        assert_eq!(game.bird().dy, 0.0);
        assert_eq!(game.pipes().len(), 1);
        assert_eq!(game.pipes()[0].x, 500.0);
    }
}
