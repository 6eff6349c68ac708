//! Phase-driven draw pass over an abstract surface.

use crate::game::{GameState, Phase};
use crate::geom::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }
}

pub const BLACK: Rgb = Rgb(0, 0, 0);
pub const WHITE: Rgb = Rgb(255, 255, 255);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sprite {
    Background,
    Bird,
    /// Upper barrier; its cap faces down into the gap.
    PipeTop,
    /// Lower barrier; its cap faces up into the gap.
    PipeBottom,
}

/// Minimal 2D drawing API in world coordinates.
pub trait Surface {
    fn clear(&mut self, area: Rect);
    fn fill_rect(&mut self, area: Rect, color: Rgb);
    /// Draws `sprite` stretched to cover `area`.
    fn draw_sprite(&mut self, sprite: Sprite, area: Rect);
    /// Draws `text` horizontally centered on `cx` with its baseline at `y`.
    fn draw_text(&mut self, text: &str, cx: f64, y: f64, size: f64, color: Rgb);
}

pub fn render<S: Surface>(game: &GameState, surface: &mut S) {
    let cfg = game.config();
    let (w, h) = (cfg.screen_width, cfg.screen_height);
    let screen = Rect::new(0.0, 0.0, w, h);
    let font = cfg.font_size;

    surface.clear(screen);
    surface.draw_sprite(Sprite::Background, screen);

    match game.phase() {
        Phase::Menu => {
            surface.fill_rect(screen, BLACK);
            surface.draw_text("FLAPPY", w / 2.0, h / 2.0 - 100.0, font, WHITE);
            surface.draw_text("Press SPACE to Start", w / 2.0, h / 2.0 + 50.0, font, WHITE);
        }
        Phase::Playing => {
            surface.draw_sprite(Sprite::Bird, game.bird().rect());
            for pipe in game.pipes() {
                surface.draw_sprite(Sprite::PipeTop, pipe.top());
                surface.draw_sprite(Sprite::PipeBottom, pipe.bottom());
            }
            let score = format!("Score: {}", game.score());
            surface.draw_text(&score, w / 2.0, 50.0, font, WHITE);
        }
        Phase::GameOver => {
            surface.fill_rect(screen, BLACK);
            let score = format!("Score: {}", game.score());
            let best = format!("Best: {}", game.high_score());
            surface.draw_text("Game Over", w / 2.0, h / 2.0 - 60.0, font, WHITE);
            surface.draw_text(&score, w / 2.0, h / 2.0, font, WHITE);
            surface.draw_text(&best, w / 2.0, h / 2.0 + 40.0, font, WHITE);
            surface.draw_text("Press SPACE to Restart", w / 2.0, h / 2.0 + 100.0, font, WHITE);
        }
    }
}
