//! Half-block pixel rendering to the terminal.
//!
//! Each terminal cell holds two vertically stacked pixels: the upper one is
//! the foreground of `▀`, the lower one its background.

use std::io::{self, Write};

use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};

use crate::font;
use crate::geom::Rect;
use crate::render::{BLACK, Rgb, Sprite, Surface};

// ── Colors ──────────────────────────────────────────────────────────────────

const SKY_TOP: Rgb = Rgb(70, 180, 200);
const SKY_BOT: Rgb = Rgb(190, 232, 245);
const PIPE_L: Rgb = Rgb(74, 122, 26);
const PIPE_M: Rgb = Rgb(100, 170, 40);
const PIPE_HI: Rgb = Rgb(145, 215, 62);
const CAP_DARK: Rgb = Rgb(60, 100, 20);
const BIRD_Y: Rgb = Rgb(245, 200, 66);
const BIRD_HI: Rgb = Rgb(255, 225, 100);
const BIRD_WING: Rgb = Rgb(215, 165, 35);
const BIRD_EYE: Rgb = Rgb(255, 255, 255);
const BIRD_PUPIL: Rgb = Rgb(20, 20, 20);
const BIRD_BEAK: Rgb = Rgb(225, 75, 35);
const BIRD_BEAK_HI: Rgb = Rgb(240, 110, 50);
const HILL_FAR: Rgb = Rgb(120, 195, 75);
const HILL_NEAR: Rgb = Rgb(95, 175, 55);
const SHADOW: Rgb = Rgb(30, 30, 30);
const LETTERBOX: Rgb = Rgb(16, 16, 16);

/// Cap height of text relative to its font size.
const CAP_HEIGHT: f64 = 0.7;

// ── Pixel buffer ────────────────────────────────────────────────────────────

pub struct PixelBuf {
    w: usize,
    h: usize, // pixel height = terminal rows * 2
    px: Vec<Rgb>,
}

impl PixelBuf {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![LETTERBOX; w * h],
        }
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.clear();
        self.px.resize(w * h, LETTERBOX);
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    fn fill(&mut self, c: Rgb) {
        self.px.fill(c);
    }

    /// Writes the whole buffer, emitting color changes only where needed.
    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut prev_fg = BLACK;
        let mut prev_bg = BLACK;
        let mut need_fg = true;
        let mut need_bg = true;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if top == bot {
                    if need_bg || prev_bg != top {
                        queue!(out, style::SetBackgroundColor(term_color(top)))?;
                        prev_bg = top;
                        need_bg = false;
                    }
                    queue!(out, style::Print(' '))?;
                } else {
                    if need_fg || prev_fg != top {
                        queue!(out, style::SetForegroundColor(term_color(top)))?;
                        prev_fg = top;
                        need_fg = false;
                    }
                    if need_bg || prev_bg != bot {
                        queue!(out, style::SetBackgroundColor(term_color(bot)))?;
                        prev_bg = bot;
                        need_bg = false;
                    }
                    queue!(out, style::Print('\u{2580}'))?;
                }
            }
            if row + 1 < rows {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                need_fg = true;
                need_bg = true;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

fn term_color(c: Rgb) -> CColor {
    CColor::Rgb {
        r: c.0,
        g: c.1,
        b: c.2,
    }
}

// ── Screen: world-to-pixel mapping ──────────────────────────────────────────

/// A [`Surface`] drawing world coordinates into a letterboxed [`PixelBuf`].
pub struct Screen {
    buf: PixelBuf,
    world_w: f64,
    world_h: f64,
    scale: f64,
    ox: f64,
    oy: f64,
    /// Pixel bounds of the world: x0, y0, x1, y1 (exclusive).
    view: (i32, i32, i32, i32),
}

impl Screen {
    pub fn new(cols: u16, rows: u16, world_w: f64, world_h: f64) -> Self {
        let mut screen = Screen {
            buf: PixelBuf::new(0, 0),
            world_w,
            world_h,
            scale: 1.0,
            ox: 0.0,
            oy: 0.0,
            view: (0, 0, 0, 0),
        };
        screen.resize(cols, rows);
        screen
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        let pw = cols as usize;
        let ph = rows as usize * 2;
        self.buf.resize(pw, ph);

        self.scale = (pw as f64 / self.world_w).min(ph as f64 / self.world_h);
        self.ox = (pw as f64 - self.world_w * self.scale) / 2.0;
        self.oy = (ph as f64 - self.world_h * self.scale) / 2.0;
        let (x0, y0, x1, y1) = self.span(Rect::new(0.0, 0.0, self.world_w, self.world_h));
        self.view = (x0, y0, x1, y1);
    }

    pub fn present(&self, out: &mut impl Write) -> io::Result<()> {
        self.buf.render(out)
    }

    fn span(&self, r: Rect) -> (i32, i32, i32, i32) {
        let x0 = (self.ox + r.x * self.scale).round() as i32;
        let y0 = (self.oy + r.y * self.scale).round() as i32;
        let x1 = (self.ox + r.right() * self.scale).round() as i32;
        let y1 = (self.oy + r.bottom() * self.scale).round() as i32;
        (x0, y0, x1, y1)
    }

    /// Sets a pixel, clipped to the world viewport.
    fn plot(&mut self, x: i32, y: i32, c: Rgb) {
        let (vx0, vy0, vx1, vy1) = self.view;
        if x >= vx0 && x < vx1 && y >= vy0 && y < vy1 {
            self.buf.set(x, y, c);
        }
    }

    fn fill_px(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.plot(x + dx, y + dy, c);
            }
        }
    }

    fn draw_background(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        let h = (y1 - y0).max(1);
        for y in y0..y1 {
            let t = ((y - y0) * 256 / h) as u16;
            let c = Rgb::lerp(SKY_TOP, SKY_BOT, t);
            for x in x0..x1 {
                self.plot(x, y, c);
            }
        }

        let hf = h as f64;
        // Far hills
        for x in x0..x1 {
            let fx = (x - x0) as f64 / self.scale * 0.01;
            let rise = (fx.sin() * 0.05 + (fx * 1.7).sin() * 0.025 + 0.12) * hf;
            for y in (y1 - rise as i32)..y1 {
                self.plot(x, y, HILL_FAR);
            }
        }
        // Near hills
        for x in x0..x1 {
            let fx = (x - x0) as f64 / self.scale * 0.015;
            let rise = (fx.sin() * 0.03 + (fx * 2.3).sin() * 0.015 + 0.06) * hf;
            for y in (y1 - rise as i32)..y1 {
                self.plot(x, y, HILL_NEAR);
            }
        }
    }

    fn draw_pipe(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, cap_at_bottom: bool) {
        let w = x1 - x0;
        let h = y1 - y0;
        let cap_extra = (w / 12).max(1).min(w / 2);
        let cap_h = (w / 5).max(2).min(h);
        let body_w = w - cap_extra * 2;

        for x in 0..body_w {
            let c = pipe_shade(x, body_w);
            for y in y0..y1 {
                self.plot(x0 + cap_extra + x, y, c);
            }
        }

        let cap_y = if cap_at_bottom { y1 - cap_h } else { y0 };
        for x in 0..w {
            let c = pipe_shade(x, w);
            for y in cap_y..cap_y + cap_h {
                self.plot(x0 + x, y, c);
            }
            self.plot(x0 + x, cap_y, CAP_DARK);
            self.plot(x0 + x, cap_y + cap_h - 1, CAP_DARK);
        }
    }

    fn draw_bird(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        let w = x1 - x0;
        let h = y1 - y0;
        let tail_w = (w / 8).max(1);
        let beak_w = (w / 4).max(1);

        // Body core
        self.fill_px(x0 + tail_w, y0, w - tail_w - beak_w, h, BIRD_Y);
        // Highlight (top of body)
        self.fill_px(x0 + tail_w + 1, y0, w - tail_w - beak_w - 2, 1, BIRD_HI);
        // Wing
        self.fill_px(x0 + tail_w, y0 + h / 2, (w / 3).max(1), (h / 3).max(1), BIRD_WING);
        // Eye
        let eye = (w / 8).max(1);
        let ex = x1 - beak_w - eye - 1;
        let ey = y0 + (h / 5).max(1);
        self.fill_px(ex, ey, eye + 1, eye + 1, BIRD_EYE);
        self.plot(ex + eye, ey + eye, BIRD_PUPIL);
        // Beak
        let beak_h = (h / 3).max(1);
        let beak_y = y0 + h / 2 - beak_h / 2;
        self.fill_px(x1 - beak_w, beak_y, beak_w, beak_h / 2 + 1, BIRD_BEAK_HI);
        self.fill_px(x1 - beak_w, beak_y + beak_h / 2 + 1, beak_w, beak_h / 2, BIRD_BEAK);
        // Tail
        self.fill_px(x0, y0 + h / 3, tail_w, (h / 3).max(1), BIRD_WING);
    }
}

impl Surface for Screen {
    fn clear(&mut self, area: Rect) {
        let whole = area.x <= 0.0
            && area.y <= 0.0
            && area.right() >= self.world_w
            && area.bottom() >= self.world_h;
        if whole {
            self.buf.fill(LETTERBOX);
        } else {
            self.fill_rect(area, BLACK);
        }
    }

    fn fill_rect(&mut self, area: Rect, color: Rgb) {
        let (x0, y0, x1, y1) = self.span(area);
        self.fill_px(x0, y0, x1 - x0, y1 - y0, color);
    }

    fn draw_sprite(&mut self, sprite: Sprite, area: Rect) {
        let (x0, y0, x1, y1) = self.span(area);
        if x1 <= x0 || y1 <= y0 {
            return;
        }
        match sprite {
            Sprite::Background => self.draw_background(x0, y0, x1, y1),
            Sprite::Bird => self.draw_bird(x0, y0, x1, y1),
            Sprite::PipeTop => self.draw_pipe(x0, y0, x1, y1, true),
            Sprite::PipeBottom => self.draw_pipe(x0, y0, x1, y1, false),
        }
    }

    // Text may spill into the letterbox; small terminals would clip it otherwise.
    fn draw_text(&mut self, text: &str, cx: f64, y: f64, size: f64, color: Rgb) {
        let cell = ((size * CAP_HEIGHT / font::GLYPH_H as f64) * self.scale)
            .round()
            .max(1.0) as i32;
        let width = font::text_width(text) as i32 * cell;
        let left = (self.ox + cx * self.scale).round() as i32 - width / 2;
        let top = (self.oy + y * self.scale).round() as i32 - font::GLYPH_H as i32 * cell;

        for (i, ch) in text.chars().enumerate() {
            let Some(rows) = font::glyph(ch) else {
                continue;
            };
            let gx = left + (i * font::ADVANCE) as i32 * cell;
            for row in 0..font::GLYPH_H {
                for col in 0..font::GLYPH_W {
                    if !font::lit(&rows, col, row) {
                        continue;
                    }
                    let px = gx + col as i32 * cell;
                    let py = top + row as i32 * cell;
                    for dy in 0..cell {
                        for dx in 0..cell {
                            self.buf.set(px + dx + 1, py + dy + 1, SHADOW);
                        }
                    }
                    for dy in 0..cell {
                        for dx in 0..cell {
                            self.buf.set(px + dx, py + dy, color);
                        }
                    }
                }
            }
        }
    }
}

/// Column shading across a pipe, keyed by position in 1/256ths of its width:
/// dark left rim, highlight left of center, shadowed right rim.
const PIPE_STOPS: [(i32, Rgb); 4] = [(0, PIPE_L), (80, PIPE_HI), (176, PIPE_M), (256, CAP_DARK)];

fn pipe_shade(x: i32, total_w: i32) -> Rgb {
    if total_w <= 1 {
        return PIPE_M;
    }
    let pos = x.clamp(0, total_w - 1) * 256 / (total_w - 1);
    PIPE_STOPS
        .windows(2)
        .find(|w| pos <= w[1].0)
        .map_or(CAP_DARK, |w| {
            let ((p0, c0), (p1, c1)) = (w[0], w[1]);
            Rgb::lerp(c0, c1, ((pos - p0) * 256 / (p1 - p0)) as u16)
        })
}
