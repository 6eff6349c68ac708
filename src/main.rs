use std::fs::File;
use std::io::{self, Write, stdout};
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute, terminal,
};
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;

use flappy_term::audio::{Audio, Soundbank};
use flappy_term::pixels::Screen;
use flappy_term::render::render;
use flappy_term::{Config, ConfigError, GameState};

const LOG_FILE_ENV: &str = "FLAPPY_LOG_FILE";
const MUTE_ENV: &str = "FLAPPY_MUTE";

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("terminal: {0}")]
    Terminal(#[from] io::Error),
}

fn init_logging() -> Result<(), AppError> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    // The alternate screen owns stdout; stderr would smear over the frame.
    if let Ok(path) = std::env::var(LOG_FILE_ENV) {
        let file = File::create(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn open_audio() -> Option<Audio> {
    if std::env::var(MUTE_ENV).is_ok_and(|v| v != "0") {
        info!("audio muted");
        return None;
    }
    let bank = Soundbank::load();
    match Audio::open(bank) {
        Ok(audio) => Some(audio),
        Err(e) => {
            warn!("running without sound: {e}");
            None
        }
    }
}

enum Input {
    Primary,
    Quit,
}

fn map_key(code: KeyCode, modifiers: KeyModifiers) -> Option<Input> {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Input::Quit),
        KeyCode::Char('q') | KeyCode::Esc => Some(Input::Quit),
        KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter => Some(Input::Primary),
        _ => None,
    }
}

fn run(out: &mut impl Write, cfg: Config, audio: Option<&Audio>) -> Result<(), AppError> {
    let mut rng = match cfg.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let frame_dur = Duration::from_millis(cfg.frame_ms);

    let (cols, rows) = terminal::size()?;
    let mut screen = Screen::new(cols, rows, cfg.screen_width, cfg.screen_height);
    let mut game = GameState::new(cfg);

    loop {
        let frame_start = Instant::now();

        // Input is applied between ticks only.
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    match map_key(key.code, key.modifiers) {
                        Some(Input::Quit) => return Ok(()),
                        Some(Input::Primary) => game.primary_action(&mut rng),
                        None => {}
                    }
                }
                Event::Resize(c, r) => {
                    debug!("resized to {c}x{r}");
                    screen.resize(c, r);
                }
                _ => {}
            }
        }

        // Update
        for cue in game.tick(&mut rng) {
            debug!("cue {cue:?}");
            if let Some(audio) = audio {
                if let Err(e) = audio.play(cue) {
                    warn!("cannot play {cue:?}: {e}");
                }
            }
        }

        // Render
        render(&game, &mut screen);
        screen.present(out)?;

        // Frame pacing
        let elapsed = frame_start.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
    }
}

fn main() -> Result<(), AppError> {
    let cfg = Config::from_env()?;
    init_logging()?;
    debug!("config: {cfg:?}");

    // Every clip is rendered before the first frame.
    let audio = open_audio();
    info!("starting {}x{} board", cfg.screen_width, cfg.screen_height);

    let mut term = TerminalGuard::enter(stdout())?;
    run(term.out(), cfg, audio.as_ref())
}

/// Owns the terminal while raw mode is on. Dropping it restores the
/// terminal, including when the game loop errors out or panics.
struct TerminalGuard<W: Write> {
    out: W,
}

impl<W: Write> TerminalGuard<W> {
    fn enter(out: W) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut guard = TerminalGuard { out };
        execute!(
            guard.out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::DisableLineWrap,
        )?;
        Ok(guard)
    }

    fn out(&mut self) -> &mut W {
        &mut self.out
    }
}

impl<W: Write> Drop for TerminalGuard<W> {
    fn drop(&mut self) {
        if let Err(e) = execute!(
            self.out,
            terminal::LeaveAlternateScreen,
            cursor::Show,
            terminal::EnableLineWrap,
        ) {
            warn!("cannot leave alternate screen: {e}");
        }
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("cannot leave raw mode: {e}");
        }
    }
}
