//! Flappy Bird in the terminal.
//!
//! [`game`] holds the deterministic core: physics, pipes, collision and the
//! phase machine. [`render`] turns a [`game::GameState`] into draw calls on
//! any [`render::Surface`]; [`pixels`] is the crossterm-backed surface and
//! [`audio`] synthesizes and plays the feedback cues.

pub mod audio;
pub mod config;
pub mod font;
pub mod game;
pub mod geom;
pub mod pixels;
pub mod render;

pub use config::{Config, ConfigError};
pub use game::{Cue, GameState, Phase};
