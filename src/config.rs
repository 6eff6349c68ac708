//! Game geometry and tuning.
//!
//! Defaults reproduce the classic 450x700 board. Every field can be
//! overridden through a `FLAPPY_*` environment variable.

use std::env;
use std::str::FromStr;

use thiserror::Error;

/// Prefix shared by every recognized environment variable.
pub const ENV_PREFIX: &str = "FLAPPY_";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key}: cannot parse {value:?}")]
    Parse { key: String, value: String },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub screen_width: f64,
    pub screen_height: f64,
    pub pipe_width: f64,
    pub pipe_gap: f64,
    /// Horizontal scroll per tick.
    pub pipe_speed: f64,
    /// Distance the newest pipe travels before the next one spawns.
    /// Zero keeps a single pipe per run.
    pub pipe_spacing: f64,
    /// How far past the right edge a pipe spawns.
    pub spawn_lead: f64,
    pub gap_center_min: u32,
    pub gap_center_max: u32,
    pub gravity: f64,
    pub impulse: f64,
    pub bird_x: f64,
    pub bird_width: f64,
    pub bird_height: f64,
    pub font_size: f64,
    pub frame_ms: u64,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            screen_width: 450.0,
            screen_height: 700.0,
            pipe_width: 120.0,
            pipe_gap: 180.0,
            pipe_speed: 6.0,
            pipe_spacing: 270.0,
            spawn_lead: 50.0,
            gap_center_min: 200,
            gap_center_max: 400,
            gravity: 0.25,
            impulse: -7.0,
            bird_x: 50.0,
            bird_width: 80.0,
            bird_height: 45.0,
            font_size: 30.0,
            frame_ms: 16,
            seed: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from defaults plus whatever `lookup` returns for each
    /// `FLAPPY_*` key, then validates it.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Config::default();
        let get = |name: &str| {
            let key = format!("{ENV_PREFIX}{name}");
            lookup(&key).map(|value| (key, value))
        };

        override_field(&mut cfg.screen_width, get("SCREEN_WIDTH"))?;
        override_field(&mut cfg.screen_height, get("SCREEN_HEIGHT"))?;
        override_field(&mut cfg.pipe_width, get("PIPE_WIDTH"))?;
        override_field(&mut cfg.pipe_gap, get("PIPE_GAP"))?;
        override_field(&mut cfg.pipe_speed, get("PIPE_SPEED"))?;
        override_field(&mut cfg.pipe_spacing, get("PIPE_SPACING"))?;
        override_field(&mut cfg.spawn_lead, get("SPAWN_LEAD"))?;
        override_field(&mut cfg.gap_center_min, get("GAP_CENTER_MIN"))?;
        override_field(&mut cfg.gap_center_max, get("GAP_CENTER_MAX"))?;
        override_field(&mut cfg.gravity, get("GRAVITY"))?;
        override_field(&mut cfg.impulse, get("IMPULSE"))?;
        override_field(&mut cfg.bird_x, get("BIRD_X"))?;
        override_field(&mut cfg.bird_width, get("BIRD_WIDTH"))?;
        override_field(&mut cfg.bird_height, get("BIRD_HEIGHT"))?;
        override_field(&mut cfg.font_size, get("FONT_SIZE"))?;
        override_field(&mut cfg.frame_ms, get("FRAME_MS"))?;
        if let Some((key, value)) = get("SEED") {
            cfg.seed = Some(parse(&key, &value)?);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let floats = [
            ("screen_width", self.screen_width),
            ("screen_height", self.screen_height),
            ("pipe_width", self.pipe_width),
            ("pipe_gap", self.pipe_gap),
            ("pipe_speed", self.pipe_speed),
            ("pipe_spacing", self.pipe_spacing),
            ("spawn_lead", self.spawn_lead),
            ("gravity", self.gravity),
            ("impulse", self.impulse),
            ("bird_x", self.bird_x),
            ("bird_width", self.bird_width),
            ("bird_height", self.bird_height),
            ("font_size", self.font_size),
        ];
        for (name, value) in floats {
            if !value.is_finite() {
                return Err(invalid(format!("{name} must be finite, got {value}")));
            }
        }
        let positive = [
            ("screen_width", self.screen_width),
            ("screen_height", self.screen_height),
            ("pipe_width", self.pipe_width),
            ("pipe_gap", self.pipe_gap),
            ("bird_width", self.bird_width),
            ("bird_height", self.bird_height),
            ("font_size", self.font_size),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(invalid(format!("{name} must be positive, got {value}")));
            }
        }
        if self.pipe_speed < 0.0 || self.pipe_spacing < 0.0 || self.spawn_lead < 0.0 {
            return Err(invalid("pipe_speed, pipe_spacing and spawn_lead must be non-negative"));
        }
        // Zero turns spacing off; anything else must leave room between pipes.
        if self.pipe_spacing > 0.0 && self.pipe_spacing < self.pipe_width {
            return Err(invalid(format!(
                "pipe_spacing {} is narrower than pipe_width {}",
                self.pipe_spacing, self.pipe_width
            )));
        }
        if self.pipe_gap >= self.screen_height {
            return Err(invalid(format!(
                "pipe_gap {} does not fit in screen_height {}",
                self.pipe_gap, self.screen_height
            )));
        }
        if self.gap_center_min > self.gap_center_max {
            return Err(invalid(format!(
                "gap_center_min {} exceeds gap_center_max {}",
                self.gap_center_min, self.gap_center_max
            )));
        }
        if f64::from(self.gap_center_max) >= self.screen_height {
            return Err(invalid(format!(
                "gap_center_max {} lies outside the screen",
                self.gap_center_max
            )));
        }
        if self.bird_x < 0.0 || self.bird_x + self.bird_width > self.screen_width {
            return Err(invalid("bird does not fit horizontally on screen"));
        }
        if self.bird_height >= self.screen_height {
            return Err(invalid("bird is taller than the screen"));
        }
        if self.frame_ms == 0 {
            return Err(invalid("frame_ms must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(msg.into())
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Parse {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn override_field<T: FromStr>(
    field: &mut T,
    entry: Option<(String, String)>,
) -> Result<(), ConfigError> {
    if let Some((key, value)) = entry {
        *field = parse(&key, &value)?;
    }
    Ok(())
}
