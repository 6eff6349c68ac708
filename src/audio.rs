//! Synthesized feedback sounds.
//!
//! Clips are rendered once up front with fundsp and replayed through rodio.

use std::thread;

use log::{debug, warn};
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};
use thiserror::Error;

use crate::game::Cue;

pub const SAMPLE_RATE: u32 = 44_100;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output: {0}")]
    Stream(#[from] rodio::StreamError),
    #[error("cannot start playback: {0}")]
    Play(#[from] rodio::PlayError),
}

// ── Voices ──────────────────────────────────────────────────────────────────

mod voices {
    use fundsp::prelude32::*;

    pub const HIT_SECS: f32 = 0.5;
    pub const SCORE_SECS: f32 = 0.18;
    pub const CELEBRATION_SECS: f32 = 0.8;

    /// Falling sawtooth: 400Hz down to 80Hz.
    pub fn hit() -> impl AudioUnit {
        let freq = lfo(|t: f32| lerp(400.0, 80.0, (t / 0.4).min(1.0)));
        let gain = lfo(|t: f32| lerp(0.15, 0.0, (t / 0.5).min(1.0)));
        (freq >> saw()) * gain
    }

    /// Two-tone blip, a fifth apart.
    pub fn score() -> impl AudioUnit {
        let freq = lfo(|t: f32| if t < 0.06 { 880.0_f32 } else { 1320.0 });
        let gain = lfo(|t: f32| 0.2 * (1.0 - t / 0.18).max(0.0));
        (freq >> sine()) * gain
    }

    /// Major arpeggio C5 E5 G5 C6, each note plucked.
    pub fn celebration() -> impl AudioUnit {
        let freq = lfo(|t: f32| match (t / 0.12) as usize {
            0 => 523.25_f32,
            1 => 659.25,
            2 => 783.99,
            _ => 1046.5,
        });
        let gain = lfo(|t: f32| {
            let pluck = 1.0 - (t % 0.12) / 0.12 * 0.6;
            0.08 * pluck * (1.0 - t / 0.8).max(0.0)
        });
        (freq >> square()) * gain
    }

    pub fn render(mut unit: impl AudioUnit, secs: f32, sample_rate: u32) -> Vec<f32> {
        unit.set_sample_rate(sample_rate as f64);
        unit.reset();
        let n = (sample_rate as f32 * secs) as usize;
        (0..n).map(|_| unit.get_mono()).collect()
    }
}

// ── Soundbank ───────────────────────────────────────────────────────────────

/// All feedback clips, rendered and ready to play.
pub struct Soundbank {
    hit: Vec<f32>,
    score: Vec<f32>,
    celebration: Vec<f32>,
}

impl Soundbank {
    /// Renders every clip concurrently and returns once all are ready.
    pub fn load() -> Self {
        let (hit, score, celebration) = thread::scope(|s| {
            let hit = s.spawn(|| voices::render(voices::hit(), voices::HIT_SECS, SAMPLE_RATE));
            let score =
                s.spawn(|| voices::render(voices::score(), voices::SCORE_SECS, SAMPLE_RATE));
            let celebration = s.spawn(|| {
                voices::render(
                    voices::celebration(),
                    voices::CELEBRATION_SECS,
                    SAMPLE_RATE,
                )
            });
            (
                ready("hit", hit.join()),
                ready("score", score.join()),
                ready("celebration", celebration.join()),
            )
        });
        debug!(
            "soundbank ready: {} / {} / {} samples",
            hit.len(),
            score.len(),
            celebration.len()
        );
        Soundbank {
            hit,
            score,
            celebration,
        }
    }

    pub fn clip(&self, cue: Cue) -> &[f32] {
        match cue {
            Cue::Hit => &self.hit,
            Cue::Score => &self.score,
            Cue::Celebration => &self.celebration,
        }
    }
}

fn ready(name: &str, joined: thread::Result<Vec<f32>>) -> Vec<f32> {
    joined.unwrap_or_else(|_| {
        warn!("rendering {name} clip panicked; it will be silent");
        Vec::new()
    })
}

// ── Playback ────────────────────────────────────────────────────────────────

pub struct Audio {
    // Dropping the stream stops all playback.
    _stream: OutputStream,
    handle: OutputStreamHandle,
    bank: Soundbank,
}

impl Audio {
    pub fn open(bank: Soundbank) -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Audio {
            _stream: stream,
            handle,
            bank,
        })
    }

    /// Starts `cue` in the background; overlapping cues mix.
    pub fn play(&self, cue: Cue) -> Result<(), AudioError> {
        let clip = self.bank.clip(cue);
        if clip.is_empty() {
            return Ok(());
        }
        let sink = Sink::try_new(&self.handle)?;
        sink.append(SamplesBuffer::new(1, SAMPLE_RATE, clip.to_vec()));
        sink.detach();
        Ok(())
    }
}
