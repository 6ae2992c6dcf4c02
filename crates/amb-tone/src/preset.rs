//! Effect presets
//!
//! The two semantic effects and their design constants. Nothing here is
//! loaded at runtime; the structs are serializable so tooling can dump or
//! diff them.

use amb_core::Millis;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::envelope::{GainEnvelope, STOP_EPSILON};
use crate::layer::{BandPass, LayerPlan, LayerSource, Waveform};

/// Peak absolute amplitude of generated noise samples
pub const NOISE_AMPLITUDE: f32 = 0.6;

// ═══════════════════════════════════════════════════════════════════════════════
// EFFECT KIND
// ═══════════════════════════════════════════════════════════════════════════════

/// Which semantic effect a trigger asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Short tick on pointer hover
    Hover,
    /// Confirmation click on activation
    Action,
}

impl EffectKind {
    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::Hover => "hover",
            EffectKind::Action => "action",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LAYER PRESETS
// ═══════════════════════════════════════════════════════════════════════════════

/// Tonal layer: a single oscillator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TonePreset {
    pub waveform: Waveform,
    pub frequency_hz: f32,
    pub duration: Millis,
    pub gain: f32,
}

/// Noise layer: random samples through a band-pass filter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoisePreset {
    pub band_pass: BandPass,
    pub duration: Millis,
    pub gain: f32,
    /// Delay after the tone starts
    pub offset: Millis,
}

// ═══════════════════════════════════════════════════════════════════════════════
// EFFECT REQUEST
// ═══════════════════════════════════════════════════════════════════════════════

/// One synthesis job, created and dropped inside a single trigger call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectRequest {
    pub kind: EffectKind,
    pub frequency_hz: f32,
    pub duration: Millis,
    pub gain: f32,
}

// ═══════════════════════════════════════════════════════════════════════════════
// EFFECT PRESET
// ═══════════════════════════════════════════════════════════════════════════════

/// Full description of one effect: tone layer plus noise layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectPreset {
    pub kind: EffectKind,
    pub tone: TonePreset,
    pub noise: NoisePreset,
}

impl EffectPreset {
    /// Hover tick: 160 Hz square, 80 ms, quiet noise burst 35 ms later
    pub const fn hover() -> Self {
        Self {
            kind: EffectKind::Hover,
            tone: TonePreset {
                waveform: Waveform::Square,
                frequency_hz: 160.0,
                duration: Millis(80),
                gain: 0.06,
            },
            noise: NoisePreset {
                band_pass: BandPass::MECHANICAL,
                duration: Millis(110),
                gain: 0.04,
                offset: Millis(35),
            },
        }
    }

    /// Action click: higher, longer and louder than the hover tick, with the
    /// noise burst starting together with the tone
    pub const fn action() -> Self {
        Self {
            kind: EffectKind::Action,
            tone: TonePreset {
                waveform: Waveform::Square,
                frequency_hz: 220.0,
                duration: Millis(120),
                gain: 0.09,
            },
            noise: NoisePreset {
                band_pass: BandPass::MECHANICAL,
                duration: Millis(180),
                gain: 0.06,
                offset: Millis::ZERO,
            },
        }
    }

    pub fn for_kind(kind: EffectKind) -> Self {
        match kind {
            EffectKind::Hover => Self::hover(),
            EffectKind::Action => Self::action(),
        }
    }

    /// The tonal part as a synthesis request
    pub fn request(&self) -> EffectRequest {
        EffectRequest {
            kind: self.kind,
            frequency_hz: self.tone.frequency_hz,
            duration: self.tone.duration,
            gain: self.tone.gain,
        }
    }

    /// Expand into the two node chains to schedule, starting at `now`
    /// (context time, seconds).
    ///
    /// The noise buffer covers the layer's full lifetime including the stop
    /// epsilon, so the source never runs dry before `stop()`.
    pub fn plan<R: Rng + ?Sized>(&self, now: f64, sample_rate: f32, rng: &mut R) -> [LayerPlan; 2] {
        let request = self.request();

        let tone_start = now;
        let tone = LayerPlan {
            kind: self.kind,
            source: LayerSource::Tone {
                waveform: self.tone.waveform,
                frequency_hz: request.frequency_hz,
            },
            envelope: GainEnvelope::percussive(tone_start, request.duration, request.gain),
            start_at: tone_start,
            stop_at: tone_start + (request.duration + STOP_EPSILON).as_secs_f64(),
        };

        let noise_start = now + self.noise.offset.as_secs_f64();
        let frames = (self.noise.duration + STOP_EPSILON).to_frames(sample_rate);
        let noise = LayerPlan {
            kind: self.kind,
            source: LayerSource::Noise {
                samples: noise_samples(frames, rng),
                sample_rate,
                band_pass: self.noise.band_pass,
            },
            envelope: GainEnvelope::percussive(noise_start, self.noise.duration, self.noise.gain),
            start_at: noise_start,
            stop_at: noise_start + (self.noise.duration + STOP_EPSILON).as_secs_f64(),
        };

        [tone, noise]
    }
}

/// Uniform white noise in `[-NOISE_AMPLITUDE, NOISE_AMPLITUDE)`
pub fn noise_samples<R: Rng + ?Sized>(frames: usize, rng: &mut R) -> Vec<f32> {
    (0..frames)
        .map(|_| (rng.random::<f32>() * 2.0 - 1.0) * NOISE_AMPLITUDE)
        .collect()
}
