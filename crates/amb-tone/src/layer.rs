//! Layer plans
//!
//! A `LayerPlan` is the platform-independent description of one
//! source → (filter) → gain → output chain. Backends build fresh nodes from
//! it on every call; nothing in a plan refers to a live node.

use serde::{Deserialize, Serialize};

use crate::envelope::GainEnvelope;
use crate::preset::EffectKind;

/// Oscillator shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// Band-pass filter settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandPass {
    pub center_hz: f32,
    pub q: f32,
}

impl BandPass {
    /// The "mechanical buzz" band shared by both effects
    pub const MECHANICAL: Self = Self {
        center_hz: 800.0,
        q: 1.4,
    };
}

/// What produces the layer's signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayerSource {
    Tone {
        waveform: Waveform,
        frequency_hz: f32,
    },
    Noise {
        samples: Vec<f32>,
        sample_rate: f32,
        band_pass: BandPass,
    },
}

impl LayerSource {
    #[inline]
    pub fn is_noise(&self) -> bool {
        matches!(self, LayerSource::Noise { .. })
    }
}

/// One node chain to schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerPlan {
    pub kind: EffectKind,
    pub source: LayerSource,
    pub envelope: GainEnvelope,
    /// Context time the source starts
    pub start_at: f64,
    /// Context time the source stops (envelope end plus epsilon)
    pub stop_at: f64,
}

impl LayerPlan {
    /// Whether the layer is still sounding at context time `now`
    #[inline]
    pub fn is_live(&self, now: f64) -> bool {
        now < self.stop_at
    }

    #[inline]
    pub fn duration_secs(&self) -> f64 {
        (self.stop_at - self.start_at).max(0.0)
    }
}
