//! Offline synthesis
//!
//! Software rendition of the Web Audio node chains a [`LayerPlan`] describes.
//! Used by [`crate::OfflinePlatform`] and the preview tool; the browser path
//! never goes through here.

use std::f64::consts::PI;

use crate::layer::{BandPass, LayerPlan, LayerSource, Waveform};

// ═══════════════════════════════════════════════════════════════════════════════
// OSCILLATOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Naive (non band-limited) oscillator sample at `phase` cycles
#[inline]
pub fn oscillator_sample(waveform: Waveform, phase: f64) -> f32 {
    let p = phase.fract();
    let v = match waveform {
        Waveform::Sine => (2.0 * PI * p).sin(),
        Waveform::Square => {
            if p < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Sawtooth => 2.0 * p - 1.0,
        Waveform::Triangle => 1.0 - 4.0 * (p - 0.5).abs(),
    };
    v as f32
}

// ═══════════════════════════════════════════════════════════════════════════════
// BAND-PASS BIQUAD
// ═══════════════════════════════════════════════════════════════════════════════

/// RBJ band-pass (constant 0 dB peak gain), Transposed Direct Form II
#[derive(Debug, Clone, Copy, Default)]
pub struct BandPassFilter {
    b0: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    z1: f64,
    z2: f64,
}

impl BandPassFilter {
    pub fn new(band: BandPass, sample_rate: f32) -> Self {
        let sample_rate = sample_rate as f64;
        // Upper bound never below the lower one, even for degenerate rates
        let nyquist = (sample_rate * 0.49).max(1.0);
        let freq = (band.center_hz as f64).clamp(1.0, nyquist);
        let q = (band.q as f64).max(0.01);

        let omega = 2.0 * PI * freq / sample_rate;
        let alpha = omega.sin() / (2.0 * q);
        let a0 = 1.0 + alpha;

        Self {
            b0: alpha / a0,
            b2: -alpha / a0,
            a1: -2.0 * omega.cos() / a0,
            a2: (1.0 - alpha) / a0,
            z1: 0.0,
            z2: 0.0,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let x = input as f64;
        let y = self.b0 * x + self.z1;
        self.z1 = -self.a1 * y + self.z2;
        self.z2 = self.b2 * x - self.a2 * y;
        y as f32
    }

    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LAYER RENDERING
// ═══════════════════════════════════════════════════════════════════════════════

/// Mix `layer` into `out`, where `out[0]` is context time `origin`.
///
/// Frames outside `[start_at, stop_at)` are left untouched.
pub fn render_layer(layer: &LayerPlan, sample_rate: f32, origin: f64, out: &mut [f32]) {
    let sr = sample_rate as f64;
    let first = frame_at(layer.start_at, origin, sr).min(out.len());
    let last = frame_at(layer.stop_at, origin, sr).min(out.len());
    if first >= last {
        return;
    }

    match &layer.source {
        LayerSource::Tone {
            waveform,
            frequency_hz,
        } => {
            for (i, slot) in out[first..last].iter_mut().enumerate() {
                let t = origin + (first + i) as f64 / sr;
                let phase = (t - layer.start_at) * *frequency_hz as f64;
                *slot += oscillator_sample(*waveform, phase) * layer.envelope.value_at(t);
            }
        }
        LayerSource::Noise {
            samples,
            sample_rate: buffer_rate,
            band_pass,
        } => {
            let mut filter = BandPassFilter::new(*band_pass, *buffer_rate);
            // Warm the filter over any frames that fell before the window
            let skipped = ((origin - layer.start_at).max(0.0) * *buffer_rate as f64) as usize;
            for &s in samples.iter().take(skipped) {
                filter.process(s);
            }

            for (i, slot) in out[first..last].iter_mut().enumerate() {
                let t = origin + (first + i) as f64 / sr;
                let idx = ((t - layer.start_at) * *buffer_rate as f64) as usize;
                let Some(&raw) = samples.get(idx) else {
                    break;
                };
                *slot += filter.process(raw) * layer.envelope.value_at(t);
            }
        }
    }
}

/// Render a single layer on its own, from its start to its stop
pub fn render_isolated(layer: &LayerPlan, sample_rate: f32) -> Vec<f32> {
    let frames = (layer.duration_secs() * sample_rate as f64).ceil() as usize;
    let mut out = vec![0.0; frames];
    render_layer(layer, sample_rate, layer.start_at, &mut out);
    out
}

#[inline]
fn frame_at(t: f64, origin: f64, sample_rate: f64) -> usize {
    ((t - origin) * sample_rate).max(0.0).ceil() as usize
}
