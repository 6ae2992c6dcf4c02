//! Ambience Tone Engine
//!
//! Procedural UI sound effects for the dashboards:
//! - Lazily created, shared audio context (one per engine)
//! - Hover tick and action click, each a square-wave tone layered with a
//!   band-passed noise burst
//! - Floor-to-floor exponential envelopes, so nodes start and stop silently
//! - Fresh nodes per trigger, never pooled
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  UI handler                                                      │
//! │  trigger_hover() / trigger_action()                              │
//! │          │                                                       │
//! │          ▼                                                       │
//! │  ToneEngine ── get-or-create ──▶ AudioPlatform::create_context   │
//! │          │      resume if suspended                              │
//! │          ▼                                                       │
//! │  EffectPreset::plan() ──▶ [LayerPlan; 2]                         │
//! │          │                 ├── Tone:  osc → gain → out           │
//! │          │                 └── Noise: buf → bandpass → gain → out│
//! │          ▼                                                       │
//! │  AudioContextOps::schedule_layer()  (Web Audio / Offline)        │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use amb_tone::{OfflinePlatform, ToneEngine};
//!
//! let engine = ToneEngine::new(OfflinePlatform::default());
//! engine.trigger_hover();
//! engine.trigger_action();
//! assert_eq!(engine.platform().contexts_created(), 1);
//! ```

pub mod engine;
pub mod envelope;
pub mod layer;
pub mod offline;
pub mod platform;
pub mod preset;
pub mod synth;

// Re-exports
pub use engine::{DEFAULT_NOISE_SEED, Feedback, ToneEngine};
pub use envelope::{ATTACK, ENVELOPE_FLOOR, EnvelopePoint, GainEnvelope, RampKind, STOP_EPSILON};
pub use layer::{BandPass, LayerPlan, LayerSource, Waveform};
pub use offline::{OfflineContext, OfflinePlatform};
pub use platform::{AudioContextOps, AudioPlatform, ContextState};
pub use preset::{EffectKind, EffectPreset, EffectRequest, NoisePreset, TonePreset};
