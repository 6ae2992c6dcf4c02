//! Platform audio primitives
//!
//! The engine only needs a context that can report its state, be resumed,
//! tell the time, and turn a [`LayerPlan`] into a fresh node chain. The
//! browser binding implements this over Web Audio; [`crate::OfflinePlatform`]
//! implements it in memory.

use amb_core::AmbResult;
use serde::{Deserialize, Serialize};

use crate::layer::LayerPlan;

/// Audio context lifecycle as seen by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextState {
    /// No context created yet (or the platform has none)
    #[default]
    Uninitialized,
    /// Created but not rendering; platform policy wants a gesture
    Suspended,
    /// Rendering
    Running,
}

/// A live audio processing session
pub trait AudioContextOps {
    fn state(&self) -> ContextState;

    /// Ask the platform to start rendering. May complete later or be refused
    /// until a gesture has been observed.
    fn resume(&self) -> AmbResult<()>;

    /// Context clock in seconds
    fn current_time(&self) -> f64;

    fn sample_rate(&self) -> f32;

    /// Build, connect, start and schedule the stop of one node chain.
    ///
    /// Implementations must allocate new nodes on every call. Source nodes
    /// are single-use; restarting a stopped one is invalid.
    fn schedule_layer(&self, layer: &LayerPlan) -> AmbResult<()>;
}

/// Factory for the audio context
pub trait AudioPlatform {
    type Context: AudioContextOps;

    /// Create the context. `AmbError::Unsupported` means the primitive does
    /// not exist and the engine will never ask again.
    fn create_context(&self) -> AmbResult<Self::Context>;
}
