//! Error types for Ambience

use thiserror::Error;

use crate::MediaSlot;

/// Core error type
///
/// None of these reach the UI. Callers at the public surface log and
/// discard them; the worst observable outcome is silence or a still frame.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AmbError {
    /// The platform primitive is missing entirely (permanent).
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Refused by autoplay policy; retried on the next gesture.
    #[error("Blocked by playback policy: {0}")]
    PolicyBlocked(String),

    /// Any other failure raised by the platform primitives.
    #[error("Platform error: {0}")]
    Platform(String),

    /// A callback arrived for a session that has since been torn down.
    #[error("Stale session on {slot:?} (generation {got}, current {current})")]
    StaleSession {
        slot: MediaSlot,
        got: u64,
        current: u64,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),
}

impl AmbError {
    /// Policy blocks are expected during normal use and only worth a debug line.
    #[inline]
    pub fn is_policy_block(&self) -> bool {
        matches!(self, AmbError::PolicyBlocked(_))
    }
}

/// Result type alias
pub type AmbResult<T> = Result<T, AmbError>;
