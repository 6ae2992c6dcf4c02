//! amb-core: Shared types for the Ambience feedback subsystem
//!
//! Error taxonomy, time helpers and the media slot identifiers used by both
//! the tone engine and the transition controller.

mod error;
mod time;

pub use error::*;
pub use time::*;

use serde::{Deserialize, Serialize};

/// Which media element a session lives on.
///
/// There is exactly one ambient element and at most one foreground element
/// (intro or modal video) at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaSlot {
    /// Intro or modal video
    Foreground,
    /// Looping background track
    Ambient,
}

impl MediaSlot {
    pub fn name(&self) -> &'static str {
        match self {
            MediaSlot::Foreground => "foreground",
            MediaSlot::Ambient => "ambient",
        }
    }
}

/// Identifies one attachment of a source to a slot.
///
/// Every attach bumps the slot's generation, so a callback carrying an older
/// token refers to a session that no longer exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken {
    pub slot: MediaSlot,
    pub generation: u64,
}

impl SessionToken {
    #[inline]
    pub const fn new(slot: MediaSlot, generation: u64) -> Self {
        Self { slot, generation }
    }
}
