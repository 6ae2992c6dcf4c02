//! Media host seam
//!
//! The controller never touches media elements directly. It talks to a
//! [`MediaHost`], which owns the foreground and ambient elements, the
//! fullscreen request and the timers. The browser binding implements it over
//! the DOM; tests use [`crate::RecordingHost`].

use amb_core::{AmbResult, MediaSlot, Millis, SessionToken};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// SESSIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// One source attached to one slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSession {
    pub token: SessionToken,
    pub source: String,
    pub muted: bool,
    /// Last reported playback position, seconds
    pub position: f64,
    /// Seconds, known once the element reported `loadeddata`
    pub duration: Option<f64>,
}

impl PlaybackSession {
    pub fn new(token: SessionToken, source: impl Into<String>, muted: bool) -> Self {
        Self {
            token,
            source: source.into(),
            muted,
            position: 0.0,
            duration: None,
        }
    }
}

/// Hands out tokens, one generation counter per slot
#[derive(Debug, Clone, Default)]
pub(crate) struct Generations {
    foreground: u64,
    ambient: u64,
}

impl Generations {
    pub(crate) fn next(&mut self, slot: MediaSlot) -> SessionToken {
        let counter = match slot {
            MediaSlot::Foreground => &mut self.foreground,
            MediaSlot::Ambient => &mut self.ambient,
        };
        *counter += 1;
        SessionToken::new(slot, *counter)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TIMERS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Intro layer has faded; mount the dashboard
    FadeOut,
    /// Dashboard mounted; start its fade-in
    Reveal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerToken {
    pub kind: TimerKind,
    pub generation: u64,
}

// ═══════════════════════════════════════════════════════════════════════════════
// HOST TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of asking the platform for fullscreen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FullscreenRequest {
    /// Already fullscreen when the call returned
    Entered,
    /// Outcome arrives later as a fullscreen change or rejection event
    Pending,
}

/// Platform side of the transition controller.
///
/// `play` returning `Ok` means the request was issued. Hosts with
/// asynchronous playback report a later refusal through
/// `TransitionController::on_play_rejected`.
pub trait MediaHost {
    /// Bind `source` to the token's slot, replacing whatever was there
    fn attach(&mut self, token: SessionToken, source: &str, muted: bool) -> AmbResult<()>;

    /// Stop and unbind the slot; events from it must stop arriving
    fn detach(&mut self, slot: MediaSlot);

    fn play(&mut self, token: SessionToken) -> AmbResult<()>;

    fn pause(&mut self, token: SessionToken);

    fn seek(&mut self, token: SessionToken, secs: f64);

    fn set_muted(&mut self, token: SessionToken, muted: bool);

    fn request_fullscreen(&mut self) -> AmbResult<FullscreenRequest>;

    /// Deliver `token` back to the controller after `delay`
    fn schedule_timer(&mut self, token: TimerToken, delay: Millis);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generations_are_per_slot() {
        let mut gens = Generations::default();
        assert_eq!(gens.next(MediaSlot::Foreground).generation, 1);
        assert_eq!(gens.next(MediaSlot::Foreground).generation, 2);
        assert_eq!(gens.next(MediaSlot::Ambient).generation, 1);
    }
}
