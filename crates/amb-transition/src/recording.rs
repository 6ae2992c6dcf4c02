//! Recording test doubles
//!
//! [`RecordingHost`] logs every host call and models just enough element
//! state (attached token, playing, muted, position) for assertions.
//! [`RecordingFeedback`] counts tone triggers.

use std::cell::Cell;
use std::collections::HashMap;

use amb_core::{AmbError, AmbResult, MediaSlot, Millis, SessionToken};
use amb_tone::Feedback;

use crate::media::{FullscreenRequest, MediaHost, TimerToken};

// ═══════════════════════════════════════════════════════════════════════════════
// HOST CALL LOG
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Attach {
        token: SessionToken,
        source: String,
        muted: bool,
    },
    Detach(MediaSlot),
    Play(SessionToken),
    Pause(SessionToken),
    Seek(SessionToken, f64),
    SetMuted(SessionToken, bool),
    RequestFullscreen,
    ScheduleTimer(TimerToken, Millis),
}

/// How `request_fullscreen` answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FullscreenBehavior {
    #[default]
    Enter,
    Pending,
    Reject,
}

#[derive(Debug, Clone, Default)]
struct SlotState {
    token: Option<SessionToken>,
    source: Option<String>,
    playing: bool,
    muted: bool,
    position: f64,
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDING HOST
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct RecordingHost {
    calls: Vec<HostCall>,
    slots: HashMap<MediaSlot, SlotState>,
    reject_play: HashMap<MediaSlot, bool>,
    fullscreen: FullscreenBehavior,
    timers: Vec<(TimerToken, Millis)>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse (or stop refusing) `play` on `slot`
    pub fn reject_plays(&mut self, slot: MediaSlot, reject: bool) {
        self.reject_play.insert(slot, reject);
    }

    pub fn set_fullscreen(&mut self, behavior: FullscreenBehavior) {
        self.fullscreen = behavior;
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn play_count(&self, slot: MediaSlot) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, HostCall::Play(t) if t.slot == slot))
            .count()
    }

    /// Token currently attached to `slot`
    pub fn attached(&self, slot: MediaSlot) -> Option<SessionToken> {
        self.slots.get(&slot).and_then(|s| s.token)
    }

    pub fn source(&self, slot: MediaSlot) -> Option<&str> {
        self.slots.get(&slot).and_then(|s| s.source.as_deref())
    }

    pub fn is_playing(&self, slot: MediaSlot) -> bool {
        self.slots.get(&slot).is_some_and(|s| s.playing)
    }

    pub fn is_muted(&self, slot: MediaSlot) -> bool {
        self.slots.get(&slot).is_some_and(|s| s.muted)
    }

    pub fn position(&self, slot: MediaSlot) -> f64 {
        self.slots.get(&slot).map_or(0.0, |s| s.position)
    }

    /// Timers scheduled and not yet taken, oldest first
    pub fn pending_timers(&self) -> &[(TimerToken, Millis)] {
        &self.timers
    }

    /// Drain the scheduled timers so the test can fire them
    pub fn take_timers(&mut self) -> Vec<(TimerToken, Millis)> {
        std::mem::take(&mut self.timers)
    }

    fn live_slot(&mut self, token: SessionToken) -> AmbResult<&mut SlotState> {
        let slot = self.slots.entry(token.slot).or_default();
        match slot.token {
            Some(current) if current == token => Ok(slot),
            current => Err(AmbError::StaleSession {
                slot: token.slot,
                got: token.generation,
                current: current.map_or(0, |t| t.generation),
            }),
        }
    }
}

impl MediaHost for RecordingHost {
    fn attach(&mut self, token: SessionToken, source: &str, muted: bool) -> AmbResult<()> {
        self.calls.push(HostCall::Attach {
            token,
            source: source.to_owned(),
            muted,
        });
        self.slots.insert(
            token.slot,
            SlotState {
                token: Some(token),
                source: Some(source.to_owned()),
                playing: false,
                muted,
                position: 0.0,
            },
        );
        Ok(())
    }

    fn detach(&mut self, slot: MediaSlot) {
        self.calls.push(HostCall::Detach(slot));
        self.slots.remove(&slot);
    }

    fn play(&mut self, token: SessionToken) -> AmbResult<()> {
        self.calls.push(HostCall::Play(token));
        if self.reject_play.get(&token.slot).copied().unwrap_or(false) {
            return Err(AmbError::PolicyBlocked(format!(
                "play() on {} not allowed",
                token.slot.name()
            )));
        }
        self.live_slot(token)?.playing = true;
        Ok(())
    }

    fn pause(&mut self, token: SessionToken) {
        self.calls.push(HostCall::Pause(token));
        if let Ok(slot) = self.live_slot(token) {
            slot.playing = false;
        }
    }

    fn seek(&mut self, token: SessionToken, secs: f64) {
        self.calls.push(HostCall::Seek(token, secs));
        if let Ok(slot) = self.live_slot(token) {
            slot.position = secs;
        }
    }

    fn set_muted(&mut self, token: SessionToken, muted: bool) {
        self.calls.push(HostCall::SetMuted(token, muted));
        if let Ok(slot) = self.live_slot(token) {
            slot.muted = muted;
        }
    }

    fn request_fullscreen(&mut self) -> AmbResult<FullscreenRequest> {
        self.calls.push(HostCall::RequestFullscreen);
        match self.fullscreen {
            FullscreenBehavior::Enter => Ok(FullscreenRequest::Entered),
            FullscreenBehavior::Pending => Ok(FullscreenRequest::Pending),
            FullscreenBehavior::Reject => {
                Err(AmbError::PolicyBlocked("fullscreen request denied".into()))
            }
        }
    }

    fn schedule_timer(&mut self, token: TimerToken, delay: Millis) {
        self.calls.push(HostCall::ScheduleTimer(token, delay));
        self.timers.push((token, delay));
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDING FEEDBACK
// ═══════════════════════════════════════════════════════════════════════════════

/// Counts tone triggers instead of playing them
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    hovers: Cell<u32>,
    actions: Cell<u32>,
    unlocks: Cell<u32>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovers(&self) -> u32 {
        self.hovers.get()
    }

    pub fn actions(&self) -> u32 {
        self.actions.get()
    }

    pub fn unlocks(&self) -> u32 {
        self.unlocks.get()
    }
}

impl Feedback for RecordingFeedback {
    fn trigger_hover(&self) {
        self.hovers.set(self.hovers.get() + 1);
    }

    fn trigger_action(&self) {
        self.actions.set(self.actions.get() + 1);
    }

    fn unlock(&self) {
        self.unlocks.set(self.unlocks.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_on_stale_token_fails() {
        let mut host = RecordingHost::new();
        let old = SessionToken::new(MediaSlot::Foreground, 1);
        let new = SessionToken::new(MediaSlot::Foreground, 2);
        host.attach(old, "a.mp4", false).unwrap();
        host.attach(new, "b.mp4", false).unwrap();

        assert!(matches!(
            host.play(old),
            Err(AmbError::StaleSession { got: 1, current: 2, .. })
        ));
        host.play(new).unwrap();
        assert!(host.is_playing(MediaSlot::Foreground));
        assert_eq!(host.source(MediaSlot::Foreground), Some("b.mp4"));
    }

    #[test]
    fn test_rejected_play_is_recorded() {
        let mut host = RecordingHost::new();
        let token = SessionToken::new(MediaSlot::Ambient, 1);
        host.attach(token, "loop.mp3", true).unwrap();
        host.reject_plays(MediaSlot::Ambient, true);

        assert!(host.play(token).unwrap_err().is_policy_block());
        assert_eq!(host.play_count(MediaSlot::Ambient), 1);
        assert!(!host.is_playing(MediaSlot::Ambient));
    }
}
