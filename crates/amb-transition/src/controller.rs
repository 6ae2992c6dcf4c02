//! Transition Controller
//!
//! One state machine per dashboard session. User intents and platform
//! callbacks come in as method calls (or [`TransitionEvent`]s through
//! [`TransitionController::dispatch`]); side effects go out through the
//! [`MediaHost`] and the [`Feedback`] handle. Nothing here blocks and no
//! failure escapes: a refused side effect leaves the state where it was.

use std::collections::VecDeque;

use amb_core::{MediaSlot, SessionToken};
use amb_tone::Feedback;
use serde::{Deserialize, Serialize};

use crate::event::TransitionEvent;
use crate::media::{
    FullscreenRequest, Generations, MediaHost, PlaybackSession, TimerKind, TimerToken,
};
use crate::progress::{StoryId, WatchProgress};
use crate::state::{SurfaceView, TransitionState, TransitionTiming};

/// Transitions kept for inspection
pub const HISTORY_CAPACITY: usize = 64;

/// One recorded state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: TransitionState,
    pub to: TransitionState,
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONTROLLER
// ═══════════════════════════════════════════════════════════════════════════════

pub struct TransitionController<H: MediaHost, F: Feedback> {
    host: H,
    feedback: F,
    timing: TransitionTiming,
    state: TransitionState,

    generations: Generations,
    foreground: Option<PlaybackSession>,
    ambient: Option<PlaybackSession>,
    modal_story: Option<StoryId>,

    gesture_seen: bool,
    pending_unmute: bool,
    dashboard_fading_in: bool,

    timer_generation: u64,
    pending_timer: Option<TimerToken>,

    progress: WatchProgress,
    history: VecDeque<Transition>,
}

impl<H: MediaHost, F: Feedback> TransitionController<H, F> {
    /// Attach the intro to the foreground slot and the ambient track muted.
    /// Nothing plays until the first gesture.
    pub fn new(host: H, feedback: F, intro_src: &str, ambient_src: &str) -> Self {
        Self::with_timing(host, feedback, intro_src, ambient_src, TransitionTiming::default())
    }

    pub fn with_timing(
        host: H,
        feedback: F,
        intro_src: &str,
        ambient_src: &str,
        timing: TransitionTiming,
    ) -> Self {
        let mut controller = Self {
            host,
            feedback,
            timing,
            state: TransitionState::IntroLocked,
            generations: Generations::default(),
            foreground: None,
            ambient: None,
            modal_story: None,
            gesture_seen: false,
            pending_unmute: false,
            dashboard_fading_in: false,
            timer_generation: 0,
            pending_timer: None,
            progress: WatchProgress::new(),
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
        };
        controller.foreground = controller.attach(MediaSlot::Foreground, intro_src, false);
        controller.ambient = controller.attach(MediaSlot::Ambient, ambient_src, true);
        log::info!(
            "[Transition] Session ready (intro: {}, ambient: {})",
            intro_src,
            ambient_src
        );
        controller
    }

    // ─── Accessors ─────────────────────────────────────────────────────────

    pub fn state(&self) -> TransitionState {
        self.state
    }

    pub fn timing(&self) -> &TransitionTiming {
        &self.timing
    }

    pub fn progress(&self) -> &WatchProgress {
        &self.progress
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    pub fn gesture_seen(&self) -> bool {
        self.gesture_seen
    }

    /// A missing ambient session counts as muted
    pub fn is_ambient_muted(&self) -> bool {
        self.ambient.as_ref().is_none_or(|s| s.muted)
    }

    /// An unmute is waiting for the next gesture
    pub fn has_pending_unmute(&self) -> bool {
        self.pending_unmute
    }

    pub fn modal_story(&self) -> Option<&str> {
        self.modal_story.as_deref()
    }

    pub fn foreground_token(&self) -> Option<SessionToken> {
        self.foreground.as_ref().map(|s| s.token)
    }

    pub fn ambient_token(&self) -> Option<SessionToken> {
        self.ambient.as_ref().map(|s| s.token)
    }

    pub fn foreground_session(&self) -> Option<&PlaybackSession> {
        self.foreground.as_ref()
    }

    pub fn ambient_session(&self) -> Option<&PlaybackSession> {
        self.ambient.as_ref()
    }

    /// Most recent transitions, oldest first
    pub fn recent_transitions(&self) -> impl Iterator<Item = &Transition> {
        self.history.iter()
    }

    pub fn view(&self) -> SurfaceView {
        let mounted = self.state.dashboard_mounted();
        SurfaceView {
            state: self.state,
            show_play_prompt: self.state == TransitionState::IntroLocked,
            intro_opacity: match self.state {
                TransitionState::IntroLocked | TransitionState::IntroPlaying => 1.0,
                _ => 0.0,
            },
            dashboard_mounted: mounted,
            dashboard_opacity: if mounted && self.dashboard_fading_in {
                1.0
            } else {
                0.0
            },
            modal_open: self.state == TransitionState::ModalPlaying,
            modal_story: self.modal_story.clone(),
            ambient_muted: self.is_ambient_muted(),
            fade_ms: self.timing.fade_out.0,
        }
    }

    // ─── Event entry point ─────────────────────────────────────────────────

    pub fn dispatch(&mut self, event: TransitionEvent) {
        if event.is_high_frequency() {
            log::trace!("[Transition] event {}", event.name());
        } else {
            log::debug!("[Transition] event {} in {}", event.name(), self.state);
        }

        match event {
            TransitionEvent::InitialPlayRequested => self.request_initial_play(),
            TransitionEvent::FullscreenEnterRequested => self.request_fullscreen_enter(),
            TransitionEvent::Gesture => self.report_gesture(),
            TransitionEvent::StorySelected { media_ref, story_id } => {
                self.select_story(&media_ref, &story_id)
            }
            TransitionEvent::ModalClosed => self.close_modal(),
            TransitionEvent::MuteToggled => self.toggle_mute(),
            TransitionEvent::IntroReplayRequested { source } => self.replay_intro(&source),
            TransitionEvent::Hover => self.hover(),
            TransitionEvent::Action => self.action(),
            TransitionEvent::FullscreenChanged { active } => self.on_fullscreen_change(active),
            TransitionEvent::FullscreenRejected => self.on_fullscreen_rejected(),
            TransitionEvent::PlayRejected { token } => self.on_play_rejected(token),
            TransitionEvent::MediaEnded { token } => self.on_media_ended(token),
            TransitionEvent::LoadedData { token, duration } => self.on_loaded_data(token, duration),
            TransitionEvent::TimeUpdate {
                token,
                current_time,
                duration,
            } => self.on_time_update(token, current_time, duration),
            TransitionEvent::Timer { token } => self.on_timer(token),
        }
    }

    // ─── Gestures and intro unlock ─────────────────────────────────────────

    /// Any genuine user interaction
    pub fn report_gesture(&mut self) {
        if !self.gesture_seen {
            log::info!("[Transition] First user gesture");
        }
        self.gesture_seen = true;
        self.feedback.unlock();
        if self.pending_unmute {
            self.try_unmute();
        }
    }

    /// Direct play, the fallback when fullscreen is unavailable
    pub fn request_initial_play(&mut self) {
        self.report_gesture();
        self.begin_intro();
    }

    /// The canonical first gesture
    pub fn request_fullscreen_enter(&mut self) {
        if self.state != TransitionState::IntroLocked {
            log::debug!("[Transition] Fullscreen request ignored in {}", self.state);
            return;
        }
        self.report_gesture();

        match self.host.request_fullscreen() {
            Ok(FullscreenRequest::Entered) => self.on_fullscreen_change(true),
            Ok(FullscreenRequest::Pending) => {
                log::debug!("[Transition] Fullscreen pending");
            }
            Err(e) => {
                log::debug!("[Transition] Fullscreen refused ({}), playing directly", e);
                self.begin_intro();
            }
        }
    }

    pub fn on_fullscreen_change(&mut self, active: bool) {
        if !active {
            log::debug!("[Transition] Left fullscreen");
            return;
        }
        self.report_gesture();
        self.begin_intro();
    }

    pub fn on_fullscreen_rejected(&mut self) {
        log::debug!("[Transition] Fullscreen rejected, falling back to direct play");
        self.request_initial_play();
    }

    /// `IntroLocked → IntroPlaying`. Idempotent; a failed play keeps the lock.
    fn begin_intro(&mut self) {
        if self.state != TransitionState::IntroLocked {
            return;
        }
        let Some(token) = self.foreground_token() else {
            log::warn!("[Transition] No intro attached");
            return;
        };

        match self.host.play(token) {
            Ok(()) => {
                self.set_state(TransitionState::IntroPlaying);
                self.feedback.trigger_action();
            }
            Err(e) => log_play_failure("intro", &e),
        }
    }

    // ─── Dashboard and modal ───────────────────────────────────────────────

    pub fn select_story(&mut self, media_ref: &str, story_id: &str) {
        if self.state != TransitionState::DashboardVisible {
            log::debug!("[Transition] Story {} ignored in {}", story_id, self.state);
            return;
        }
        self.gesture_seen = true;

        let Some(session) = self.attach(MediaSlot::Foreground, media_ref, false) else {
            return;
        };
        let token = session.token;
        self.foreground = Some(session);

        match self.host.play(token) {
            Ok(()) => {
                self.modal_story = Some(story_id.to_owned());
                self.set_state(TransitionState::ModalPlaying);
                self.feedback.trigger_action();
            }
            Err(e) => {
                log_play_failure("story", &e);
                self.detach_foreground();
            }
        }
    }

    pub fn close_modal(&mut self) {
        if self.state != TransitionState::ModalPlaying {
            return;
        }
        if let Some(token) = self.foreground_token() {
            self.host.pause(token);
        }
        self.detach_foreground();
        self.modal_story = None;
        self.set_state(TransitionState::DashboardVisible);
        self.feedback.trigger_action();
    }

    /// Theme switch: play a different intro from the dashboard, then fade
    /// back through the normal intro path
    pub fn replay_intro(&mut self, source: &str) {
        if self.state != TransitionState::DashboardVisible {
            log::debug!("[Transition] Intro replay ignored in {}", self.state);
            return;
        }
        let Some(session) = self.attach(MediaSlot::Foreground, source, false) else {
            return;
        };
        let token = session.token;
        self.foreground = Some(session);

        match self.host.play(token) {
            Ok(()) => {
                self.dashboard_fading_in = false;
                self.set_state(TransitionState::IntroPlaying);
            }
            Err(e) => {
                log_play_failure("intro replay", &e);
                self.detach_foreground();
            }
        }
    }

    // ─── Ambient mute ──────────────────────────────────────────────────────

    pub fn toggle_mute(&mut self) {
        self.feedback.trigger_action();

        if self.is_ambient_muted() {
            if self.gesture_seen {
                self.try_unmute();
            } else {
                log::debug!("[Transition] Unmute deferred until a gesture");
                self.pending_unmute = true;
            }
        } else {
            self.pending_unmute = false;
            if let Some(token) = self.ambient_token() {
                self.set_ambient_muted(token, true);
                self.host.pause(token);
            }
        }
    }

    fn try_unmute(&mut self) {
        self.pending_unmute = false;
        let Some(token) = self.ambient_token() else {
            return;
        };

        self.set_ambient_muted(token, false);
        if let Err(e) = self.host.play(token) {
            log_play_failure("ambient", &e);
            self.set_ambient_muted(token, true);
            self.pending_unmute = true;
        }
    }

    // ─── Feedback pass-through ─────────────────────────────────────────────

    pub fn hover(&self) {
        self.feedback.trigger_hover();
    }

    pub fn action(&self) {
        self.feedback.trigger_action();
    }

    // ─── Platform callbacks ────────────────────────────────────────────────

    /// Asynchronous refusal of an earlier `play`
    pub fn on_play_rejected(&mut self, token: SessionToken) {
        if !self.is_current(token) {
            log::debug!("[Transition] Stale play rejection for {:?}", token);
            return;
        }

        match (token.slot, self.state) {
            // Muted since the play was issued; a pause interrupting it
            // rejects too, and must not bring the sound back later
            (MediaSlot::Ambient, _) if self.is_ambient_muted() && !self.pending_unmute => {
                log::debug!("[Transition] Ambient play rejected while muted, ignored");
            }
            (MediaSlot::Ambient, _) => {
                log::debug!("[Transition] Ambient play rejected, re-muting");
                self.set_ambient_muted(token, true);
                self.pending_unmute = true;
            }
            (MediaSlot::Foreground, TransitionState::IntroPlaying) => {
                log::debug!("[Transition] Intro play rejected, prompting again");
                self.set_state(TransitionState::IntroLocked);
            }
            (MediaSlot::Foreground, TransitionState::ModalPlaying) => {
                log::debug!("[Transition] Story play rejected, closing modal");
                self.detach_foreground();
                self.modal_story = None;
                self.set_state(TransitionState::DashboardVisible);
            }
            (MediaSlot::Foreground, state) => {
                log::debug!("[Transition] Play rejection ignored in {}", state);
            }
        }
    }

    pub fn on_media_ended(&mut self, token: SessionToken) {
        if !self.is_current(token) {
            log::debug!("[Transition] Stale ended for {:?}", token);
            return;
        }

        match token.slot {
            MediaSlot::Ambient => {
                // Manual loop restart; mute state is re-applied at the boundary
                self.host.seek(token, 0.0);
                let muted = self.is_ambient_muted();
                self.host.set_muted(token, muted);
                if let Some(session) = self.ambient.as_mut() {
                    session.position = 0.0;
                }
                if let Err(e) = self.host.play(token) {
                    log_play_failure("ambient loop", &e);
                }
            }
            MediaSlot::Foreground if self.state == TransitionState::IntroPlaying => {
                self.set_state(TransitionState::FadingOut);
                self.schedule(TimerKind::FadeOut);
            }
            MediaSlot::Foreground => {
                log::debug!("[Transition] Foreground ended in {}", self.state);
            }
        }
    }

    /// Rewind the foreground and remember its duration
    pub fn on_loaded_data(&mut self, token: SessionToken, duration: f64) {
        if !self.is_current(token) {
            return;
        }
        if token.slot == MediaSlot::Foreground {
            self.host.seek(token, 0.0);
            if let Some(session) = self.foreground.as_mut() {
                session.position = 0.0;
                session.duration = (duration.is_finite() && duration > 0.0).then_some(duration);
            }
        }
    }

    /// Modal progress. Samples from detached or replaced elements are dropped.
    pub fn on_time_update(&mut self, token: SessionToken, current_time: f64, duration: f64) {
        if token.slot != MediaSlot::Foreground
            || !self.is_current(token)
            || self.state != TransitionState::ModalPlaying
        {
            return;
        }
        let Some(story) = self.modal_story.as_deref() else {
            return;
        };
        if let Some(session) = self.foreground.as_mut() {
            session.position = current_time;
        }

        // Unknown or zero duration leaves the map untouched
        if let Some(pct) = self.progress.record(story, current_time, duration) {
            log::trace!("[Transition] {} watched {}%", story, pct);
        }
    }

    pub fn on_timer(&mut self, token: TimerToken) {
        if self.pending_timer != Some(token) {
            log::debug!("[Transition] Stale timer {:?}", token);
            return;
        }
        self.pending_timer = None;

        match token.kind {
            TimerKind::FadeOut if self.state == TransitionState::FadingOut => {
                // Intro layer is gone once the dashboard mounts
                self.detach_foreground();
                self.dashboard_fading_in = false;
                self.set_state(TransitionState::DashboardVisible);
                self.schedule(TimerKind::Reveal);
            }
            TimerKind::Reveal if self.state.dashboard_mounted() => {
                self.dashboard_fading_in = true;
            }
            kind => log::debug!("[Transition] Timer {:?} ignored in {}", kind, self.state),
        }
    }

    // ─── Internals ─────────────────────────────────────────────────────────

    fn set_state(&mut self, next: TransitionState) {
        if self.state == next {
            return;
        }
        debug_assert!(
            self.state.can_step_to(next),
            "illegal transition {} → {}",
            self.state,
            next
        );
        log::info!("[Transition] {} → {}", self.state, next);

        if self.history.len() == HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(Transition {
            from: self.state,
            to: next,
        });
        self.state = next;
    }

    fn attach(&mut self, slot: MediaSlot, source: &str, muted: bool) -> Option<PlaybackSession> {
        let token = self.generations.next(slot);
        match self.host.attach(token, source, muted) {
            Ok(()) => Some(PlaybackSession::new(token, source, muted)),
            Err(e) => {
                log::warn!("[Transition] Attach {} to {} failed: {}", source, slot.name(), e);
                None
            }
        }
    }

    fn set_ambient_muted(&mut self, token: SessionToken, muted: bool) {
        self.host.set_muted(token, muted);
        if let Some(session) = self.ambient.as_mut() {
            session.muted = muted;
        }
    }

    fn detach_foreground(&mut self) {
        if self.foreground.take().is_some() {
            self.host.detach(MediaSlot::Foreground);
        }
    }

    fn is_current(&self, token: SessionToken) -> bool {
        let session = match token.slot {
            MediaSlot::Foreground => self.foreground.as_ref(),
            MediaSlot::Ambient => self.ambient.as_ref(),
        };
        session.is_some_and(|s| s.token == token)
    }

    fn schedule(&mut self, kind: TimerKind) {
        self.timer_generation += 1;
        let token = TimerToken {
            kind,
            generation: self.timer_generation,
        };
        let delay = match kind {
            TimerKind::FadeOut => self.timing.fade_out,
            TimerKind::Reveal => self.timing.reveal_delay,
        };
        self.pending_timer = Some(token);
        self.host.schedule_timer(token, delay);
    }
}

fn log_play_failure(what: &str, e: &amb_core::AmbError) {
    if e.is_policy_block() {
        log::debug!("[Transition] {} play blocked: {}", what, e);
    } else {
        log::warn!("[Transition] {} play failed: {}", what, e);
    }
}
