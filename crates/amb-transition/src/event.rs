//! Typed controller events
//!
//! Every user intent and platform callback the controller reacts to, as one
//! enum. Bindings that cannot call the controller re-entrantly (DOM listeners
//! firing inside a controller call) queue these and feed them through
//! `TransitionController::dispatch` afterwards.

use amb_core::SessionToken;
use serde::{Deserialize, Serialize};

use crate::media::TimerToken;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransitionEvent {
    // User intents
    InitialPlayRequested,
    FullscreenEnterRequested,
    Gesture,
    StorySelected { media_ref: String, story_id: String },
    ModalClosed,
    MuteToggled,
    IntroReplayRequested { source: String },
    Hover,
    Action,

    // Platform callbacks
    FullscreenChanged { active: bool },
    FullscreenRejected,
    PlayRejected { token: SessionToken },
    MediaEnded { token: SessionToken },
    LoadedData { token: SessionToken, duration: f64 },
    TimeUpdate {
        token: SessionToken,
        current_time: f64,
        duration: f64,
    },
    Timer { token: TimerToken },
}

impl TransitionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TransitionEvent::InitialPlayRequested => "initial_play_requested",
            TransitionEvent::FullscreenEnterRequested => "fullscreen_enter_requested",
            TransitionEvent::Gesture => "gesture",
            TransitionEvent::StorySelected { .. } => "story_selected",
            TransitionEvent::ModalClosed => "modal_closed",
            TransitionEvent::MuteToggled => "mute_toggled",
            TransitionEvent::IntroReplayRequested { .. } => "intro_replay_requested",
            TransitionEvent::Hover => "hover",
            TransitionEvent::Action => "action",
            TransitionEvent::FullscreenChanged { .. } => "fullscreen_changed",
            TransitionEvent::FullscreenRejected => "fullscreen_rejected",
            TransitionEvent::PlayRejected { .. } => "play_rejected",
            TransitionEvent::MediaEnded { .. } => "media_ended",
            TransitionEvent::LoadedData { .. } => "loaded_data",
            TransitionEvent::TimeUpdate { .. } => "time_update",
            TransitionEvent::Timer { .. } => "timer",
        }
    }

    /// Fired many times a second; logged at trace only
    pub fn is_high_frequency(&self) -> bool {
        matches!(
            self,
            TransitionEvent::TimeUpdate { .. } | TransitionEvent::Hover
        )
    }
}
