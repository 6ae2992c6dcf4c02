//! Ambience Transition Controller
//!
//! Drives a dashboard session from the locked intro to the dashboard and its
//! story modal:
//!
//! ```text
//! IntroLocked ──gesture──▶ IntroPlaying ──ended──▶ FadingOut ──700ms──▶ DashboardVisible
//!      ▲                        │                                         │      ▲
//!      └──── play rejected ─────┘                              select_story│      │close_modal
//!                                                                          ▼      │
//!                                                                       ModalPlaying
//! ```
//!
//! - Media is only started after a genuine gesture (fullscreen first,
//!   direct play as fallback)
//! - Every attach produces a fresh [`amb_core::SessionToken`]; callbacks
//!   carrying an old token are dropped
//! - Watch progress is owned here, clamped and rounded
//! - The ambient loop restarts manually so the mute state is re-applied on
//!   every pass

pub mod controller;
pub mod event;
pub mod media;
pub mod progress;
pub mod recording;
pub mod state;

pub use controller::{HISTORY_CAPACITY, Transition, TransitionController};
pub use event::TransitionEvent;
pub use media::{FullscreenRequest, MediaHost, PlaybackSession, TimerKind, TimerToken};
pub use progress::{StoryId, WatchProgress};
pub use recording::{FullscreenBehavior, HostCall, RecordingFeedback, RecordingHost};
pub use state::{SurfaceView, TransitionState, TransitionTiming};
