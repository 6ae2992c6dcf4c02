//! Transition states and presentation config

use amb_core::Millis;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSITION STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Where the session is in the intro → dashboard → modal flow
///
/// `IntroLocked` is the only initial state. There is no terminal state;
/// `DashboardVisible` is where the session settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionState {
    /// Waiting for the first gesture; play prompt shown
    #[default]
    IntroLocked,
    /// Intro video running
    IntroPlaying,
    /// Intro ended, video layer fading out
    FadingOut,
    /// Dashboard mounted
    DashboardVisible,
    /// Story video open over the dashboard
    ModalPlaying,
}

impl TransitionState {
    pub fn name(&self) -> &'static str {
        match self {
            TransitionState::IntroLocked => "INTRO_LOCKED",
            TransitionState::IntroPlaying => "INTRO_PLAYING",
            TransitionState::FadingOut => "FADING_OUT",
            TransitionState::DashboardVisible => "DASHBOARD_VISIBLE",
            TransitionState::ModalPlaying => "MODAL_PLAYING",
        }
    }

    /// Dashboard layer is in the tree
    #[inline]
    pub fn dashboard_mounted(&self) -> bool {
        matches!(
            self,
            TransitionState::DashboardVisible | TransitionState::ModalPlaying
        )
    }

    /// Whether a legal single step leads from `self` to `next`
    pub fn can_step_to(&self, next: TransitionState) -> bool {
        use TransitionState::*;
        matches!(
            (self, next),
            (IntroLocked, IntroPlaying)
                | (IntroPlaying, FadingOut)
                | (IntroPlaying, IntroLocked)
                | (FadingOut, DashboardVisible)
                | (DashboardVisible, ModalPlaying)
                | (DashboardVisible, IntroPlaying)
                | (ModalPlaying, DashboardVisible)
        )
    }
}

impl std::fmt::Display for TransitionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TIMING
// ═══════════════════════════════════════════════════════════════════════════════

/// Presentation timing. Fixed by design; injected rather than loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionTiming {
    /// Intro layer cross-fade after the video ends
    pub fade_out: Millis,
    /// Gap between mounting the dashboard and starting its fade-in
    pub reveal_delay: Millis,
}

impl Default for TransitionTiming {
    fn default() -> Self {
        Self {
            fade_out: Millis(700),
            reveal_delay: Millis(16),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SURFACE VIEW
// ═══════════════════════════════════════════════════════════════════════════════

/// Everything a renderer needs to draw the layers for the current state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceView {
    pub state: TransitionState,
    /// "Enter fullscreen" prompt over the intro
    pub show_play_prompt: bool,
    /// Target opacity of the intro video layer
    pub intro_opacity: f32,
    pub dashboard_mounted: bool,
    /// Target opacity of the dashboard layer
    pub dashboard_opacity: f32,
    pub modal_open: bool,
    pub modal_story: Option<String>,
    pub ambient_muted: bool,
    /// CSS transition length for both opacity changes
    pub fade_ms: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        assert_eq!(TransitionState::default(), TransitionState::IntroLocked);
    }

    #[test]
    fn test_dashboard_only_reachable_through_fade_or_modal() {
        use TransitionState::*;
        let all = [IntroLocked, IntroPlaying, FadingOut, DashboardVisible, ModalPlaying];
        let sources: Vec<_> = all
            .iter()
            .filter(|s| s.can_step_to(DashboardVisible))
            .copied()
            .collect();
        assert_eq!(sources, vec![FadingOut, ModalPlaying]);
    }

    #[test]
    fn test_state_serializes_screaming() {
        let json = serde_json::to_string(&TransitionState::DashboardVisible).unwrap();
        assert_eq!(json, "\"DASHBOARD_VISIBLE\"");
    }

    #[test]
    fn test_default_fade_is_700ms() {
        assert_eq!(TransitionTiming::default().fade_out, Millis(700));
    }
}
