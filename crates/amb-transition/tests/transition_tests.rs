//! TransitionController Integration Tests
//!
//! Tests for:
//! - Full session: fullscreen unlock, fade, dashboard, modal, progress
//! - Gesture gating and fallbacks when fullscreen or play is refused
//! - Stale media and timer callbacks
//! - Ambient mute, deferred unmute and the manual loop restart
//! - Progress clamping for arbitrary time updates
//! - Wiring to the real tone engine

use amb_core::{MediaSlot, Millis, SessionToken};
use amb_tone::{OfflinePlatform, ToneEngine};
use amb_transition::{
    FullscreenBehavior, HostCall, RecordingFeedback, RecordingHost, TimerKind, TransitionController,
    TransitionEvent, TransitionState, TransitionTiming, WatchProgress,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ═══════════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

type TestController = TransitionController<RecordingHost, RecordingFeedback>;

fn controller() -> TestController {
    TransitionController::new(
        RecordingHost::new(),
        RecordingFeedback::new(),
        "/media/intro.mp4",
        "/media/ambient.mp3",
    )
}

/// Fire every scheduled timer, in order, until none are left
fn run_timers(c: &mut TestController) {
    loop {
        let timers = c.host_mut().take_timers();
        if timers.is_empty() {
            break;
        }
        for (token, _) in timers {
            c.on_timer(token);
        }
    }
}

/// Walk a fresh session to the dashboard
fn at_dashboard() -> TestController {
    let mut c = controller();
    c.request_fullscreen_enter();
    let intro = c.foreground_token().unwrap();
    c.on_media_ended(intro);
    run_timers(&mut c);
    assert_eq!(c.state(), TransitionState::DashboardVisible);
    c
}

// ═══════════════════════════════════════════════════════════════════════════════
// FULL SESSION
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_full_session_scenario() {
    let mut c = controller();
    assert_eq!(c.state(), TransitionState::IntroLocked);

    c.request_fullscreen_enter();
    assert_eq!(c.state(), TransitionState::IntroPlaying);
    assert_eq!(c.feedback().actions(), 1);
    assert!(c.host().is_playing(MediaSlot::Foreground));

    let intro = c.foreground_token().unwrap();
    c.on_media_ended(intro);
    assert_eq!(c.state(), TransitionState::FadingOut);

    let timers = c.host_mut().take_timers();
    assert_eq!(timers.len(), 1);
    assert_eq!(timers[0].0.kind, TimerKind::FadeOut);
    assert_eq!(timers[0].1, Millis(700));
    c.on_timer(timers[0].0);
    assert_eq!(c.state(), TransitionState::DashboardVisible);
    run_timers(&mut c);
    assert!(c.view().dashboard_opacity > 0.99);

    c.select_story("/media/s1.mp4", "s1");
    assert_eq!(c.state(), TransitionState::ModalPlaying);
    assert_eq!(c.feedback().actions(), 2);
    assert_eq!(c.host().source(MediaSlot::Foreground), Some("/media/s1.mp4"));

    let modal = c.foreground_token().unwrap();
    let mut seen = Vec::new();
    for t in [25.0, 50.0, 90.0] {
        c.on_time_update(modal, t, 100.0);
        seen.push(c.progress().get("s1").unwrap());
    }
    assert_eq!(seen, vec![25, 50, 90]);

    c.close_modal();
    assert_eq!(c.state(), TransitionState::DashboardVisible);
    assert_eq!(c.host().attached(MediaSlot::Foreground), None);

    // Late update from the detached element
    c.on_time_update(modal, 99.0, 100.0);
    assert_eq!(c.progress().get("s1"), Some(90));
}

#[test]
fn test_dashboard_never_skips_fading_out() {
    let c = at_dashboard();
    let path: Vec<_> = c.recent_transitions().map(|t| (t.from, t.to)).collect();
    assert_eq!(
        path,
        vec![
            (TransitionState::IntroLocked, TransitionState::IntroPlaying),
            (TransitionState::IntroPlaying, TransitionState::FadingOut),
            (TransitionState::FadingOut, TransitionState::DashboardVisible),
        ]
    );
    assert!(c.recent_transitions().all(|t| t.from.can_step_to(t.to)));
}

#[test]
fn test_dispatch_drives_same_machine() {
    let mut c = controller();
    c.dispatch(TransitionEvent::FullscreenEnterRequested);
    let intro = c.foreground_token().unwrap();
    c.dispatch(TransitionEvent::MediaEnded { token: intro });
    for (token, _) in c.host_mut().take_timers() {
        c.dispatch(TransitionEvent::Timer { token });
    }
    c.dispatch(TransitionEvent::StorySelected {
        media_ref: "/media/s2.mp4".into(),
        story_id: "s2".into(),
    });
    assert_eq!(c.state(), TransitionState::ModalPlaying);
    c.dispatch(TransitionEvent::ModalClosed);
    assert_eq!(c.state(), TransitionState::DashboardVisible);
}

// ═══════════════════════════════════════════════════════════════════════════════
// GESTURE GATING
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_fullscreen_entry_fires_action_once() {
    let mut c = controller();
    c.host_mut().set_fullscreen(FullscreenBehavior::Pending);

    c.request_fullscreen_enter();
    assert_eq!(c.state(), TransitionState::IntroLocked);

    c.on_fullscreen_change(true);
    c.on_fullscreen_change(true);
    c.request_initial_play();

    assert_eq!(c.state(), TransitionState::IntroPlaying);
    assert_eq!(c.feedback().actions(), 1);
    assert_eq!(c.host().play_count(MediaSlot::Foreground), 1);
}

#[test]
fn test_fullscreen_refused_falls_back_to_direct_play() {
    let mut c = controller();
    c.host_mut().set_fullscreen(FullscreenBehavior::Reject);

    c.request_fullscreen_enter();
    assert_eq!(c.state(), TransitionState::IntroPlaying);
    assert_eq!(c.feedback().actions(), 1);
}

#[test]
fn test_async_fullscreen_rejection_falls_back() {
    let mut c = controller();
    c.host_mut().set_fullscreen(FullscreenBehavior::Pending);

    c.request_fullscreen_enter();
    c.on_fullscreen_rejected();
    assert_eq!(c.state(), TransitionState::IntroPlaying);
}

#[test]
fn test_intro_play_failure_keeps_lock() {
    let mut c = controller();
    c.host_mut().reject_plays(MediaSlot::Foreground, true);

    c.request_fullscreen_enter();
    assert_eq!(c.state(), TransitionState::IntroLocked);
    assert_eq!(c.feedback().actions(), 0);
    assert!(c.view().show_play_prompt);

    c.host_mut().reject_plays(MediaSlot::Foreground, false);
    c.request_initial_play();
    assert_eq!(c.state(), TransitionState::IntroPlaying);
}

#[test]
fn test_async_intro_rejection_shows_prompt_again() {
    let mut c = controller();
    c.request_initial_play();
    let intro = c.foreground_token().unwrap();

    c.on_play_rejected(intro);
    assert_eq!(c.state(), TransitionState::IntroLocked);
    assert!(c.view().show_play_prompt);
}

#[test]
fn test_no_foreground_play_before_gesture() {
    let mut c = controller();
    let intro = c.foreground_token().unwrap();

    c.on_loaded_data(intro, 30.0);
    c.on_fullscreen_change(false);
    c.on_media_ended(intro);
    c.close_modal();
    c.select_story("/media/s1.mp4", "s1");

    assert_eq!(c.host().play_count(MediaSlot::Foreground), 0);
    assert_eq!(c.state(), TransitionState::IntroLocked);
}

// ═══════════════════════════════════════════════════════════════════════════════
// STALE CALLBACKS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_ended_from_old_intro_is_ignored() {
    let mut c = at_dashboard();
    c.replay_intro("/media/intro-dark.mp4");
    assert_eq!(c.state(), TransitionState::IntroPlaying);

    let stale = SessionToken::new(MediaSlot::Foreground, 1);
    c.on_media_ended(stale);
    assert_eq!(c.state(), TransitionState::IntroPlaying);

    let current = c.foreground_token().unwrap();
    c.on_media_ended(current);
    run_timers(&mut c);
    assert_eq!(c.state(), TransitionState::DashboardVisible);
}

#[test]
fn test_replay_intro_is_silent() {
    let mut c = at_dashboard();
    let before = c.feedback().actions();
    c.replay_intro("/media/intro-dark.mp4");
    assert_eq!(c.feedback().actions(), before);
    assert_eq!(
        c.host().source(MediaSlot::Foreground),
        Some("/media/intro-dark.mp4")
    );
}

#[test]
fn test_superseded_timer_is_ignored() {
    let mut c = at_dashboard();
    let fade = amb_transition::TimerToken {
        kind: TimerKind::FadeOut,
        generation: 1,
    };
    c.on_timer(fade);
    assert_eq!(c.state(), TransitionState::DashboardVisible);
    assert_eq!(c.recent_transitions().count(), 3);
}

#[test]
fn test_story_play_failure_stays_on_dashboard() {
    let mut c = at_dashboard();
    c.host_mut().reject_plays(MediaSlot::Foreground, true);

    c.select_story("/media/s1.mp4", "s1");
    assert_eq!(c.state(), TransitionState::DashboardVisible);
    assert_eq!(c.host().attached(MediaSlot::Foreground), None);
    assert!(c.modal_story().is_none());
}

#[test]
fn test_async_story_rejection_closes_modal() {
    let mut c = at_dashboard();
    c.select_story("/media/s1.mp4", "s1");
    let modal = c.foreground_token().unwrap();

    c.on_play_rejected(modal);
    assert_eq!(c.state(), TransitionState::DashboardVisible);
    assert!(!c.view().modal_open);

    c.on_time_update(modal, 10.0, 20.0);
    assert!(c.progress().is_empty());
}

#[test]
fn test_progress_skips_unknown_duration() {
    let mut c = at_dashboard();
    c.select_story("/media/s1.mp4", "s1");
    let modal = c.foreground_token().unwrap();

    c.on_time_update(modal, 3.0, f64::NAN);
    c.on_time_update(modal, 3.0, 0.0);
    assert!(c.progress().get("s1").is_none());

    // A duration seen at loadeddata does not stand in for the sample's own
    c.on_loaded_data(modal, 12.0);
    assert_eq!(c.host().position(MediaSlot::Foreground), 0.0);
    c.on_time_update(modal, 3.0, 0.0);
    c.on_time_update(modal, 3.0, f64::NAN);
    c.on_time_update(modal, 3.0, f64::INFINITY);
    assert!(c.progress().is_empty());

    c.on_time_update(modal, 3.0, 12.0);
    assert_eq!(c.progress().get("s1"), Some(25));
}

#[test]
fn test_foreground_session_tracks_position() {
    let mut c = at_dashboard();
    c.select_story("/media/s1.mp4", "s1");
    let modal = c.foreground_token().unwrap();

    c.on_loaded_data(modal, 20.0);
    c.on_time_update(modal, 7.5, 20.0);

    let session = c.foreground_session().unwrap();
    assert_eq!(session.source, "/media/s1.mp4");
    assert!(!session.muted);
    assert_eq!(session.duration, Some(20.0));
    assert!((session.position - 7.5).abs() < 1e-9);
}

// ═══════════════════════════════════════════════════════════════════════════════
// AMBIENT MUTE
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_toggle_mute_before_gesture_stays_muted() {
    let mut c = controller();

    c.toggle_mute();
    assert!(c.is_ambient_muted());
    assert!(c.has_pending_unmute());
    assert!(c.host().is_muted(MediaSlot::Ambient));
    assert_eq!(c.host().play_count(MediaSlot::Ambient), 0);
    assert_eq!(c.feedback().actions(), 1);

    // Deferred unmute runs on the next gesture
    c.report_gesture();
    assert!(!c.is_ambient_muted());
    assert!(!c.has_pending_unmute());
    assert!(c.host().is_playing(MediaSlot::Ambient));
}

#[test]
fn test_toggle_mute_round_trip_after_gesture() {
    let mut c = at_dashboard();

    c.toggle_mute();
    assert!(!c.is_ambient_muted());
    assert!(c.host().is_playing(MediaSlot::Ambient));

    c.toggle_mute();
    assert!(c.is_ambient_muted());
    assert!(c.host().is_muted(MediaSlot::Ambient));
    assert!(!c.host().is_playing(MediaSlot::Ambient));
}

#[test]
fn test_rejected_unmute_retries_on_next_gesture() {
    let mut c = at_dashboard();
    c.host_mut().reject_plays(MediaSlot::Ambient, true);

    c.toggle_mute();
    assert!(c.is_ambient_muted());
    assert!(c.host().is_muted(MediaSlot::Ambient));
    assert!(c.has_pending_unmute());

    c.host_mut().reject_plays(MediaSlot::Ambient, false);
    c.report_gesture();
    assert!(!c.is_ambient_muted());
}

#[test]
fn test_async_ambient_rejection_remutes() {
    let mut c = at_dashboard();
    c.toggle_mute();
    let ambient = c.ambient_token().unwrap();

    c.on_play_rejected(ambient);
    assert!(c.is_ambient_muted());
    assert!(c.view().ambient_muted);
    assert!(c.has_pending_unmute());
}

#[test]
fn test_late_rejection_after_mute_does_not_unmute_later() {
    let mut c = at_dashboard();
    let ambient = c.ambient_token().unwrap();

    c.toggle_mute();
    c.toggle_mute();
    assert!(c.is_ambient_muted());

    // The pause interrupted the earlier play, which now reports failure
    c.on_play_rejected(ambient);
    assert!(!c.has_pending_unmute());

    c.report_gesture();
    assert!(c.is_ambient_muted());
    assert!(c.host().is_muted(MediaSlot::Ambient));
    assert!(!c.host().is_playing(MediaSlot::Ambient));
}

#[test]
fn test_ambient_session_follows_mute() {
    let mut c = at_dashboard();
    assert!(c.ambient_session().unwrap().muted);

    c.toggle_mute();
    assert!(!c.ambient_session().unwrap().muted);

    c.toggle_mute();
    assert!(c.ambient_session().unwrap().muted);
}

#[test]
fn test_ambient_loop_restart_reapplies_mute() {
    let mut c = at_dashboard();
    c.toggle_mute();
    let ambient = c.ambient_token().unwrap();
    c.host_mut().clear_calls();

    c.on_media_ended(ambient);
    assert_eq!(
        c.host().calls(),
        &[
            HostCall::Seek(ambient, 0.0),
            HostCall::SetMuted(ambient, false),
            HostCall::Play(ambient),
        ]
    );
    assert_eq!(c.state(), TransitionState::DashboardVisible);
}

// ═══════════════════════════════════════════════════════════════════════════════
// PROGRESS PROPERTIES
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_progress_always_within_bounds() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5707);
    let mut c = at_dashboard();
    c.select_story("/media/s1.mp4", "s1");
    let modal = c.foreground_token().unwrap();

    for _ in 0..1000 {
        let duration: f64 = rng.random_range(0.1..600.0);
        let current = match rng.random_range(0..4) {
            0 => rng.random_range(-50.0..0.0),
            1 => rng.random_range(duration..duration * 3.0),
            _ => rng.random_range(0.0..=duration),
        };
        c.on_time_update(modal, current, duration);

        let pct = c.progress().get("s1").unwrap();
        assert!(pct <= 100);
        assert_eq!(Some(pct), WatchProgress::percent(current, duration));
    }
}

#[test]
fn test_progress_tracks_each_story() {
    let mut c = at_dashboard();
    for (id, t) in [("a", 10.0), ("b", 40.0)] {
        c.select_story(&format!("/media/{}.mp4", id), id);
        let token = c.foreground_token().unwrap();
        c.on_time_update(token, t, 80.0);
        c.close_modal();
    }
    let snapshot = c.progress().snapshot();
    assert_eq!(snapshot.get("a"), Some(&13));
    assert_eq!(snapshot.get("b"), Some(&50));
}

// ═══════════════════════════════════════════════════════════════════════════════
// VIEW AND TIMING
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_view_follows_fade_sequence() {
    let timing = TransitionTiming {
        fade_out: Millis(300),
        reveal_delay: Millis(0),
    };
    let mut c = TransitionController::with_timing(
        RecordingHost::new(),
        RecordingFeedback::new(),
        "/i.mp4",
        "/a.mp3",
        timing,
    );

    c.request_initial_play();
    assert_eq!(c.view().intro_opacity, 1.0);

    let intro = c.foreground_token().unwrap();
    c.on_media_ended(intro);
    let view = c.view();
    assert_eq!(view.intro_opacity, 0.0);
    assert!(!view.dashboard_mounted);
    assert_eq!(view.fade_ms, 300);
    assert_eq!(c.host().pending_timers()[0].1, Millis(300));

    let fade = c.host_mut().take_timers();
    c.on_timer(fade[0].0);
    let view = c.view();
    assert!(view.dashboard_mounted);
    assert_eq!(view.dashboard_opacity, 0.0);

    run_timers(&mut c);
    assert_eq!(c.view().dashboard_opacity, 1.0);
}

// ═══════════════════════════════════════════════════════════════════════════════
// TONE ENGINE WIRING
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_first_gesture_unlocks_shared_engine() {
    let platform = OfflinePlatform::default();
    let engine = ToneEngine::with_seed(platform.clone(), 7).shared();
    let mut c = TransitionController::new(
        RecordingHost::new(),
        std::rc::Rc::clone(&engine),
        "/i.mp4",
        "/a.mp3",
    );

    c.hover();
    assert_eq!(platform.contexts_created(), 1);

    platform.grant_gesture();
    c.request_fullscreen_enter();
    assert_eq!(engine.context_state(), amb_tone::ContextState::Running);
    // hover (2 layers) + entry action (2 layers)
    assert_eq!(platform.scheduled_total(), 4);
    assert_eq!(platform.contexts_created(), 1);
}
