//! Scripted dashboard session
//!
//! Walks the controller through the full intro → dashboard → modal flow
//! against the recording host and a real tone engine on the offline
//! platform, so a developer can watch the transitions and hear nothing.

use std::rc::Rc;

use amb_core::MediaSlot;
use amb_tone::{OfflinePlatform, ToneEngine};
use amb_transition::{RecordingHost, TransitionController, TransitionState};
use anyhow::{Context, Result, ensure};

pub struct ScenarioReport {
    pub final_state: TransitionState,
    pub transitions: Vec<(TransitionState, TransitionState)>,
    pub progress: Vec<(String, u8)>,
    pub layers_scheduled: u64,
    pub host_calls: usize,
}

pub fn run(seed: u64, sample_rate: f32) -> Result<ScenarioReport> {
    let platform = OfflinePlatform::new(sample_rate);
    let engine = ToneEngine::with_seed(platform.clone(), seed).shared();
    let mut c = TransitionController::new(
        RecordingHost::new(),
        Rc::clone(&engine),
        "/media/intro.mp4",
        "/media/ambient.mp3",
    );

    // Pointer moves over the prompt before anyone clicks
    c.hover();

    platform.grant_gesture();
    c.request_fullscreen_enter();
    ensure!(c.state() == TransitionState::IntroPlaying, "intro did not start");

    let intro = c.foreground_token().context("no intro session attached")?;
    c.on_loaded_data(intro, 12.0);
    c.on_media_ended(intro);
    fire_timers(&mut c);
    ensure!(
        c.state() == TransitionState::DashboardVisible,
        "dashboard not visible after fade"
    );

    c.toggle_mute();

    for (story, media) in [("s1", "/media/s1.mp4"), ("s2", "/media/s2.mp4")] {
        c.hover();
        c.select_story(media, story);
        let token = c.foreground_token().with_context(|| format!("no session for {}", story))?;
        c.on_loaded_data(token, 40.0);
        for pct in [25.0, 50.0, 90.0] {
            c.on_time_update(token, 40.0 * pct / 100.0, 40.0);
        }
        c.close_modal();
        // Detached element still ticking
        c.on_time_update(token, 40.0, 40.0);
    }

    let ambient = c.ambient_token().context("no ambient session attached")?;
    c.on_media_ended(ambient);
    ensure!(
        c.host().is_playing(MediaSlot::Ambient),
        "ambient loop did not restart"
    );

    let mut progress: Vec<(String, u8)> = c
        .progress()
        .iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect();
    progress.sort();

    Ok(ScenarioReport {
        final_state: c.state(),
        transitions: c.recent_transitions().map(|t| (t.from, t.to)).collect(),
        progress,
        layers_scheduled: platform.scheduled_total(),
        host_calls: c.host().calls().len(),
    })
}

fn fire_timers<F: amb_tone::Feedback>(c: &mut TransitionController<RecordingHost, F>) {
    loop {
        let timers = c.host_mut().take_timers();
        if timers.is_empty() {
            break;
        }
        for (token, delay) in timers {
            log::debug!("[Preview] timer {:?} after {} ms", token.kind, delay.0);
            c.on_timer(token);
        }
    }
}
