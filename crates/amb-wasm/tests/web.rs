//! Browser tests for the Ambience bindings
//!
//! Run with `wasm-pack test --headless --chrome crates/amb-wasm`.

#![cfg(target_arch = "wasm32")]

use amb_wasm::{get_version, AmbientFeedback};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn session() -> AmbientFeedback {
    AmbientFeedback::new("/media/intro.mp4", "/media/ambient.mp3").unwrap()
}

#[wasm_bindgen_test]
fn test_new_session_is_locked() {
    let feedback = session();
    assert_eq!(feedback.state(), "INTRO_LOCKED");
}

#[wasm_bindgen_test]
fn test_triggers_never_throw() {
    let feedback = session();
    for _ in 0..20 {
        feedback.trigger_hover();
        feedback.trigger_action();
    }
}

#[wasm_bindgen_test]
fn test_elements_are_created() {
    let feedback = session();
    let video = feedback.video_element().unwrap();
    assert!(video.src().ends_with("/media/intro.mp4"));

    let audio = feedback.audio_element().unwrap();
    assert!(audio.muted());
}

#[wasm_bindgen_test]
fn test_view_serializes_to_object() {
    let feedback = session();
    let view = feedback.view().unwrap();
    let prompt = js_sys::Reflect::get(&view, &"show_play_prompt".into()).unwrap();
    assert_eq!(prompt.as_bool(), Some(true));
}

#[wasm_bindgen_test]
fn test_toggle_mute_without_gesture_stays_muted() {
    let feedback = session();
    feedback.toggle_mute();
    assert!(feedback.audio_element().unwrap().muted());
}

#[wasm_bindgen_test]
fn test_story_ignored_before_dashboard() {
    let feedback = session();
    feedback.select_story("/media/s1.mp4", "s1");
    assert_eq!(feedback.state(), "INTRO_LOCKED");

    let progress = feedback.progress().unwrap();
    let keys = js_sys::Object::keys(progress.unchecked_ref());
    assert_eq!(keys.length(), 0);
}

#[wasm_bindgen_test]
fn test_version() {
    assert!(!get_version().is_empty());
}
