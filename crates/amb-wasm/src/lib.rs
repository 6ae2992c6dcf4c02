// ============================================================================
// AMBIENCE — WASM bindings
// Web Audio tone engine and DOM-backed transition controller for the
// story dashboards
// ============================================================================

mod audio;
mod media;
mod queue;

use std::cell::RefCell;
use std::rc::Rc;

use amb_tone::{Feedback, ToneEngine};
use amb_transition::{MediaHost, TransitionController, TransitionEvent};
use serde::Serialize;
use wasm_bindgen::prelude::*;

pub use audio::{WebAudioContext, WebAudioPlatform};
pub use media::DomMediaHost;

use queue::{EventQueue, EventSink};

type Engine = Rc<ToneEngine<WebAudioPlatform>>;
type Controller = TransitionController<DomMediaHost, Engine>;

impl<H: MediaHost, F: Feedback> EventSink for TransitionController<H, F> {
    fn handle(&mut self, event: TransitionEvent) {
        self.dispatch(event);
    }
}

// ============================================================================
// INITIALIZATION
// ============================================================================

#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    console_log::init_with_level(log::Level::Debug).ok();
    log::info!("[Ambience WASM] Initialized");
}

// ============================================================================
// AMBIENT FEEDBACK (Main WASM API)
// ============================================================================

/// One dashboard session: the intro/dashboard/modal state machine plus the
/// shared UI sound effects
#[wasm_bindgen]
pub struct AmbientFeedback {
    engine: Engine,
    controller: Rc<RefCell<Controller>>,
    queue: Rc<EventQueue<Controller>>,
}

#[wasm_bindgen]
impl AmbientFeedback {
    /// Create the session. Mount `video_element()` and `audio_element()`
    /// into the page; nothing plays before the first gesture.
    #[wasm_bindgen(constructor)]
    pub fn new(intro_src: &str, ambient_src: &str) -> Result<AmbientFeedback, JsValue> {
        let queue: Rc<EventQueue<Controller>> = EventQueue::new();
        let sink = Rc::clone(&queue);
        let host = DomMediaHost::new(Rc::new(move |event| sink.push(event)))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let engine = ToneEngine::new(WebAudioPlatform).shared();
        let controller = Rc::new(RefCell::new(TransitionController::new(
            host,
            Rc::clone(&engine),
            intro_src,
            ambient_src,
        )));
        queue.bind(&controller);

        log::info!("[Ambience WASM] Session created");
        Ok(AmbientFeedback {
            engine,
            controller,
            queue,
        })
    }

    // ════════════════════════════════════════════════════════════════════════
    // SOUND EFFECTS
    // ════════════════════════════════════════════════════════════════════════

    #[wasm_bindgen]
    pub fn trigger_hover(&self) {
        self.engine.trigger_hover();
    }

    #[wasm_bindgen]
    pub fn trigger_action(&self) {
        self.engine.trigger_action();
    }

    // ════════════════════════════════════════════════════════════════════════
    // USER INTENTS
    // ════════════════════════════════════════════════════════════════════════

    #[wasm_bindgen]
    pub fn request_initial_play(&self) {
        self.with_controller(|c| c.request_initial_play());
    }

    #[wasm_bindgen]
    pub fn request_fullscreen_enter(&self) {
        self.with_controller(|c| c.request_fullscreen_enter());
    }

    /// Call from a document-level pointer handler
    #[wasm_bindgen]
    pub fn report_gesture(&self) {
        self.with_controller(|c| c.report_gesture());
    }

    #[wasm_bindgen]
    pub fn select_story(&self, media_ref: &str, story_id: &str) {
        self.with_controller(|c| c.select_story(media_ref, story_id));
    }

    #[wasm_bindgen]
    pub fn close_modal(&self) {
        self.with_controller(|c| c.close_modal());
    }

    #[wasm_bindgen]
    pub fn toggle_mute(&self) {
        self.with_controller(|c| c.toggle_mute());
    }

    /// Swap the intro source (theme change) and play it from the dashboard
    #[wasm_bindgen]
    pub fn replay_intro(&self, source: &str) {
        self.with_controller(|c| c.replay_intro(source));
    }

    // ════════════════════════════════════════════════════════════════════════
    // OBSERVATION
    // ════════════════════════════════════════════════════════════════════════

    #[wasm_bindgen]
    pub fn state(&self) -> String {
        self.with_controller(|c| c.state().name().to_string())
            .unwrap_or_default()
    }

    /// `SurfaceView` as a plain object
    #[wasm_bindgen]
    pub fn view(&self) -> Result<JsValue, JsValue> {
        let view = self
            .with_controller(|c| c.view())
            .ok_or_else(|| JsValue::from_str("controller busy"))?;
        to_js(&view)
    }

    /// `{ storyId: percent }`
    #[wasm_bindgen]
    pub fn progress(&self) -> Result<JsValue, JsValue> {
        let snapshot = self
            .with_controller(|c| c.progress().snapshot())
            .ok_or_else(|| JsValue::from_str("controller busy"))?;
        to_js(&snapshot)
    }

    #[wasm_bindgen]
    pub fn is_audio_supported(&self) -> bool {
        self.engine.is_supported()
    }

    #[wasm_bindgen]
    pub fn video_element(&self) -> Option<web_sys::HtmlVideoElement> {
        self.with_controller(|c| c.host().video().clone())
    }

    #[wasm_bindgen]
    pub fn audio_element(&self) -> Option<web_sys::HtmlMediaElement> {
        self.with_controller(|c| c.host().audio().clone())
    }
}

impl AmbientFeedback {
    /// Run `f` on the controller, then deliver whatever DOM events it caused
    fn with_controller<R>(&self, f: impl FnOnce(&mut Controller) -> R) -> Option<R> {
        let result = match self.controller.try_borrow_mut() {
            Ok(mut controller) => Some(f(&mut controller)),
            Err(_) => {
                log::debug!("[Ambience WASM] Controller busy, call dropped");
                None
            }
        };
        self.queue.drain();
        result
    }
}

// ============================================================================
// UTILITY EXPORTS
// ============================================================================

/// Get Ambience version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}
