// ============================================================================
// DOM media host
// Foreground <video> and ambient <audio> elements, fullscreen and timers
// ============================================================================

use std::rc::Rc;

use amb_core::{AmbError, AmbResult, MediaSlot, Millis, SessionToken};
use amb_transition::{FullscreenRequest, MediaHost, TimerToken, TransitionEvent};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, HtmlAudioElement, HtmlMediaElement, HtmlVideoElement, Window};

use crate::audio::js_error;

/// Where DOM callbacks send their events
pub(crate) type Emit = Rc<dyn Fn(TransitionEvent)>;

type Listener = Closure<dyn FnMut(Event)>;

/// One element plus the listeners bound for its current session
struct SlotBinding {
    element: HtmlMediaElement,
    token: Option<SessionToken>,
    listeners: Vec<(&'static str, Listener)>,
}

impl SlotBinding {
    fn new(element: HtmlMediaElement) -> Self {
        Self {
            element,
            token: None,
            listeners: Vec::new(),
        }
    }

    fn unlisten(&mut self) {
        for (name, listener) in self.listeners.drain(..) {
            let _ = self
                .element
                .remove_event_listener_with_callback(name, listener.as_ref().unchecked_ref());
        }
    }

    fn listen(&mut self, name: &'static str, listener: Listener) -> AmbResult<()> {
        self.element
            .add_event_listener_with_callback(name, listener.as_ref().unchecked_ref())
            .map_err(|e| AmbError::Platform(js_error(name, &e)))?;
        self.listeners.push((name, listener));
        Ok(())
    }

    fn is_current(&self, token: SessionToken) -> bool {
        self.token == Some(token)
    }
}

pub struct DomMediaHost {
    window: Window,
    document: Document,
    video: HtmlVideoElement,
    foreground: SlotBinding,
    ambient: SlotBinding,
    emit: Emit,
    document_listeners: Vec<(&'static str, Listener)>,
}

impl DomMediaHost {
    /// Create detached elements; the page mounts them via the getters
    pub(crate) fn new(emit: Emit) -> AmbResult<Self> {
        let window = web_sys::window().ok_or_else(|| AmbError::Unsupported("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| AmbError::Unsupported("no document".into()))?;

        let video: HtmlVideoElement = document
            .create_element("video")
            .map_err(|e| AmbError::Platform(js_error("create video", &e)))?
            .dyn_into()
            .map_err(|_| AmbError::Platform("video element has wrong type".into()))?;
        video.set_attribute("playsinline", "").ok();
        video.set_preload("auto");

        let audio = HtmlAudioElement::new()
            .map_err(|e| AmbError::Platform(js_error("create audio", &e)))?;
        audio.set_preload("auto");

        let foreground = SlotBinding::new(video.clone().unchecked_into());
        let ambient = SlotBinding::new(audio.unchecked_into());

        let mut host = Self {
            window,
            document,
            video,
            foreground,
            ambient,
            emit,
            document_listeners: Vec::new(),
        };
        host.listen_fullscreen()?;
        Ok(host)
    }

    pub(crate) fn video(&self) -> &HtmlVideoElement {
        &self.video
    }

    pub(crate) fn audio(&self) -> &HtmlMediaElement {
        &self.ambient.element
    }

    fn binding(&mut self, slot: MediaSlot) -> &mut SlotBinding {
        match slot {
            MediaSlot::Foreground => &mut self.foreground,
            MediaSlot::Ambient => &mut self.ambient,
        }
    }

    fn listen_fullscreen(&mut self) -> AmbResult<()> {
        let emit = Rc::clone(&self.emit);
        let document = self.document.clone();
        let change: Listener = Closure::new(move |_: Event| {
            emit(TransitionEvent::FullscreenChanged {
                active: document.fullscreen_element().is_some(),
            });
        });

        let emit = Rc::clone(&self.emit);
        let error: Listener = Closure::new(move |_: Event| {
            emit(TransitionEvent::FullscreenRejected);
        });

        for (name, listener) in [("fullscreenchange", change), ("fullscreenerror", error)] {
            self.document
                .add_event_listener_with_callback(name, listener.as_ref().unchecked_ref())
                .map_err(|e| AmbError::Platform(js_error(name, &e)))?;
            self.document_listeners.push((name, listener));
        }
        Ok(())
    }

    /// Per-session element listeners; each closure carries its own token
    fn listen_session(&mut self, token: SessionToken) -> AmbResult<()> {
        let element = self.binding(token.slot).element.clone();

        let emit = Rc::clone(&self.emit);
        let ended: Listener = Closure::new(move |_: Event| {
            emit(TransitionEvent::MediaEnded { token });
        });

        let emit = Rc::clone(&self.emit);
        let el = element.clone();
        let loaded: Listener = Closure::new(move |_: Event| {
            emit(TransitionEvent::LoadedData {
                token,
                duration: el.duration(),
            });
        });

        let emit = Rc::clone(&self.emit);
        let el = element;
        let progress: Listener = Closure::new(move |_: Event| {
            emit(TransitionEvent::TimeUpdate {
                token,
                current_time: el.current_time(),
                duration: el.duration(),
            });
        });

        let binding = self.binding(token.slot);
        binding.listen("ended", ended)?;
        binding.listen("loadeddata", loaded)?;
        if token.slot == MediaSlot::Foreground {
            binding.listen("timeupdate", progress)?;
        }
        Ok(())
    }
}

impl MediaHost for DomMediaHost {
    fn attach(&mut self, token: SessionToken, source: &str, muted: bool) -> AmbResult<()> {
        {
            let binding = self.binding(token.slot);
            binding.unlisten();
            binding.token = Some(token);
            binding.element.set_muted(muted);
            binding.element.set_src(source);
        }
        self.listen_session(token)?;
        self.binding(token.slot).element.load();
        log::debug!(
            "[Ambience WASM] {} ← {} (gen {})",
            token.slot.name(),
            source,
            token.generation
        );
        Ok(())
    }

    fn detach(&mut self, slot: MediaSlot) {
        let binding = self.binding(slot);
        binding.unlisten();
        binding.token = None;
        let _ = binding.element.pause();
        binding.element.remove_attribute("src").ok();
        binding.element.load();
    }

    fn play(&mut self, token: SessionToken) -> AmbResult<()> {
        let binding = self.binding(token.slot);
        if !binding.is_current(token) {
            return Err(AmbError::StaleSession {
                slot: token.slot,
                got: token.generation,
                current: binding.token.map_or(0, |t| t.generation),
            });
        }

        let promise = binding
            .element
            .play()
            .map_err(|e| AmbError::Platform(js_error("play", &e)))?;

        let emit = Rc::clone(&self.emit);
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = wasm_bindgen_futures::JsFuture::from(promise).await {
                log::debug!("[Ambience WASM] play() rejected: {:?}", e);
                emit(TransitionEvent::PlayRejected { token });
            }
        });
        Ok(())
    }

    fn pause(&mut self, token: SessionToken) {
        let binding = self.binding(token.slot);
        if binding.is_current(token) {
            let _ = binding.element.pause();
        }
    }

    fn seek(&mut self, token: SessionToken, secs: f64) {
        let binding = self.binding(token.slot);
        if binding.is_current(token) {
            binding.element.set_current_time(secs);
        }
    }

    fn set_muted(&mut self, token: SessionToken, muted: bool) {
        let binding = self.binding(token.slot);
        if binding.is_current(token) {
            binding.element.set_muted(muted);
        }
    }

    fn request_fullscreen(&mut self) -> AmbResult<FullscreenRequest> {
        if self.document.fullscreen_element().is_some() {
            return Ok(FullscreenRequest::Entered);
        }
        let root = self
            .document
            .document_element()
            .ok_or_else(|| AmbError::Unsupported("no document element".into()))?;
        root.request_fullscreen()
            .map_err(|e| AmbError::PolicyBlocked(js_error("requestFullscreen", &e)))?;
        Ok(FullscreenRequest::Pending)
    }

    fn schedule_timer(&mut self, token: TimerToken, delay: Millis) {
        let emit = Rc::clone(&self.emit);
        let callback = Closure::once_into_js(move || {
            emit(TransitionEvent::Timer { token });
        });
        let timeout = i32::try_from(delay.0).unwrap_or(i32::MAX);
        if let Err(e) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), timeout)
        {
            log::warn!("[Ambience WASM] setTimeout failed: {:?}", e);
        }
    }
}

impl Drop for DomMediaHost {
    fn drop(&mut self) {
        self.foreground.unlisten();
        self.ambient.unlisten();
        for (name, listener) in self.document_listeners.drain(..) {
            let _ = self
                .document
                .remove_event_listener_with_callback(name, listener.as_ref().unchecked_ref());
        }
    }
}
