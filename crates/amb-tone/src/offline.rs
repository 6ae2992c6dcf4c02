//! In-memory audio platform
//!
//! Stands in for Web Audio in tests and in the preview tool. The platform
//! keeps a manual clock, models the gesture policy (resume is refused until
//! [`OfflinePlatform::grant_gesture`]), and remembers only the voices that
//! are still sounding.

use std::cell::RefCell;
use std::rc::Rc;

use amb_core::{AmbError, AmbResult};

use crate::layer::LayerPlan;
use crate::platform::{AudioContextOps, AudioPlatform, ContextState};
use crate::synth::render_layer;

#[derive(Debug)]
struct OfflineState {
    supported: bool,
    sample_rate: f32,
    now: f64,
    gesture: bool,
    context_state: ContextState,
    contexts_created: usize,
    resume_attempts: usize,
    scheduled_total: u64,
    fail_schedule: Option<AmbError>,
    voices: Vec<LayerPlan>,
}

impl OfflineState {
    fn prune(&mut self) {
        let now = self.now;
        self.voices.retain(|v| v.is_live(now));
    }
}

/// Shared handle; clones observe the same platform
#[derive(Debug, Clone)]
pub struct OfflinePlatform {
    state: Rc<RefCell<OfflineState>>,
}

impl OfflinePlatform {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            state: Rc::new(RefCell::new(OfflineState {
                supported: true,
                sample_rate,
                now: 0.0,
                gesture: false,
                context_state: ContextState::Uninitialized,
                contexts_created: 0,
                resume_attempts: 0,
                scheduled_total: 0,
                fail_schedule: None,
                voices: Vec::new(),
            })),
        }
    }

    /// A platform with no audio primitive at all
    pub fn unsupported() -> Self {
        let platform = Self::new(48000.0);
        platform.state.borrow_mut().supported = false;
        platform
    }

    /// Record that the user has interacted; later resumes succeed
    pub fn grant_gesture(&self) {
        self.state.borrow_mut().gesture = true;
    }

    pub fn has_gesture(&self) -> bool {
        self.state.borrow().gesture
    }

    /// Make every following `schedule_layer` fail with `error`
    pub fn fail_scheduling(&self, error: Option<AmbError>) {
        self.state.borrow_mut().fail_schedule = error;
    }

    /// Move the clock forward and drop voices that finished
    pub fn advance(&self, secs: f64) {
        let mut state = self.state.borrow_mut();
        if state.context_state == ContextState::Running {
            state.now += secs.max(0.0);
        }
        state.prune();
    }

    pub fn now(&self) -> f64 {
        self.state.borrow().now
    }

    pub fn sample_rate(&self) -> f32 {
        self.state.borrow().sample_rate
    }

    pub fn contexts_created(&self) -> usize {
        self.state.borrow().contexts_created
    }

    pub fn resume_attempts(&self) -> usize {
        self.state.borrow().resume_attempts
    }

    /// Layers accepted since the platform was created
    pub fn scheduled_total(&self) -> u64 {
        self.state.borrow().scheduled_total
    }

    pub fn context_state(&self) -> ContextState {
        self.state.borrow().context_state
    }

    /// Voices that have not reached their stop time
    pub fn live_voices(&self) -> Vec<LayerPlan> {
        self.state.borrow().voices.clone()
    }

    pub fn live_voice_count(&self) -> usize {
        self.state.borrow().voices.len()
    }

    /// Mix every live voice over the next `secs` seconds, starting at `now`
    pub fn render(&self, secs: f64) -> Vec<f32> {
        let state = self.state.borrow();
        let frames = (secs.max(0.0) * state.sample_rate as f64).ceil() as usize;
        let mut out = vec![0.0; frames];
        for voice in &state.voices {
            render_layer(voice, state.sample_rate, state.now, &mut out);
        }
        out
    }
}

impl Default for OfflinePlatform {
    fn default() -> Self {
        Self::new(48000.0)
    }
}

impl AudioPlatform for OfflinePlatform {
    type Context = OfflineContext;

    fn create_context(&self) -> AmbResult<OfflineContext> {
        let mut state = self.state.borrow_mut();
        if !state.supported {
            return Err(AmbError::Unsupported("no audio primitive".into()));
        }
        state.contexts_created += 1;
        state.context_state = if state.gesture {
            ContextState::Running
        } else {
            ContextState::Suspended
        };
        Ok(OfflineContext {
            state: Rc::clone(&self.state),
        })
    }
}

/// Context handed to the engine
#[derive(Debug)]
pub struct OfflineContext {
    state: Rc<RefCell<OfflineState>>,
}

impl AudioContextOps for OfflineContext {
    fn state(&self) -> ContextState {
        self.state.borrow().context_state
    }

    fn resume(&self) -> AmbResult<()> {
        let mut state = self.state.borrow_mut();
        state.resume_attempts += 1;
        if state.gesture {
            state.context_state = ContextState::Running;
            Ok(())
        } else {
            Err(AmbError::PolicyBlocked("resume before user gesture".into()))
        }
    }

    fn current_time(&self) -> f64 {
        self.state.borrow().now
    }

    fn sample_rate(&self) -> f32 {
        self.state.borrow().sample_rate
    }

    fn schedule_layer(&self, layer: &LayerPlan) -> AmbResult<()> {
        let mut state = self.state.borrow_mut();
        if let Some(err) = state.fail_schedule.clone() {
            return Err(err);
        }
        layer.envelope.validate()?;
        state.prune();
        state.voices.push(layer.clone());
        state.scheduled_total += 1;
        Ok(())
    }
}
