//! Tone Engine
//!
//! Owns the lazily created audio context and turns the two triggers into
//! scheduled layer plans. All access is single-threaded; the engine is shared
//! between dashboards by `Rc` and uses `RefCell` internally so triggers can
//! take `&self`.

use std::cell::RefCell;
use std::rc::Rc;

use amb_core::AmbError;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::platform::{AudioContextOps, AudioPlatform, ContextState};
use crate::preset::{EffectKind, EffectPreset};

/// Seed used when the caller does not pick one. Noise only has to sound
/// like noise, it does not have to be unpredictable.
pub const DEFAULT_NOISE_SEED: u64 = 0x5EED_A3B1_E4CE;

// ═══════════════════════════════════════════════════════════════════════════════
// FEEDBACK TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// What the transition controller needs from the tone engine
pub trait Feedback {
    fn trigger_hover(&self);
    fn trigger_action(&self);
    /// Create the context if needed and try to resume it
    fn unlock(&self);
}

impl<T: Feedback + ?Sized> Feedback for Rc<T> {
    fn trigger_hover(&self) {
        (**self).trigger_hover()
    }

    fn trigger_action(&self) {
        (**self).trigger_action()
    }

    fn unlock(&self) {
        (**self).unlock()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONTEXT SLOT
// ═══════════════════════════════════════════════════════════════════════════════

enum ContextSlot<C> {
    Uninitialized,
    /// Creation failed with `Unsupported`; every trigger is a no-op from now on
    Unsupported,
    Ready(C),
}

// ═══════════════════════════════════════════════════════════════════════════════
// TONE ENGINE
// ═══════════════════════════════════════════════════════════════════════════════

/// Procedural UI sound effects over a single shared audio context
pub struct ToneEngine<P: AudioPlatform> {
    platform: P,
    context: RefCell<ContextSlot<P::Context>>,
    rng: RefCell<ChaCha8Rng>,
    hover: EffectPreset,
    action: EffectPreset,
}

impl<P: AudioPlatform> ToneEngine<P> {
    pub fn new(platform: P) -> Self {
        Self::with_seed(platform, DEFAULT_NOISE_SEED)
    }

    pub fn with_seed(platform: P, seed: u64) -> Self {
        Self {
            platform,
            context: RefCell::new(ContextSlot::Uninitialized),
            rng: RefCell::new(ChaCha8Rng::seed_from_u64(seed)),
            hover: EffectPreset::hover(),
            action: EffectPreset::action(),
        }
    }

    /// Wrap in the shared handle dashboards pass around
    pub fn shared(self) -> Rc<Self> {
        Rc::new(self)
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn preset(&self, kind: EffectKind) -> &EffectPreset {
        match kind {
            EffectKind::Hover => &self.hover,
            EffectKind::Action => &self.action,
        }
    }

    /// False once context creation has reported the primitive missing
    pub fn is_supported(&self) -> bool {
        match self.context.try_borrow() {
            Ok(slot) => !matches!(*slot, ContextSlot::Unsupported),
            Err(_) => true,
        }
    }

    pub fn context_state(&self) -> ContextState {
        match self.context.try_borrow() {
            Ok(slot) => match &*slot {
                ContextSlot::Ready(ctx) => ctx.state(),
                _ => ContextState::Uninitialized,
            },
            Err(_) => ContextState::Uninitialized,
        }
    }

    pub fn trigger_hover(&self) {
        self.trigger(EffectKind::Hover);
    }

    pub fn trigger_action(&self) {
        self.trigger(EffectKind::Action);
    }

    /// Create-if-absent and resume, without scheduling anything
    pub fn unlock(&self) {
        let Ok(mut slot) = self.context.try_borrow_mut() else {
            log::debug!("[Tone] unlock re-entered, skipped");
            return;
        };
        let _ = acquire(&self.platform, &mut *slot);
    }

    /// Schedule one effect. Never fails visibly.
    pub fn trigger(&self, kind: EffectKind) {
        let Ok(mut slot) = self.context.try_borrow_mut() else {
            log::debug!("[Tone] {} trigger re-entered, skipped", kind.name());
            return;
        };
        let Some(ctx) = acquire(&self.platform, &mut *slot) else {
            return;
        };

        let preset = *self.preset(kind);
        let layers = {
            let Ok(mut rng) = self.rng.try_borrow_mut() else {
                return;
            };
            preset.plan(ctx.current_time(), ctx.sample_rate(), &mut *rng)
        };

        for layer in &layers {
            if let Err(e) = ctx.schedule_layer(layer) {
                log::warn!("[Tone] {} layer failed: {}", kind.name(), e);
            }
        }
    }
}

impl<P: AudioPlatform> Feedback for ToneEngine<P> {
    fn trigger_hover(&self) {
        ToneEngine::trigger_hover(self)
    }

    fn trigger_action(&self) {
        ToneEngine::trigger_action(self)
    }

    fn unlock(&self) {
        ToneEngine::unlock(self)
    }
}

/// Get-or-create the context, resuming it when suspended.
///
/// `Unsupported` is permanent. Any other creation error leaves the slot
/// uninitialized so the next trigger tries again; nothing was instantiated.
fn acquire<'a, P: AudioPlatform>(
    platform: &P,
    slot: &'a mut ContextSlot<P::Context>,
) -> Option<&'a P::Context> {
    if let ContextSlot::Uninitialized = slot {
        match platform.create_context() {
            Ok(ctx) => {
                log::info!(
                    "[Tone] Audio context created ({} Hz, {:?})",
                    ctx.sample_rate(),
                    ctx.state()
                );
                *slot = ContextSlot::Ready(ctx);
            }
            Err(AmbError::Unsupported(reason)) => {
                log::warn!("[Tone] Audio unsupported, effects disabled: {}", reason);
                *slot = ContextSlot::Unsupported;
            }
            Err(e) => {
                log::warn!("[Tone] Audio context creation failed: {}", e);
            }
        }
    }

    match slot {
        ContextSlot::Ready(ctx) => {
            if ctx.state() == ContextState::Suspended {
                if let Err(e) = ctx.resume() {
                    if e.is_policy_block() {
                        log::debug!("[Tone] Resume deferred: {}", e);
                    } else {
                        log::warn!("[Tone] Resume failed: {}", e);
                    }
                }
            }
            Some(ctx)
        }
        _ => None,
    }
}
