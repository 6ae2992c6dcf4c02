// ============================================================================
// Web Audio platform for the tone engine
// One AudioContext per engine; fresh nodes for every layer
// ============================================================================

use amb_core::{AmbError, AmbResult};
use amb_tone::{AudioContextOps, AudioPlatform, ContextState, LayerPlan, LayerSource, RampKind, Waveform};
use wasm_bindgen::JsValue;
use web_sys::{AudioContext, AudioContextState, AudioNode, AudioParam, BiquadFilterType, OscillatorType};

/// Creates real `AudioContext`s
#[derive(Debug, Clone, Copy, Default)]
pub struct WebAudioPlatform;

impl AudioPlatform for WebAudioPlatform {
    type Context = WebAudioContext;

    fn create_context(&self) -> AmbResult<WebAudioContext> {
        // Browsers without Web Audio throw from the constructor
        let context = AudioContext::new()
            .map_err(|e| AmbError::Unsupported(js_error("AudioContext", &e)))?;
        Ok(WebAudioContext { context })
    }
}

pub struct WebAudioContext {
    context: AudioContext,
}

impl AudioContextOps for WebAudioContext {
    fn state(&self) -> ContextState {
        context_state(self.context.state())
    }

    /// Starts the resume; the promise settles on its own
    fn resume(&self) -> AmbResult<()> {
        let promise = self
            .context
            .resume()
            .map_err(|e| AmbError::Platform(js_error("resume", &e)))?;
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = wasm_bindgen_futures::JsFuture::from(promise).await {
                log::debug!("[Ambience WASM] Resume not allowed yet: {:?}", e);
            }
        });
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.context.current_time()
    }

    fn sample_rate(&self) -> f32 {
        self.context.sample_rate()
    }

    fn schedule_layer(&self, layer: &LayerPlan) -> AmbResult<()> {
        self.build_layer(layer)
            .map_err(|e| AmbError::Platform(js_error("schedule_layer", &e)))
    }
}

impl WebAudioContext {
    /// source → (band-pass) → gain → destination, started and stopped on
    /// the layer's own times
    fn build_layer(&self, layer: &LayerPlan) -> Result<(), JsValue> {
        let ctx = &self.context;

        let gain = ctx.create_gain()?;
        apply_envelope(&gain.gain(), layer)?;
        gain.connect_with_audio_node(&ctx.destination())?;

        match &layer.source {
            LayerSource::Tone {
                waveform,
                frequency_hz,
            } => {
                let osc = ctx.create_oscillator()?;
                osc.set_type(oscillator_type(*waveform));
                osc.frequency().set_value(*frequency_hz);
                osc.connect_with_audio_node(&gain)?;
                osc.start_with_when(layer.start_at)?;
                osc.stop_with_when(layer.stop_at)?;
            }
            LayerSource::Noise {
                samples,
                sample_rate,
                band_pass,
            } => {
                let buffer = ctx.create_buffer(1, samples.len().max(1) as u32, *sample_rate)?;
                buffer.copy_to_channel(samples, 0)?;

                let source = ctx.create_buffer_source()?;
                source.set_buffer(Some(&buffer));

                let filter = ctx.create_biquad_filter()?;
                filter.set_type(BiquadFilterType::Bandpass);
                filter.frequency().set_value(band_pass.center_hz);
                filter.q().set_value(band_pass.q);

                let filter_node: &AudioNode = &filter;
                source.connect_with_audio_node(filter_node)?;
                filter.connect_with_audio_node(&gain)?;
                source.start_with_when(layer.start_at)?;
                source.stop_with_when(layer.stop_at)?;
            }
        }
        Ok(())
    }
}

fn apply_envelope(param: &AudioParam, layer: &LayerPlan) -> Result<(), JsValue> {
    for point in layer.envelope.points() {
        match point.ramp {
            RampKind::Set => {
                param.set_value_at_time(point.value, point.time)?;
            }
            RampKind::Exponential => {
                param.exponential_ramp_to_value_at_time(point.value, point.time)?;
            }
        }
    }
    Ok(())
}

pub(crate) fn context_state(state: AudioContextState) -> ContextState {
    match state {
        AudioContextState::Running => ContextState::Running,
        // Closed contexts cannot be resumed; report them as suspended so the
        // engine keeps trying without panicking
        _ => ContextState::Suspended,
    }
}

pub(crate) fn oscillator_type(waveform: Waveform) -> OscillatorType {
    match waveform {
        Waveform::Sine => OscillatorType::Sine,
        Waveform::Square => OscillatorType::Square,
        Waveform::Sawtooth => OscillatorType::Sawtooth,
        Waveform::Triangle => OscillatorType::Triangle,
    }
}

pub(crate) fn js_error(what: &str, e: &JsValue) -> String {
    match e.as_string() {
        Some(msg) => format!("{}: {}", what, msg),
        None => format!("{}: {:?}", what, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_state_mapping() {
        assert_eq!(context_state(AudioContextState::Running), ContextState::Running);
        assert_eq!(context_state(AudioContextState::Suspended), ContextState::Suspended);
    }

    #[test]
    fn test_oscillator_type_mapping() {
        assert_eq!(oscillator_type(Waveform::Square), OscillatorType::Square);
        assert_eq!(oscillator_type(Waveform::Sine), OscillatorType::Sine);
    }
}
