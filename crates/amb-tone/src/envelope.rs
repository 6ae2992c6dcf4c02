//! Gain envelopes
//!
//! Every layer is shaped floor → peak → floor with exponential ramps. An
//! exponential ramp cannot target or start from zero, and a jump to or from
//! zero is an audible click, so the floor is a small positive value.

use amb_core::{AmbError, AmbResult, Millis};
use serde::{Deserialize, Serialize};

/// Lowest gain any envelope point may take
pub const ENVELOPE_FLOOR: f32 = 0.0001;

/// Rise time from floor to peak
pub const ATTACK: Millis = Millis(10);

/// Extra time a source keeps running after its envelope reaches the floor
pub const STOP_EPSILON: Millis = Millis(20);

/// How the parameter moves from the previous point to this one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RampKind {
    /// Jump (`setValueAtTime`)
    Set,
    /// Exponential approach (`exponentialRampToValueAtTime`)
    Exponential,
}

/// One automation point, in context time (seconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopePoint {
    pub time: f64,
    pub value: f32,
    pub ramp: RampKind,
}

/// Automation curve for one gain node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GainEnvelope {
    points: Vec<EnvelopePoint>,
}

impl GainEnvelope {
    /// Floor at `start`, exponential rise to `peak` over [`ATTACK`], then
    /// exponential decay back to the floor at `start + duration`.
    ///
    /// Durations shorter than twice the attack split the time evenly between
    /// rise and fall. Peaks at or below the floor (including NaN) collapse to
    /// a flat floor curve.
    pub fn percussive(start: f64, duration: Millis, peak: f32) -> Self {
        let total = duration.as_secs_f64();
        let attack = ATTACK.as_secs_f64().min(total / 2.0);
        let peak = if peak.is_finite() {
            peak.max(ENVELOPE_FLOOR)
        } else {
            ENVELOPE_FLOOR
        };

        Self {
            points: vec![
                EnvelopePoint {
                    time: start,
                    value: ENVELOPE_FLOOR,
                    ramp: RampKind::Set,
                },
                EnvelopePoint {
                    time: start + attack,
                    value: peak,
                    ramp: RampKind::Exponential,
                },
                EnvelopePoint {
                    time: start + total,
                    value: ENVELOPE_FLOOR,
                    ramp: RampKind::Exponential,
                },
            ],
        }
    }

    pub fn points(&self) -> &[EnvelopePoint] {
        &self.points
    }

    pub fn start_value(&self) -> f32 {
        self.points.first().map(|p| p.value).unwrap_or(ENVELOPE_FLOOR)
    }

    pub fn end_value(&self) -> f32 {
        self.points.last().map(|p| p.value).unwrap_or(ENVELOPE_FLOOR)
    }

    pub fn peak(&self) -> f32 {
        self.points
            .iter()
            .map(|p| p.value)
            .fold(ENVELOPE_FLOOR, f32::max)
    }

    /// Time of the final point
    pub fn end_time(&self) -> f64 {
        self.points.last().map(|p| p.time).unwrap_or(0.0)
    }

    /// Gain at context time `t`. Before the first point the curve holds the
    /// first value, after the last it holds the last.
    pub fn value_at(&self, t: f64) -> f32 {
        let Some(first) = self.points.first() else {
            return ENVELOPE_FLOOR;
        };
        if t <= first.time {
            return first.value;
        }

        for pair in self.points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t > b.time {
                continue;
            }
            return match b.ramp {
                RampKind::Set => a.value,
                RampKind::Exponential => {
                    let span = b.time - a.time;
                    if span <= 0.0 {
                        return b.value;
                    }
                    let x = ((t - a.time) / span) as f32;
                    a.value * (b.value / a.value).powf(x)
                }
            };
        }

        self.end_value()
    }

    /// Reject curves a platform would refuse: non-positive or non-finite
    /// values, or time going backwards.
    pub fn validate(&self) -> AmbResult<()> {
        let mut last_time = f64::NEG_INFINITY;
        for p in &self.points {
            if !p.value.is_finite() || p.value <= 0.0 {
                return Err(AmbError::InvalidParam(format!(
                    "envelope value {} at t={} is not a positive gain",
                    p.value, p.time
                )));
            }
            if !p.time.is_finite() || p.time < last_time {
                return Err(AmbError::InvalidParam(format!(
                    "envelope time {} goes backwards",
                    p.time
                )));
            }
            last_time = p.time;
        }
        Ok(())
    }
}
