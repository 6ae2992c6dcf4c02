//! Time helpers
//!
//! Platform clocks (audio context time, media `currentTime`) are in seconds
//! as `f64`; the design constants are in milliseconds.

use serde::{Deserialize, Serialize};

/// Duration in whole milliseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Millis(pub u32);

impl Millis {
    pub const ZERO: Self = Self(0);

    #[inline]
    pub const fn new(ms: u32) -> Self {
        Self(ms)
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Convert from seconds, rounding to the nearest millisecond.
    /// Negative and non-finite input maps to zero.
    #[inline]
    pub fn from_secs_f64(secs: f64) -> Self {
        if !secs.is_finite() || secs <= 0.0 {
            return Self::ZERO;
        }
        Self((secs * 1000.0).round().min(u32::MAX as f64) as u32)
    }

    /// Number of whole frames this duration covers at `sample_rate`.
    #[inline]
    pub fn to_frames(self, sample_rate: f32) -> usize {
        (self.as_secs_f64() * sample_rate as f64).ceil() as usize
    }
}

impl std::ops::Add for Millis {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl From<u32> for Millis {
    fn from(ms: u32) -> Self {
        Self(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secs_roundtrip() {
        assert_eq!(Millis::from_secs_f64(0.7), Millis(700));
        assert!((Millis(80).as_secs_f64() - 0.08).abs() < 1e-12);
    }

    #[test]
    fn test_from_secs_rejects_garbage() {
        assert_eq!(Millis::from_secs_f64(f64::NAN), Millis::ZERO);
        assert_eq!(Millis::from_secs_f64(-3.0), Millis::ZERO);
        assert_eq!(Millis::from_secs_f64(f64::INFINITY), Millis::ZERO);
    }

    #[test]
    fn test_frames() {
        assert_eq!(Millis(1000).to_frames(48000.0), 48000);
        assert_eq!(Millis(80).to_frames(44100.0), 3528);
    }
}
