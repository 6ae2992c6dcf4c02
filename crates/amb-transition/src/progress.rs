//! Watch progress
//!
//! Per-story percentage of the modal video viewed. Only the controller
//! writes; everyone else gets `&WatchProgress` or a snapshot.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Story identifier as handed over by the dashboard
pub type StoryId = String;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchProgress {
    entries: HashMap<StoryId, u8>,
}

impl WatchProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// `current / duration` as a whole percentage in `[0, 100]`.
    ///
    /// `None` while the duration is unknown (zero, negative or not finite) or
    /// the position is not a number.
    pub fn percent(current_time: f64, duration: f64) -> Option<u8> {
        if !duration.is_finite() || duration <= 0.0 || current_time.is_nan() {
            return None;
        }
        let pct = (current_time / duration * 100.0).clamp(0.0, 100.0);
        Some(pct.round() as u8)
    }

    /// Store the percentage for `story`; returns the stored value, or `None`
    /// if the sample was skipped and the map left unchanged.
    pub(crate) fn record(&mut self, story: &str, current_time: f64, duration: f64) -> Option<u8> {
        let pct = Self::percent(current_time, duration)?;
        match self.entries.get_mut(story) {
            Some(slot) => *slot = pct,
            None => {
                self.entries.insert(story.to_owned(), pct);
            }
        }
        Some(pct)
    }

    pub fn get(&self, story: &str) -> Option<u8> {
        self.entries.get(story).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Owned copy for widgets that outlive the borrow
    pub fn snapshot(&self) -> HashMap<StoryId, u8> {
        self.entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_basic() {
        assert_eq!(WatchProgress::percent(25.0, 100.0), Some(25));
        assert_eq!(WatchProgress::percent(0.0, 3.0), Some(0));
        assert_eq!(WatchProgress::percent(3.0, 3.0), Some(100));
    }

    #[test]
    fn test_percent_clamps() {
        assert_eq!(WatchProgress::percent(150.0, 100.0), Some(100));
        assert_eq!(WatchProgress::percent(-5.0, 100.0), Some(0));
        assert_eq!(WatchProgress::percent(f64::INFINITY, 100.0), Some(100));
    }

    #[test]
    fn test_unknown_duration_skips() {
        let mut progress = WatchProgress::new();
        for duration in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert_eq!(progress.record("s1", 10.0, duration), None);
        }
        assert_eq!(progress.record("s1", f64::NAN, 10.0), None);
        assert!(progress.is_empty());
    }

    #[test]
    fn test_record_overwrites() {
        let mut progress = WatchProgress::new();
        progress.record("s1", 9.0, 10.0);
        progress.record("s1", 2.0, 10.0);
        assert_eq!(progress.get("s1"), Some(20));
        assert_eq!(progress.len(), 1);
    }
}
