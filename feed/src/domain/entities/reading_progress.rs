//! Reading progress entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How far a reader got through a post
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingProgress {
    /// Percentage read, always within `0.0..=100.0`
    pub progress: f64,
    /// Absolute scroll offset in pixels
    pub scroll_position: f64,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl ReadingProgress {
    pub fn new(fraction: f64, offset: f64, at: DateTime<Utc>) -> Self {
        Self {
            progress: clamp_progress(fraction),
            scroll_position: if offset.is_finite() { offset.max(0.0) } else { 0.0 },
            timestamp: at.timestamp_millis(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.progress >= 100.0
    }
}

/// Clamp to `[0, 100]`; NaN counts as unread
pub fn clamp_progress(fraction: f64) -> f64 {
    if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 100.0)
    }
}
