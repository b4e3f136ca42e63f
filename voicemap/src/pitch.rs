use tracing::warn;

use crate::mapping::clamp01;

/// Maps fundamental frequency onto the vertical axis of the voice map.
///
/// Linear between `min_hz` (y = 0) and `max_hz` (y = 1), clamped outside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchAxis {
    min_hz: f32,
    max_hz: f32,
}

impl Default for PitchAxis {
    /// 80–300 Hz, the range of the color scheme.
    fn default() -> Self {
        Self {
            min_hz: 80.0,
            max_hz: 300.0,
        }
    }
}

impl PitchAxis {
    /// Creates an axis over the given range. An invalid range falls back to
    /// the default one.
    pub fn new(min_hz: f32, max_hz: f32) -> Self {
        let mut axis = Self::default();
        axis.set_range(min_hz, max_hz);
        axis
    }

    /// Sets the range. Reversed bounds are swapped; an empty or non-finite
    /// range is ignored.
    pub fn set_range(&mut self, min_hz: f32, max_hz: f32) {
        let (lo, hi) = if min_hz <= max_hz {
            (min_hz, max_hz)
        } else {
            (max_hz, min_hz)
        };
        if !(lo.is_finite() && hi.is_finite()) || hi - lo <= f32::EPSILON {
            warn!(min_hz, max_hz, "voicemap: ignoring invalid pitch range");
            return;
        }
        self.min_hz = lo;
        self.max_hz = hi;
    }

    pub fn min_hz(&self) -> f32 {
        self.min_hz
    }

    pub fn max_hz(&self) -> f32 {
        self.max_hz
    }

    pub fn score_from_f0(&self, f0_hz: f32) -> f32 {
        clamp01((f0_hz - self.min_hz) / (self.max_hz - self.min_hz))
    }
}
