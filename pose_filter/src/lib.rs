//! # pose_filter
//!
//! Holt double-exponential smoothing for a single noisy scalar channel
//! (typically the per-frame finger count reported by a hand-tracking
//! sensor), with forward prediction to hide the smoothing lag and a
//! deviation clamp that keeps the output close to the raw sample.
//!
//! ## Quick start
//!
//! ```rust
//! use pose_filter::{SingleNumberFilter, SmoothParameters};
//!
//! let mut filter = SingleNumberFilter::with_params(SmoothParameters::default());
//! for raw in [3.0, 3.0, 2.0, 3.0, 3.0] {
//!     let smoothed = filter.update(raw);
//!     assert!((smoothed - raw).abs() <= 0.04 + 1e-5);
//! }
//! ```
//!
//! ## Algorithm
//!
//! | Frame | Filtered | Trend |
//! |---|---|---|
//! | 0 | `raw` | `0` |
//! | 1 | `(raw + prev_raw) / 2` | `c·(f − prev_f) + (1−c)·prev_trend` |
//! | ≥2 | `(1−s)·raw + s·(prev_f + prev_trend)` | `c·(f − prev_f) + (1−c)·prev_trend` |
//!
//! The output is `filtered + trend · prediction`, pulled back toward the raw
//! sample whenever it strays further than `max_deviation_radius`.  A negative
//! sample means "no reading" and resets the channel.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

/// Smallest jitter radius accepted; larger values are kept as-is.
pub const MIN_JITTER_RADIUS: f32 = 0.0001;

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("{name} must be within [0, 1], got {value}")]
    OutOfUnitRange { name: &'static str, value: f32 },

    #[error("{name} must be non-negative, got {value}")]
    Negative { name: &'static str, value: f32 },

    #[error("{name} must be a finite number")]
    NotFinite { name: &'static str },
}

pub type Result<T> = std::result::Result<T, FilterError>;

// ════════════════════════════════════════════════════════════════════════════
// SmoothParameters
// ════════════════════════════════════════════════════════════════════════════

/// Tuning for one [`SingleNumberFilter`].  Fixed for the filter's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothParameters {
    /// `[0, 1]`; higher is smoother but lags more.
    pub smoothing: f32,
    /// `[0, 1]`; higher corrects toward the data faster; can get springy.
    pub correction: f32,
    /// Frames to extrapolate forward.  Overshoots when too high.
    pub prediction: f32,
    /// Deviation treated as noise rather than signal.
    pub jitter_radius: f32,
    /// Largest distance the output may sit from the raw sample.
    pub max_deviation_radius: f32,
}

impl Default for SmoothParameters {
    fn default() -> Self {
        SmoothParameters {
            smoothing:            0.5,
            correction:           0.5,
            prediction:           0.5,
            jitter_radius:        0.05,
            max_deviation_radius: 0.04,
        }
    }
}

impl SmoothParameters {
    /// Build a checked parameter set.
    ///
    /// Smoothing and correction must lie in `[0, 1]`; prediction and maximum
    /// deviation must be non-negative.  The jitter radius is floored to
    /// [`MIN_JITTER_RADIUS`] rather than rejected.
    pub fn new(
        smoothing:            f32,
        correction:           f32,
        prediction:           f32,
        jitter_radius:        f32,
        max_deviation_radius: f32,
    ) -> Result<Self> {
        let params = SmoothParameters {
            smoothing,
            correction,
            prediction,
            jitter_radius,
            max_deviation_radius,
        };
        params.check()?;
        Ok(params.validated())
    }

    /// Verify every field, reporting the first one out of range.
    pub fn check(&self) -> Result<()> {
        let fields = [
            ("smoothing",            self.smoothing),
            ("correction",           self.correction),
            ("prediction",           self.prediction),
            ("jitter_radius",        self.jitter_radius),
            ("max_deviation_radius", self.max_deviation_radius),
        ];
        if let Some((name, _)) = fields.into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(FilterError::NotFinite { name });
        }
        for (name, value) in [("smoothing", self.smoothing), ("correction", self.correction)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(FilterError::OutOfUnitRange { name, value });
            }
        }
        for (name, value) in [
            ("prediction",           self.prediction),
            ("max_deviation_radius", self.max_deviation_radius),
        ] {
            if value < 0.0 {
                return Err(FilterError::Negative { name, value });
            }
        }
        Ok(())
    }

    /// Same parameters with the jitter radius floored so it can divide.
    pub fn validated(mut self) -> Self {
        self.jitter_radius = self.jitter_radius.max(MIN_JITTER_RADIUS);
        self
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FilterState
// ════════════════════════════════════════════════════════════════════════════

/// Per-channel history carried from one frame to the next.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FilterState {
    pub raw_value:      f32,
    pub filtered_value: f32,
    pub trend:          f32,
    /// Saturates; only 0, 1 and "2 or more" change the update rule.
    pub frame_count:    u32,
}

// ════════════════════════════════════════════════════════════════════════════
// SingleNumberFilter
// ════════════════════════════════════════════════════════════════════════════

/// Double-exponential smoothing filter for one scalar channel.
#[derive(Clone, Debug, Default)]
pub struct SingleNumberFilter {
    params: SmoothParameters,
    state:  FilterState,
}

impl SingleNumberFilter {
    /// Filter with the default parameters.
    pub fn new() -> Self {
        Self::with_params(SmoothParameters::default())
    }

    pub fn with_params(params: SmoothParameters) -> Self {
        SingleNumberFilter {
            params: params.validated(),
            state:  FilterState::default(),
        }
    }

    pub fn params(&self) -> &SmoothParameters { &self.params }
    pub fn state(&self)  -> &FilterState      { &self.state }
    pub fn frame_count(&self) -> u32          { self.state.frame_count }

    /// Forget all history; the next sample passes through unchanged.
    pub fn reset(&mut self) {
        self.state = FilterState::default();
    }

    /// Feed one raw sample and return the smoothed, predicted value.
    ///
    /// A negative or non-finite sample is a "no reading" signal: the channel
    /// is reset and the sample is handed back untouched.
    pub fn update(&mut self, raw: f32) -> f32 {
        if raw < 0.0 || !raw.is_finite() {
            trace!(raw, "invalid sample, resetting filter");
            self.reset();
            return raw;
        }

        let p = &self.params;
        let prev = self.state;

        let (filtered, trend) = match prev.frame_count {
            0 => (raw, 0.0),
            1 => {
                let filtered = (raw + prev.raw_value) * 0.5;
                (filtered, self.next_trend(filtered))
            }
            _ => {
                let filtered = raw * (1.0 - p.smoothing)
                    + (prev.filtered_value + prev.trend) * p.smoothing;
                (filtered, self.next_trend(filtered))
            }
        };

        // Predict into the future to hide the smoothing lag
        let mut predicted = filtered + trend * p.prediction;

        // Never stray further than max_deviation_radius from the raw sample
        let diff = (predicted - raw).abs();
        if diff > p.max_deviation_radius {
            let keep = p.max_deviation_radius / diff;
            predicted = predicted * keep + raw * (1.0 - keep);
        }

        self.state = FilterState {
            raw_value:      raw,
            filtered_value: filtered,
            trend,
            frame_count:    prev.frame_count.saturating_add(1),
        };

        predicted
    }

    fn next_trend(&self, filtered: f32) -> f32 {
        let c = self.params.correction;
        (filtered - self.state.filtered_value) * c + self.state.trend * (1.0 - c)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
