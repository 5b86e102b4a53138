//! Tracker configuration, loadable from a TOML file.
//!
//! ```toml
//! frames_to_skip = 10
//! left_handed_user = false
//! extra_gestures = ["Fist", "Click", "HandSwipe"]
//! min_time_between_gestures = 1.0
//!
//! [finger_filter]
//! smoothing = 0.5
//! correction = 0.5
//! prediction = 0.5
//! jitter_radius = 0.05
//! max_deviation_radius = 0.04
//! ```
//!
//! Every key is optional; missing keys take the defaults shown above.

use std::fs;
use std::path::Path;
use std::time::Duration;

use extra_gestures::{GestureKind, DEFAULT_TRACKING_PAUSE};
use pose_filter::SmoothParameters;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::frame::InteractionBox;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Frames between two grip-detection samples.
    pub frames_to_skip:            u32,
    /// Use the rightmost finger as the thumb.
    pub left_handed_user:          bool,
    /// Gestures registered at start-up.
    pub extra_gestures:            Vec<GestureKind>,
    /// Seconds all gesture detection pauses after a completion.
    pub min_time_between_gestures: f32,
    /// Smoothing applied to the finger count before grip detection.
    pub finger_filter:             SmoothParameters,
    pub interaction_box:           InteractionBox,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            frames_to_skip:            10,
            left_handed_user:          false,
            extra_gestures:            GestureKind::ALL.to_vec(),
            min_time_between_gestures: DEFAULT_TRACKING_PAUSE.as_secs_f32(),
            finger_filter:             SmoothParameters::default(),
            interaction_box:           InteractionBox::default(),
        }
    }
}

impl TrackerConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: TrackerConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frames_to_skip == 0 {
            return Err(ConfigError::Invalid("frames_to_skip must be at least 1".into()));
        }
        if Duration::try_from_secs_f32(self.min_time_between_gestures).is_err() {
            return Err(ConfigError::Invalid(format!(
                "min_time_between_gestures must be a non-negative number of seconds, got {}",
                self.min_time_between_gestures
            )));
        }
        self.finger_filter.check()?;
        Ok(())
    }

    /// The global pause after a completion.  Falls back to the default for
    /// values [`validate`](Self::validate) would reject.
    pub fn tracking_pause(&self) -> Duration {
        Duration::try_from_secs_f32(self.min_time_between_gestures).unwrap_or(DEFAULT_TRACKING_PAUSE)
    }
}
