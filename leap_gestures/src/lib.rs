//! # leap_gestures
//!
//! LeapMotion hand tracker built on [`pose_filter`] and [`extra_gestures`].
//!
//! Each sensor frame goes through the [`HandTracker`](tracker::HandTracker):
//!
//! 1. keep following the current hand, or pick up the last hand in view;
//! 2. build a [`PoseSnapshot`](extra_gestures::PoseSnapshot) in scene units,
//!    with the thumb-side finger and an interaction-box cursor;
//! 3. smooth the finger count and sample it for pinch/release grips;
//! 4. advance the registered fist/click/swipe gestures.
//!
//! ## Frame sources
//!
//! | Source | Availability |
//! |---|---|
//! | [`ReplaySource`](source::ReplaySource) | always; JSON-lines recordings |
//! | `LeapFrameSource` | `leap` feature; needs the LeapC library |
//!
//! ## Feature flags
//!
//! * (default): **Replay mode**: recorded sessions only, no hardware.
//! * `leap`: **Hardware mode**: polls a real LeapMotion controller via LeapC.

pub mod app;
pub mod config;
pub mod error;
pub mod frame;
pub mod logging;
pub mod source;
pub mod tracker;

pub use app::{run, Session, SessionSummary};
pub use config::TrackerConfig;
pub use error::{AppError, ConfigError, Result};
pub use frame::{FingerObservation, HandObservation, InteractionBox, TrackingFrame};
pub use tracker::{GripEvent, HandTracker, TrackerUpdate};
