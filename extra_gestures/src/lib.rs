//! # extra_gestures
//!
//! Hold- and motion-based hand gestures built on top of raw per-frame pose
//! data, with progress feedback, cancellation and per-gesture cool-down.
//!
//! | Gesture | Arms when | Completes when | Cancels when |
//! |---|---|---|---|
//! | [`Fist`](GestureKind::Fist) | hand with ≥2 fingers | ≤1 finger, same hand and thumb, 1.5 s after arming | hand or thumb changes |
//! | [`Click`](GestureKind::Click) | any hand | hand stays within 0.05 for 2.0 s | hand drifts or changes |
//! | [`HandSwipe`](GestureKind::HandSwipe) | any hand | hand moves > 0.15 within 1.5 s | 1.5 s pass without a swipe |
//!
//! The host owns a [`GestureRegistry`], feeds it one [`PoseSnapshot`] per
//! sensor frame and reads back progress, completion and direction. Times are
//! [`Duration`](std::time::Duration)s since the start of the session, and
//! positions are [`glam::Vec3`].
//!
//! ```rust
//! use std::time::Duration;
//!
//! use extra_gestures::{GestureKind, GestureRegistry, PoseSnapshot, SwipeDirection, Vec3,
//!                      swipe_direction, DEFAULT_TRACKING_PAUSE};
//!
//! let t = Duration::from_millis;
//! let mut reg = GestureRegistry::with_gestures(DEFAULT_TRACKING_PAUSE, [GestureKind::HandSwipe]);
//! reg.update(t(0), &PoseSnapshot::hand(1, Vec3::ZERO, 5));
//! reg.update(t(200), &PoseSnapshot::hand(1, Vec3::new(0.0, 0.3, 0.0), 5));
//!
//! assert!(reg.is_complete(GestureKind::HandSwipe, true, t(200)));
//! assert_eq!(swipe_direction(reg.direction(GestureKind::HandSwipe)), SwipeDirection::Up);
//! ```

pub mod gesture;
pub mod registry;

pub use gesture::{
    check_for_gesture, swipe_direction, GestureEvent, GestureKind, GesturePhase, GestureRecord,
    PoseSnapshot, SwipeDirection, CLICK_RADIUS, CLICK_STAY_DURATION, MIN_TIME_BETWEEN_GESTURES,
    POSE_COMPLETE_DURATION, SWIPE_MIN_DISTANCE, SWIPE_WINDOW,
};
pub use registry::{GestureRegistry, DEFAULT_TRACKING_PAUSE};
pub use glam::Vec3;
