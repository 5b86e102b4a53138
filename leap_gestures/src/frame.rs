//! Raw sensor frames as delivered by a frame source.
//!
//! Positions are in sensor millimetres with the sensor's right-handed axes
//! (z toward the user).  [`to_scene`] converts them to scene metres with z
//! pointing away from the user.

use std::time::Duration;

use extra_gestures::Vec3;
use serde::{Deserialize, Serialize};

/// Millimetres → scene metres, depth axis flipped.
pub fn to_scene(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, -v.z) * 0.001
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FingerObservation {
    pub id:           i32,
    pub tip_position: Vec3,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HandObservation {
    pub id:            i32,
    pub palm_position: Vec3,
    /// Extended fingers only.
    #[serde(default)]
    pub fingers:       Vec<FingerObservation>,
}

impl HandObservation {
    pub fn has_finger(&self, id: i32) -> bool {
        self.fingers.iter().any(|f| f.id == id)
    }

    /// Leftmost (smallest x) finger.
    pub fn leftmost_finger(&self) -> Option<&FingerObservation> {
        self.fingers.iter().min_by(|a, b| a.tip_position.x.total_cmp(&b.tip_position.x))
    }

    /// Rightmost (largest x) finger.
    pub fn rightmost_finger(&self) -> Option<&FingerObservation> {
        self.fingers.iter().max_by(|a, b| a.tip_position.x.total_cmp(&b.tip_position.x))
    }
}

/// One sensor frame.  `timestamp_us` is microseconds since the source
/// started, the sensor's own clock unit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackingFrame {
    pub frame_id:     u64,
    pub timestamp_us: u64,
    #[serde(default)]
    pub hands:        Vec<HandObservation>,
}

impl TrackingFrame {
    /// Frame time as a [`Duration`] since the source started.
    pub fn time(&self) -> Duration {
        Duration::from_micros(self.timestamp_us)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// InteractionBox
// ════════════════════════════════════════════════════════════════════════════

/// The region above the sensor mapped onto the screen.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InteractionBox {
    /// Centre in sensor millimetres.
    pub center: Vec3,
    /// Width, height, depth in millimetres.
    pub size:   Vec3,
}

impl Default for InteractionBox {
    fn default() -> Self {
        InteractionBox {
            center: Vec3::new(0.0, 200.0, 0.0),
            size:   Vec3::new(240.0, 240.0, 150.0),
        }
    }
}

impl InteractionBox {
    /// Screen-plane position of `p`, clamped to `[0, 1]` on both axes.
    pub fn normalize_point(&self, p: Vec3) -> [f32; 2] {
        let axis = |v: f32, c: f32, s: f32| {
            if s <= 0.0 { 0.5 } else { ((v - c) / s + 0.5).clamp(0.0, 1.0) }
        };
        [
            axis(p.x, self.center.x, self.size.x),
            axis(p.y, self.center.y, self.size.y),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_scene_scales_and_flips_depth() {
        let v = to_scene(Vec3::new(100.0, 250.0, 50.0));
        assert!((v - Vec3::new(0.1, 0.25, -0.05)).length() < 1e-6, "{:?}", v);
    }

    #[test]
    fn interaction_box_centre_and_clamp() {
        let b = InteractionBox::default();
        assert_eq!(b.normalize_point(Vec3::new(0.0, 200.0, 0.0)), [0.5, 0.5]);
        assert_eq!(b.normalize_point(Vec3::new(120.0, 80.0, 0.0)), [1.0, 0.0]);
        assert_eq!(b.normalize_point(Vec3::new(-999.0, 999.0, 0.0)), [0.0, 1.0]);
    }

    #[test]
    fn extreme_fingers() {
        let hand = HandObservation {
            id: 1,
            palm_position: Vec3::ZERO,
            fingers: vec![
                FingerObservation { id: 12, tip_position: Vec3::new(10.0, 0.0, 0.0) },
                FingerObservation { id: 10, tip_position: Vec3::new(-40.0, 0.0, 0.0) },
                FingerObservation { id: 14, tip_position: Vec3::new(35.0, 0.0, 0.0) },
            ],
        };
        assert_eq!(hand.leftmost_finger().map(|f| f.id), Some(10));
        assert_eq!(hand.rightmost_finger().map(|f| f.id), Some(14));
        assert!(hand.has_finger(12));
        assert!(!hand.has_finger(11));
    }

    #[test]
    fn frame_parses_from_json_line() {
        let line = r#"{"frame_id":3,"timestamp_us":50000,"hands":[{"id":1,"palm_position":[0,200,0]}]}"#;
        let frame: TrackingFrame = serde_json::from_str(line).unwrap();
        assert_eq!(frame.frame_id, 3);
        assert_eq!(frame.time(), Duration::from_millis(50));
        assert_eq!(frame.hands.len(), 1);
        assert_eq!(frame.hands[0].palm_position, Vec3::new(0.0, 200.0, 0.0));
        assert!(frame.hands[0].fingers.is_empty());
    }

    #[test]
    fn frame_time_keeps_microseconds() {
        let frame = TrackingFrame { frame_id: 1, timestamp_us: 100_020, hands: vec![] };
        assert_eq!(frame.time(), Duration::from_millis(100) + Duration::from_micros(20));
    }
}
