//! Per-frame hand tracking: picks the hand to follow, builds the gesture
//! pose, smooths the finger count and watches for pinch/release grips.

use std::time::Duration;

use extra_gestures::{GestureEvent, GestureRegistry, PoseSnapshot, Vec3};
use pose_filter::SingleNumberFilter;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::config::TrackerConfig;
use crate::frame::{to_scene, HandObservation, InteractionBox, TrackingFrame};

/// Edge reported once when a grip starts or ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum GripEvent {
    Pinch,
    Release,
}

/// What one accepted frame produced.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackerUpdate {
    pub frame_id: u64,
    pub time:     Duration,
    pub snapshot: PoseSnapshot,
    pub grip:     Option<GripEvent>,
    pub gestures: Vec<GestureEvent>,
}

// ════════════════════════════════════════════════════════════════════════════
// GripDetector
// ════════════════════════════════════════════════════════════════════════════

/// Pinch detection from the smoothed finger count.
///
/// Sampled every `frames_to_skip` frames.  A grip needs two equal samples
/// followed by a lower one with the thumb-side finger gone; it ends when the
/// count climbs back and either the thumb reappears or the pre-grip count
/// is reached.
#[derive(Clone, Debug)]
struct GripDetector {
    frames_to_skip:   u64,
    left_handed:      bool,
    prev:             Option<u32>,
    prev_prev:        Option<u32>,
    detected:         bool,
    reported:         bool,
    grip_fingers:     u32,
    last_check_frame: u64,
    left_finger:      Option<i32>,
    right_finger:     Option<i32>,
}

impl GripDetector {
    fn new(frames_to_skip: u32, left_handed: bool) -> Self {
        GripDetector {
            frames_to_skip:   u64::from(frames_to_skip.max(1)),
            left_handed,
            prev:             None,
            prev_prev:        None,
            detected:         false,
            reported:         false,
            grip_fingers:     0,
            last_check_frame: 0,
            left_finger:      None,
            right_finger:     None,
        }
    }

    /// Forget the sample history (new hand or no hand).
    fn restart(&mut self) {
        self.prev      = None;
        self.prev_prev = None;
        self.detected  = false;
    }

    fn thumb_finger(&self) -> Option<i32> {
        if self.left_handed { self.right_finger } else { self.left_finger }
    }

    fn sample(&mut self, frame_counter: u64, fingers_now: u32, hand: &HandObservation) {
        if frame_counter - self.last_check_frame < self.frames_to_skip {
            return;
        }
        self.last_check_frame = frame_counter;

        if self.prev == self.prev_prev {
            let thumb_present = self.thumb_finger().map(|id| hand.has_finger(id));
            if !self.detected {
                if let Some(prev) = self.prev.filter(|&p| fingers_now < p) {
                    if thumb_present == Some(false) {
                        self.detected     = true;
                        self.grip_fingers = prev;
                    }
                } else {
                    self.left_finger  = hand.leftmost_finger().map(|f| f.id);
                    self.right_finger = hand.rightmost_finger().map(|f| f.id);
                }
            } else if self.prev.map_or(true, |p| fingers_now >= p)
                && (thumb_present == Some(true) || fingers_now >= self.grip_fingers)
            {
                self.detected = false;
            }
        }

        self.prev_prev = self.prev;
        self.prev      = Some(fingers_now);
    }

    /// Report each grip edge exactly once.
    fn poll(&mut self) -> Option<GripEvent> {
        match (self.detected, self.reported) {
            (true, false) => {
                self.reported = true;
                Some(GripEvent::Pinch)
            }
            (false, true) => {
                self.reported = false;
                Some(GripEvent::Release)
            }
            _ => None,
        }
    }

    fn clear(&mut self) {
        self.detected = false;
        self.reported = false;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandTracker
// ════════════════════════════════════════════════════════════════════════════

/// Turns raw [`TrackingFrame`]s into gesture input and events.
pub struct HandTracker {
    left_handed:       bool,
    interaction_box:   InteractionBox,
    last_frame_id:     Option<u64>,
    frame_counter:     u64,
    hand_id:           Option<i32>,
    filter_hand_id:    Option<i32>,
    finger_filter:     SingleNumberFilter,
    filtered_fingers:  f32,
    cursor:            [f32; 2],
    grip:              GripDetector,
    registry:          GestureRegistry,
}

impl HandTracker {
    pub fn new(config: &TrackerConfig) -> Self {
        HandTracker {
            left_handed:      config.left_handed_user,
            interaction_box:  config.interaction_box,
            last_frame_id:    None,
            frame_counter:    0,
            hand_id:          None,
            filter_hand_id:   None,
            finger_filter:    SingleNumberFilter::with_params(config.finger_filter),
            filtered_fingers: 0.0,
            cursor:           [0.5, 0.5],
            grip:             GripDetector::new(config.frames_to_skip, config.left_handed_user),
            registry:         GestureRegistry::with_gestures(
                config.tracking_pause(),
                config.extra_gestures.iter().copied(),
            ),
        }
    }

    /// Process one frame.  Returns `None` if the frame repeats the last id.
    pub fn tick(&mut self, frame: &TrackingFrame) -> Option<TrackerUpdate> {
        if self.last_frame_id == Some(frame.frame_id) {
            return None;
        }
        self.last_frame_id  = Some(frame.frame_id);
        self.frame_counter += 1;

        let hand = self.select_hand(frame);
        let snapshot = self.snapshot(hand);
        trace!(frame = frame.frame_id, ?snapshot, "pose");

        // Finger-count filter and grip detection follow the tracked hand
        if self.hand_id != self.filter_hand_id {
            self.filter_hand_id = self.hand_id;
            self.finger_filter.reset();
            self.grip.restart();
        }
        if let Some(hand) = hand {
            self.filtered_fingers = self.finger_filter.update(hand.fingers.len() as f32);
            let fingers_now = (self.filtered_fingers + 0.5).max(0.0) as u32;
            self.grip.sample(self.frame_counter, fingers_now, hand);
        }

        let grip = self.grip.poll();
        if let Some(edge) = grip {
            info!(?edge, hand = ?self.hand_id, "grip");
        }

        let gestures = self.registry.update(frame.time(), &snapshot);

        Some(TrackerUpdate {
            frame_id: frame.frame_id,
            time: frame.time(),
            snapshot,
            grip,
            gestures,
        })
    }

    /// Keep following the current hand; otherwise take the last one in the frame.
    fn select_hand<'f>(&mut self, frame: &'f TrackingFrame) -> Option<&'f HandObservation> {
        let hand = self
            .hand_id
            .and_then(|id| frame.hands.iter().find(|h| h.id == id))
            .or_else(|| frame.hands.last());

        let id = hand.map(|h| h.id);
        if id != self.hand_id {
            debug!(from = ?self.hand_id, to = ?id, "tracked hand changed");
            self.hand_id = id;
        }
        hand
    }

    fn snapshot(&mut self, hand: Option<&HandObservation>) -> PoseSnapshot {
        let Some(hand) = hand else {
            return PoseSnapshot::none().with_cursor(self.cursor);
        };

        if hand.palm_position != Vec3::ZERO {
            self.cursor = self.interaction_box.normalize_point(hand.palm_position);
        }

        let thumb = if self.left_handed { hand.rightmost_finger() } else { hand.leftmost_finger() };
        let mut pose = PoseSnapshot::hand(hand.id, to_scene(hand.palm_position), hand.fingers.len() as u32)
            .with_cursor(self.cursor);
        pose.thumb_id = thumb.map(|f| f.id);
        pose
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn registry(&self) -> &GestureRegistry { &self.registry }
    pub fn registry_mut(&mut self) -> &mut GestureRegistry { &mut self.registry }

    /// Frames accepted so far (repeats excluded).
    pub fn frame_counter(&self) -> u64 { self.frame_counter }
    pub fn hand_id(&self) -> Option<i32> { self.hand_id }
    pub fn filtered_finger_count(&self) -> f32 { self.filtered_fingers }
    pub fn cursor(&self) -> [f32; 2] { self.cursor }
    pub fn is_grip_detected(&self) -> bool { self.grip.detected }

    /// Drop the current grip without reporting a release.
    pub fn clear_grip(&mut self) {
        self.grip.clear();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FingerObservation;
    use extra_gestures::GestureKind;

    /// Five fingers spread along x; `ids` picks which are extended.
    fn hand(id: i32, palm: Vec3, ids: &[i32]) -> HandObservation {
        HandObservation {
            id,
            palm_position: palm,
            fingers: ids
                .iter()
                .map(|&f| FingerObservation { id: f, tip_position: Vec3::new(f as f32 * 10.0, 250.0, 0.0) })
                .collect(),
        }
    }

    fn frame(frame_id: u64, millis: u64, hands: Vec<HandObservation>) -> TrackingFrame {
        TrackingFrame { frame_id, timestamp_us: millis * 1000, hands }
    }

    fn grip_config() -> TrackerConfig {
        TrackerConfig { frames_to_skip: 1, extra_gestures: vec![], ..TrackerConfig::default() }
    }

    const OPEN:  [i32; 5] = [1, 2, 3, 4, 5];
    const PINCH: [i32; 4] = [2, 3, 4, 5];

    #[test]
    fn repeated_frame_is_ignored() {
        let mut t = HandTracker::new(&grip_config());
        let f = frame(7, 0, vec![]);
        assert!(t.tick(&f).is_some());
        assert!(t.tick(&f).is_none());
        assert_eq!(t.frame_counter(), 1);
    }

    #[test]
    fn keeps_current_hand_else_takes_last() {
        let mut t = HandTracker::new(&grip_config());
        t.tick(&frame(1, 0, vec![hand(4, Vec3::ZERO, &OPEN), hand(9, Vec3::ZERO, &OPEN)]));
        assert_eq!(t.hand_id(), Some(9));

        // Hand 9 still present, though no longer last
        t.tick(&frame(2, 100, vec![hand(9, Vec3::ZERO, &OPEN), hand(4, Vec3::ZERO, &OPEN)]));
        assert_eq!(t.hand_id(), Some(9));

        t.tick(&frame(3, 200, vec![hand(4, Vec3::ZERO, &OPEN)]));
        assert_eq!(t.hand_id(), Some(4));

        let update = t.tick(&frame(4, 300, vec![])).unwrap();
        assert_eq!(t.hand_id(), None);
        assert!(!update.snapshot.hand_valid);
    }

    #[test]
    fn snapshot_in_scene_units_with_thumb_and_cursor() {
        let mut t = HandTracker::new(&grip_config());
        let update = t.tick(&frame(1, 0, vec![hand(3, Vec3::new(0.0, 200.0, 100.0), &OPEN)])).unwrap();
        let s = update.snapshot;
        assert!(s.hand_valid);
        assert_eq!(s.hand_id, 3);
        assert_eq!(s.finger_count, 5);
        assert_eq!(s.thumb_id, Some(1));
        assert_eq!(s.cursor, [0.5, 0.5]);
        assert!((s.hand_pos - Vec3::new(0.0, 0.2, -0.1)).length() < 1e-6);
    }

    #[test]
    fn left_handed_thumb_is_rightmost() {
        let cfg = TrackerConfig { left_handed_user: true, ..grip_config() };
        let mut t = HandTracker::new(&cfg);
        let update = t.tick(&frame(1, 0, vec![hand(3, Vec3::ZERO, &OPEN)])).unwrap();
        assert_eq!(update.snapshot.thumb_id, Some(5));
    }

    #[test]
    fn cursor_holds_when_hand_is_lost() {
        let mut t = HandTracker::new(&grip_config());
        t.tick(&frame(1, 0, vec![hand(3, Vec3::new(120.0, 320.0, 0.0), &OPEN)]));
        assert_eq!(t.cursor(), [1.0, 1.0]);
        let update = t.tick(&frame(2, 100, vec![])).unwrap();
        assert_eq!(update.snapshot.cursor, [1.0, 1.0]);
    }

    fn grips(t: &mut HandTracker, fingers: &[&[i32]]) -> Vec<Option<GripEvent>> {
        fingers
            .iter()
            .enumerate()
            .map(|(i, ids)| {
                let f = frame(i as u64 + 1, i as u64 * 20, vec![hand(1, Vec3::new(0.0, 200.0, 0.0), ids)]);
                t.tick(&f).unwrap().grip
            })
            .collect()
    }

    #[test]
    fn pinch_then_release() {
        let mut t = HandTracker::new(&grip_config());
        let events = grips(&mut t, &[&OPEN, &OPEN, &OPEN, &PINCH, &PINCH, &OPEN]);
        assert_eq!(events, vec![None, None, None, Some(GripEvent::Pinch), None, Some(GripEvent::Release)]);
        assert!(!t.is_grip_detected());
    }

    #[test]
    fn losing_a_non_thumb_finger_is_not_a_pinch() {
        let mut t = HandTracker::new(&grip_config());
        let events = grips(&mut t, &[&OPEN, &OPEN, &OPEN, &[1, 2, 3, 4], &[1, 2, 3, 4]]);
        assert!(events.iter().all(Option::is_none));
    }

    #[test]
    fn hand_change_releases_grip() {
        let mut t = HandTracker::new(&grip_config());
        grips(&mut t, &[&OPEN, &OPEN, &OPEN, &PINCH]);
        assert!(t.is_grip_detected());

        let update = t.tick(&frame(10, 1000, vec![hand(2, Vec3::ZERO, &PINCH)])).unwrap();
        assert_eq!(update.grip, Some(GripEvent::Release));
        assert_eq!(t.filtered_finger_count(), 4.0);
    }

    #[test]
    fn clear_grip_suppresses_release() {
        let mut t = HandTracker::new(&grip_config());
        grips(&mut t, &[&OPEN, &OPEN, &OPEN, &PINCH]);
        t.clear_grip();
        assert!(!t.is_grip_detected());
        let update = t.tick(&frame(10, 1000, vec![])).unwrap();
        assert_eq!(update.grip, None);
    }

    #[test]
    fn grip_sampling_respects_frame_skip() {
        let cfg = TrackerConfig { frames_to_skip: 3, ..grip_config() };
        let mut t = HandTracker::new(&cfg);
        // Samples land on frames 3, 6, 9, 12
        let mut seq: Vec<&[i32]> = vec![&OPEN[..]; 9];
        seq.extend([&PINCH[..]; 3]);
        let events = grips(&mut t, &seq);
        assert_eq!(events[11], Some(GripEvent::Pinch));
        assert!(events[..11].iter().all(Option::is_none));
    }

    #[test]
    fn gestures_run_on_the_snapshot() {
        let cfg = TrackerConfig { extra_gestures: vec![GestureKind::HandSwipe], ..grip_config() };
        let mut t = HandTracker::new(&cfg);
        t.tick(&frame(1, 0, vec![hand(1, Vec3::new(0.0, 200.0, 0.0), &OPEN)]));
        // 200 mm to the right
        let update = t.tick(&frame(2, 300, vec![hand(1, Vec3::new(200.0, 200.0, 0.0), &OPEN)])).unwrap();
        assert!(matches!(update.gestures[..], [GestureEvent::Completed { kind: GestureKind::HandSwipe, .. }]));
        assert!(t.registry_mut().is_complete(GestureKind::HandSwipe, true, Duration::from_millis(300)));
    }
}
