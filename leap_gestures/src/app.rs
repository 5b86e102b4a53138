//! Session loop: frames in, gesture and grip events out.
//!
//! `Session` owns the [`HandTracker`] and a running [`SessionSummary`].
//! Completed gestures are consumed (reset with their cool-down) as soon as
//! they are seen, so each completion is counted once.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use extra_gestures::{swipe_direction, GestureEvent, GestureKind, SwipeDirection};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::TrackerConfig;
use crate::error::Result;
use crate::frame::TrackingFrame;
use crate::source::{spawn_frame_source, FrameSource};
use crate::tracker::{GripEvent, HandTracker, TrackerUpdate};

// ════════════════════════════════════════════════════════════════════════════
// SessionSummary
// ════════════════════════════════════════════════════════════════════════════

/// Counts accumulated over one run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SessionSummary {
    /// Frames accepted by the tracker (repeats excluded).
    pub frames:        u64,
    pub completed:     BTreeMap<GestureKind, u32>,
    pub swipes:        BTreeMap<SwipeDirection, u32>,
    pub cancellations: u32,
    pub pinches:       u32,
    pub releases:      u32,
}

impl SessionSummary {
    pub fn completed(&self, kind: GestureKind) -> u32 {
        self.completed.get(&kind).copied().unwrap_or(0)
    }

    pub fn swipes(&self, direction: SwipeDirection) -> u32 {
        self.swipes.get(&direction).copied().unwrap_or(0)
    }
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Frames processed : {}", self.frames)?;
        for kind in GestureKind::ALL {
            writeln!(f, "  {:<17}: {}", kind.as_str(), self.completed(kind))?;
        }
        for (dir, n) in &self.swipes {
            writeln!(f, "    swipe {:<9}: {}", dir.as_str(), n)?;
        }
        writeln!(f, "  Cancellations    : {}", self.cancellations)?;
        write!(f, "  Pinch / release  : {} / {}", self.pinches, self.releases)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Session
// ════════════════════════════════════════════════════════════════════════════

pub struct Session {
    tracker: HandTracker,
    summary: SessionSummary,
}

impl Session {
    pub fn new(config: &TrackerConfig) -> Self {
        Session {
            tracker: HandTracker::new(config),
            summary: SessionSummary::default(),
        }
    }

    /// Feed one frame.  Returns `None` for a repeated frame.
    pub fn handle_frame(&mut self, frame: &TrackingFrame) -> Option<TrackerUpdate> {
        let update = self.tracker.tick(frame)?;
        self.summary.frames += 1;

        match update.grip {
            Some(GripEvent::Pinch)   => self.summary.pinches  += 1,
            Some(GripEvent::Release) => self.summary.releases += 1,
            None => {}
        }

        for event in &update.gestures {
            match *event {
                GestureEvent::Armed { .. } => {}
                GestureEvent::Cancelled { kind, .. } => {
                    self.summary.cancellations += 1;
                    debug!(gesture = kind.as_str(), "gesture cancelled");
                }
                GestureEvent::Completed { kind, .. } => self.consume_completion(kind, update.time),
            }
        }
        Some(update)
    }

    fn consume_completion(&mut self, kind: GestureKind, now: Duration) {
        let registry = self.tracker.registry_mut();
        // Read before the reset so the direction is the completed one
        let direction = registry.direction(kind);
        if !registry.is_complete(kind, true, now) {
            return;
        }

        *self.summary.completed.entry(kind).or_default() += 1;
        if kind == GestureKind::HandSwipe {
            let label = swipe_direction(direction);
            info!(direction = label.as_str(), "swipe");
            *self.summary.swipes.entry(label).or_default() += 1;
        }
    }

    pub fn tracker(&self) -> &HandTracker { &self.tracker }
    pub fn summary(&self) -> &SessionSummary { &self.summary }

    pub fn into_summary(self) -> SessionSummary {
        self.summary
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Entry point
// ════════════════════════════════════════════════════════════════════════════

/// Run `source` to exhaustion through a fresh tracker.
pub fn run<S: FrameSource>(config: &TrackerConfig, source: S) -> Result<SessionSummary> {
    config.validate()?;
    info!(
        gestures = ?config.extra_gestures,
        frames_to_skip = config.frames_to_skip,
        left_handed = config.left_handed_user,
        "tracking started"
    );

    let frames = spawn_frame_source(source);
    let mut session = Session::new(config);
    for frame in frames {
        session.handle_frame(&frame);
    }

    let summary = session.into_summary();
    info!(frames = summary.frames, "source finished");
    Ok(summary)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, ConfigError};
    use crate::frame::{FingerObservation, HandObservation};
    use crate::source::ReplaySource;
    use extra_gestures::Vec3;
    use std::io::Cursor;

    fn open_hand(palm: Vec3, finger_ids: &[i32]) -> HandObservation {
        HandObservation {
            id: 1,
            palm_position: palm,
            fingers: finger_ids
                .iter()
                .map(|&id| FingerObservation { id, tip_position: palm + Vec3::new(id as f32 * 15.0, 40.0, 0.0) })
                .collect(),
        }
    }

    fn frame_at(i: u64, palm: Vec3, fingers: &[i32]) -> TrackingFrame {
        TrackingFrame { frame_id: i + 1, timestamp_us: i * 100_000, hands: vec![open_hand(palm, fingers)] }
    }

    fn config_for(kinds: &[GestureKind]) -> TrackerConfig {
        TrackerConfig { frames_to_skip: 1, extra_gestures: kinds.to_vec(), ..TrackerConfig::default() }
    }

    fn as_json_lines(frames: &[TrackingFrame]) -> String {
        frames
            .iter()
            .map(|f| serde_json::to_string(f).unwrap() + "\n")
            .collect()
    }

    #[test]
    fn swipe_counted_once_with_direction() {
        let mut session = Session::new(&config_for(&[GestureKind::HandSwipe]));
        let centre = Vec3::new(0.0, 200.0, 0.0);
        session.handle_frame(&frame_at(0, centre, &[1, 2, 3]));
        session.handle_frame(&frame_at(1, centre + Vec3::new(0.0, 0.0, -200.0), &[1, 2, 3]));
        // Hand stays away; the completion was consumed
        session.handle_frame(&frame_at(2, centre + Vec3::new(0.0, 0.0, -200.0), &[1, 2, 3]));

        let s = session.summary();
        assert_eq!(s.completed(GestureKind::HandSwipe), 1);
        // Toward the sensor's -z is away from the user in scene space
        assert_eq!(s.swipes(SwipeDirection::Forward), 1);
    }

    #[test]
    fn click_completes_after_holding_still() {
        let mut session = Session::new(&config_for(&[GestureKind::Click]));
        let palm = Vec3::new(10.0, 220.0, 5.0);
        for i in 0..25 {
            session.handle_frame(&frame_at(i, palm, &[1, 2, 3, 4, 5]));
        }
        let s = session.summary();
        assert_eq!(s.completed(GestureKind::Click), 1);
        assert_eq!(s.cancellations, 0);
        assert_eq!(s.frames, 25);
    }

    #[test]
    fn cancellations_and_grips_are_counted() {
        let mut session = Session::new(&config_for(&[GestureKind::Click]));
        let palm = Vec3::new(0.0, 200.0, 0.0);
        let open  = [1, 2, 3, 4, 5];
        let pinch = [2, 3, 4, 5];
        session.handle_frame(&frame_at(0, palm, &open));
        session.handle_frame(&frame_at(1, palm, &open));
        session.handle_frame(&frame_at(2, palm, &open));
        session.handle_frame(&frame_at(3, palm, &pinch));
        // 100 mm drift breaks the click
        session.handle_frame(&frame_at(4, palm + Vec3::new(100.0, 0.0, 0.0), &pinch));
        session.handle_frame(&frame_at(5, palm + Vec3::new(100.0, 0.0, 0.0), &open));

        let s = session.summary();
        assert_eq!((s.pinches, s.releases), (1, 1));
        assert_eq!(s.cancellations, 1);
        assert_eq!(s.completed(GestureKind::Click), 0);
    }

    #[test]
    fn run_replays_a_recorded_session() {
        let centre = Vec3::new(0.0, 200.0, 0.0);
        let frames = vec![
            frame_at(0, centre, &[1, 2]),
            frame_at(0, centre, &[1, 2]),
            frame_at(1, centre + Vec3::new(200.0, 0.0, 0.0), &[1, 2]),
        ];
        let source = ReplaySource::new(Cursor::new(as_json_lines(&frames)));
        let summary = run(&config_for(&[GestureKind::HandSwipe]), source).unwrap();
        assert_eq!(summary.frames, 2);
        assert_eq!(summary.swipes(SwipeDirection::Right), 1);
    }

    #[test]
    fn run_rejects_invalid_config() {
        let cfg = TrackerConfig { frames_to_skip: 0, ..TrackerConfig::default() };
        let source = ReplaySource::new(Cursor::new(String::new()));
        let err = run(&cfg, source).unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn summary_display_lists_every_kind() {
        let mut s = SessionSummary::default();
        s.completed.insert(GestureKind::Fist, 2);
        let text = s.to_string();
        assert!(text.contains("fist"));
        assert!(text.contains("click"));
        assert!(text.contains("hand-swipe"));
    }
}
