//! Per-gesture state machines.
//!
//! Every gesture kind runs the same two-phase machine:
//!
//! ```text
//!   Idle ──arm──▶ Armed ──hold/move──▶ Complete
//!     ▲             │
//!     └─ Cancelled ◀┘  (pose lost, wrong hand, window expired)
//! ```
//!
//! Arming captures an anchor (hand id, palm position, time).  While armed,
//! each frame checks the gesture's continuity predicate; progress grows with
//! the time spent in pose and the gesture completes once the hold duration
//! is reached.  A cancelled gesture re-arms on the next qualifying frame.
//!
//! Times are [`Duration`]s since an arbitrary session origin, so a hold
//! measured between two frame times is exact.

use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ════════════════════════════════════════════════════════════════════════════
// Thresholds
// ════════════════════════════════════════════════════════════════════════════

/// How long a fist must be held after arming.
pub const POSE_COMPLETE_DURATION: Duration = Duration::from_millis(1500);
/// How long the hand must stay put for a click.
pub const CLICK_STAY_DURATION: Duration = Duration::from_secs(2);
/// Scene units the hand may drift while clicking.
pub const CLICK_RADIUS: f32 = 0.05;
/// Scene units the hand must travel for a swipe.
pub const SWIPE_MIN_DISTANCE: f32 = 0.15;
/// Time after arming within which a swipe must happen.
pub const SWIPE_WINDOW: Duration = Duration::from_millis(1500);
/// Per-kind cool-down applied when a gesture is reset.
pub const MIN_TIME_BETWEEN_GESTURES: Duration = Duration::from_millis(700);

// ════════════════════════════════════════════════════════════════════════════
// GestureKind / GesturePhase
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GestureKind {
    /// Open hand closing to a fist.
    Fist,
    /// Hand held still over a target.
    Click,
    /// Fast palm movement in any direction.
    HandSwipe,
}

impl GestureKind {
    pub const ALL: [GestureKind; 3] = [GestureKind::Fist, GestureKind::Click, GestureKind::HandSwipe];

    pub fn as_str(&self) -> &'static str {
        match self {
            GestureKind::Fist      => "fist",
            GestureKind::Click     => "click",
            GestureKind::HandSwipe => "hand-swipe",
        }
    }

    /// Progress reported as soon as the gesture arms.
    fn armed_progress(self) -> f32 {
        match self {
            GestureKind::Fist | GestureKind::Click => 0.3,
            GestureKind::HandSwipe                 => 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GesturePhase {
    /// Waiting for the arming precondition.
    #[default]
    Idle,
    /// Anchor captured; waiting for completion.
    Armed,
    /// Finished.  Stays here until the record is reset.
    Complete,
    /// Lost the pose; behaves like `Idle` but remembers why.
    Cancelled,
}

impl GesturePhase {
    /// Numeric phase: 0 awaiting detection, 1 awaiting completion, 2 complete.
    pub fn state_index(self) -> u8 {
        match self {
            GesturePhase::Idle | GesturePhase::Cancelled => 0,
            GesturePhase::Armed                          => 1,
            GesturePhase::Complete                       => 2,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PoseSnapshot
// ════════════════════════════════════════════════════════════════════════════

/// One frame of tracked-hand data, already in scene units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseSnapshot {
    pub hand_valid:   bool,
    pub hand_id:      i32,
    pub hand_pos:     Vec3,
    pub finger_count: u32,
    /// Id of the thumb-side finger, if any finger is visible.
    pub thumb_id:     Option<i32>,
    /// Normalised cursor position, `[0, 1]` on both axes.
    pub cursor:       [f32; 2],
}

impl PoseSnapshot {
    /// Frame with no tracked hand.
    pub fn none() -> Self { Self::default() }

    pub fn hand(hand_id: i32, hand_pos: Vec3, finger_count: u32) -> Self {
        PoseSnapshot {
            hand_valid: true,
            hand_id,
            hand_pos,
            finger_count,
            ..Self::default()
        }
    }

    pub fn with_thumb(mut self, thumb_id: i32) -> Self {
        self.thumb_id = Some(thumb_id);
        self
    }

    pub fn with_cursor(mut self, cursor: [f32; 2]) -> Self {
        self.cursor = cursor;
        self
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureRecord
// ════════════════════════════════════════════════════════════════════════════

/// Live tracking state of one gesture kind.
#[derive(Clone, Debug, PartialEq)]
pub struct GestureRecord {
    pub kind:           GestureKind,
    pub phase:          GesturePhase,
    /// Time of the last phase transition (arming or completion).
    pub timestamp:      Duration,
    pub joint_id:       i32,
    pub joint_pos:      Vec3,
    pub screen_pos:     [f32; 2],
    /// Thumb id captured at arming (fist only).
    pub thumb_id:       Option<i32>,
    pub progress:       f32,
    /// Arming to completion.
    pub complete_time:  Duration,
    /// Displacement from anchor to completion position.
    pub direction:      Vec3,
    /// Detection is skipped until this time.
    pub earliest_retry: Duration,
}

impl GestureRecord {
    pub fn new(kind: GestureKind) -> Self {
        GestureRecord {
            kind,
            phase:          GesturePhase::Idle,
            timestamp:      Duration::ZERO,
            joint_id:       0,
            joint_pos:      Vec3::ZERO,
            screen_pos:     [0.0; 2],
            thumb_id:       None,
            progress:       0.0,
            complete_time:  Duration::ZERO,
            direction:      Vec3::ZERO,
            earliest_retry: Duration::ZERO,
        }
    }

    pub fn is_complete(&self)  -> bool { self.phase == GesturePhase::Complete }
    pub fn is_cancelled(&self) -> bool { self.phase == GesturePhase::Cancelled }
    pub fn state_index(&self)  -> u8   { self.phase.state_index() }

    /// Unit direction of the completed gesture.
    pub fn normalized_direction(&self) -> Vec3 {
        self.direction.normalize_or_zero()
    }

    /// Unit direction of the average velocity, zero for instant gestures.
    pub fn velocity(&self) -> Vec3 {
        if !self.complete_time.is_zero() {
            (self.direction / self.complete_time.as_secs_f32()).normalize_or_zero()
        } else {
            Vec3::ZERO
        }
    }

    fn arm(&mut self, now: Duration, pose: &PoseSnapshot) {
        self.joint_id   = pose.hand_id;
        self.joint_pos  = pose.hand_pos;
        self.timestamp  = now;
        self.screen_pos = pose.cursor;
        self.progress   = self.kind.armed_progress();
        self.phase      = GesturePhase::Armed;
    }

    fn cancel(&mut self) {
        self.phase    = GesturePhase::Cancelled;
        self.progress = 0.0;
    }

    /// Advance an armed pose-hold; leaving the pose cancels it.
    fn check_pose_complete(&mut self, now: Duration, joint_pos: Vec3, in_pose: bool, duration: Duration) {
        if !in_pose {
            self.cancel();
            return;
        }

        let elapsed = now.saturating_sub(self.timestamp);
        self.progress = if duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / duration.as_secs_f64()).min(1.0) as f32
        };

        if elapsed >= duration {
            self.complete_time = elapsed;
            self.direction     = joint_pos - self.joint_pos;
            self.timestamp     = now;
            self.joint_pos     = joint_pos;
            self.phase         = GesturePhase::Complete;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GestureEvent
// ════════════════════════════════════════════════════════════════════════════

/// Phase transition produced by one detection step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureEvent {
    Armed     { kind: GestureKind, at: Duration },
    Cancelled { kind: GestureKind, at: Duration },
    Completed { kind: GestureKind, at: Duration, duration: Duration, direction: Vec3 },
}

impl GestureEvent {
    pub fn kind(&self) -> GestureKind {
        match *self {
            GestureEvent::Armed { kind, .. }
            | GestureEvent::Cancelled { kind, .. }
            | GestureEvent::Completed { kind, .. } => kind,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// check_for_gesture
// ════════════════════════════════════════════════════════════════════════════

/// Advance `record` by one frame.  Completed gestures are left untouched
/// until the caller resets them.
pub fn check_for_gesture(record: &mut GestureRecord, now: Duration, pose: &PoseSnapshot) -> Option<GestureEvent> {
    if record.is_complete() {
        return None;
    }

    let before = record.phase;
    match record.kind {
        GestureKind::Fist      => step_fist(record, now, pose),
        GestureKind::Click     => step_click(record, now, pose),
        GestureKind::HandSwipe => step_swipe(record, now, pose),
    }

    let kind = record.kind;
    let event = match (before, record.phase) {
        (b, a) if b == a                 => None,
        (_, GesturePhase::Armed)         => Some(GestureEvent::Armed { kind, at: now }),
        (_, GesturePhase::Cancelled)     => Some(GestureEvent::Cancelled { kind, at: now }),
        (_, GesturePhase::Complete)      => Some(GestureEvent::Completed {
            kind,
            at:        now,
            duration:  record.complete_time,
            direction: record.direction,
        }),
        (_, GesturePhase::Idle)          => None,
    };
    if let Some(ref e) = event {
        debug!(?e, progress = record.progress, "gesture transition");
    }
    event
}

fn is_armed(record: &GestureRecord) -> bool {
    record.phase == GesturePhase::Armed
}

fn step_fist(record: &mut GestureRecord, now: Duration, pose: &PoseSnapshot) {
    if !is_armed(record) {
        if pose.hand_valid && pose.finger_count > 1 {
            record.arm(now, pose);
            record.thumb_id = pose.thumb_id;
        }
        return;
    }

    if !pose.hand_valid {
        return;
    }

    let hand_match  = pose.hand_id == record.joint_id;
    let thumb_match = pose.finger_count == 0 || pose.thumb_id == record.thumb_id;

    if hand_match && thumb_match {
        if pose.finger_count <= 1 {
            record.screen_pos = pose.cursor;
            record.check_pose_complete(now, pose.hand_pos, true, POSE_COMPLETE_DURATION);
        }
    } else {
        record.cancel();
    }
}

fn step_click(record: &mut GestureRecord, now: Duration, pose: &PoseSnapshot) {
    if !is_armed(record) {
        if pose.hand_valid {
            record.arm(now, pose);
        }
        return;
    }

    if !pose.hand_valid {
        return;
    }

    let drift   = pose.hand_pos.distance(record.joint_pos);
    let in_pose = pose.hand_id == record.joint_id && drift < CLICK_RADIUS;
    record.check_pose_complete(now, pose.hand_pos, in_pose, CLICK_STAY_DURATION);
}

fn step_swipe(record: &mut GestureRecord, now: Duration, pose: &PoseSnapshot) {
    if !is_armed(record) {
        if pose.hand_valid {
            record.arm(now, pose);
        }
        return;
    }

    if now.saturating_sub(record.timestamp) >= SWIPE_WINDOW {
        record.cancel();
        return;
    }

    if pose.hand_valid {
        let travel  = pose.hand_pos.distance(record.joint_pos);
        let in_pose = pose.hand_id == record.joint_id && travel > SWIPE_MIN_DISTANCE;
        if in_pose {
            record.check_pose_complete(now, pose.hand_pos, true, Duration::ZERO);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SwipeDirection
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SwipeDirection {
    None,
    Right,
    Left,
    Up,
    Down,
    Forward,
    Back,
}

impl SwipeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeDirection::None    => "none",
            SwipeDirection::Right   => "right",
            SwipeDirection::Left    => "left",
            SwipeDirection::Up      => "up",
            SwipeDirection::Down    => "down",
            SwipeDirection::Forward => "forward",
            SwipeDirection::Back    => "back",
        }
    }
}

/// Classify a displacement by its dominant axis.
///
/// x is compared against y first; the winner is then compared against z.
/// Ties go to the later axis (y over x, z over either).
pub fn swipe_direction(dir: Vec3) -> SwipeDirection {
    if dir == Vec3::ZERO {
        return SwipeDirection::None;
    }

    let (ax, ay, az) = (dir.x.abs(), dir.y.abs(), dir.z.abs());
    let depth = || if dir.z > 0.0 { SwipeDirection::Forward } else { SwipeDirection::Back };

    if ax > ay {
        if ax > az {
            if dir.x > 0.0 { SwipeDirection::Right } else { SwipeDirection::Left }
        } else {
            depth()
        }
    } else if ay > az {
        if dir.y > 0.0 { SwipeDirection::Up } else { SwipeDirection::Down }
    } else {
        depth()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
