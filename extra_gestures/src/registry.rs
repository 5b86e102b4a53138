//! The set of gestures a host wants detected, one live record per kind.

use std::time::Duration;

use glam::Vec3;
use tracing::{debug, info};

use crate::gesture::{check_for_gesture, GestureEvent, GestureKind, GesturePhase, GestureRecord,
                     PoseSnapshot, MIN_TIME_BETWEEN_GESTURES};

/// Default pause for all detection after any gesture completes.
pub const DEFAULT_TRACKING_PAUSE: Duration = Duration::from_secs(1);

/// Owns one [`GestureRecord`] per registered kind and advances them together.
///
/// Two cool-downs apply:
///
/// * per kind: a reset record is skipped until `now + MIN_TIME_BETWEEN_GESTURES`;
/// * global: after any completion, no record is advanced for `tracking_pause`.
#[derive(Clone, Debug)]
pub struct GestureRegistry {
    records:             Vec<GestureRecord>,
    tracking_pause:      Duration,
    tracking_resumes_at: Duration,
}

impl Default for GestureRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureRegistry {
    pub fn new() -> Self {
        Self::with_tracking_pause(DEFAULT_TRACKING_PAUSE)
    }

    pub fn with_tracking_pause(tracking_pause: Duration) -> Self {
        GestureRegistry {
            records:             Vec::new(),
            tracking_pause,
            tracking_resumes_at: Duration::ZERO,
        }
    }

    /// Registry with every kind in `kinds` registered.
    pub fn with_gestures<I: IntoIterator<Item = GestureKind>>(tracking_pause: Duration, kinds: I) -> Self {
        let mut reg = Self::with_tracking_pause(tracking_pause);
        for kind in kinds {
            reg.detect(kind);
        }
        reg
    }

    // ── registration ──────────────────────────────────────────────────────

    /// Start detecting `kind`, replacing any existing record for it.
    pub fn detect(&mut self, kind: GestureKind) {
        self.delete(kind);
        self.records.push(GestureRecord::new(kind));
        debug!(gesture = kind.as_str(), "gesture registered");
    }

    /// Rearm `kind` after a cool-down.  Returns false if it isn't registered.
    ///
    /// The last completion's direction and duration are kept so they can
    /// still be read after the reset.
    pub fn reset(&mut self, kind: GestureKind, now: Duration) -> bool {
        match self.record_mut(kind) {
            Some(r) => {
                r.phase          = GesturePhase::Idle;
                r.joint_id       = 0;
                r.thumb_id       = None;
                r.progress       = 0.0;
                r.earliest_retry = now.saturating_add(MIN_TIME_BETWEEN_GESTURES);
                true
            }
            None => false,
        }
    }

    /// Stop detecting `kind`.  Returns false if it wasn't registered.
    pub fn delete(&mut self, kind: GestureKind) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.kind != kind);
        self.records.len() != before
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn is_detected(&self, kind: GestureKind) -> bool {
        self.record(kind).is_some()
    }

    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    // ── per-frame update ──────────────────────────────────────────────────

    /// Advance every registered gesture by one frame.
    ///
    /// The global pause is set once, on the frame a record enters Complete;
    /// a record that stays complete does not extend it.
    pub fn update(&mut self, now: Duration, pose: &PoseSnapshot) -> Vec<GestureEvent> {
        let mut events = Vec::new();
        if now < self.tracking_resumes_at {
            return events;
        }

        for record in self.records.iter_mut() {
            if now < record.earliest_retry {
                continue;
            }
            if let Some(event) = check_for_gesture(record, now, pose) {
                if let GestureEvent::Completed { kind, duration, .. } = event {
                    info!(gesture = kind.as_str(), secs = duration.as_secs_f32(), "gesture complete");
                    self.tracking_resumes_at = now.saturating_add(self.tracking_pause);
                }
                events.push(event);
            }
        }
        events
    }

    // ── queries ───────────────────────────────────────────────────────────

    pub fn record(&self, kind: GestureKind) -> Option<&GestureRecord> {
        self.records.iter().find(|r| r.kind == kind)
    }

    fn record_mut(&mut self, kind: GestureKind) -> Option<&mut GestureRecord> {
        self.records.iter_mut().find(|r| r.kind == kind)
    }

    pub fn records(&self) -> impl Iterator<Item = &GestureRecord> {
        self.records.iter()
    }

    /// True if `kind` has completed.  With `reset_on_complete` the record is
    /// rearmed (with its cool-down) before returning.
    pub fn is_complete(&mut self, kind: GestureKind, reset_on_complete: bool, now: Duration) -> bool {
        let complete = self.record(kind).is_some_and(GestureRecord::is_complete);
        if complete && reset_on_complete {
            self.reset(kind, now);
        }
        complete
    }

    pub fn is_cancelled(&self, kind: GestureKind) -> bool {
        self.record(kind).is_some_and(GestureRecord::is_cancelled)
    }

    /// Progress in `[0, 1]`, or 0 for an unregistered kind.
    pub fn progress(&self, kind: GestureKind) -> f32 {
        self.record(kind).map_or(0.0, |r| r.progress)
    }

    pub fn screen_pos(&self, kind: GestureKind) -> [f32; 2] {
        self.record(kind).map_or([0.0; 2], |r| r.screen_pos)
    }

    /// Normalised direction of the last completion.
    pub fn direction(&self, kind: GestureKind) -> Vec3 {
        self.record(kind).map_or(Vec3::ZERO, GestureRecord::normalized_direction)
    }

    /// Normalised average velocity of the last completion.
    pub fn velocity(&self, kind: GestureKind) -> Vec3 {
        self.record(kind).map_or(Vec3::ZERO, GestureRecord::velocity)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
