//! Frame sources: real hardware or a recorded session.
//!
//! Whichever source is used, frames arrive as [`TrackingFrame`]s over a
//! `mpsc` channel, so the tracker never knows where they came from.

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use tracing::{debug, warn};

use crate::frame::TrackingFrame;

// ════════════════════════════════════════════════════════════════════════════
// FrameSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`TrackingFrame`]s over a channel.
///
/// `run` returns when the source is exhausted or the receiver hangs up.
pub trait FrameSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<TrackingFrame>);
}

/// Spawn a frame source on its own thread and return the receiving end.
pub fn spawn_frame_source<S: FrameSource>(source: S) -> Receiver<TrackingFrame> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// ReplaySource: recorded JSON-lines session
// ════════════════════════════════════════════════════════════════════════════

/// Replays frames recorded one JSON object per line.
///
/// Blank lines are skipped; lines that don't parse are logged and skipped.
pub struct ReplaySource<R> {
    reader: R,
}

impl<R: BufRead + Send + 'static> ReplaySource<R> {
    pub fn new(reader: R) -> Self {
        ReplaySource { reader }
    }
}

impl<R: BufRead + Send + 'static> FrameSource for ReplaySource<R> {
    fn run(self: Box<Self>, tx: Sender<TrackingFrame>) {
        let mut sent = 0usize;
        for (index, line) in self.reader.lines().enumerate() {
            let line = match line {
                Ok(l)  => l,
                Err(e) => {
                    warn!(line = index + 1, error = %e, "replay read failed, stopping");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<TrackingFrame>(&line) {
                Ok(frame) => {
                    if tx.send(frame).is_err() {
                        return;
                    }
                    sent += 1;
                }
                Err(e) => warn!(line = index + 1, error = %e, "skipping malformed frame"),
            }
        }
        debug!(frames = sent, "replay finished");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapFrameSource: real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Poll timeout handed to LeapC, in milliseconds.
#[cfg(any(feature = "leap", test))]
const POLL_TIMEOUT_MS: u32 = 100;

/// Consecutive failed polls before the device is treated as gone (5 s).
#[cfg(any(feature = "leap", test))]
const MAX_POLL_FAILURES: u32 = 50;

/// Counts consecutive poll failures; any delivered message clears it.
#[cfg(any(feature = "leap", test))]
#[derive(Debug, Default)]
struct PollFailures {
    consecutive: u32,
}

#[cfg(any(feature = "leap", test))]
impl PollFailures {
    /// Record a failure.  Returns true once the limit is reached.
    fn failed(&mut self) -> bool {
        self.consecutive = self.consecutive.saturating_add(1);
        self.consecutive >= MAX_POLL_FAILURES
    }

    fn delivered(&mut self) {
        self.consecutive = 0;
    }
}

/// Frame source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Only extended fingers are reported; finger ids are `hand_id * 10 + digit`.
#[cfg(feature = "leap")]
pub struct LeapFrameSource;

#[cfg(feature = "leap")]
impl FrameSource for LeapFrameSource {
    fn run(self: Box<Self>, tx: Sender<TrackingFrame>) {
        use std::time::Instant;

        use extra_gestures::Vec3;
        use leaprs::*;

        use crate::frame::{FingerObservation, HandObservation};

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c)  => c,
            Err(e) => {
                warn!(error = ?e, "cannot create LeapC connection");
                return;
            }
        };
        if let Err(e) = connection.open() {
            warn!(error = ?e, "cannot open LeapMotion device");
            return;
        }

        let started = Instant::now();
        let mut frame_id = 0u64;
        let mut failures = PollFailures::default();

        loop {
            let msg = match connection.poll(POLL_TIMEOUT_MS) {
                Ok(m)  => m,
                Err(e) => {
                    debug!(error = ?e, "LeapC poll failed");
                    if failures.failed() {
                        warn!(polls = MAX_POLL_FAILURES, "no message from LeapC, closing source");
                        return;
                    }
                    continue;
                }
            };
            failures.delivered();

            if let Event::Tracking(frame) = msg.event() {
                frame_id += 1;
                let hands = frame
                    .hands()
                    .into_iter()
                    .map(|hand| {
                        let hand_id = hand.id() as i32;
                        let p = hand.palm().position();
                        let fingers = hand
                            .digits()
                            .into_iter()
                            .enumerate()
                            .filter(|(_, d)| d.is_extended())
                            .map(|(i, d)| {
                                let tip = d.distal().next_joint();
                                FingerObservation {
                                    id:           hand_id * 10 + i as i32,
                                    tip_position: Vec3::new(tip.x, tip.y, tip.z),
                                }
                            })
                            .collect();
                        HandObservation {
                            id:            hand_id,
                            palm_position: Vec3::new(p.x, p.y, p.z),
                            fingers,
                        }
                    })
                    .collect();

                let frame = TrackingFrame {
                    frame_id,
                    timestamp_us: u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
                    hands,
                };
                if tx.send(frame).is_err() {
                    debug!(frames = frame_id, "receiver closed, stopping LeapC source");
                    return;
                }
            }
        }
    }
}
