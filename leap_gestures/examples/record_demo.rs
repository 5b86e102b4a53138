//! Writes a synthetic 50 Hz session as JSON lines on stdout:
//! a still hand (click), a swipe to the right, a closing fist, then no hand.
//!
//! ```text
//! cargo run --example record_demo > session.jsonl
//! cargo run --bin leap_gestures -- --replay session.jsonl
//! ```

use std::io::{self, BufWriter, Write};

use extra_gestures::Vec3;
use leap_gestures::{FingerObservation, HandObservation, TrackingFrame};

/// 50 Hz.
const FRAME_US: u64 = 20_000;
const HAND_ID: i32 = 7;

fn hand(palm: Vec3, fingers: &[i32]) -> HandObservation {
    HandObservation {
        id: HAND_ID,
        palm_position: palm,
        fingers: fingers
            .iter()
            .map(|&i| FingerObservation {
                id:           HAND_ID * 10 + i,
                tip_position: palm + Vec3::new(-40.0 + i as f32 * 20.0, 60.0, -30.0),
            })
            .collect(),
    }
}

struct Recorder<W: Write> {
    out:   W,
    frame: u64,
}

impl<W: Write> Recorder<W> {
    fn time_us(&self) -> u64 {
        self.frame * FRAME_US
    }

    /// Emit frames until `until` seconds, with the hand given by `pose(t)`.
    fn span(&mut self, until: f32, pose: impl Fn(f32) -> Option<HandObservation>) -> io::Result<()> {
        while (self.time_us() as f32) < until * 1e6 {
            let t = self.time_us();
            let frame = TrackingFrame {
                frame_id:     self.frame + 1,
                timestamp_us: t,
                hands:        pose(t as f32 * 1e-6).into_iter().collect(),
            };
            serde_json::to_writer(&mut self.out, &frame)?;
            writeln!(self.out)?;
            self.frame += 1;
        }
        Ok(())
    }
}

fn main() -> io::Result<()> {
    let centre = Vec3::new(0.0, 200.0, 0.0);
    let open = [0, 1, 2, 3, 4];
    let mut rec = Recorder { out: BufWriter::new(io::stdout().lock()), frame: 0 };

    // Still hand long enough for a click
    rec.span(3.0, |_| Some(hand(centre, &open)))?;

    // 250 mm to the right in 0.3 s
    rec.span(3.3, |t| {
        let x = (t - 3.0) / 0.3 * 250.0;
        Some(hand(centre + Vec3::new(x, 0.0, 0.0), &open))
    })?;
    rec.span(5.0, |_| Some(hand(centre + Vec3::new(250.0, 0.0, 0.0), &open)))?;

    // Back to centre, then close to the thumb only
    rec.span(5.5, |_| Some(hand(centre, &open)))?;
    rec.span(6.0, |_| Some(hand(centre, &[0, 1, 2])))?;
    rec.span(8.0, |_| Some(hand(centre, &[0])))?;

    // Hand leaves
    rec.span(8.5, |_| None)?;

    rec.out.flush()
}
