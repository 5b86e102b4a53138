//! Shows the filter on a noisy finger-count stream: a hand closing from five
//! fingers to a fist, with single-frame dropouts and a lost-hand gap.

use pose_filter::{SingleNumberFilter, SmoothParameters};

fn show(label: &str, filter: &mut SingleNumberFilter, samples: &[f32]) {
    println!("{}", label);
    for (i, &raw) in samples.iter().enumerate() {
        let out = filter.update(raw);
        println!("   {:>3}  raw {:>5.1}  →  {:>7.3}   (count {})",
            i, raw, out, filter.frame_count());
    }
    println!();
}

fn main() {
    println!("\n=== Finger-count smoothing demo ===\n");

    // ── 1. Default parameters ────────────────────────────────────────────
    let mut filter = SingleNumberFilter::new();
    show("1. Closing hand with jitter (defaults)", &mut filter,
        &[5.0, 5.0, 4.0, 5.0, 4.0, 3.0, 3.0, 2.0, 1.0, 0.0, 1.0, 0.0, 0.0]);

    // ── 2. Lost hand in the middle ───────────────────────────────────────
    filter.reset();
    show("2. Hand lost for one frame (negative = no reading)", &mut filter,
        &[3.0, 3.0, 3.0, -1.0, 2.0, 2.0, 2.0]);

    // ── 3. Loose clamp, aggressive prediction ────────────────────────────
    let params = SmoothParameters {
        smoothing:            0.7,
        correction:           0.3,
        prediction:           2.0,
        max_deviation_radius: 1.0,
        ..SmoothParameters::default()
    };
    let mut loose = SingleNumberFilter::with_params(params);
    show("3. Aggressive prediction, 1.0 deviation radius", &mut loose,
        &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 5.0, 5.0, 5.0]);
}
