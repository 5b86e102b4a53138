//! Interactive explorer for the smoothing filter: type raw samples, watch the
//! smoothed and predicted output.

use pose_filter::{SingleNumberFilter, SmoothParameters};
use std::io::{self, Write};

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║       Double-Exponential Smoothing Explorer          ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let params = pick_params();
    let mut filter = SingleNumberFilter::with_params(params);

    println!();
    println!("  Enter one sample per line (negative = no reading).");
    println!("  'r' resets the filter, 'q' quits.");
    println!();
    println!("  {:>6}  {:>10}  {:>10}  {:>10}  {:>6}", "frame", "raw", "output", "trend", "count");

    let mut frame = 0usize;
    loop {
        let line = read_line("  > ");
        let input = line.trim();
        if input.is_empty() { continue; }
        if input.eq_ignore_ascii_case("q") {
            println!("\nGoodbye!\n");
            break;
        }
        if input.eq_ignore_ascii_case("r") {
            filter.reset();
            println!("  ── filter reset ──");
            continue;
        }

        let raw: f32 = match input.parse() {
            Ok(v)  => v,
            Err(_) => { println!("  ⚠  Not a number: {}", input); continue; }
        };

        let out = filter.update(raw);
        let state = filter.state();
        println!(
            "  {:>6}  {:>10.4}  {:>10.4}  {:>10.4}  {:>6}",
            frame, raw, out, state.trend, state.frame_count
        );
        frame += 1;
    }
}

fn pick_params() -> SmoothParameters {
    let d = SmoothParameters::default();
    println!("  Defaults: smoothing={} correction={} prediction={} jitter={} max_dev={}",
        d.smoothing, d.correction, d.prediction, d.jitter_radius, d.max_deviation_radius);

    if !read_line("  Customise? (y/N): ").trim().eq_ignore_ascii_case("y") {
        return d;
    }

    loop {
        let smoothing  = read_f32("    Smoothing  [0..1]", d.smoothing);
        let correction = read_f32("    Correction [0..1]", d.correction);
        let prediction = read_f32("    Prediction (frames)", d.prediction);
        let jitter     = read_f32("    Jitter radius", d.jitter_radius);
        let max_dev    = read_f32("    Max deviation radius", d.max_deviation_radius);

        match SmoothParameters::new(smoothing, correction, prediction, jitter, max_dev) {
            Ok(p)  => return p,
            Err(e) => println!("    ⚠  {}", e),
        }
    }
}

fn read_f32(label: &str, default: f32) -> f32 {
    read_line(&format!("{} (default {}): ", label, default))
        .trim().parse().unwrap_or(default)
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
