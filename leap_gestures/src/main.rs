//! leap_gestures command-line entry point.

use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{ArgAction, Parser};
use leap_gestures::logging::{init_logging, LogConfig, LogFormat};
use leap_gestures::source::ReplaySource;
use leap_gestures::{run, SessionSummary, TrackerConfig};

#[derive(Parser)]
#[command(
    name = "leap_gestures",
    version,
    about = "Track a hand and report fist, click, swipe and pinch gestures"
)]
struct Cli {
    /// TOML tracker configuration (defaults are used when omitted).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Replay a recorded JSON-lines session; `-` reads stdin.
    #[arg(long, value_name = "PATH", conflicts_with = "leap")]
    replay: Option<PathBuf>,

    /// Read live frames from a LeapMotion controller.
    #[arg(long)]
    leap: bool,

    /// More logging (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Warnings and errors only.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Print the session summary as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig::from_verbosity(cli.verbose, cli.quiet)
        .with_format(cli.log_format)
        .with_ansi(cli.log_file.is_none() && io::stderr().is_terminal())
        .with_log_file(cli.log_file.clone());
    init_logging(&log_config).context("failed to initialize logging")?;

    let config = match &cli.config {
        Some(path) => TrackerConfig::load(path)?,
        None => TrackerConfig::default(),
    };

    let summary = if cli.leap {
        run_leap(&config)?
    } else {
        match cli.replay.as_deref() {
            Some(path) if path.as_os_str() == "-" => {
                run(&config, ReplaySource::new(BufReader::new(io::stdin())))?
            }
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("cannot open replay file {}", path.display()))?;
                run(&config, ReplaySource::new(BufReader::new(file)))?
            }
            None => bail!("no frame source: pass --replay PATH or --leap"),
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!();
        println!("╔══════════════════════════════════════════════════════╗");
        println!("║                  Session summary                     ║");
        println!("╚══════════════════════════════════════════════════════╝");
        println!("{summary}");
    }
    Ok(())
}

#[cfg(feature = "leap")]
fn run_leap(config: &TrackerConfig) -> anyhow::Result<SessionSummary> {
    Ok(run(config, leap_gestures::source::LeapFrameSource)?)
}

#[cfg(not(feature = "leap"))]
fn run_leap(_config: &TrackerConfig) -> anyhow::Result<SessionSummary> {
    bail!("built without hardware support; rebuild with --features leap")
}
