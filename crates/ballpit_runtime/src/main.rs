//! Ballpit Runtime
//!
//! Headless driver: loads settings, replays an input recording (the built-in
//! demo by default) through the simulation, and logs frame statistics.
//!
//! Run `ballpit --help` for the flags.

use anyhow::Result;
use ballpit_core::time::{FixedStepper, TICK_SECONDS};
use ballpit_core::Simulation;
use ballpit_metrics::FrameTimer;
use ballpit_services::{InputCommand, InputRecording, Settings};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Frames between statistics log lines.
const REPORT_INTERVAL: u64 = 120;

#[derive(Parser, Debug)]
#[command(name = "ballpit", version, about = "Replay pointer input through a ballpit simulation")]
struct Args {
    /// Settings JSON; defaults apply when omitted
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Input recording to replay instead of the built-in demo
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Write the replayed recording as JSON
    #[arg(long, value_name = "FILE")]
    record: Option<PathBuf>,

    /// Write the final snapshot as JSON
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Run whole 60 Hz ticks instead of each frame's raw dt
    #[arg(long)]
    fixed_step: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    tracing::info!("Ballpit v{}", ballpit_core::VERSION);
    let args = Args::parse();

    let mut settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let recording = match &args.replay {
        Some(path) => InputRecording::load(path)?,
        None => InputRecording::demo(),
    };
    if let Some(path) = &args.record {
        recording.save(path)?;
        tracing::info!(path = %path.display(), "wrote recording");
    }

    let mut sim = Simulation::new(settings.simulation_config())?;
    tracing::info!(
        bodies = sim.len(),
        frames = recording.len(),
        seconds = recording.duration(),
        "starting replay"
    );

    let mut timer = FrameTimer::new(REPORT_INTERVAL as usize);
    let mut stepper = FixedStepper::default();
    let mut frames = 0u64;

    'replay: for frame in recording.iter() {
        for command in &frame.commands {
            match *command {
                InputCommand::Sim(command) => sim.apply(command),
                InputCommand::ToggleFullscreen => {
                    let (width, height) = settings.window.toggle_fullscreen();
                    tracing::info!(fullscreen = settings.window.fullscreen, "toggled fullscreen");
                    sim.on_resize(width, height);
                }
                InputCommand::Quit => {
                    tracing::info!(frame = frames, "quit requested");
                    break 'replay;
                }
            }
        }

        timer.begin();
        if args.fixed_step {
            let ticks = stepper.push(Duration::from_secs_f32(frame.dt));
            for _ in 0..ticks {
                sim.step(TICK_SECONDS, frame.pointer);
            }
        } else {
            sim.step(frame.dt, frame.pointer);
        }
        timer.end();
        frames += 1;

        if frames % REPORT_INTERVAL == 0 {
            report(&sim, &timer);
        }
    }
    report(&sim, &timer);

    if let Some(path) = &args.snapshot {
        write_snapshot(&sim, path)?;
    }
    tracing::info!("Runtime shut down cleanly");
    Ok(())
}

fn report(sim: &Simulation, timer: &FrameTimer) {
    let (min_ms, max_ms) = timer.frame_time_range_ms();
    let stats = sim.last_stats();
    tracing::info!(
        tick = sim.clock().tick_count(),
        bodies = sim.len(),
        steps_per_sec = timer.fps(),
        step_ms = timer.frame_time_ms(),
        min_ms,
        max_ms,
        pair_checks = stats.pair_checks,
        contacts = stats.contacts,
        obstacle_contacts = stats.obstacle_contacts,
        "frame stats"
    );
    for (phase, average) in sim.profiler().averages() {
        tracing::debug!(phase, micros = average.as_micros() as u64, "phase timing");
    }
}

fn write_snapshot(sim: &Simulation, path: &Path) -> Result<()> {
    let document = serde_json::json!({
        "tick": sim.clock().tick_count(),
        "elapsed": sim.clock().elapsed(),
        "width": sim.config().width,
        "height": sim.config().height,
        "container": sim.container_snapshot(),
        "bodies": sim.snapshot(),
    });
    std::fs::write(path, serde_json::to_string_pretty(&document)?)?;
    tracing::info!(path = %path.display(), bodies = sim.len(), "wrote snapshot");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn flags_parse() {
        let args = Args::try_parse_from(["ballpit", "--replay", "run.json", "--fixed-step"]).unwrap();
        assert_eq!(args.replay, Some(PathBuf::from("run.json")));
        assert!(args.fixed_step);
        assert!(args.settings.is_none());

        assert!(Args::try_parse_from(["ballpit", "--snapshot"]).is_err());
        assert!(Args::try_parse_from(["ballpit", "--bogus"]).is_err());
    }
}
