//! Simulation time
//!
//! Variable-step clock plus a fixed 60Hz stepper for drivers that want it

use std::time::Duration;

/// Reference tick rate (60 Hz). Per-tick constants such as damping and
/// slosh jitter are expressed against this rate and rescaled by `dt`.
pub const TICK_RATE_HZ: u32 = 60;
pub const TICK_DURATION: Duration = Duration::from_micros(16_666); // ~16.666ms
pub const TICK_SECONDS: f32 = 1.0 / TICK_RATE_HZ as f32;

/// Simulation time tracker
#[derive(Debug, Clone, Default)]
pub struct SimulationClock {
    tick_count: u64,
    elapsed: f64,
}

impl SimulationClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Seconds of simulated time since construction.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn advance(&mut self, dt: f32) {
        self.tick_count += 1;
        self.elapsed += f64::from(dt);
    }
}

/// Converts real frame durations into a whole number of fixed ticks.
///
/// Leftover time carries over to the next frame. At most `max_steps` ticks
/// are produced per frame; the excess is dropped so a long stall does not
/// trigger a burst of catch-up steps.
#[derive(Debug, Clone)]
pub struct FixedStepper {
    accumulator: Duration,
    max_steps: u32,
}

impl FixedStepper {
    pub fn new(max_steps: u32) -> Self {
        Self {
            accumulator: Duration::ZERO,
            max_steps: max_steps.max(1),
        }
    }

    /// Feed one frame's elapsed time; returns how many ticks to run.
    pub fn push(&mut self, frame: Duration) -> u32 {
        self.accumulator += frame;
        let mut steps = 0;
        while self.accumulator >= TICK_DURATION && steps < self.max_steps {
            self.accumulator -= TICK_DURATION;
            steps += 1;
        }
        if steps == self.max_steps && self.accumulator >= TICK_DURATION {
            self.accumulator = Duration::ZERO;
        }
        steps
    }

    /// Fraction of a tick left in the accumulator, for render interpolation.
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / TICK_DURATION.as_secs_f32()
    }
}

impl Default for FixedStepper {
    fn default() -> Self {
        Self::new(5)
    }
}
