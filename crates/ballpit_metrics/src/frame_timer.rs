//! Wall-clock cost of simulation steps

use super::ring_buffer::RingBuffer;
use std::time::{Duration, Instant};

/// Rolling step cost. A step is bracketed by [`begin`](Self::begin) and
/// [`end`](Self::end); an `end` without a matching `begin` is ignored.
pub struct FrameTimer {
    started: Option<Instant>,
    samples: RingBuffer<Duration>,
    total_frames: u64,
}

impl FrameTimer {
    pub fn new(capacity: usize) -> Self {
        Self {
            started: None,
            samples: RingBuffer::new(capacity),
            total_frames: 0,
        }
    }

    pub fn begin(&mut self) {
        self.started = Some(Instant::now());
    }

    pub fn end(&mut self) {
        if let Some(started) = self.started.take() {
            self.samples.push(started.elapsed());
            self.total_frames += 1;
        }
    }

    /// Frames completed since construction.
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Steps per second the loop could sustain at the current average cost.
    pub fn fps(&self) -> f64 {
        match self.samples.average().as_secs_f64() {
            secs if secs > 0.0 => secs.recip(),
            _ => 0.0,
        }
    }

    pub fn frame_time_ms(&self) -> f64 {
        to_ms(self.samples.average())
    }

    /// Fastest and slowest step in the window.
    pub fn frame_time_range_ms(&self) -> (f64, f64) {
        let (min, max) = self.samples.min_max();
        (to_ms(min), to_ms(max))
    }
}

fn to_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
