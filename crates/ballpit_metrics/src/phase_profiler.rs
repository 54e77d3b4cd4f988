//! Rolling timings for the named phases of a simulation step

use super::ring_buffer::RingBuffer;
use std::time::{Duration, Instant};

/// Per-phase rolling timings, reported in first-seen order.
pub struct PhaseProfiler {
    capacity: usize,
    phases: Vec<(&'static str, RingBuffer<Duration>)>,
}

impl PhaseProfiler {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            phases: Vec::new(),
        }
    }

    pub fn time_phase<F, R>(&mut self, name: &'static str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        match self.phases.iter_mut().find(|(phase, _)| *phase == name) {
            Some((_, samples)) => samples.push(elapsed),
            None => {
                let mut samples = RingBuffer::new(self.capacity);
                samples.push(elapsed);
                self.phases.push((name, samples));
            }
        }
        result
    }

    pub fn average(&self, name: &str) -> Duration {
        self.phases
            .iter()
            .find(|(phase, _)| *phase == name)
            .map(|(_, samples)| samples.average())
            .unwrap_or(Duration::ZERO)
    }

    pub fn averages(&self) -> Vec<(&'static str, Duration)> {
        self.phases
            .iter()
            .map(|(phase, samples)| (*phase, samples.average()))
            .collect()
    }

    pub fn reset(&mut self) {
        self.phases.clear();
    }
}

impl Default for PhaseProfiler {
    fn default() -> Self {
        Self::new(120)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_keep_first_seen_order() {
        let mut profiler = PhaseProfiler::new(4);
        profiler.time_phase("grid", || ());
        profiler.time_phase("solve", || ());
        profiler.time_phase("grid", || ());

        let names: Vec<_> = profiler.averages().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["grid", "solve"]);
        assert_eq!(profiler.average("missing"), Duration::ZERO);

        profiler.reset();
        assert!(profiler.averages().is_empty());
    }
}
