//! Fixed-capacity ring buffer for rolling averages

use std::time::Duration;

/// Keeps the most recent `capacity` samples, overwriting the oldest.
pub struct RingBuffer<T> {
    samples: Vec<T>,
    capacity: usize,
    index: usize,
}

impl<T: Clone + Default> RingBuffer<T> {
    /// A zero capacity is bumped to one so `push` never divides by zero.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
            index: 0,
        }
    }

    pub fn push(&mut self, sample: T) {
        if self.samples.len() < self.capacity {
            self.samples.push(sample);
        } else {
            self.samples[self.index] = sample;
        }
        self.index = (self.index + 1) % self.capacity;
    }

    /// Most recently pushed sample.
    pub fn latest(&self) -> Option<&T> {
        if self.samples.is_empty() {
            return None;
        }
        let last = (self.index + self.capacity - 1) % self.capacity;
        self.samples.get(last)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.index = 0;
    }
}

impl RingBuffer<Duration> {
    pub fn average(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }

        let sum: Duration = self.samples.iter().sum();
        sum / self.samples.len() as u32
    }

    pub fn min_max(&self) -> (Duration, Duration) {
        let min = self.samples.iter().min().copied().unwrap_or(Duration::ZERO);
        let max = self.samples.iter().max().copied().unwrap_or(Duration::ZERO);
        (min, max)
    }
}
