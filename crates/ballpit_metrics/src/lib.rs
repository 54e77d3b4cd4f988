//! Ballpit Metrics - frame and phase timing for the simulation loop
//!
//! Provides zero-cost abstractions for metrics collection that completely
//! vanish in production builds via feature flags.
//!
//! # Feature Flags
//!
//! - `metrics` - Enable metrics collection (default: disabled)
//!
//! # Usage
//!
//! ```ignore
//! use ballpit_metrics::{FrameTimer, PhaseProfiler};
//!
//! let mut timer = FrameTimer::new(120);
//! let mut phases = PhaseProfiler::new(120);
//! timer.begin();
//! phases.time_phase("integrate", || integrate(&mut bodies, dt));
//! timer.end();
//! println!("steps/s: {:.1}", timer.fps());
//! ```
//!
//! Without the `metrics` feature every type below is a no-op stub with the
//! same signatures, so call sites never need their own `cfg` guards.

#[cfg(feature = "metrics")]
mod frame_timer;
#[cfg(feature = "metrics")]
mod phase_profiler;
#[cfg(feature = "metrics")]
mod ring_buffer;

#[cfg(feature = "metrics")]
pub use frame_timer::FrameTimer;
#[cfg(feature = "metrics")]
pub use phase_profiler::PhaseProfiler;
#[cfg(feature = "metrics")]
pub use ring_buffer::RingBuffer;

// ============================================================================
// No-op stubs when metrics disabled
// ============================================================================

#[cfg(not(feature = "metrics"))]
pub struct FrameTimer;

#[cfg(not(feature = "metrics"))]
impl FrameTimer {
    pub fn new(_capacity: usize) -> Self { Self }
    pub fn begin(&mut self) {}
    pub fn end(&mut self) {}
    pub fn total_frames(&self) -> u64 { 0 }
    pub fn fps(&self) -> f64 { 0.0 }
    pub fn frame_time_ms(&self) -> f64 { 0.0 }
    pub fn frame_time_range_ms(&self) -> (f64, f64) { (0.0, 0.0) }
}

#[cfg(not(feature = "metrics"))]
pub struct RingBuffer<T>(std::marker::PhantomData<T>);

#[cfg(not(feature = "metrics"))]
impl<T> RingBuffer<T> {
    pub fn new(_capacity: usize) -> Self { Self(std::marker::PhantomData) }
    pub fn push(&mut self, _value: T) {}
    pub fn len(&self) -> usize { 0 }
    pub fn is_empty(&self) -> bool { true }
    pub fn average(&self) -> T where T: Default { T::default() }
}

#[cfg(not(feature = "metrics"))]
pub struct PhaseProfiler;

#[cfg(not(feature = "metrics"))]
impl PhaseProfiler {
    pub fn new(_capacity: usize) -> Self { Self }
    pub fn time_phase<F, R>(&mut self, _name: &'static str, f: F) -> R where F: FnOnce() -> R { f() }
    pub fn average(&self, _name: &str) -> std::time::Duration { std::time::Duration::ZERO }
    pub fn averages(&self) -> Vec<(&'static str, std::time::Duration)> { Vec::new() }
    pub fn reset(&mut self) {}
}

#[cfg(not(feature = "metrics"))]
impl Default for PhaseProfiler {
    fn default() -> Self { Self }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_compiles_without_metrics() {
        // Stubs and real types share signatures
        let mut _timer = super::FrameTimer::new(60);
        let mut _buffer = super::RingBuffer::<std::time::Duration>::new(10);
        let mut profiler = super::PhaseProfiler::new(10);
        let value = profiler.time_phase("noop", || 7);
        assert_eq!(value, 7);
    }
}
