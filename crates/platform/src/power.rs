//! Power backend trait and the arithmetic shared by implementations.

use std::time::Duration;

use crate::error::Result;

const MICROJOULES_PER_JOULE: f64 = 1_000_000.0;

/// Trait for hardware power backends.
///
/// The owning tracker checks [`is_available`](PowerBackend::is_available),
/// calls [`initialize`](PowerBackend::initialize) once, samples any number of
/// times and finally calls [`shutdown`](PowerBackend::shutdown).
pub trait PowerBackend {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Check if the backend's hardware interface is present.
    ///
    /// Must be callable before initialization and has no side effects.
    fn is_available(&self) -> bool;

    /// Discover the devices this backend will sample.
    fn initialize(&mut self) -> Result<()>;

    /// Identifiers of the discovered devices, in sampling order.
    fn devices(&self) -> Vec<String>;

    /// Measure the average power of every device in watts.
    ///
    /// The returned vector has one entry per device, in the order of
    /// [`devices`](PowerBackend::devices). Implementations may block.
    fn sample_power(&mut self) -> Result<Vec<f64>>;

    /// Release resources held by the backend.
    fn shutdown(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Average power in watts between two cumulative microjoule readings.
///
/// A counter that wrapped between the readings yields a negative value.
pub fn compute_power(before_uj: u64, after_uj: u64, delay: Duration) -> f64 {
    let delta_uj = after_uj as i128 - before_uj as i128;
    let joules = delta_uj as f64 / MICROJOULES_PER_JOULE;
    joules / delay.as_secs_f64()
}

/// Blocks the current thread between two readings.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps with [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<F> Sleeper for F
where
    F: Fn(Duration),
{
    fn sleep(&self, duration: Duration) {
        self(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::Instant;

    #[test]
    fn test_compute_power_one_second() {
        assert_eq!(
            compute_power(1_000_000, 3_000_000, Duration::from_secs(1)),
            2.0
        );
    }

    #[test]
    fn test_compute_power_scales_with_delay() {
        let watts = compute_power(0, 5_000_000, Duration::from_millis(500));
        assert!((watts - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_compute_power_idle_domain() {
        assert_eq!(compute_power(42, 42, Duration::from_secs(1)), 0.0);
    }

    #[test]
    fn test_compute_power_wraparound_is_negative() {
        let watts = compute_power(262_143_000_000, 1_000_000, Duration::from_secs(1));
        assert!(watts < 0.0);
    }

    #[test]
    fn test_closure_sleeper() {
        let slept = Cell::new(Duration::ZERO);
        let sleeper = |d: Duration| slept.set(slept.get() + d);
        sleeper.sleep(Duration::from_millis(3));
        sleeper.sleep(Duration::from_millis(4));
        assert_eq!(slept.get(), Duration::from_millis(7));
    }

    #[test]
    fn test_thread_sleeper_blocks() {
        let start = Instant::now();
        ThreadSleeper.sleep(Duration::from_millis(20));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
