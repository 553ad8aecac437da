//! Monotonic time source.
//!
//! Timeout math uses elapsed monotonic milliseconds rather than wall-clock
//! time, so user clock changes cannot be used to bypass re-authentication.
//! Tests inject a fake clock and advance it explicitly; nothing sleeps.

use std::time::Instant;

/// A monotonic, non-wall-clock time source.
pub trait Clock {
    /// Milliseconds elapsed since an arbitrary fixed origin.
    ///
    /// Must never decrease for the lifetime of the process.
    fn elapsed_millis(&self) -> u64;
}

/// Production clock anchored to [`Instant`] at construction.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is now.
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let first = clock.elapsed_millis();
        let second = clock.elapsed_millis();
        assert!(second >= first);
    }
}
