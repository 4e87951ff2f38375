//! Remote call timing
//!
//! Accumulates wall-clock durations of backend calls made on cache misses.

use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallTimings {
    /// Remote calls made (successful or not)
    pub calls: u64,
    /// Remote calls that returned an error
    pub failures: u64,
    /// Sum of all call durations
    pub total: Duration,
    /// Key and duration of the slowest call so far
    pub slowest: Option<(String, Duration)>,
}

impl CallTimings {
    pub fn record(&mut self, key: &str, elapsed: Duration, succeeded: bool) {
        self.calls += 1;
        if !succeeded {
            self.failures += 1;
        }
        self.total += elapsed;

        let is_slowest = self
            .slowest
            .as_ref()
            .map_or(true, |(_, slowest)| elapsed > *slowest);
        if is_slowest {
            self.slowest = Some((key.to_string(), elapsed));
        }
    }

    /// Mean call duration, zero before the first call.
    pub fn average(&self) -> Duration {
        if self.calls == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos((self.total.as_nanos() / self.calls as u128) as u64)
    }
}
