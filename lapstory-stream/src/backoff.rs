//! Reconnect backoff schedule
//!
//! The delay handed out is `min(current, max)`; once that reconnect fires,
//! `current` grows by the factor (capped at `max`). A successful connect
//! resets it to the base value. Delays are kept in whole milliseconds.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Backoff {
    base_ms: u64,
    max_ms: u64,
    factor: f64,
    current_ms: u64,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration, factor: f64) -> Self {
        let base_ms = base.as_millis() as u64;
        Self {
            base_ms,
            max_ms: max.as_millis() as u64,
            factor,
            current_ms: base_ms,
        }
    }

    /// Delay for the next scheduled reconnect
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.current_ms.min(self.max_ms))
    }

    /// Grow the interval after a reconnect has fired
    pub fn grow(&mut self) {
        let grown = (self.current_ms as f64 * self.factor).round();
        self.current_ms = if grown >= self.max_ms as f64 {
            self.max_ms
        } else {
            grown as u64
        };
    }

    pub fn reset(&mut self) {
        self.current_ms = self.base_ms;
    }
}
