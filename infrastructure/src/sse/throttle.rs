//! Minimum-interval emission throttle.

use std::time::Duration;
use tokio::time::Instant;

/// Default minimum time between two chunk emissions
pub const DEFAULT_MIN_EMIT_INTERVAL: Duration = Duration::from_millis(50);

/// Coalesces deltas so that emissions are at least `interval` apart.
///
/// The first delta is emitted immediately. Deltas offered too soon are
/// held and prepended to the next emission.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last_emit: Option<Instant>,
    pending: String,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: None,
            pending: String::new(),
        }
    }

    /// Queue `delta`; returns the coalesced text if an emission is due.
    pub fn offer(&mut self, delta: &str, now: Instant) -> Option<String> {
        self.pending.push_str(delta);
        let due = self
            .last_emit
            .is_none_or(|last| now.duration_since(last) >= self.interval);
        if !due {
            return None;
        }
        self.last_emit = Some(now);
        Some(std::mem::take(&mut self.pending))
    }

    /// Text held back since the last emission
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Release the held-back text regardless of the interval.
    pub fn flush(&mut self) -> Option<String> {
        (!self.pending.is_empty()).then(|| std::mem::take(&mut self.pending))
    }
}
