//! Polled interval timers.
//!
//! Every timeout in the firmware is an absolute millisecond timestamp
//! compared on each tick; nothing is scheduled as a callback.  [`Interval`]
//! wraps the common "has `period` passed since I last fired" check.

/// A repeating timer checked from the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    period_ms: u64,
    /// `None` until the first fire, so a fresh interval is due immediately.
    last_ms: Option<u64>,
}

impl Interval {
    pub const fn new(period_ms: u64) -> Self {
        Self {
            period_ms,
            last_ms: None,
        }
    }

    /// Whether the interval is due at `now_ms` (always true before the
    /// first fire).
    pub fn is_due(&self, now_ms: u64) -> bool {
        self.last_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= self.period_ms)
    }

    /// Record a fire at `now_ms`.
    pub fn mark(&mut self, now_ms: u64) {
        self.last_ms = Some(now_ms);
    }

    /// If due, mark and return `true`.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if self.is_due(now_ms) {
            self.mark(now_ms);
            true
        } else {
            false
        }
    }
}
