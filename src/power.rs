//! Power saving: the TARGET active/sleep duty cycle.
//!
//! While no ready peer is around, a TARGET stays awake for the active
//! window and then asks for deep sleep.  Waking from deep sleep is a reset,
//! so the cycle simply restarts from the first tick after boot.
//!
//! ```text
//!   ┌── active window ──┐               ┌── active window ──┐
//!   │ radio + polling   │ ─▶ deep sleep ─▶ (reset) ─▶ …      │
//!   └───────────────────┘               └───────────────────┘
//!   any tick with a ready peer skips the sleep request
//! ```

use log::info;

/// Deferred sleep request produced by [`DutyCycle::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepRequest {
    pub duration_ms: u64,
}

/// Two-phase active/sleep timer.
#[derive(Debug, Clone)]
pub struct DutyCycle {
    enabled: bool,
    active_ms: u64,
    sleep_ms: u64,
    /// Start of the current active window, `None` between windows.
    phase_start_ms: Option<u64>,
}

impl DutyCycle {
    pub fn new(power_saving: bool, active_ms: u64, sleep_ms: u64) -> Self {
        Self {
            enabled: power_saving && active_ms > 0 && sleep_ms > 0,
            active_ms,
            sleep_ms,
            phase_start_ms: None,
        }
    }

    /// Disabled cycle; [`poll`](Self::poll) never requests sleep.
    pub fn disabled() -> Self {
        Self::new(false, 0, 0)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn phase_start_ms(&self) -> Option<u64> {
        self.phase_start_ms
    }

    /// Advance the cycle.  `peer_ready` is re-evaluated on every call and
    /// suppresses the cycle entirely while true.
    pub fn poll(&mut self, now_ms: u64, peer_ready: bool) -> Option<SleepRequest> {
        if !self.enabled || peer_ready {
            return None;
        }
        let start = *self.phase_start_ms.get_or_insert(now_ms);
        if now_ms.saturating_sub(start) > self.active_ms {
            self.phase_start_ms = None;
            info!("power: active window over, sleeping {} ms", self.sleep_ms);
            return Some(SleepRequest {
                duration_ms: self.sleep_ms,
            });
        }
        None
    }
}

/// Enter deep sleep.  Does not return; the chip resets on wake.
#[cfg(target_os = "espidf")]
pub fn enter_deep_sleep(duration_ms: u64) {
    info!("power: deep sleep for {} ms", duration_ms);
    // SAFETY: plain FFI call with a scalar argument; control never returns.
    unsafe { esp_idf_svc::sys::esp_deep_sleep(duration_ms.saturating_mul(1000)) }
}

#[cfg(not(target_os = "espidf"))]
pub fn enter_deep_sleep(duration_ms: u64) {
    info!("power(sim): deep sleep for {} ms skipped", duration_ms);
}
