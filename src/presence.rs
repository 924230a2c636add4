//! READYONE presence tracking.
//!
//! READYONE is a lightweight heartbeat independent of detection traffic.
//! It gates whether a REMOTE bothers to transmit (no peer listening, no
//! DETECTED) and whether a TARGET stays awake (no ready peer, eligible for
//! power-saving sleep).
//!
//! ```text
//!  TARGET                                   REMOTE
//!    │ every check interval                   │
//!    │──── READYONE:CHECK<BEL> ──────────────▶│ peer_present = true
//!    │                                        │ is_ready = presence pin
//!    │◀─── READYONE:<TRUE|FALSE><BEL> ────────│
//!    │ is_ready = reported                    │
//!    │                                        │
//!    │ no answer within timeout               │ no CHECK within timeout
//!    ▼ is_ready = false (once)                ▼ peer_present = false
//! ```

use log::{debug, info};

use crate::app::ports::GpioPort;
use crate::sensors::read_asserted;
use crate::timer::Interval;

/// Shared presence view.  Each field has exactly one writer: the tracker
/// of the running role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresenceState {
    /// REMOTE: presence pin asserted.  TARGET: last status the peer reported.
    pub is_ready: bool,
    /// The peer has been heard from recently.
    pub peer_present: bool,
    /// Last time the peer proved it was alive (or the clock was reset).
    pub last_peer_reply_ms: u64,
}

/// What a presence evaluation changed, for logging and events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresenceUpdate {
    /// `Some(new)` if `is_ready` flipped.
    pub ready: Option<bool>,
    /// `Some(new)` if `peer_present` flipped.
    pub peer: Option<bool>,
}

impl PresenceUpdate {
    pub fn is_empty(&self) -> bool {
        self.ready.is_none() && self.peer.is_none()
    }

    /// Combine two updates applied in order; the later change wins.
    pub fn then(self, later: Self) -> Self {
        Self {
            ready: later.ready.or(self.ready),
            peer: later.peer.or(self.peer),
        }
    }
}

impl PresenceState {
    fn set_ready(&mut self, ready: bool, update: &mut PresenceUpdate) {
        if self.is_ready != ready {
            self.is_ready = ready;
            update.ready = Some(ready);
        }
    }

    fn set_peer(&mut self, present: bool, update: &mut PresenceUpdate) {
        if self.peer_present != present {
            self.peer_present = present;
            update.peer = Some(present);
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  REMOTE side
// ═══════════════════════════════════════════════════════════════

/// REMOTE tracker: local readiness from the presence pin, peer liveness
/// from incoming CHECKs.
#[derive(Debug, Clone)]
pub struct RemotePresence {
    state: PresenceState,
    check: Interval,
    timeout_ms: u64,
    pin: u8,
    triggered_high: bool,
}

impl RemotePresence {
    pub fn new(pin: u8, triggered_high: bool, check_ms: u64, timeout_ms: u64, now_ms: u64) -> Self {
        Self {
            state: PresenceState {
                last_peer_reply_ms: now_ms,
                ..PresenceState::default()
            },
            check: Interval::new(check_ms),
            timeout_ms,
            pin,
            triggered_high,
        }
    }

    pub fn state(&self) -> &PresenceState {
        &self.state
    }

    /// Scheduled check.  Runs at most once per check interval; the first
    /// call always runs.
    pub fn poll(&mut self, now_ms: u64, gpio: &mut impl GpioPort) -> PresenceUpdate {
        if !self.check.poll(now_ms) {
            return PresenceUpdate::default();
        }
        let asserted = read_asserted(gpio, self.pin, self.triggered_high);
        self.evaluate(now_ms, asserted)
    }

    /// Apply one reading of the presence pin.
    pub fn evaluate(&mut self, now_ms: u64, pin_asserted: bool) -> PresenceUpdate {
        let mut update = PresenceUpdate::default();
        let s = &mut self.state;

        if pin_asserted {
            if !s.is_ready {
                s.set_ready(true, &mut update);
            } else if now_ms.saturating_sub(s.last_peer_reply_ms) > self.timeout_ms {
                debug!("presence: no word from peer in {} ms", self.timeout_ms);
                s.set_peer(false, &mut update);
                s.last_peer_reply_ms = now_ms;
            }
        } else {
            s.set_ready(false, &mut update);
            if s.peer_present {
                s.set_peer(false, &mut update);
                s.last_peer_reply_ms = now_ms;
            }
        }

        update
    }

    /// A READYONE:CHECK arrived from the peer: it is present, and it wants
    /// our current readiness (re-read from the pin, not the last poll).
    pub fn on_check(&mut self, now_ms: u64, gpio: &mut impl GpioPort) -> PresenceUpdate {
        let found = self.on_peer_heard(now_ms);
        let asserted = read_asserted(gpio, self.pin, self.triggered_high);
        found.then(self.evaluate(now_ms, asserted))
    }

    /// Any frame from the peer proves it is alive.
    pub fn on_peer_heard(&mut self, now_ms: u64) -> PresenceUpdate {
        let mut update = PresenceUpdate::default();
        self.state.set_peer(true, &mut update);
        self.state.last_peer_reply_ms = now_ms;
        update
    }
}

// ═══════════════════════════════════════════════════════════════
//  TARGET side
// ═══════════════════════════════════════════════════════════════

/// TARGET tracker: periodic CHECK requests with a hard reply timeout.
#[derive(Debug, Clone)]
pub struct TargetPresence {
    state: PresenceState,
    check: Interval,
    timeout_ms: u64,
    /// Time of the oldest CHECK not yet answered.
    pending_since_ms: Option<u64>,
}

impl TargetPresence {
    pub fn new(check_ms: u64, timeout_ms: u64, now_ms: u64) -> Self {
        Self {
            state: PresenceState {
                last_peer_reply_ms: now_ms,
                ..PresenceState::default()
            },
            check: Interval::new(check_ms),
            timeout_ms,
            pending_since_ms: None,
        }
    }

    pub fn state(&self) -> &PresenceState {
        &self.state
    }

    /// Expire an unanswered CHECK.  Fires at most once per outstanding
    /// window: the window closes here and only a new CHECK reopens it.
    pub fn poll_timeout(&mut self, now_ms: u64) -> PresenceUpdate {
        let mut update = PresenceUpdate::default();
        let Some(since) = self.pending_since_ms else {
            return update;
        };
        if now_ms.saturating_sub(since) > self.timeout_ms {
            info!("presence: peer silent for {} ms, marking unready", now_ms - since);
            self.pending_since_ms = None;
            self.state.set_ready(false, &mut update);
            self.state.set_peer(false, &mut update);
        }
        update
    }

    /// Whether a CHECK should go out now.  Marks the interval.
    pub fn check_due(&mut self, now_ms: u64) -> bool {
        self.check.poll(now_ms)
    }

    /// Record a CHECK that actually reached the transport.
    pub fn on_check_sent(&mut self, now_ms: u64) {
        self.pending_since_ms.get_or_insert(now_ms);
    }

    /// A READYONE status answer arrived.
    pub fn on_status(&mut self, now_ms: u64, ready: bool) -> PresenceUpdate {
        let mut update = PresenceUpdate::default();
        self.pending_since_ms = None;
        self.state.last_peer_reply_ms = now_ms;
        self.state.set_peer(true, &mut update);
        self.state.set_ready(ready, &mut update);
        update
    }
}
