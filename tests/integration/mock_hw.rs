//! Mock hardware adapter for integration tests.
//!
//! Records every pin write, mesh send and sleep request so tests can
//! assert on the full history without touching real GPIO or a radio.
//! Input levels are settable per pin; unset pins idle HIGH (pull-ups).

use std::collections::HashMap;

use embedded_hal::digital::PinState;
use meshnag::app::events::AppEvent;
use meshnag::app::ports::{EventSink, GpioPort, MeshPort, PinMode, PowerPort};
use meshnag::error::{GpioError, TransportError};
use meshnag::mesh::{NodeNum, OutboundFrame, Priority};

// ── Sent frame record ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct SentFrame {
    pub to: NodeNum,
    pub priority: Priority,
    pub want_ack: bool,
    pub payload: Vec<u8>,
}

impl SentFrame {
    /// Payload with the sentinel shown as `<BEL>`.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.payload).replace('\x07', "<BEL>")
    }
}

// ── MockHardware ──────────────────────────────────────────────

#[derive(Default)]
pub struct MockHardware {
    levels: HashMap<u8, bool>,
    pub configured: Vec<(u8, PinMode)>,
    pub writes: Vec<(u8, PinState)>,
    pub sent: Vec<SentFrame>,
    pub sleeps: Vec<u64>,
    /// Make every `allocate_frame` fail.
    pub exhausted: bool,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_level(&mut self, pin: u8, high: bool) {
        self.levels.insert(pin, high);
    }

    /// Last level written to `pin`.
    pub fn output(&self, pin: u8) -> Option<PinState> {
        self.writes.iter().rev().find(|(p, _)| *p == pin).map(|(_, l)| *l)
    }

    pub fn is_high(&self, pin: u8) -> bool {
        self.output(pin) == Some(PinState::High)
    }

    pub fn mode(&self, pin: u8) -> Option<PinMode> {
        self.configured.iter().rev().find(|(p, _)| *p == pin).map(|(_, m)| *m)
    }

    pub fn take_sent(&mut self) -> Vec<SentFrame> {
        std::mem::take(&mut self.sent)
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent.iter().map(SentFrame::text).collect()
    }
}

impl GpioPort for MockHardware {
    fn configure_pin(&mut self, pin: u8, mode: PinMode) -> Result<(), GpioError> {
        if pin > meshnag::pins::MAX_GPIO {
            return Err(GpioError::InvalidPin(pin));
        }
        self.configured.push((pin, mode));
        Ok(())
    }

    fn read_pin(&mut self, pin: u8) -> bool {
        self.levels.get(&pin).copied().unwrap_or(true)
    }

    fn write_pin(&mut self, pin: u8, level: PinState) {
        self.writes.push((pin, level));
    }
}

impl MeshPort for MockHardware {
    fn allocate_frame(&mut self) -> Result<OutboundFrame, TransportError> {
        if self.exhausted {
            Err(TransportError::Exhausted)
        } else {
            Ok(OutboundFrame::default())
        }
    }

    fn send(&mut self, frame: OutboundFrame, to: NodeNum, priority: Priority, want_ack: bool) {
        self.sent.push(SentFrame {
            to,
            priority,
            want_ack,
            payload: frame.payload.to_vec(),
        });
    }
}

impl PowerPort for MockHardware {
    fn request_deep_sleep(&mut self, duration_ms: u64) {
        self.sleeps.push(duration_ms);
    }
}

// ── Event log ─────────────────────────────────────────────────

#[derive(Default)]
pub struct EventLog {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}
