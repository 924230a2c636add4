//! REMOTE role: sample inputs, report them to the TARGET.
//!
//! Transmission is gated on a present peer.  A triggered input produces a
//! DETECTED (rate limited by the minimum broadcast interval); otherwise a
//! periodic OBSERVED reports the idle state.

use log::info;

use crate::config::{ModuleConfig, Role};
use crate::error::GpioError;
use crate::mesh::{Decoded, Message, NodeNum, ProcessMessage};
use crate::presence::{PresenceState, RemotePresence};
use crate::sensors::{Detection, PinSampler};
use crate::timer::Interval;

use super::{RoleBehavior, emit_presence, transmit};
use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, GpioPort, MeshPort, PinMode};

pub struct RemoteBehavior {
    peer: NodeNum,
    input_pins: [u8; crate::CHANNEL_COUNT],
    presence_pin: u8,
    input_mode: PinMode,
    sampler: PinSampler,
    presence: RemotePresence,
    /// Spacing between any two sends.
    broadcast: Interval,
    /// Cadence of idle OBSERVED reports.
    state_report: Interval,
    last_detection: Detection,
}

impl RemoteBehavior {
    pub fn new(config: &ModuleConfig, peer: NodeNum, now_ms: u64) -> Self {
        let t = config.timings();
        Self {
            peer,
            input_pins: config.channel_pins,
            presence_pin: config.presence_pin,
            input_mode: if config.use_pullup {
                PinMode::InputPullUp
            } else {
                PinMode::Input
            },
            sampler: PinSampler::new(config.channel_pins, config.triggered_high),
            presence: RemotePresence::new(
                config.presence_pin,
                config.triggered_high,
                t.ready_one_check_ms,
                t.ready_one_timeout_ms,
                now_ms,
            ),
            broadcast: Interval::new(t.minimum_broadcast_ms),
            state_report: Interval::new(t.state_broadcast_ms),
            last_detection: Detection::default(),
        }
    }

    /// Most recent input sample.
    pub fn last_detection(&self) -> Detection {
        self.last_detection
    }
}

impl RoleBehavior for RemoteBehavior {
    fn role(&self) -> Role {
        Role::Remote
    }

    fn configure(&mut self, gpio: &mut impl GpioPort) -> Result<(), GpioError> {
        for &pin in self.input_pins.iter().chain(core::iter::once(&self.presence_pin)) {
            if pin != 0 {
                gpio.configure_pin(pin, self.input_mode)?;
            }
        }
        Ok(())
    }

    fn presence(&self) -> &PresenceState {
        self.presence.state()
    }

    fn poll_presence(
        &mut self,
        now_ms: u64,
        io: &mut (impl GpioPort + MeshPort),
        sink: &mut impl EventSink,
    ) -> bool {
        let update = self.presence.poll(now_ms, io);
        if let Some(ready) = update.ready {
            info!("remote: presence {}", if ready { "asserted" } else { "released" });
        }
        emit_presence(update, sink);
        false
    }

    fn run(&mut self, now_ms: u64, io: &mut (impl GpioPort + MeshPort), sink: &mut impl EventSink) -> bool {
        let detection = self.sampler.sample(io);
        self.last_detection = detection;

        if !self.presence.state().peer_present || !self.broadcast.is_due(now_ms) {
            return false;
        }

        let message = if detection.any {
            Message::Detected(detection.channels)
        } else if self.state_report.is_due(now_ms) {
            Message::Observed(detection.channels)
        } else {
            return false;
        };

        // A failed send still uses up the slot.
        self.broadcast.mark(now_ms);
        self.state_report.mark(now_ms);
        transmit(io, sink, self.peer, &message)
    }

    fn handle(
        &mut self,
        decoded: Decoded,
        now_ms: u64,
        io: &mut (impl GpioPort + MeshPort),
        sink: &mut impl EventSink,
    ) -> ProcessMessage {
        match decoded.message {
            Message::ReadyOneCheck => {
                let update = self.presence.on_check(now_ms, io);
                emit_presence(update, sink);
                let ready = self.presence.state().is_ready;
                transmit(io, sink, self.peer, &Message::ReadyOneStatus { ready });
                ProcessMessage::Claimed
            }
            Message::Respond(mask) => {
                emit_presence(self.presence.on_peer_heard(now_ms), sink);
                sink.emit(&AppEvent::ResponseReceived(mask));
                ProcessMessage::Claimed
            }
            Message::Detected(_) | Message::Observed(_) | Message::ReadyOneStatus { .. } => {
                ProcessMessage::Ignored
            }
        }
    }

    fn shutdown(&mut self, _gpio: &mut impl GpioPort) {}
}
