//! TARGET role: poll the REMOTE for readiness, actuate on DETECTED.

use log::{debug, info};

use crate::actuation::{ActuationEngine, ChannelState, ChannelTransition};
use crate::config::{ModuleConfig, Role};
use crate::drivers::status_led::PresenceLeds;
use crate::error::GpioError;
use crate::mesh::{Decoded, Message, NodeNum, ProcessMessage};
use crate::presence::{PresenceState, TargetPresence};

use super::{RoleBehavior, emit_presence, transmit};
use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, GpioPort, MeshPort};

pub struct TargetBehavior {
    peer: NodeNum,
    presence: TargetPresence,
    engine: ActuationEngine,
    leds: PresenceLeds,
}

impl TargetBehavior {
    pub fn new(config: &ModuleConfig, peer: NodeNum, now_ms: u64) -> Self {
        let t = config.timings();
        Self {
            peer,
            presence: TargetPresence::new(t.ready_one_check_ms, t.ready_one_timeout_ms, now_ms),
            engine: ActuationEngine::new(
                config.channel_pins,
                config.output_active_high,
                t.signal_duration_ms,
                t.nag_timeout_ms,
            ),
            leds: PresenceLeds::new(config.ready_led_pin, config.unready_led_pin),
        }
    }

    pub fn channels(&self) -> &[ChannelState; crate::CHANNEL_COUNT] {
        self.engine.channels()
    }
}

impl RoleBehavior for TargetBehavior {
    fn role(&self) -> Role {
        Role::Target
    }

    fn configure(&mut self, gpio: &mut impl GpioPort) -> Result<(), GpioError> {
        self.engine.configure(gpio)?;
        self.leds.configure(gpio)
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
        emit_presence(self.presence.poll_timeout(now_ms), sink);

        if !self.presence.check_due(now_ms) {
            return false;
        }
        let sent = transmit(io, sink, self.peer, &Message::ReadyOneCheck);
        if sent {
            self.presence.on_check_sent(now_ms);
        }
        sent
    }

    fn run(&mut self, now_ms: u64, io: &mut (impl GpioPort + MeshPort), sink: &mut impl EventSink) -> bool {
        self.leds.show(self.presence.state().is_ready, io);

        for (channel, transition) in self.engine.poll(now_ms, io).into_iter().enumerate() {
            match transition {
                Some(ChannelTransition::Toggled { on }) => {
                    sink.emit(&AppEvent::NagToggled { channel, on });
                }
                Some(ChannelTransition::Cutoff) => sink.emit(&AppEvent::NagCutoff { channel }),
                None => {}
            }
        }
        false
    }

    fn handle(
        &mut self,
        decoded: Decoded,
        now_ms: u64,
        io: &mut (impl GpioPort + MeshPort),
        sink: &mut impl EventSink,
    ) -> ProcessMessage {
        match decoded.message {
            Message::Detected(flags) if decoded.sentinel => {
                let fired = self.engine.actuate(flags, now_ms, io);
                for channel in fired.iter() {
                    sink.emit(&AppEvent::ChannelActuated { channel });
                }
                info!("target: DETECTED, {} channel(s) actuated", fired.len());
                transmit(io, sink, self.peer, &Message::Respond(fired));
                ProcessMessage::Claimed
            }
            Message::Detected(flags) | Message::Observed(flags) => {
                debug!("target: remembering {:?}", flags);
                self.engine.remember(flags);
                ProcessMessage::Claimed
            }
            Message::ReadyOneStatus { ready } => {
                emit_presence(self.presence.on_status(now_ms, ready), sink);
                ProcessMessage::Claimed
            }
            Message::ReadyOneCheck | Message::Respond(_) => ProcessMessage::Ignored,
        }
    }

    fn shutdown(&mut self, gpio: &mut impl GpioPort) {
        self.engine.all_off(gpio);
        self.leds.off(gpio);
    }
}
