//! Role strategies.
//!
//! A node is either a REMOTE or a TARGET, chosen once at activation.  Both
//! implement [`RoleBehavior`]; the service holds them in a [`Behavior`]
//! enum so dispatch is static and nothing is boxed.
//!
//! ```text
//!              ┌──────────────── RoleBehavior ────────────────┐
//!              │ configure · poll_presence · run · handle     │
//!              └───────────────┬──────────────────┬───────────┘
//!                              │                  │
//!                    RemoteBehavior        TargetBehavior
//!                 sampler · presence pin   actuation · LEDs
//! ```

pub mod remote;
pub mod target;

pub use remote::RemoteBehavior;
pub use target::TargetBehavior;

use log::{debug, warn};

use crate::config::{ModuleConfig, Role};
use crate::error::{ConfigError, GpioError};
use crate::mesh::{Decoded, Message, NodeNum, Priority, ProcessMessage, encode};
use crate::presence::{PresenceState, PresenceUpdate};

use super::events::AppEvent;
use super::ports::{EventSink, GpioPort, MeshPort};

/// Common contract of the two roles.  Every method runs inside one tick or
/// one inbound dispatch; none of them block.
pub trait RoleBehavior {
    fn role(&self) -> Role;

    /// One-time pin setup at activation.
    fn configure(&mut self, gpio: &mut impl GpioPort) -> Result<(), GpioError>;

    fn presence(&self) -> &PresenceState;

    /// Presence scheduling.  Returns `true` if a frame was sent.
    fn poll_presence(
        &mut self,
        now_ms: u64,
        io: &mut (impl GpioPort + MeshPort),
        sink: &mut impl EventSink,
    ) -> bool;

    /// Steady-state role work.  Returns `true` if a frame was sent.
    fn run(&mut self, now_ms: u64, io: &mut (impl GpioPort + MeshPort), sink: &mut impl EventSink) -> bool;

    /// A decoded frame from the peer.
    fn handle(
        &mut self,
        decoded: Decoded,
        now_ms: u64,
        io: &mut (impl GpioPort + MeshPort),
        sink: &mut impl EventSink,
    ) -> ProcessMessage;

    /// Release outputs before going inert.
    fn shutdown(&mut self, gpio: &mut impl GpioPort);
}

/// The active role.
pub enum Behavior {
    Remote(RemoteBehavior),
    Target(TargetBehavior),
}

impl Behavior {
    /// Select the strategy for `config.role`.
    pub fn for_config(config: &ModuleConfig, peer: NodeNum, now_ms: u64) -> Result<Self, ConfigError> {
        match config.role {
            Role::Remote => Ok(Self::Remote(RemoteBehavior::new(config, peer, now_ms))),
            Role::Target => Ok(Self::Target(TargetBehavior::new(config, peer, now_ms))),
            Role::None => Err(ConfigError::RoleUnset),
        }
    }
}

impl RoleBehavior for Behavior {
    fn role(&self) -> Role {
        match self {
            Self::Remote(b) => b.role(),
            Self::Target(b) => b.role(),
        }
    }

    fn configure(&mut self, gpio: &mut impl GpioPort) -> Result<(), GpioError> {
        match self {
            Self::Remote(b) => b.configure(gpio),
            Self::Target(b) => b.configure(gpio),
        }
    }

    fn presence(&self) -> &PresenceState {
        match self {
            Self::Remote(b) => b.presence(),
            Self::Target(b) => b.presence(),
        }
    }

    fn poll_presence(
        &mut self,
        now_ms: u64,
        io: &mut (impl GpioPort + MeshPort),
        sink: &mut impl EventSink,
    ) -> bool {
        match self {
            Self::Remote(b) => b.poll_presence(now_ms, io, sink),
            Self::Target(b) => b.poll_presence(now_ms, io, sink),
        }
    }

    fn run(&mut self, now_ms: u64, io: &mut (impl GpioPort + MeshPort), sink: &mut impl EventSink) -> bool {
        match self {
            Self::Remote(b) => b.run(now_ms, io, sink),
            Self::Target(b) => b.run(now_ms, io, sink),
        }
    }

    fn handle(
        &mut self,
        decoded: Decoded,
        now_ms: u64,
        io: &mut (impl GpioPort + MeshPort),
        sink: &mut impl EventSink,
    ) -> ProcessMessage {
        match self {
            Self::Remote(b) => b.handle(decoded, now_ms, io, sink),
            Self::Target(b) => b.handle(decoded, now_ms, io, sink),
        }
    }

    fn shutdown(&mut self, gpio: &mut impl GpioPort) {
        match self {
            Self::Remote(b) => b.shutdown(gpio),
            Self::Target(b) => b.shutdown(gpio),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Shared helpers
// ───────────────────────────────────────────────────────────────

/// Transport hints per message kind.
fn delivery(message: &Message) -> (Priority, bool) {
    match message {
        Message::Detected(_) => (Priority::Reliable, true),
        Message::Observed(_) => (Priority::Background, false),
        Message::ReadyOneCheck | Message::ReadyOneStatus { .. } | Message::Respond(_) => {
            (Priority::Default, false)
        }
    }
}

/// Encode and send one message.  On allocation failure the send is
/// abandoned; the next scheduled opportunity tries again.
pub(crate) fn transmit(
    mesh: &mut impl MeshPort,
    sink: &mut impl EventSink,
    to: NodeNum,
    message: &Message,
) -> bool {
    let kind = message.kind();
    let mut frame = match mesh.allocate_frame() {
        Ok(frame) => frame,
        Err(error) => {
            warn!("mesh: {} not sent: {}", kind, error);
            sink.emit(&AppEvent::SendFailed { kind, error });
            return false;
        }
    };
    frame.payload = encode(message);
    let (priority, want_ack) = delivery(message);
    debug!("mesh: {} -> !{:08x} ({} bytes)", kind, to, frame.payload.len());
    mesh.send(frame, to, priority, want_ack);
    sink.emit(&AppEvent::MessageSent { kind, to });
    true
}

/// Turn a presence update into events.
pub(crate) fn emit_presence(update: PresenceUpdate, sink: &mut impl EventSink) {
    if let Some(ready) = update.ready {
        sink.emit(&AppEvent::ReadinessChanged { ready });
    }
    match update.peer {
        Some(true) => sink.emit(&AppEvent::PeerFound),
        Some(false) => sink.emit(&AppEvent::PeerLost),
        None => {}
    }
}
