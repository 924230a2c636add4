//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, count them in tests,
//! forward them to a status display.

use crate::config::Role;
use crate::error::{Error, TransportError};
use crate::mesh::{ChannelMask, MessageKind, NodeNum};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// First activation succeeded; pins are configured.
    Activated { role: Role, local: NodeNum, peer: NodeNum },

    /// The module went inert.  `None` means it was switched off by command.
    Disabled(Option<Error>),

    /// A protocol frame was handed to the transport.
    MessageSent { kind: MessageKind, to: NodeNum },

    /// A send was abandoned.
    SendFailed { kind: MessageKind, error: TransportError },

    /// A frame from the peer decoded successfully.
    MessageReceived { kind: MessageKind, from: NodeNum, sentinel: bool },

    /// Local readiness (REMOTE) or reported peer readiness (TARGET) flipped.
    ReadinessChanged { ready: bool },

    /// The peer was heard from after a silence.
    PeerFound,

    /// The peer went quiet past the READYONE timeout.
    PeerLost,

    /// A TARGET output started a nag cycle (0-based channel).
    ChannelActuated { channel: usize },

    /// Nag toggle on a running cycle.
    NagToggled { channel: usize, on: bool },

    /// Hard cutoff ended a nag cycle.
    NagCutoff { channel: usize },

    /// The duty cycle asked for deep sleep.
    DeepSleepRequested { duration_ms: u64 },

    /// The TARGET acknowledged a DETECTED with these channels.
    ResponseReceived(ChannelMask),
}
