//! Frame channels between the radio task and the control loop.
//!
//! The radio runs in its own task and may receive at any time; the poll
//! loop owns all module state.  Frames cross over through bounded
//! `embassy-sync` channels so inbound handling and ticks are serialized on
//! the control-loop side.
//!
//! ```text
//! ┌──────────────┐  InboundFrame   ┌──────────────┐
//! │  Radio Task  │────────────────▶│ Control Loop │
//! │              │◀────────────────│  (AppService)│
//! └──────────────┘  QueuedFrame    └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use super::{NodeNum, Payload, Priority};

/// Frame received from the mesh, waiting for the control loop.
#[derive(Debug, Clone)]
pub struct InboundFrame {
    pub from: NodeNum,
    pub payload: Payload,
}

/// Frame produced by the control loop, waiting for the radio.
#[derive(Debug, Clone)]
pub struct QueuedFrame {
    pub to: NodeNum,
    pub priority: Priority,
    pub want_ack: bool,
    pub payload: Payload,
}

/// Inbound depth.  A handful is plenty: the peer sends at most one frame
/// per poll interval.
pub const INBOUND_DEPTH: usize = 8;

/// Outbound depth.  When full, frame allocation fails and the send is
/// dropped until the next scheduled opportunity.
pub const OUTBOUND_DEPTH: usize = 4;

pub type InboundChannel = Channel<CriticalSectionRawMutex, InboundFrame, INBOUND_DEPTH>;
pub type OutboundChannel = Channel<CriticalSectionRawMutex, QueuedFrame, OUTBOUND_DEPTH>;

/// Radio task → control loop.
pub static INBOUND: InboundChannel = Channel::new();

/// Control loop → radio task.
pub static OUTBOUND: OutboundChannel = Channel::new();

/// Radio-side delivery hook.  Payloads longer than a frame are dropped, as
/// is everything once the queue is full.  Returns `true` if queued.
pub fn deliver_inbound(channel: &InboundChannel, from: NodeNum, bytes: &[u8]) -> bool {
    let Ok(payload) = Payload::from_slice(bytes) else {
        log::debug!("mesh: dropping {}-byte payload from !{:08x}", bytes.len(), from);
        return false;
    };
    channel.try_send(InboundFrame { from, payload }).is_ok()
}
