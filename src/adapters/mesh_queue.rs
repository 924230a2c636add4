//! Mesh queue adapter — [`MeshPort`] over the outbound frame channel.
//!
//! The radio task drains [`OUTBOUND`](crate::mesh::channels::OUTBOUND)
//! and hands frames to the transport.  A frame is only "allocated" while
//! the channel has room, so a full queue surfaces as
//! [`TransportError::Exhausted`] and the caller drops that send.

use log::warn;

use crate::app::ports::MeshPort;
use crate::error::TransportError;
use crate::mesh::channels::{OutboundChannel, QueuedFrame};
use crate::mesh::{NodeNum, OutboundFrame, Priority};

pub struct MeshQueue {
    channel: &'static OutboundChannel,
}

impl MeshQueue {
    pub fn new(channel: &'static OutboundChannel) -> Self {
        Self { channel }
    }
}

impl MeshPort for MeshQueue {
    fn allocate_frame(&mut self) -> Result<OutboundFrame, TransportError> {
        if self.channel.is_full() {
            return Err(TransportError::Exhausted);
        }
        Ok(OutboundFrame::default())
    }

    fn send(&mut self, frame: OutboundFrame, to: NodeNum, priority: Priority, want_ack: bool) {
        let queued = QueuedFrame {
            to,
            priority,
            want_ack,
            payload: frame.payload,
        };
        if self.channel.try_send(queued).is_err() {
            warn!("mesh: outbound queue filled after allocation, frame to !{:08x} dropped", to);
        }
    }
}
