//! Mesh link: message model, text codec, and the frame channels that
//! connect the radio task to the control loop.
//!
//! The mesh transport itself (routing, acks, retransmission) lives outside
//! this crate.  Everything here deals with one short text payload at a time.

pub mod channels;
pub mod codec;
pub mod message;

pub use codec::{DecodeError, Decoded, SENTINEL, decode, encode};
pub use message::{ChannelMask, Message, MessageKind};

/// Mesh node number (32-bit, as assigned by the transport).
pub type NodeNum = u32;

/// Largest text payload the transport carries for this module.
pub const MAX_FRAME_LEN: usize = 40;

/// Fixed-capacity payload buffer.
pub type Payload = heapless::Vec<u8, MAX_FRAME_LEN>;

/// Delivery priority hint passed through to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Background,
    Default,
    Reliable,
}

/// A staged outbound frame handed out by
/// [`MeshPort::allocate_frame`](crate::app::ports::MeshPort::allocate_frame).
///
/// Dropping it without sending releases the slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutboundFrame {
    pub payload: Payload,
}

/// Result of offering an inbound frame to the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessMessage {
    /// The module consumed the frame; no other handler should see it.
    Claimed,
    /// Not for us; fall through to the next consumer.
    Ignored,
}

/// Origin check applied to every inbound frame: it must come from the
/// configured peer and must not be our own echo.
pub fn accept_origin(from: NodeNum, peer: NodeNum, local: NodeNum) -> bool {
    from == peer && from != local
}
