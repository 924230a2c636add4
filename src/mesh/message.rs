//! Typed protocol messages exchanged between a REMOTE and its TARGET.

use core::fmt;

use crate::CHANNEL_COUNT;

/// Set of channel indices (0-based), stored as a bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelMask(u8);

impl ChannelMask {
    pub const EMPTY: Self = Self(0);

    /// Build a mask from a per-channel flag vector.
    pub fn from_flags(flags: &[bool; CHANNEL_COUNT]) -> Self {
        let mut mask = Self::EMPTY;
        for (i, _) in flags.iter().enumerate().filter(|(_, f)| **f) {
            mask.insert(i);
        }
        mask
    }

    /// Add a channel.  Indices outside `0..CHANNEL_COUNT` are ignored.
    pub fn insert(&mut self, channel: usize) {
        if channel < CHANNEL_COUNT {
            self.0 |= 1 << channel;
        }
    }

    pub fn contains(self, channel: usize) -> bool {
        channel < CHANNEL_COUNT && self.0 & (1 << channel) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Channel indices in ascending order.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..CHANNEL_COUNT).filter(move |&ch| self.contains(ch))
    }
}

/// One decoded (or to-be-encoded) protocol message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// REMOTE → TARGET: channels currently detected; actuate and reply.
    Detected([bool; CHANNEL_COUNT]),
    /// REMOTE → TARGET: periodic state report, informational only.
    Observed([bool; CHANNEL_COUNT]),
    /// TARGET → REMOTE: readiness request.
    ReadyOneCheck,
    /// REMOTE → TARGET: readiness answer.
    ReadyOneStatus { ready: bool },
    /// TARGET → REMOTE: channels actuated for the last DETECTED.
    Respond(ChannelMask),
}

impl Message {
    /// Whether the frame carries the sentinel byte.
    pub fn demands_response(&self) -> bool {
        matches!(
            self,
            Self::Detected(_) | Self::ReadyOneCheck | Self::ReadyOneStatus { .. }
        )
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Detected(_) => MessageKind::Detected,
            Self::Observed(_) => MessageKind::Observed,
            Self::ReadyOneCheck => MessageKind::ReadyOneCheck,
            Self::ReadyOneStatus { .. } => MessageKind::ReadyOneStatus,
            Self::Respond(_) => MessageKind::Respond,
        }
    }
}

/// Payload-free discriminant, used in events and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Detected,
    Observed,
    ReadyOneCheck,
    ReadyOneStatus,
    Respond,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Detected => "DETECTED",
            Self::Observed => "OBSERVED",
            Self::ReadyOneCheck => "READYONE:CHECK",
            Self::ReadyOneStatus => "READYONE",
            Self::Respond => "DONE",
        };
        f.write_str(name)
    }
}
