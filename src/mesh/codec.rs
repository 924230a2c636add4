//! Text frame codec.
//!
//! Wire format (ASCII, colon separated, at most [`MAX_FRAME_LEN`] bytes):
//! ```text
//! DETECTED:<B>:<B>:<B>:<B><BEL>     B ∈ {TRUE, FALSE}
//! OBSERVED:<B>:<B>:<B>:<B>
//! READYONE:CHECK<BEL>
//! READYONE:<TRUE|FALSE><BEL>
//! DONE [ n ][ n ]...                n = 1-based channel number
//! ```
//!
//! `<BEL>` (0x07) is the sentinel: it is not part of the text and is never
//! delimited.  The decoder strips every sentinel before tokenising and
//! reports its presence separately.

use core::fmt;

use super::message::{ChannelMask, Message};
use super::{MAX_FRAME_LEN, Payload};
use crate::CHANNEL_COUNT;

/// Out-of-band marker meaning "the recipient must actuate/reply".
pub const SENTINEL: u8 = 0x07;

const DETECTED: &str = "DETECTED";
const OBSERVED: &str = "OBSERVED";
const READYONE: &str = "READYONE";
const CHECK: &str = "CHECK";
const DONE: &str = "DONE";
const TRUE: &str = "TRUE";
const FALSE: &str = "FALSE";

/// Field count of a DETECTED / OBSERVED frame (prefix + four channels).
const STATE_ARITY: usize = 1 + CHANNEL_COUNT;
/// Field count of a READYONE frame.
const READYONE_ARITY: usize = 2;

// ═══════════════════════════════════════════════════════════════
//  Encoding
// ═══════════════════════════════════════════════════════════════

/// Appends text to a payload, refusing anything past `limit`.
struct FrameWriter {
    buf: Payload,
    limit: usize,
}

impl FrameWriter {
    /// `reserve` bytes at the end stay free (for the sentinel).
    fn new(reserve: usize) -> Self {
        Self {
            buf: Payload::new(),
            limit: MAX_FRAME_LEN - reserve,
        }
    }

    /// Append `s` whole, or not at all.
    fn push_str(&mut self, s: &str) -> bool {
        if self.buf.len() + s.len() > self.limit {
            return false;
        }
        self.buf.extend_from_slice(s.as_bytes()).is_ok()
    }

    fn push_fmt(&mut self, args: fmt::Arguments<'_>) -> bool {
        let mut tmp = heapless::String::<16>::new();
        fmt::Write::write_fmt(&mut tmp, args).is_ok() && self.push_str(&tmp)
    }

    fn finish(mut self, sentinel: bool) -> Payload {
        if sentinel {
            // Capacity was reserved in `new`.
            let _ = self.buf.push(SENTINEL);
        }
        self.buf
    }
}

fn bool_token(value: bool) -> &'static str {
    if value { TRUE } else { FALSE }
}

/// Encode a message into a frame payload.
///
/// Never overflows: content that does not fit is dropped from the end,
/// whole tokens at a time, and the sentinel slot is always kept.
pub fn encode(message: &Message) -> Payload {
    let sentinel = message.demands_response();
    let mut w = FrameWriter::new(usize::from(sentinel));

    match message {
        Message::Detected(flags) | Message::Observed(flags) => {
            let prefix = if matches!(message, Message::Detected(_)) {
                DETECTED
            } else {
                OBSERVED
            };
            if w.push_str(prefix) {
                for &flag in flags {
                    if !(w.push_str(":") && w.push_str(bool_token(flag))) {
                        break;
                    }
                }
            }
        }
        Message::ReadyOneCheck => {
            let _ = w.push_str(READYONE) && w.push_str(":") && w.push_str(CHECK);
        }
        Message::ReadyOneStatus { ready } => {
            let _ = w.push_str(READYONE) && w.push_str(":") && w.push_str(bool_token(*ready));
        }
        Message::Respond(mask) => {
            if w.push_str(DONE) && !mask.is_empty() && w.push_str(" ") {
                for ch in mask.iter() {
                    if !w.push_fmt(format_args!("[ {} ]", ch + 1)) {
                        break;
                    }
                }
            }
        }
    }

    w.finish(sentinel)
}

// ═══════════════════════════════════════════════════════════════
//  Decoding
// ═══════════════════════════════════════════════════════════════

/// A successfully decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    pub message: Message,
    /// The sentinel byte was present somewhere in the frame.
    pub sentinel: bool,
}

/// Why a frame was not recognised.  Callers treat every variant as noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Nothing left after stripping sentinels and whitespace.
    Empty,
    /// Longer than any frame this module produces.
    TooLong,
    /// Not valid UTF-8.
    NotText,
    /// First field is not a known message prefix.
    UnknownPrefix,
    /// Field count does not match the prefix.
    Arity { expected: usize, found: usize },
    /// A field holds an unexpected token.
    BadField,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty frame"),
            Self::TooLong => write!(f, "frame too long"),
            Self::NotText => write!(f, "frame is not text"),
            Self::UnknownPrefix => write!(f, "unknown prefix"),
            Self::Arity { expected, found } => {
                write!(f, "expected {expected} fields, found {found}")
            }
            Self::BadField => write!(f, "bad field"),
        }
    }
}

/// Decode an inbound payload.
pub fn decode(raw: &[u8]) -> Result<Decoded, DecodeError> {
    let sentinel = raw.contains(&SENTINEL);

    let mut text_buf = Payload::new();
    for &b in raw.iter().filter(|&&b| b != SENTINEL && b != 0) {
        text_buf.push(b).map_err(|_| DecodeError::TooLong)?;
    }
    let text = core::str::from_utf8(&text_buf)
        .map_err(|_| DecodeError::NotText)?
        .trim();
    if text.is_empty() {
        return Err(DecodeError::Empty);
    }

    let message = if let Some(rest) = text.strip_prefix(DONE) {
        parse_respond(rest)?
    } else {
        parse_fields(text)?
    };

    Ok(Decoded { message, sentinel })
}

fn parse_fields(text: &str) -> Result<Message, DecodeError> {
    let found = text.split(':').count();
    let mut fields = text.split(':');
    let prefix = fields.next().unwrap_or_default();

    let expect = |expected: usize| {
        if found == expected {
            Ok(())
        } else {
            Err(DecodeError::Arity { expected, found })
        }
    };

    match prefix {
        DETECTED | OBSERVED => {
            expect(STATE_ARITY)?;
            let mut flags = [false; CHANNEL_COUNT];
            for (flag, field) in flags.iter_mut().zip(fields) {
                *flag = parse_bool(field)?;
            }
            Ok(if prefix == DETECTED {
                Message::Detected(flags)
            } else {
                Message::Observed(flags)
            })
        }
        READYONE => {
            expect(READYONE_ARITY)?;
            match fields.next().unwrap_or_default() {
                CHECK => Ok(Message::ReadyOneCheck),
                other => parse_bool(other).map(|ready| Message::ReadyOneStatus { ready }),
            }
        }
        _ => Err(DecodeError::UnknownPrefix),
    }
}

fn parse_bool(field: &str) -> Result<bool, DecodeError> {
    match field {
        TRUE => Ok(true),
        FALSE => Ok(false),
        _ => Err(DecodeError::BadField),
    }
}

/// Parse the part of a `DONE` frame after the prefix: `[ n ][ n ]...`.
fn parse_respond(rest: &str) -> Result<Message, DecodeError> {
    if !(rest.is_empty() || rest.starts_with([' ', '['])) {
        return Err(DecodeError::UnknownPrefix);
    }

    let mut mask = ChannelMask::EMPTY;
    let mut rest = rest.trim_start();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[').ok_or(DecodeError::BadField)?;
        let (number, tail) = inner.split_once(']').ok_or(DecodeError::BadField)?;
        let channel: usize = number.trim().parse().map_err(|_| DecodeError::BadField)?;
        if !(1..=CHANNEL_COUNT).contains(&channel) {
            return Err(DecodeError::BadField);
        }
        mask.insert(channel - 1);
        rest = tail.trim_start();
    }

    Ok(Message::Respond(mask))
}
