//! Serial mesh link: the radio side of the frame channels.
//!
//! The mesh radio is a separate module on a UART, running its text-message
//! serial mode.  Each frame is one line:
//!
//! ```text
//!   !a1b2c3d4 DETECTED:TRUE:FALSE:FALSE:FALSE<BEL>\n
//!   └─ node ─┘└──────────── payload ─────────────┘
//! ```
//!
//! Inbound lines name the sender; outbound lines name the destination.
//! Priority and ack hints do not survive the serial hop; the radio applies
//! its own defaults.
//!
//! Runs in a dedicated thread using `edge-executor` with two futures:
//!
//! 1. **Read**: polls the UART every 5 ms via an `async-io-mini` timer
//! 2. **Write**: truly async via `OUTBOUND.receive().await`

use core::cell::RefCell;
use core::fmt::Write as _;
use core::time::Duration;
use std::rc::Rc;

use log::{debug, info, warn};

use crate::config::parse_node_num;
use crate::drivers::task_pin::{self, Core};
use crate::error::Error;
use crate::mesh::channels::{INBOUND, OUTBOUND, QueuedFrame, deliver_inbound};
use crate::mesh::{MAX_FRAME_LEN, NodeNum};

/// Longest line: `!xxxxxxxx ` + payload + `\n`.
pub const LINE_MAX: usize = MAX_FRAME_LEN + 16;

pub type Line = heapless::Vec<u8, LINE_MAX>;

const READ_POLL: Duration = Duration::from_millis(5);

/// Raw byte pipe to the radio module.
pub trait ByteLink {
    /// Non-blocking read; returns 0 when nothing is pending.
    fn read(&mut self, buf: &mut [u8]) -> usize;

    fn write_all(&mut self, bytes: &[u8]) -> bool;
}

// ── Line codec ───────────────────────────────────────────────

/// Split `!node payload` into its parts.  `None` for anything else.
pub fn parse_line(line: &[u8]) -> Option<(NodeNum, &[u8])> {
    let space = line.iter().position(|&b| b == b' ')?;
    let (head, rest) = line.split_at(space);
    let node = core::str::from_utf8(head).ok().filter(|h| h.starts_with('!'))?;
    let from = parse_node_num(node)?;
    let payload = &rest[1..];
    if payload.is_empty() {
        return None;
    }
    Some((from, payload))
}

/// Render an outbound frame as one line.
pub fn format_line(frame: &QueuedFrame) -> Line {
    let mut head = heapless::String::<12>::new();
    let _ = write!(head, "!{:08x} ", frame.to);
    let mut line = Line::new();
    // Capacity covers the longest frame, so these never fail.
    let _ = line.extend_from_slice(head.as_bytes());
    let _ = line.extend_from_slice(&frame.payload);
    let _ = line.push(b'\n');
    line
}

/// Reassembles lines from a byte stream.  Over-long lines are discarded up
/// to the next newline.
#[derive(Default)]
pub struct LineSplitter {
    buf: Line,
    overflow: bool,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, byte: u8) -> Option<Line> {
        match byte {
            b'\n' => {
                let line = core::mem::take(&mut self.buf);
                let overflow = core::mem::replace(&mut self.overflow, false);
                let line = trim_cr(line);
                (!overflow && !line.is_empty()).then_some(line)
            }
            _ if self.overflow => None,
            _ => {
                if self.buf.push(byte).is_err() {
                    self.overflow = true;
                    self.buf.clear();
                }
                None
            }
        }
    }
}

fn trim_cr(mut line: Line) -> Line {
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    line
}

/// Push every complete line in `data` into the inbound channel.
pub fn feed_bytes(splitter: &mut LineSplitter, data: &[u8]) {
    for &byte in data {
        let Some(line) = splitter.feed(byte) else {
            continue;
        };
        match parse_line(&line) {
            Some((from, payload)) => {
                if !deliver_inbound(&INBOUND, from, payload) {
                    warn!("link: frame from !{:08x} dropped", from);
                }
            }
            None => debug!("link: ignoring {}-byte line", line.len()),
        }
    }
}

// ── Async I/O loop ───────────────────────────────────────────

type SharedLink<L> = Rc<RefCell<L>>;

async fn read_loop<L: ByteLink>(link: SharedLink<L>) {
    let mut splitter = LineSplitter::new();
    let mut buf = [0u8; 64];
    loop {
        loop {
            let n = link.borrow_mut().read(&mut buf);
            if n == 0 {
                break;
            }
            feed_bytes(&mut splitter, &buf[..n]);
        }
        async_io_mini::Timer::after(READ_POLL).await;
    }
}

async fn write_loop<L: ByteLink>(link: SharedLink<L>) {
    loop {
        let frame = OUTBOUND.receive().await;
        let line = format_line(&frame);
        if !link.borrow_mut().write_all(&line) {
            warn!("link: write to radio failed, frame to !{:08x} lost", frame.to);
        }
    }
}

fn run_link_loop<L: ByteLink + 'static>(link: L) {
    let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();
    let link: SharedLink<L> = Rc::new(RefCell::new(link));

    executor.spawn(read_loop(link.clone())).detach();
    executor.spawn(write_loop(link)).detach();

    info!("link task started");
    futures_lite::future::block_on(executor.run(core::future::pending::<()>()));
}

/// Spawn the link task on the protocol core.
pub fn spawn<L: ByteLink + Send + 'static>(link: L) -> Result<std::thread::JoinHandle<()>, Error> {
    task_pin::spawn_on_core(Core::Pro, 10, 8, "mesh-link\0", move || run_link_loop(link))
}

// ── UART binding ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
impl ByteLink for esp_idf_hal::uart::UartDriver<'static> {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        esp_idf_hal::uart::UartDriver::read(self, buf, esp_idf_hal::delay::NON_BLOCK).unwrap_or(0)
    }

    fn write_all(&mut self, bytes: &[u8]) -> bool {
        let mut rest = bytes;
        while !rest.is_empty() {
            match esp_idf_hal::uart::UartDriver::write(self, rest) {
                Ok(0) | Err(_) => return false,
                Ok(n) => rest = &rest[n..],
            }
        }
        true
    }
}
