//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (GPIO, mesh radio, power management, event sinks,
//! config storage) implement these traits.  The
//! [`AppService`](super::service::AppService) consumes them via generics,
//! so the domain core never touches hardware directly.

use embedded_hal::digital::PinState;

use crate::config::ModuleConfig;
use crate::error::{GpioError, TransportError};
use crate::mesh::{NodeNum, OutboundFrame, Priority};

// ───────────────────────────────────────────────────────────────
// GPIO port (driven adapter: domain ↔ pins)
// ───────────────────────────────────────────────────────────────

/// Electrical mode for [`GpioPort::configure_pin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Input,
    InputPullUp,
    Output,
}

/// Raw digital I/O by pin number.
pub trait GpioPort {
    fn configure_pin(&mut self, pin: u8, mode: PinMode) -> Result<(), GpioError>;

    /// Instantaneous level, `true` = HIGH.  Unconnected pins read whatever
    /// idle level the platform gives them.
    fn read_pin(&mut self, pin: u8) -> bool;

    fn write_pin(&mut self, pin: u8, level: PinState);
}

// ───────────────────────────────────────────────────────────────
// Mesh port (driven adapter: domain → transport)
// ───────────────────────────────────────────────────────────────

/// Outbound side of the mesh transport.  Inbound frames are pushed into
/// [`AppService::handle_received`](super::service::AppService::handle_received)
/// by the control loop.
pub trait MeshPort {
    /// Stage a frame.  Fails when the transport is out of buffers; the
    /// caller must abort the send.
    fn allocate_frame(&mut self) -> Result<OutboundFrame, TransportError>;

    /// Hand a filled frame to the transport.  Delivery is best effort.
    fn send(&mut self, frame: OutboundFrame, to: NodeNum, priority: Priority, want_ack: bool);
}

// ───────────────────────────────────────────────────────────────
// Power port (driven adapter: domain → power management)
// ───────────────────────────────────────────────────────────────

pub trait PowerPort {
    /// Enter deep sleep for `duration_ms`.  On hardware this does not
    /// return (wake is a reset); mocks just record it.
    fn request_deep_sleep(&mut self, duration_ms: u64);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: persistent config → domain)
// ───────────────────────────────────────────────────────────────

/// Read-only access to the stored module configuration.
pub trait ConfigPort {
    /// Load configuration; [`ModuleConfig::default()`] if none is stored.
    fn load(&self) -> Result<ModuleConfig, StoreError>;
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// Stored blob failed to deserialize.
    Corrupted,
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
