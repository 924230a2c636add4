//! Unified error types for the meshnag firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! poll loop's error handling uniform.  All variants are `Copy` so they can
//! be passed through the service and emitted as events without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The module configuration cannot support the selected role.
    Config(ConfigError),
    /// The mesh transport could not accept an outbound frame.
    Transport(TransportError),
    /// A GPIO line could not be configured.
    Gpio(GpioError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Gpio(e) => write!(f, "gpio: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Reasons the module refuses to activate.
///
/// These are fatal for the current run but contained: the service logs them,
/// emits [`AppEvent::Disabled`](crate::app::events::AppEvent::Disabled) and
/// goes inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Module is switched off in configuration.
    NotEnabled,
    /// Role is `None`.
    RoleUnset,
    /// A pin the role cannot work without is 0.
    MissingPin(&'static str),
    /// No channel pin is configured.
    NoChannels,
    /// The local node number is 0, so no peer can be resolved.
    NodeUnresolved,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotEnabled => write!(f, "module not enabled"),
            Self::RoleUnset => write!(f, "role not set"),
            Self::MissingPin(which) => write!(f, "{which} pin not configured"),
            Self::NoChannels => write!(f, "no channel pins configured"),
            Self::NodeUnresolved => write!(f, "local node number unresolved"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// No outbound frame could be allocated (pool or queue exhausted).
    Exhausted,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => write!(f, "no outbound frame available"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// GPIO errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioError {
    /// `gpio_config` rejected the pin (rc from ESP-IDF).
    ConfigFailed { pin: u8, rc: i32 },
    /// Pin number is outside the chip's GPIO matrix.
    InvalidPin(u8),
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigFailed { pin, rc } => write!(f, "GPIO{pin} config failed (rc={rc})"),
            Self::InvalidPin(pin) => write!(f, "GPIO{pin} does not exist"),
        }
    }
}

impl From<GpioError> for Error {
    fn from(e: GpioError) -> Self {
        Self::Gpio(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
