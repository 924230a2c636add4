//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (a config tool,
//! a serial console, a test harness) that the
//! [`AppService`](super::service::AppService) interprets and acts upon.

use crate::config::ModuleConfig;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Re-arm the module; the next tick activates it again.
    Enable,

    /// Drive every output OFF and stop all protocol work.
    Disable,

    /// Replace the configuration.  Outputs go OFF and the module
    /// re-activates with the new settings on the next tick.
    UpdateConfig(ModuleConfig),
}
