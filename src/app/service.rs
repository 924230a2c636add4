//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the module lifecycle, the active role strategy and
//! the duty cycle.  It exposes a clean, hardware-agnostic API.  All I/O
//! flows through port traits injected at call sites, making the entire
//! service testable with mock adapters.
//!
//! ```text
//!   GpioPort ◀──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │       AppService       │
//!   MeshPort ◀──▶ │ lifecycle · role · duty│ ──▶ PowerPort
//!                 └────────────────────────┘
//! ```
//!
//! The external scheduler calls [`AppService::tick`] and waits for the
//! returned delay; inbound frames are fed through
//! [`AppService::handle_received`] from the same context, so the two never
//! overlap.

use log::{debug, info, warn};

use crate::actuation::ChannelState;
use crate::config::{ModuleConfig, Role};
use crate::error::{ConfigError, Error};
use crate::mesh::{NodeNum, ProcessMessage, accept_origin, decode};
use crate::power::{DutyCycle, SleepRequest};
use crate::presence::PresenceState;
use crate::sensors::Detection;

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{EventSink, GpioPort, MeshPort, PowerPort};
use super::roles::{Behavior, RoleBehavior};

/// Steady-state poll cadence.
pub const POLL_INTERVAL_MS: u32 = 100;

/// Delay after activation or after sending a frame.
pub const SETTLE_INTERVAL_MS: u32 = 1000;

/// Delay while the module is disabled.
pub const INERT_INTERVAL_MS: u32 = 5000;

enum Lifecycle {
    /// Not yet activated; the next tick configures pins.
    Inactive,
    Running(Behavior),
    /// Inert until re-enabled by command.
    Disabled,
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: ModuleConfig,
    local: NodeNum,
    /// Resolved at activation.
    peer: NodeNum,
    lifecycle: Lifecycle,
    duty: DutyCycle,
}

impl AppService {
    /// Construct the service.  Nothing touches hardware until the first
    /// [`tick`](Self::tick).
    pub fn new(config: ModuleConfig, local: NodeNum) -> Self {
        Self {
            config,
            local,
            peer: 0,
            lifecycle: Lifecycle::Inactive,
            duty: DutyCycle::disabled(),
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one poll cycle and return the delay until the next one.
    ///
    /// The first tick only activates the module.  Presence scheduling, the
    /// duty cycle and the role branch start on the tick after, so the
    /// first forced presence check goes out on the second tick.
    ///
    /// The `io` parameter satisfies [`GpioPort`], [`MeshPort`] **and**
    /// [`PowerPort`]; this avoids multiple mutable borrows while keeping
    /// the port boundary explicit.
    pub fn tick(
        &mut self,
        now_ms: u64,
        io: &mut (impl GpioPort + MeshPort + PowerPort),
        sink: &mut impl EventSink,
    ) -> u32 {
        if matches!(self.lifecycle, Lifecycle::Inactive) {
            return self.activate(now_ms, io, sink);
        }
        let Lifecycle::Running(behavior) = &mut self.lifecycle else {
            return INERT_INTERVAL_MS;
        };

        // 1. Presence scheduling
        let mut sent = behavior.poll_presence(now_ms, io, sink);

        // 2. Duty cycle, honoured at the end of the tick
        let sleep = self.duty.poll(now_ms, behavior.presence().is_ready);

        // 3. Role branch
        sent |= behavior.run(now_ms, io, sink);

        if let Some(SleepRequest { duration_ms }) = sleep {
            sink.emit(&AppEvent::DeepSleepRequested { duration_ms });
            io.request_deep_sleep(duration_ms);
        }

        if sent { SETTLE_INTERVAL_MS } else { POLL_INTERVAL_MS }
    }

    /// Offer an inbound frame.  Anything not from the configured peer, or
    /// not a recognised message, is left for other consumers.
    pub fn handle_received(
        &mut self,
        from: NodeNum,
        payload: &[u8],
        now_ms: u64,
        io: &mut (impl GpioPort + MeshPort),
        sink: &mut impl EventSink,
    ) -> ProcessMessage {
        let Lifecycle::Running(behavior) = &mut self.lifecycle else {
            return ProcessMessage::Ignored;
        };
        if !accept_origin(from, self.peer, self.local) {
            debug!("mesh: ignoring frame from !{:08x}", from);
            return ProcessMessage::Ignored;
        }
        let decoded = match decode(payload) {
            Ok(decoded) => decoded,
            Err(e) => {
                debug!("mesh: ignoring frame from !{:08x}: {}", from, e);
                return ProcessMessage::Ignored;
            }
        };

        sink.emit(&AppEvent::MessageReceived {
            kind: decoded.message.kind(),
            from,
            sentinel: decoded.sentinel,
        });
        behavior.handle(decoded, now_ms, io, sink)
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command.
    pub fn handle_command(&mut self, cmd: AppCommand, gpio: &mut impl GpioPort, sink: &mut impl EventSink) {
        match cmd {
            AppCommand::Enable => {
                self.release(gpio);
                self.config.enabled = true;
                self.lifecycle = Lifecycle::Inactive;
                info!("module enabled, activating on next tick");
            }
            AppCommand::Disable => {
                self.release(gpio);
                self.lifecycle = Lifecycle::Disabled;
                info!("module disabled by command");
                sink.emit(&AppEvent::Disabled(None));
            }
            AppCommand::UpdateConfig(config) => {
                self.release(gpio);
                self.config = config;
                self.lifecycle = Lifecycle::Inactive;
                info!("configuration updated at runtime");
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    pub fn local_node(&self) -> NodeNum {
        self.local
    }

    /// Resolved peer, 0 before activation.
    pub fn peer(&self) -> NodeNum {
        self.peer
    }

    pub fn role(&self) -> Option<Role> {
        self.behavior().map(|b| b.role())
    }

    pub fn is_running(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Running(_))
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Disabled)
    }

    pub fn presence(&self) -> Option<PresenceState> {
        self.behavior().map(|b| *b.presence())
    }

    /// TARGET channel states.
    pub fn channels(&self) -> Option<&[ChannelState; crate::CHANNEL_COUNT]> {
        match self.behavior()? {
            Behavior::Target(t) => Some(t.channels()),
            Behavior::Remote(_) => None,
        }
    }

    /// REMOTE input sample from the last tick.
    pub fn last_detection(&self) -> Option<Detection> {
        match self.behavior()? {
            Behavior::Remote(r) => Some(r.last_detection()),
            Behavior::Target(_) => None,
        }
    }

    // ── Internals ─────────────────────────────────────────────

    fn behavior(&self) -> Option<&Behavior> {
        match &self.lifecycle {
            Lifecycle::Running(b) => Some(b),
            Lifecycle::Inactive | Lifecycle::Disabled => None,
        }
    }

    /// First-activation work: validate, resolve the peer, configure pins.
    fn activate(&mut self, now_ms: u64, gpio: &mut impl GpioPort, sink: &mut impl EventSink) -> u32 {
        match self.try_activate(now_ms, gpio) {
            Ok(behavior) => {
                let role = behavior.role();
                self.duty = if role == Role::Target {
                    let t = self.config.timings();
                    DutyCycle::new(self.config.power_saving, t.active_ms, t.sleep_ms)
                } else {
                    DutyCycle::disabled()
                };
                info!(
                    "activated as {:?}: local !{:08x}, peer !{:08x}",
                    role, self.local, self.peer
                );
                sink.emit(&AppEvent::Activated {
                    role,
                    local: self.local,
                    peer: self.peer,
                });
                self.lifecycle = Lifecycle::Running(behavior);
                SETTLE_INTERVAL_MS
            }
            Err(Error::Config(ConfigError::NotEnabled)) => {
                info!("module not enabled, staying inert");
                self.lifecycle = Lifecycle::Disabled;
                sink.emit(&AppEvent::Disabled(Some(ConfigError::NotEnabled.into())));
                INERT_INTERVAL_MS
            }
            Err(e) => {
                warn!("activation failed ({}), module disabled", e);
                self.lifecycle = Lifecycle::Disabled;
                sink.emit(&AppEvent::Disabled(Some(e)));
                INERT_INTERVAL_MS
            }
        }
    }

    fn try_activate(&mut self, now_ms: u64, gpio: &mut impl GpioPort) -> crate::error::Result<Behavior> {
        self.config.validate()?;
        if self.local == 0 {
            return Err(ConfigError::NodeUnresolved.into());
        }
        self.peer = self.config.resolve_peer(self.local);
        let mut behavior = Behavior::for_config(&self.config, self.peer, now_ms)?;
        behavior.configure(gpio)?;
        Ok(behavior)
    }

    /// Drive outputs off if a role is running.
    fn release(&mut self, gpio: &mut impl GpioPort) {
        if let Lifecycle::Running(behavior) = &mut self.lifecycle {
            behavior.shutdown(gpio);
        }
        self.duty = DutyCycle::disabled();
    }
}
