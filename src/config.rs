//! Module configuration.
//!
//! All tunable parameters for one meshnag node.  The structure is read-only
//! to the core: it is loaded once (NVS blob or defaults) and handed to the
//! [`AppService`](crate::app::service::AppService).  Every timing constant is
//! in seconds, and zero selects the documented default listed on
//! [`Timings`].

use log::warn;
use serde::{Deserialize, Serialize};

use crate::CHANNEL_COUNT;
use crate::error::ConfigError;
use crate::mesh::NodeNum;
use crate::pins;

/// Which side of the link this node plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Role {
    #[default]
    None,
    /// Senses inputs and reports to the TARGET.
    Remote,
    /// Receives reports and drives outputs.
    Target,
}

/// Peer identifier as entered by the user: hex node number, optionally
/// prefixed with `!` or `0x`.  Empty means "use the local node".
pub type PeerId = heapless::String<16>;

/// Core module configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleConfig {
    pub enabled: bool,
    pub role: Role,
    /// Hex node number of the counterpart.
    pub peer: PeerId,

    // --- Pins (0 = unconfigured) ---
    /// Per-channel pins: inputs on a REMOTE, outputs on a TARGET.
    pub channel_pins: [u8; CHANNEL_COUNT],
    /// REMOTE presence ("ready") input.
    pub presence_pin: u8,
    /// TARGET LED lit while the peer reports ready.
    pub ready_led_pin: u8,
    /// TARGET LED lit while the peer is not ready.
    pub unready_led_pin: u8,

    // --- Polarity ---
    /// Inputs read HIGH when triggered.
    pub triggered_high: bool,
    /// Enable the internal pull-up on inputs.
    pub use_pullup: bool,
    /// Outputs are ON when driven HIGH.
    pub output_active_high: bool,

    // --- Timing (seconds, 0 = default) ---
    /// Minimum spacing between REMOTE broadcasts.
    pub minimum_broadcast_secs: u32,
    /// REMOTE state (OBSERVED) report interval.
    pub state_broadcast_secs: u32,
    /// READYONE check cadence on both roles.
    pub ready_one_check_interval_secs: u32,
    /// READYONE reply timeout.
    pub ready_one_timeout_secs: u32,
    /// TARGET output pulse length / nag toggle period.
    pub signal_duration_secs: u32,
    /// TARGET hard cutoff for a nag cycle (0 = same as signal duration).
    pub nag_timeout_secs: u32,

    // --- Power saving (TARGET) ---
    pub power_saving: bool,
    pub active_secs: u32,
    pub sleep_secs: u32,
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            role: Role::None,
            peer: PeerId::new(),

            channel_pins: [
                pins::CHANNEL_1_GPIO,
                pins::CHANNEL_2_GPIO,
                pins::CHANNEL_3_GPIO,
                pins::CHANNEL_4_GPIO,
            ],
            presence_pin: pins::PRESENCE_GPIO,
            ready_led_pin: pins::READY_LED_GPIO,
            unready_led_pin: pins::UNREADY_LED_GPIO,

            triggered_high: false, // buttons to ground
            use_pullup: true,
            output_active_high: true,

            minimum_broadcast_secs: 0,
            state_broadcast_secs: 0,
            ready_one_check_interval_secs: 0,
            ready_one_timeout_secs: 0,
            signal_duration_secs: 0,
            nag_timeout_secs: 0,

            power_saving: false,
            active_secs: 0,
            sleep_secs: 0,
        }
    }
}

/// Timing constants resolved to milliseconds.
///
/// | Field                  | Default |
/// |------------------------|---------|
/// | `minimum_broadcast`    | 45 s    |
/// | `state_broadcast`      | 15 min  |
/// | `ready_one_check`      | 30 s    |
/// | `ready_one_timeout`    | 90 s    |
/// | `signal_duration`      | 10 s    |
/// | `nag_timeout`          | = signal duration |
/// | `active`               | 60 s    |
/// | `sleep`                | 5 min   |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub minimum_broadcast_ms: u64,
    pub state_broadcast_ms: u64,
    pub ready_one_check_ms: u64,
    pub ready_one_timeout_ms: u64,
    pub signal_duration_ms: u64,
    pub nag_timeout_ms: u64,
    pub active_ms: u64,
    pub sleep_ms: u64,
}

pub const DEFAULT_MINIMUM_BROADCAST_SECS: u32 = 45;
pub const DEFAULT_STATE_BROADCAST_SECS: u32 = 15 * 60;
pub const DEFAULT_READY_ONE_CHECK_SECS: u32 = 30;
pub const DEFAULT_READY_ONE_TIMEOUT_SECS: u32 = 90;
pub const DEFAULT_SIGNAL_DURATION_SECS: u32 = 10;
pub const DEFAULT_ACTIVE_SECS: u32 = 60;
pub const DEFAULT_SLEEP_SECS: u32 = 5 * 60;

/// `secs` in milliseconds, or `default` when unset.
fn secs_or(secs: u32, default: u32) -> u64 {
    let secs = if secs == 0 { default } else { secs };
    u64::from(secs) * 1000
}

impl ModuleConfig {
    /// Resolve every timing constant, substituting defaults for zeros.
    pub fn timings(&self) -> Timings {
        let signal_duration_ms = secs_or(self.signal_duration_secs, DEFAULT_SIGNAL_DURATION_SECS);
        Timings {
            minimum_broadcast_ms: secs_or(self.minimum_broadcast_secs, DEFAULT_MINIMUM_BROADCAST_SECS),
            state_broadcast_ms: secs_or(self.state_broadcast_secs, DEFAULT_STATE_BROADCAST_SECS),
            ready_one_check_ms: secs_or(self.ready_one_check_interval_secs, DEFAULT_READY_ONE_CHECK_SECS),
            ready_one_timeout_ms: secs_or(self.ready_one_timeout_secs, DEFAULT_READY_ONE_TIMEOUT_SECS),
            signal_duration_ms,
            nag_timeout_ms: if self.nag_timeout_secs == 0 {
                signal_duration_ms
            } else {
                u64::from(self.nag_timeout_secs) * 1000
            },
            active_ms: secs_or(self.active_secs, DEFAULT_ACTIVE_SECS),
            sleep_ms: secs_or(self.sleep_secs, DEFAULT_SLEEP_SECS),
        }
    }

    /// Resolve the peer node number.
    ///
    /// An empty field, a malformed value, or zero all fall back to `local`.
    pub fn resolve_peer(&self, local: NodeNum) -> NodeNum {
        let raw = self.peer.trim();
        if raw.is_empty() {
            return local;
        }
        match parse_node_num(raw) {
            Some(node) if node != 0 => node,
            _ => {
                warn!("config: peer '{}' is not a node number, using local !{:08x}", raw, local);
                local
            }
        }
    }

    /// Channels with a pin assigned.
    pub fn configured_channels(&self) -> [bool; CHANNEL_COUNT] {
        self.channel_pins.map(|pin| pin != 0)
    }

    /// Check the configuration can drive `self.role`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Err(ConfigError::NotEnabled);
        }
        match self.role {
            Role::None => Err(ConfigError::RoleUnset),
            Role::Remote if self.presence_pin == 0 => Err(ConfigError::MissingPin("presence")),
            Role::Remote | Role::Target if !self.configured_channels().contains(&true) => {
                Err(ConfigError::NoChannels)
            }
            Role::Remote | Role::Target => Ok(()),
        }
    }
}

/// Parse `!a1b2c3d4`, `0xa1b2c3d4` or `a1b2c3d4`.
pub fn parse_node_num(raw: &str) -> Option<NodeNum> {
    let hex = raw
        .strip_prefix('!')
        .or_else(|| raw.strip_prefix("0x"))
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    if hex.is_empty() || hex.len() > 8 {
        return None;
    }
    NodeNum::from_str_radix(hex, 16).ok()
}
