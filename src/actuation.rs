//! Actuation engine — TARGET channel outputs and their nag cycles.
//!
//! A qualifying DETECTED switches a channel ON and arms two deadlines:
//!
//! ```text
//!  ON ──signal──▶ toggle ──signal──▶ toggle ── … ──▶ cutoff: OFF (terminal)
//!  │                                                    ▲
//!  └──────────────────── nag timeout ───────────────────┘
//! ```
//!
//! The cutoff is checked first on every poll, so with the default nag
//! timeout (equal to the signal duration) a channel gives one pulse and
//! never toggles.  Each channel runs independently.

use embedded_hal::digital::PinState;
use log::{debug, info};

use crate::CHANNEL_COUNT;
use crate::app::ports::{GpioPort, PinMode};
use crate::error::GpioError;
use crate::mesh::ChannelMask;

/// Per-channel bookkeeping.  Owned by the TARGET behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelState {
    /// A pin is assigned.
    pub configured: bool,
    /// Last flag the peer reported for this channel.
    pub detected: bool,
    /// Output currently driven ON.
    pub actuated: bool,
    /// Last ON or toggle instant.
    pub actuated_at_ms: u64,
    /// A nag cycle is running.
    pub nagging: bool,
    /// Hard OFF deadline, `None` when idle.
    pub nag_cutoff_ms: Option<u64>,
}

/// What [`ActuationEngine::poll`] did to a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelTransition {
    /// Nag toggle; `on` is the new output state.
    Toggled { on: bool },
    /// Hard cutoff reached; output forced OFF.
    Cutoff,
}

#[derive(Debug, Clone)]
pub struct ActuationEngine {
    channels: [ChannelState; CHANNEL_COUNT],
    pins: [u8; CHANNEL_COUNT],
    active_high: bool,
    signal_ms: u64,
    nag_timeout_ms: u64,
}

impl ActuationEngine {
    pub fn new(pins: [u8; CHANNEL_COUNT], active_high: bool, signal_ms: u64, nag_timeout_ms: u64) -> Self {
        let channels = pins.map(|pin| ChannelState {
            configured: pin != 0,
            ..ChannelState::default()
        });
        Self {
            channels,
            pins,
            active_high,
            signal_ms,
            nag_timeout_ms,
        }
    }

    pub fn channels(&self) -> &[ChannelState; CHANNEL_COUNT] {
        &self.channels
    }

    /// Configure every assigned pin as an output and drive it OFF.
    pub fn configure(&mut self, gpio: &mut impl GpioPort) -> Result<(), GpioError> {
        for (i, pin) in self.pins.into_iter().enumerate() {
            if pin == 0 {
                continue;
            }
            gpio.configure_pin(pin, PinMode::Output)?;
            self.drive(i, false, gpio);
        }
        Ok(())
    }

    /// Store the peer's flags without touching any output.
    pub fn remember(&mut self, flags: [bool; CHANNEL_COUNT]) {
        for (ch, flag) in self.channels.iter_mut().zip(flags) {
            ch.detected = flag;
        }
    }

    /// Start a nag cycle on every flagged, configured channel.  Returns the
    /// channels that were switched ON.
    pub fn actuate(&mut self, flags: [bool; CHANNEL_COUNT], now_ms: u64, gpio: &mut impl GpioPort) -> ChannelMask {
        self.remember(flags);
        let mut fired = ChannelMask::EMPTY;
        for i in 0..CHANNEL_COUNT {
            if !(flags[i] && self.channels[i].configured) {
                continue;
            }
            self.drive(i, true, gpio);
            let ch = &mut self.channels[i];
            ch.nagging = true;
            ch.actuated_at_ms = now_ms;
            let cutoff = now_ms.saturating_add(self.nag_timeout_ms);
            ch.nag_cutoff_ms = Some(cutoff);
            fired.insert(i);
            info!("actuation: channel {} ON until {} ms", i + 1, cutoff);
        }
        fired
    }

    /// Advance every channel's nag timers.
    pub fn poll(&mut self, now_ms: u64, gpio: &mut impl GpioPort) -> [Option<ChannelTransition>; CHANNEL_COUNT] {
        let mut out = [None; CHANNEL_COUNT];
        for (i, slot) in out.iter_mut().enumerate() {
            let ch = self.channels[i];
            if ch.nag_cutoff_ms.is_some_and(|cutoff| now_ms >= cutoff) {
                self.drive(i, false, gpio);
                let ch = &mut self.channels[i];
                ch.nagging = false;
                ch.nag_cutoff_ms = None;
                *slot = Some(ChannelTransition::Cutoff);
                debug!("actuation: channel {} cutoff", i + 1);
            } else if ch.nagging && now_ms > ch.actuated_at_ms.saturating_add(self.signal_ms) {
                let on = !ch.actuated;
                self.drive(i, on, gpio);
                self.channels[i].actuated_at_ms = now_ms;
                *slot = Some(ChannelTransition::Toggled { on });
            }
        }
        out
    }

    /// Force every output OFF and cancel all nag cycles.
    pub fn all_off(&mut self, gpio: &mut impl GpioPort) {
        for i in 0..CHANNEL_COUNT {
            if self.channels[i].configured {
                self.drive(i, false, gpio);
            }
            let ch = &mut self.channels[i];
            ch.nagging = false;
            ch.nag_cutoff_ms = None;
        }
    }

    fn drive(&mut self, channel: usize, on: bool, gpio: &mut impl GpioPort) {
        let pin = self.pins[channel];
        if pin == 0 {
            return;
        }
        let level = PinState::from(on == self.active_high);
        gpio.write_pin(pin, level);
        self.channels[channel].actuated = on;
    }
}
