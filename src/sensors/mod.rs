//! Pin sampler — the REMOTE's view of its input lines.
//!
//! Four channel inputs (plus the presence input, read with the same
//! polarity rule) are sampled instantaneously on every poll.  There is no
//! debouncing: the poll interval is long compared to switch bounce and a
//! missed edge is picked up on the next poll.

use crate::CHANNEL_COUNT;
use crate::app::ports::GpioPort;

/// Apply the triggered-polarity transform to a raw level.
pub fn asserted(raw: bool, triggered_high: bool) -> bool {
    if triggered_high { raw } else { !raw }
}

/// Read one line and report whether it is triggered.  Pin 0 (unconfigured)
/// is never triggered.
pub fn read_asserted(gpio: &mut impl GpioPort, pin: u8, triggered_high: bool) -> bool {
    pin != 0 && asserted(gpio.read_pin(pin), triggered_high)
}

/// One sample of all channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Detection {
    /// Per-channel triggered state.
    pub channels: [bool; CHANNEL_COUNT],
    /// Aggregate flag, see [`Detection::from_raw`].
    pub any: bool,
}

impl Detection {
    /// Classify raw levels.
    ///
    /// `any` is computed from the raw levels, not from `channels`:
    /// OR(raw) when triggered high, OR(!raw) when triggered low.
    pub fn from_raw(raw: [bool; CHANNEL_COUNT], triggered_high: bool) -> Self {
        let any = if triggered_high {
            raw.iter().any(|&r| r)
        } else {
            raw.iter().any(|&r| !r)
        };
        Self {
            channels: raw.map(|r| asserted(r, triggered_high)),
            any,
        }
    }
}

/// Samples the four channel inputs.
#[derive(Debug, Clone, Copy)]
pub struct PinSampler {
    pins: [u8; CHANNEL_COUNT],
    triggered_high: bool,
}

impl PinSampler {
    pub fn new(pins: [u8; CHANNEL_COUNT], triggered_high: bool) -> Self {
        Self {
            pins,
            triggered_high,
        }
    }

    /// Read every channel.  Unconfigured channels contribute the idle
    /// (untriggered) level.
    pub fn sample(&self, gpio: &mut impl GpioPort) -> Detection {
        let idle = !self.triggered_high;
        let raw = self
            .pins
            .map(|pin| if pin == 0 { idle } else { gpio.read_pin(pin) });
        Detection::from_raw(raw, self.triggered_high)
    }
}
