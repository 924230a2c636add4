//! Presence indicator LEDs (TARGET).
//!
//! Two discrete active-HIGH LEDs: one lit while the peer reports ready,
//! the other while it does not.  Either pin may be 0 (not fitted).  The
//! pins are only written when the shown state changes.

use embedded_hal::digital::PinState;

use crate::app::ports::{GpioPort, PinMode};
use crate::error::GpioError;

pub struct PresenceLeds {
    ready_pin: u8,
    unready_pin: u8,
    shown: Option<bool>,
}

impl PresenceLeds {
    pub fn new(ready_pin: u8, unready_pin: u8) -> Self {
        Self {
            ready_pin,
            unready_pin,
            shown: None,
        }
    }

    pub fn configure(&mut self, gpio: &mut impl GpioPort) -> Result<(), GpioError> {
        for pin in [self.ready_pin, self.unready_pin] {
            if pin != 0 {
                gpio.configure_pin(pin, PinMode::Output)?;
            }
        }
        self.off(gpio);
        Ok(())
    }

    /// Light the LED matching `ready`.
    pub fn show(&mut self, ready: bool, gpio: &mut impl GpioPort) {
        if self.shown == Some(ready) {
            return;
        }
        self.set(self.ready_pin, ready, gpio);
        self.set(self.unready_pin, !ready, gpio);
        self.shown = Some(ready);
    }

    pub fn off(&mut self, gpio: &mut impl GpioPort) {
        self.set(self.ready_pin, false, gpio);
        self.set(self.unready_pin, false, gpio);
        self.shown = None;
    }

    fn set(&self, pin: u8, on: bool, gpio: &mut impl GpioPort) {
        if pin != 0 {
            gpio.write_pin(pin, PinState::from(on));
        }
    }
}
