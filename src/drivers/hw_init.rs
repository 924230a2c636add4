//! Raw GPIO primitives.
//!
//! Pin directions and levels using raw ESP-IDF sys calls.  Pins are
//! configured lazily, one at a time, when a role activates; there is no
//! fixed board-wide init.
//!
//! On host builds the pins are simulated: a 64-bit level mask that tests
//! (and the sim binary path) can drive with [`sim_set_level`].

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::app::ports::PinMode;
use crate::error::GpioError;
use crate::pins;

fn check_pin(pin: u8) -> Result<(), GpioError> {
    if pin == 0 || pin > pins::MAX_GPIO {
        return Err(GpioError::InvalidPin(pin));
    }
    Ok(())
}

// ── Configuration ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn gpio_configure(pin: u8, mode: PinMode) -> Result<(), GpioError> {
    check_pin(pin)?;
    let (gpio_mode, pull_up) = match mode {
        PinMode::Input => (gpio_mode_t_GPIO_MODE_INPUT, gpio_pullup_t_GPIO_PULLUP_DISABLE),
        PinMode::InputPullUp => (gpio_mode_t_GPIO_MODE_INPUT, gpio_pullup_t_GPIO_PULLUP_ENABLE),
        PinMode::Output => (gpio_mode_t_GPIO_MODE_OUTPUT, gpio_pullup_t_GPIO_PULLUP_DISABLE),
    };
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: gpio_mode,
        pull_up_en: pull_up,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    // SAFETY: cfg is a valid, fully initialised struct on the stack;
    // gpio_config copies it.  Called from the control loop only.
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(GpioError::ConfigFailed { pin, rc: ret });
    }
    log::debug!("hw_init: GPIO{} configured as {:?}", pin, mode);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_configure(pin: u8, mode: PinMode) -> Result<(), GpioError> {
    check_pin(pin)?;
    log::debug!("hw_init(sim): GPIO{} configured as {:?}", pin, mode);
    if mode == PinMode::InputPullUp {
        sim_set_level(pin, true);
    }
    Ok(())
}

// ── Levels ────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: u8) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin; safe to call from main context.
    (unsafe { gpio_get_level(i32::from(pin)) }) != 0
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: u8, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin.
    // Main-loop only.
    unsafe {
        gpio_set_level(i32::from(pin), u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
static SIM_LEVELS: core::sync::atomic::AtomicU64 = core::sync::atomic::AtomicU64::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(pin: u8) -> bool {
    sim_level(pin)
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: u8, high: bool) {
    sim_set_level(pin, high);
}

/// Drive a simulated pin.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_level(pin: u8, high: bool) {
    use core::sync::atomic::Ordering;
    if pin > pins::MAX_GPIO {
        return;
    }
    let bit = 1u64 << pin;
    if high {
        SIM_LEVELS.fetch_or(bit, Ordering::Relaxed);
    } else {
        SIM_LEVELS.fetch_and(!bit, Ordering::Relaxed);
    }
}

/// Current level of a simulated pin.
#[cfg(not(target_os = "espidf"))]
pub fn sim_level(pin: u8) -> bool {
    use core::sync::atomic::Ordering;
    pin <= pins::MAX_GPIO && SIM_LEVELS.load(Ordering::Relaxed) & (1u64 << pin) != 0
}
