//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Exposes the GPIO primitives through [`GpioPort`], deep sleep through
//! [`PowerPort`], and the outbound mesh queue through [`MeshPort`], so a
//! single `&mut HardwareAdapter` satisfies everything
//! [`AppService::tick`](crate::app::service::AppService::tick) needs.  On
//! non-espidf targets, the underlying primitives use cfg-gated simulation
//! stubs.

use embedded_hal::digital::PinState;

use crate::app::ports::{GpioPort, MeshPort, PinMode, PowerPort};
use crate::drivers::hw_init;
use crate::error::{GpioError, TransportError};
use crate::mesh::{NodeNum, OutboundFrame, Priority};
use crate::power;

use super::mesh_queue::MeshQueue;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter {
    mesh: MeshQueue,
}

impl HardwareAdapter {
    pub fn new(mesh: MeshQueue) -> Self {
        Self { mesh }
    }
}

// ── GpioPort implementation ───────────────────────────────────

impl GpioPort for HardwareAdapter {
    fn configure_pin(&mut self, pin: u8, mode: PinMode) -> Result<(), GpioError> {
        hw_init::gpio_configure(pin, mode)
    }

    fn read_pin(&mut self, pin: u8) -> bool {
        hw_init::gpio_read(pin)
    }

    fn write_pin(&mut self, pin: u8, level: PinState) {
        hw_init::gpio_write(pin, level == PinState::High);
    }
}

// ── MeshPort implementation ───────────────────────────────────

impl MeshPort for HardwareAdapter {
    fn allocate_frame(&mut self) -> Result<OutboundFrame, TransportError> {
        self.mesh.allocate_frame()
    }

    fn send(&mut self, frame: OutboundFrame, to: NodeNum, priority: Priority, want_ack: bool) {
        self.mesh.send(frame, to, priority, want_ack);
    }
}

// ── PowerPort implementation ──────────────────────────────────

impl PowerPort for HardwareAdapter {
    fn request_deep_sleep(&mut self, duration_ms: u64) {
        power::enter_deep_sleep(duration_ms);
    }
}
