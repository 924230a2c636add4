//! meshnag firmware entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  HardwareAdapter    LogEventSink   NvsAdapter   Esp32Time    │
//! │  (Gpio+Mesh+Power)  (EventSink)    (Config)     (uptime)     │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ─────────────────       │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────┐      │
//! │  │             AppService (pure logic)                │      │
//! │  │  REMOTE: sample · report · answer presence         │      │
//! │  │  TARGET: actuate · nag · check presence · sleep    │      │
//! │  └────────────────────────────────────────────────────┘      │
//! │                                                              │
//! │  mesh-link task (core 0) ⇄ INBOUND / OUTBOUND channels       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{debug, info, warn};

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::AnyIOPin;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{UartDriver, config::Config as UartConfig};
use esp_idf_hal::units::Hertz;

use meshnag::adapters::device_id;
use meshnag::adapters::hardware::HardwareAdapter;
use meshnag::adapters::log_sink::LogEventSink;
use meshnag::adapters::mesh_queue::MeshQueue;
use meshnag::adapters::nvs::NvsAdapter;
use meshnag::adapters::serial_link;
use meshnag::adapters::time::Esp32TimeAdapter;
use meshnag::app::ports::ConfigPort;
use meshnag::app::service::AppService;
use meshnag::config::ModuleConfig;
use meshnag::mesh::ProcessMessage;
use meshnag::mesh::channels::{INBOUND, OUTBOUND};
use meshnag::pins;

/// Inbound frames are drained at least this often while waiting.
const DRAIN_SLICE_MS: u32 = 10;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  meshnag v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config from NVS (or defaults) ──────────────────────
    let config = match NvsAdapter::new().and_then(|nvs| nvs.load()) {
        Ok(cfg) => {
            info!("Config loaded from NVS");
            cfg
        }
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            ModuleConfig::default()
        }
    };
    match serde_json::to_string(&config) {
        Ok(json) => info!("Config: {}", json),
        Err(e) => warn!("Config not printable: {}", e),
    }

    // ── 3. Identity ───────────────────────────────────────────
    let local = device_id::node_num(&device_id::read_mac());
    info!("Node ID: {}", device_id::node_id(local));

    // ── 4. Mesh radio link ────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let uart_config = UartConfig::default().baudrate(Hertz(pins::LINK_BAUD));
    // SAFETY: the link pins are reserved for the radio UART and claimed
    // exactly once, here.
    let (tx, rx) = unsafe {
        (
            AnyIOPin::new(i32::from(pins::LINK_TX_GPIO)),
            AnyIOPin::new(i32::from(pins::LINK_RX_GPIO)),
        )
    };
    let uart = UartDriver::new(
        peripherals.uart1,
        tx,
        rx,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &uart_config,
    )?;
    serial_link::spawn(uart)?;

    // ── 5. Adapters + app service ─────────────────────────────
    let mut hw = HardwareAdapter::new(MeshQueue::new(&OUTBOUND));
    let mut log_sink = LogEventSink::new();
    let clock = Esp32TimeAdapter::new();
    let mut app = AppService::new(config, local);

    info!("System ready. Entering poll loop.");

    // ── 6. Poll loop ──────────────────────────────────────────
    loop {
        drain_inbound(&mut app, &clock, &mut hw, &mut log_sink);

        let delay_ms = app.tick(clock.uptime_ms(), &mut hw, &mut log_sink);

        let mut waited = 0;
        while waited < delay_ms {
            let slice = DRAIN_SLICE_MS.min(delay_ms - waited);
            FreeRtos::delay_ms(slice);
            waited += slice;
            drain_inbound(&mut app, &clock, &mut hw, &mut log_sink);
        }
    }
}

fn drain_inbound(
    app: &mut AppService,
    clock: &Esp32TimeAdapter,
    hw: &mut HardwareAdapter,
    sink: &mut LogEventSink,
) {
    while let Ok(frame) = INBOUND.try_receive() {
        let outcome = app.handle_received(frame.from, &frame.payload, clock.uptime_ms(), hw, sink);
        if outcome == ProcessMessage::Ignored {
            debug!("frame from !{:08x} passed on", frame.from);
        }
    }
}
