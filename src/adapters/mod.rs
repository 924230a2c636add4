//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements | Connects to               |
//! |--------------|------------|---------------------------|
//! | `hardware`   | GpioPort   | ESP32 GPIO matrix         |
//! |              | MeshPort   | outbound frame queue      |
//! |              | PowerPort  | ESP32 deep sleep          |
//! | `mesh_queue` | MeshPort   | `embassy-sync` channel    |
//! | `serial_link`| —          | mesh radio UART           |
//! | `log_sink`   | EventSink  | Serial log output         |
//! | `nvs`        | ConfigPort | NVS / in-memory store     |
//! | `time`       | —          | ESP32 system timer        |
//! | `device_id`  | —          | eFuse factory MAC         |

pub mod device_id;
pub mod hardware;
pub mod log_sink;
pub mod mesh_queue;
pub mod nvs;
pub mod serial_link;
pub mod time;
