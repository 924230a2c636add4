//! Default GPIO assignments for the meshnag carrier board.
//!
//! These only seed [`ModuleConfig::default`](crate::config::ModuleConfig);
//! the stored configuration may remap any of them, and 0 always means
//! "not connected".

// ---------------------------------------------------------------------------
// Channel lines (buttons on a REMOTE, relays/buzzers on a TARGET)
// ---------------------------------------------------------------------------

pub const CHANNEL_1_GPIO: u8 = 4;
pub const CHANNEL_2_GPIO: u8 = 5;
pub const CHANNEL_3_GPIO: u8 = 6;
pub const CHANNEL_4_GPIO: u8 = 7;

// ---------------------------------------------------------------------------
// Presence
// ---------------------------------------------------------------------------

/// REMOTE "I am here" switch.
pub const PRESENCE_GPIO: u8 = 15;

/// TARGET indicator LEDs (active HIGH).
pub const READY_LED_GPIO: u8 = 16;
pub const UNREADY_LED_GPIO: u8 = 17;

/// Highest GPIO number in the ESP32-S3 matrix.
pub const MAX_GPIO: u8 = 48;

// ---------------------------------------------------------------------------
// Mesh radio UART (text-message serial mode)
// ---------------------------------------------------------------------------

pub const LINK_TX_GPIO: u8 = 8;
pub const LINK_RX_GPIO: u8 = 9;
pub const LINK_BAUD: u32 = 115_200;
