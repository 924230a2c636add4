//! Node identity derived from the ESP32 factory MAC address.
//!
//! The mesh node number is the last four MAC bytes read big-endian, the
//! same number the transport announces.  It is shown as `!xxxxxxxx`, the
//! form the peer field of [`ModuleConfig`](crate::config::ModuleConfig)
//! accepts.

use core::fmt::Write;

use crate::mesh::NodeNum;

/// Fixed-size node id string: "!xxxxxxxx".
pub type NodeIdString = heapless::String<16>;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: mac is a valid 6-byte buffer, which is what the call writes.
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// Node number from the last four MAC bytes.
pub fn node_num(mac: &MacAddress) -> NodeNum {
    NodeNum::from_be_bytes([mac[2], mac[3], mac[4], mac[5]])
}

/// `!xxxxxxxx`, lowercase hex.
pub fn node_id(node: NodeNum) -> NodeIdString {
    let mut id = NodeIdString::new();
    let _ = write!(id, "!{:08x}", node);
    id
}
