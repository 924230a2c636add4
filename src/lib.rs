//! meshnag firmware library.
//!
//! A REMOTE node reads up to four input lines and reports them over a mesh
//! text protocol; its TARGET peer drives matching outputs with timed nag
//! cycles.  The pure-logic modules are exposed for integration testing and
//! fuzzing.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod actuation;
pub mod app;
pub mod config;
pub mod error;
pub mod mesh;
pub mod power;
pub mod presence;
pub mod sensors;
pub mod timer;

pub mod pins;

// Hardware-facing layers.  Host builds get simulated primitives.
pub mod adapters;
pub mod drivers;

/// Number of detection/actuation channels per node.
pub const CHANNEL_COUNT: usize = 4;
