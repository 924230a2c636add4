//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the protocol rules for a meshnag node: activation,
//! the REMOTE and TARGET role behaviors, and the poll loop that sequences
//! them.  All interaction with hardware happens through **port traits**
//! defined in [`ports`], keeping this layer fully testable without real
//! peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod roles;
pub mod service;
