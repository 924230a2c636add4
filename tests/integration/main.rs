//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises one role (or both, back
//! to back) against mock adapters.  All tests run on the host (x86_64)
//! with no real hardware or radio required.

mod mock_hw;
mod remote_tests;
mod target_tests;
