//! End-to-end test support for Wordwise
//!
//! - [`harness`]: isolated temporary databases driven by a fixed clock
//! - [`mocks`]: word and word-list factories

pub mod harness;
pub mod mocks;
