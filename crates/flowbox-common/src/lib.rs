//! Common utilities for the flowbox layout engine.
//!
//! This crate provides shared infrastructure used by the engine and its
//! front ends:
//! - **Warning System** - deduplicated, non-fatal diagnostics routed through `log`

pub mod warning;
