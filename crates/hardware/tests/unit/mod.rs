//! # Unit Components
//!
//! Unit tests organized to mirror the crate's module tree.







/// Trace records and sinks.
pub mod trace;
