//! Tests for the five-stage pipeline.




/// Commit package computation.
pub mod execute;

/// Hazard detection in isolation.
pub mod hazards;

/// Loads, stores, and `la`.
pub mod memory;

/// The generic stage state machine.
pub mod stage;


/// Per-opcode and per-stage latencies.
pub mod timing;
