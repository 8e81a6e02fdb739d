//! Common utilities and types used throughout the pipeline simulator.
//!
//! This module provides fundamental building blocks that are shared across all components
//! of the simulator. It includes:
//! 1. **Constants:** Register count, memory capacities, and cycle-cap parameters.
//! 2. **Error Handling:** Decode, load, and fatal simulation errors.

/// Common constants used throughout the simulator.
pub mod constants;

/// Error types for decoding, loading, and simulation.
pub mod error;

pub use constants::{
    CYCLES_PER_LINE, DATA_MEMORY_WORDS, INSTRUCTION_BYTES, MIN_CYCLE_CAP, NUM_REGS,
};
pub use error::{AddressSpace, DecodeError, LoadError, SimError};
