//! Core processor implementation.
//!
//! This module contains the pipeline, the execution units, and the
//! architectural state the pipeline commits to.

/// Architectural state (register file, data memory, symbol table).
pub mod arch;

/// Instruction pipeline implementation (engine, stages, latches, hazards, signals).
pub mod pipeline;

/// Execution units (ALU, branch predictor, speculation state).
pub mod units;

pub use self::pipeline::{FinalState, PipelineEngine};
