//! Five-stage pipeline simulator library.
//!
//! This crate implements a cycle-accurate, in-order, five-stage pipeline
//! (Fetch, Decode, `RegisterRead`, Execute, Store) for a small RISC-V-style
//! instruction subset, with the following:
//! 1. **Core:** Generic latency-counting stages, dynamic RAW hazard control, and
//!    static branch prediction with flush on misprediction.
//! 2. **Architecture:** 32 integer registers, word-addressed data memory, and a symbol table.
//! 3. **ISA:** Textual decoding of ALU, memory, and control instructions.
//! 4. **Simulation:** Assembly loader, cycle-capped run loop, and a sequential reference.
//! 5. **Observation:** Per-cycle trace records, statistics, and final state.

/// Common types and constants (errors, register count, memory sizes).
pub mod common;
/// Simulator configuration (defaults, latencies, presets).
pub mod config;
/// Pipeline core (engine, stages, hazards, architectural state, functional units).
pub mod core;
/// Instruction set (opcodes, ABI names, decoder).
pub mod isa;
/// Program loading and run drivers.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;
/// Per-cycle trace records and sinks.
pub mod trace;

/// Root configuration type; use `Config::default()`, a preset, or JSON.
pub use crate::config::{Config, Preset};
/// Cycle-level engine and its end-of-run snapshot.
pub use crate::core::{FinalState, PipelineEngine};
/// Loaded program and run loop.
pub use crate::sim::{Program, Simulator};
