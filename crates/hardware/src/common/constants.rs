//! Global Simulator Constants.
//!
//! This module defines constants shared across the simulator. It includes:
//! 1. **Architectural Constants:** Register count and instruction width.
//! 2. **Memory Constants:** Default instruction and data memory capacities.
//! 3. **Simulation Constants:** Cycle-cap floor and per-instruction budget.

/// Number of general-purpose registers.
pub const NUM_REGS: usize = 32;

/// Size of one instruction in bytes; the fetch PC advances by this amount.
pub const INSTRUCTION_BYTES: u32 = 4;

/// Default capacity of the word-addressed data memory.
pub const DATA_MEMORY_WORDS: usize = 256;

/// Minimum cycle cap applied to every run.
pub const MIN_CYCLE_CAP: u64 = 1000;

/// Worst-case cycles budgeted per program line when deriving the default cap.
///
/// Covers a divide (10 cycles) in Execute plus the four single-cycle stages,
/// stall bubbles, and a refetch after a flush, with headroom for short loops.
pub const CYCLES_PER_LINE: u64 = 64;
