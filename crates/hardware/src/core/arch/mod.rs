//! Architectural state.
//!
//! This module contains the state visible to programs. It includes the following modules:
//! 1. **GPRs:** The 32-entry integer register file with `x0` hardwired to zero.
//! 2. **Memory:** Word-addressed, bounds-checked data memory.
//! 3. **Symbols:** The label table shared read-only by the decoder and the engine.

/// General-Purpose Register file implementation.
pub mod gpr;

/// Word-addressed data memory.
pub mod memory;

/// Label-to-address symbol table.
pub mod symbols;

pub use gpr::RegisterFile;
pub use memory::{DataMemory, OutOfBounds};
pub use symbols::SymbolTable;
