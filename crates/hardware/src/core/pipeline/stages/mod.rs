//! Pipeline stage implementations.
//!
//! This module contains the per-stage logic of the five-stage pipeline. Each
//! function moves an instruction *into* its stage and computes the payload the
//! stage hands downstream. It includes:
//! 1. **Fetch:** Admits the instruction at the fetch PC.
//! 2. **Decode:** Decodes instruction text and predicts `beq`.
//! 3. **Register Read:** Reads operands, or stalls on a data hazard.
//! 4. **Execute:** Computes the commit package with the ALU.
//! 5. **Store:** Commits the package, resolving branches and jumps.

/// Instruction decode stage implementation.
pub mod decode;

/// Instruction execute stage implementation.
pub mod execute;

/// Instruction fetch stage implementation.
pub mod fetch;

/// Register read stage implementation.
pub mod register_read;

/// Store (commit) stage implementation.
pub mod store;

/// Decode stage entry point.
pub use decode::decode_stage;
/// Execute stage entry point.
pub use execute::execute_stage;
/// Fetch stage entry point.
pub use fetch::fetch_stage;
/// Register read stage entry point.
pub use register_read::register_read_stage;
/// Store stage entry points (admission and commit).
pub use store::{commit_stage, store_stage};
