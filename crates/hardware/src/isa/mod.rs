//! Instruction Set Definitions.
//!
//! Contains the opcode set, the decoded instruction record, register naming,
//! and the textual decoder.
//!
//! # Supported instructions
//!
//! * ALU: `add`, `sub`, `and`, `or`, `xor`, `slt`, `mul`, `div`, `addi`.
//! * Memory: `lw`, `sw` (word-addressed), `la` (resolved at decode).
//! * Control: `beq`, `blt`, `jal`, `nop`.

/// Application Binary Interface (ABI) register name mappings.
pub mod abi;

/// Textual instruction decoding.
pub mod decode;

/// Opcode and instruction record definitions.
pub mod instruction;

pub use decode::decode;
pub use instruction::{Instruction, Opcode, Target};
