//! Simulator Error Definitions.
//!
//! This module defines the error types raised by the simulator. It provides:
//! 1. **Decode Errors:** Malformed instruction text rejected by the decoder.
//! 2. **Load Errors:** Problems found while assembling a source file into a program.
//! 3. **Simulation Errors:** Fatal run-time faults, each tagged with the cycle they occurred in.

use std::fmt;

use thiserror::Error;

/// Errors produced while decoding one line of instruction text.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The line was empty after trimming.
    #[error("empty instruction")]
    Empty,

    /// The mnemonic is not part of the supported instruction set.
    #[error("unknown opcode `{0}`")]
    UnknownOpcode(String),

    /// The opcode received the wrong number of operands.
    #[error("`{opcode}` expects {expected} operand(s), found {found}")]
    OperandCount {
        /// Mnemonic of the offending instruction.
        opcode: &'static str,
        /// Operand count required by the opcode.
        expected: usize,
        /// Operand count present in the text.
        found: usize,
    },

    /// A register operand did not name one of the 32 registers.
    #[error("invalid register `{0}`")]
    InvalidRegister(String),

    /// An immediate or offset could not be parsed as a 32-bit integer.
    #[error("invalid immediate `{0}`")]
    InvalidImmediate(String),

    /// A memory operand was not of the form `offset(reg)`.
    #[error("invalid memory operand `{0}`")]
    InvalidMemoryOperand(String),

    /// `la` named a label missing from the symbol table.
    #[error("unresolved label `{0}`")]
    UnresolvedLabel(String),
}

/// Errors produced while assembling source text into a [`Program`](crate::sim::loader::Program).
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source file could not be read.
    #[error("failed to read program: {0}")]
    Io(#[from] std::io::Error),

    /// An assembler directive is not supported.
    #[error("line {line}: unknown directive `{directive}`")]
    UnknownDirective {
        /// 1-based source line.
        line: usize,
        /// The directive as written.
        directive: String,
    },

    /// A label was defined twice.
    #[error("line {line}: duplicate label `{label}`")]
    DuplicateLabel {
        /// 1-based source line.
        line: usize,
        /// The repeated label.
        label: String,
    },

    /// A label name contained characters other than alphanumerics, `_` and `.`.
    #[error("line {line}: invalid label `{label}`")]
    InvalidLabel {
        /// 1-based source line.
        line: usize,
        /// The rejected label.
        label: String,
    },

    /// A `.word` literal or `.string` body could not be parsed.
    #[error("line {line}: invalid data literal `{literal}`")]
    InvalidData {
        /// 1-based source line.
        line: usize,
        /// The rejected literal.
        literal: String,
    },

    /// A data directive appeared in the text section.
    #[error("line {line}: data directive outside of .data")]
    DataOutsideSection {
        /// 1-based source line.
        line: usize,
    },

    /// An instruction appeared in the data section.
    #[error("line {line}: instruction `{text}` inside .data")]
    InstructionInData {
        /// 1-based source line.
        line: usize,
        /// The offending text.
        text: String,
    },
}

/// Address space touched by an out-of-bounds access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressSpace {
    /// Word-addressed data memory.
    Data,
    /// Byte-addressed instruction memory (branch and jump targets).
    Instruction,
}

impl fmt::Display for AddressSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data => write!(f, "data"),
            Self::Instruction => write!(f, "instruction"),
        }
    }
}

/// Fatal simulation errors.
///
/// None of these are retried: the run halts at the first one. A misprediction
/// flush is ordinary control flow and never surfaces here.
#[derive(Debug, Error)]
pub enum SimError {
    /// The instruction in Decode could not be decoded.
    #[error("cycle {cycle}: cannot decode `{text}` at pc {pc}: {source}")]
    Decode {
        /// Cycle in which decoding failed.
        cycle: u64,
        /// Byte address of the instruction.
        pc: u32,
        /// Offending instruction text.
        text: String,
        /// Underlying decoder error.
        #[source]
        source: DecodeError,
    },

    /// An access fell outside data or instruction memory.
    #[error("cycle {cycle}: {space} address {addr} out of bounds (limit {limit})")]
    MemoryBounds {
        /// Cycle in which the access happened.
        cycle: u64,
        /// Which memory was accessed.
        space: AddressSpace,
        /// The effective address (word index for data, byte address for instructions).
        addr: i64,
        /// Exclusive upper bound of the address space.
        limit: i64,
    },

    /// A branch or jump target is missing from the symbol table.
    #[error("cycle {cycle}: unresolved label `{label}`")]
    UnresolvedLabel {
        /// Cycle in which resolution was attempted.
        cycle: u64,
        /// The missing label.
        label: String,
    },

    /// The cycle cap was reached before the pipeline drained.
    #[error("program did not terminate within {cycles} cycles")]
    NonTermination {
        /// The cap that was exceeded.
        cycles: u64,
    },

    /// The program could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),
}

impl SimError {
    /// Returns the cycle the error was raised in, if it is tied to one.
    pub const fn cycle(&self) -> Option<u64> {
        match self {
            Self::Decode { cycle, .. }
            | Self::MemoryBounds { cycle, .. }
            | Self::UnresolvedLabel { cycle, .. } => Some(*cycle),
            Self::NonTermination { cycles } => Some(*cycles),
            Self::Load(_) => None,
        }
    }
}
