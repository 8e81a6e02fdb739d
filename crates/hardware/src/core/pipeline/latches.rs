//! Pipeline payload structures for inter-stage communication.
//!
//! This module defines what each stage hands to its successor:
//! Fetch -> Decode -> `RegisterRead` -> Execute -> Store.
//!
//! 1. **Instruction Identity:** [`InFlight`] travels with an instruction through every stage.
//! 2. **Operands:** [`Operands`] carries register values read in `RegisterRead`.
//! 3. **Commit Packages:** [`CommitPackage`] carries the deferred effect applied in Store.
//! 4. **Faults:** [`Fault`] rides with an instruction that cannot execute and is
//!    raised only if that instruction reaches commit.

use std::sync::Arc;

use crate::common::{DecodeError, SimError};
use crate::core::pipeline::traits::RegisterWriter;
use crate::isa::instruction::{Instruction, Opcode};

/// Branch prediction attached to a `beq` at Decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Prediction {
    /// Predicted direction.
    pub taken: bool,
    /// Fetch address chosen by the prediction.
    pub target: u32,
}

/// Identity of an instruction in flight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InFlight {
    /// Fetch order; bubbles take a sequence number too.
    pub seq: u64,
    /// Byte address (bubbles carry the address of the instruction they delay).
    pub pc: u32,
    /// Source text as fetched.
    pub text: Arc<str>,
    /// True for a stall bubble.
    pub bubble: bool,
    /// Opcode, known once the instruction has been decoded.
    pub opcode: Option<Opcode>,
    /// Prediction made at Decode, for predicted branches.
    pub prediction: Option<Prediction>,
    /// Deferred fault; a flush discards it with the instruction.
    pub fault: Option<Fault>,
}

impl InFlight {
    /// A fetched program instruction.
    pub const fn new(seq: u64, pc: u32, text: Arc<str>) -> Self {
        Self {
            seq,
            pc,
            text,
            bubble: false,
            opcode: None,
            prediction: None,
            fault: None,
        }
    }

    /// A stall bubble standing in front of the instruction at `pc`.
    pub fn bubble(seq: u64, pc: u32) -> Self {
        Self {
            seq,
            pc,
            text: Arc::from("nop"),
            bubble: true,
            opcode: Some(Opcode::Nop),
            prediction: None,
            fault: None,
        }
    }
}

/// Why an in-flight instruction cannot take effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fault {
    /// The fetched text is not a valid instruction.
    Decode(DecodeError),
    /// A label operand names no label.
    UnresolvedLabel(String),
}

impl From<DecodeError> for Fault {
    fn from(source: DecodeError) -> Self {
        match source {
            DecodeError::UnresolvedLabel(label) => Self::UnresolvedLabel(label),
            source => Self::Decode(source),
        }
    }
}

impl Fault {
    /// The error reported when the faulting instruction commits at `cycle`.
    pub fn raise(self, cycle: u64, entry: &InFlight) -> SimError {
        match self {
            Self::Decode(source) => SimError::Decode {
                cycle,
                pc: entry.pc,
                text: entry.text.to_string(),
                source,
            },
            Self::UnresolvedLabel(label) => SimError::UnresolvedLabel { cycle, label },
        }
    }
}

/// `RegisterRead` output: the instruction with its source values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operands {
    /// The decoded instruction.
    pub inst: Instruction,
    /// Value of `rs1` (0 if unused).
    pub rs1_val: i32,
    /// Value of `rs2` (0 if unused).
    pub rs2_val: i32,
}

impl Operands {
    /// Operands of a stall bubble.
    pub const fn bubble() -> Self {
        Self {
            inst: Instruction::nop(),
            rs1_val: 0,
            rs2_val: 0,
        }
    }
}

/// Effect computed in Execute and applied, without further computation, in Store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommitPackage {
    /// No architectural effect (`nop`, bubbles).
    Nop,
    /// Write `value` to `rd`.
    RegWrite {
        /// Destination register.
        rd: usize,
        /// Result.
        value: i32,
    },
    /// Write `value` to data memory.
    MemWrite {
        /// Word address.
        addr: i64,
        /// Value of `rs2`.
        value: i32,
    },
    /// Read data memory at commit and write the word to `rd`.
    Load {
        /// Destination register.
        rd: usize,
        /// Word address.
        addr: i64,
    },
    /// Conditional branch outcome.
    Branch {
        /// Condition result.
        taken: bool,
        /// Resolved taken-path target (byte address).
        target: i64,
    },
    /// Unconditional jump.
    Jump {
        /// Link register.
        rd: usize,
        /// Return address (`pc + 4`).
        link: i32,
        /// Resolved target (byte address).
        target: i64,
    },
}

impl RegisterWriter for Instruction {
    fn dest_reg(&self) -> Option<usize> {
        self.dest()
    }
}

impl RegisterWriter for Operands {
    fn dest_reg(&self) -> Option<usize> {
        self.inst.dest()
    }
}

impl RegisterWriter for CommitPackage {
    fn dest_reg(&self) -> Option<usize> {
        match self {
            Self::RegWrite { rd, .. } | Self::Load { rd, .. } | Self::Jump { rd, .. } => {
                Some(*rd).filter(|&r| r != 0)
            }
            Self::Nop | Self::MemWrite { .. } | Self::Branch { .. } => None,
        }
    }
}
