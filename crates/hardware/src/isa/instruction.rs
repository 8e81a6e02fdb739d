//! Decoded instruction representation.
//!
//! Provides the opcode set, the symbolic branch target, and the immutable
//! [`Instruction`] record produced by the decoder.

use std::fmt;

use serde::Serialize;

/// Supported opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Opcode {
    /// `rd = rs1 + rs2`
    Add,
    /// `rd = rs1 - rs2`
    Sub,
    /// `rd = rs1 & rs2`
    And,
    /// `rd = rs1 | rs2`
    Or,
    /// `rd = rs1 ^ rs2`
    Xor,
    /// `rd = (rs1 < rs2) ? 1 : 0`
    Slt,
    /// `rd = rs1 * rs2`
    Mul,
    /// `rd = rs1 / rs2`
    Div,
    /// `rd = rs1 + imm`
    Addi,
    /// `rd = mem[rs1 + imm]`
    Lw,
    /// `mem[rs1 + imm] = rs2`
    Sw,
    /// `rd = address(label)`
    La,
    /// Branch if `rs1 == rs2`
    Beq,
    /// Branch if `rs1 < rs2`
    Blt,
    /// `rd = pc + 4`, jump to target
    Jal,
    /// No operation
    Nop,
}

impl Opcode {
    /// Every opcode, in mnemonic table order.
    pub const ALL: [Self; 16] = [
        Self::Add,
        Self::Sub,
        Self::And,
        Self::Or,
        Self::Xor,
        Self::Slt,
        Self::Mul,
        Self::Div,
        Self::Addi,
        Self::Lw,
        Self::Sw,
        Self::La,
        Self::Beq,
        Self::Blt,
        Self::Jal,
        Self::Nop,
    ];

    /// Returns the assembly mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Slt => "slt",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Addi => "addi",
            Self::Lw => "lw",
            Self::Sw => "sw",
            Self::La => "la",
            Self::Beq => "beq",
            Self::Blt => "blt",
            Self::Jal => "jal",
            Self::Nop => "nop",
        }
    }

    /// Looks up an opcode by mnemonic (case-insensitive).
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        let lower = mnemonic.to_ascii_lowercase();
        Self::ALL.into_iter().find(|op| op.mnemonic() == lower)
    }

    /// Returns true for the three-register ALU forms.
    pub const fn is_register_alu(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Sub | Self::And | Self::Or | Self::Xor | Self::Slt | Self::Mul | Self::Div
        )
    }

    /// Returns true for conditional branches.
    pub const fn is_branch(self) -> bool {
        matches!(self, Self::Beq | Self::Blt)
    }

    /// Returns true if the branch predictor is consulted for this opcode.
    ///
    /// Only `beq` is predicted; `blt` always resolves at Store.
    pub const fn is_predicted(self) -> bool {
        matches!(self, Self::Beq)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Symbolic branch or jump target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Target {
    /// A text label, resolved against the symbol table.
    Label(String),
    /// A signed offset in instructions, relative to the branch itself.
    Offset(i32),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(label) => f.write_str(label),
            Self::Offset(offset) => write!(f, "{offset}"),
        }
    }
}

/// A decoded instruction. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instruction {
    /// Operation.
    pub opcode: Opcode,
    /// Destination register.
    pub rd: Option<usize>,
    /// First source register (base register for memory operations).
    pub rs1: Option<usize>,
    /// Second source register (stored value for `sw`).
    pub rs2: Option<usize>,
    /// Immediate, memory offset, or the resolved `la` address.
    pub imm: Option<i32>,
    /// Branch/jump target, or the label named by `la`.
    pub target: Option<Target>,
}

impl Instruction {
    /// The no-op, also used for stall bubbles.
    pub const fn nop() -> Self {
        Self {
            opcode: Opcode::Nop,
            rd: None,
            rs1: None,
            rs2: None,
            imm: None,
            target: None,
        }
    }

    /// Source registers read in `RegisterRead`, excluding `x0`.
    pub fn sources(&self) -> impl Iterator<Item = usize> + use<> {
        [self.rs1, self.rs2]
            .into_iter()
            .flatten()
            .filter(|&r| r != 0)
    }

    /// Register written at commit, excluding `x0`.
    pub fn dest(&self) -> Option<usize> {
        self.rd.filter(|&r| r != 0)
    }

    /// Returns true if `reg` is one of this instruction's (non-zero) sources.
    pub fn reads(&self, reg: usize) -> bool {
        self.sources().any(|r| r == reg)
    }
}

fn reg(idx: Option<usize>) -> String {
    idx.map_or_else(|| "x?".to_string(), |r| format!("x{r}"))
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.opcode;
        let imm = self.imm.unwrap_or(0);
        let target = self
            .target
            .as_ref()
            .map_or_else(|| "?".to_string(), ToString::to_string);
        match op {
            Opcode::Nop => write!(f, "nop"),
            _ if op.is_register_alu() => write!(
                f,
                "{op} {}, {}, {}",
                reg(self.rd),
                reg(self.rs1),
                reg(self.rs2)
            ),
            Opcode::Addi => write!(f, "addi {}, {}, {imm}", reg(self.rd), reg(self.rs1)),
            Opcode::Lw => write!(f, "lw {}, {imm}({})", reg(self.rd), reg(self.rs1)),
            Opcode::Sw => write!(f, "sw {}, {imm}({})", reg(self.rs2), reg(self.rs1)),
            Opcode::La => write!(f, "la {}, {target}", reg(self.rd)),
            Opcode::Beq | Opcode::Blt => {
                write!(f, "{op} {}, {}, {target}", reg(self.rs1), reg(self.rs2))
            }
            Opcode::Jal => write!(f, "jal {}, {target}", reg(self.rd)),
            _ => write!(f, "{op}"),
        }
    }
}
