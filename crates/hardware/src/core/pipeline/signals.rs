//! Pipeline control signals and operation types.
//!
//! This module defines the signals that control instruction execution. It performs:
//! 1. **Operation Classification:** Maps each opcode to its ALU operation.
//! 2. **Operand Selection:** Defines sources for ALU inputs (registers, zero, or immediates).
//! 3. **Commit Control:** Flags register writes, memory access, and control transfers.

use crate::isa::instruction::Opcode;

/// ALU operation types.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AluOp {
    /// Integer addition (also address generation).
    #[default]
    Add,
    /// Integer subtraction.
    Sub,
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
    /// Set less than (signed).
    Slt,
    /// Integer multiply (low 32 bits).
    Mul,
    /// Integer divide (signed).
    Div,
}

/// Source of ALU operand A.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OpASrc {
    /// Value of `rs1`.
    #[default]
    Reg1,
    /// Constant zero.
    Zero,
}

/// Source of ALU operand B.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OpBSrc {
    /// Value of `rs2`.
    #[default]
    Reg2,
    /// Sign-extended immediate.
    Imm,
}

/// Condition tested by a conditional branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchCond {
    /// Taken when `rs1 == rs2`.
    Eq,
    /// Taken when `rs1 < rs2` (signed).
    Lt,
}

/// Control signals derived from an opcode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlSignals {
    /// Enable write to the destination register.
    pub reg_write: bool,
    /// Enable memory read operation (load).
    pub mem_read: bool,
    /// Enable memory write operation (store).
    pub mem_write: bool,
    /// Conditional branch and its condition.
    pub branch: Option<BranchCond>,
    /// Instruction is an unconditional jump.
    pub jump: bool,
    /// ALU operation to perform.
    pub alu: AluOp,
    /// Source selection for ALU operand A.
    pub a_src: OpASrc,
    /// Source selection for ALU operand B.
    pub b_src: OpBSrc,
}

impl ControlSignals {
    /// Generates the control signals for `op`.
    pub const fn for_opcode(op: Opcode) -> Self {
        let mut sig = Self {
            reg_write: false,
            mem_read: false,
            mem_write: false,
            branch: None,
            jump: false,
            alu: AluOp::Add,
            a_src: OpASrc::Reg1,
            b_src: OpBSrc::Reg2,
        };
        match op {
            Opcode::Add => sig.reg_write = true,
            Opcode::Sub => {
                sig.reg_write = true;
                sig.alu = AluOp::Sub;
            }
            Opcode::And => {
                sig.reg_write = true;
                sig.alu = AluOp::And;
            }
            Opcode::Or => {
                sig.reg_write = true;
                sig.alu = AluOp::Or;
            }
            Opcode::Xor => {
                sig.reg_write = true;
                sig.alu = AluOp::Xor;
            }
            Opcode::Slt => {
                sig.reg_write = true;
                sig.alu = AluOp::Slt;
            }
            Opcode::Mul => {
                sig.reg_write = true;
                sig.alu = AluOp::Mul;
            }
            Opcode::Div => {
                sig.reg_write = true;
                sig.alu = AluOp::Div;
            }
            Opcode::Addi => {
                sig.reg_write = true;
                sig.b_src = OpBSrc::Imm;
            }
            Opcode::La => {
                sig.reg_write = true;
                sig.a_src = OpASrc::Zero;
                sig.b_src = OpBSrc::Imm;
            }
            Opcode::Lw => {
                sig.reg_write = true;
                sig.mem_read = true;
                sig.b_src = OpBSrc::Imm;
            }
            Opcode::Sw => {
                sig.mem_write = true;
                sig.b_src = OpBSrc::Imm;
            }
            Opcode::Beq => {
                sig.branch = Some(BranchCond::Eq);
                sig.alu = AluOp::Sub;
            }
            Opcode::Blt => {
                sig.branch = Some(BranchCond::Lt);
                sig.alu = AluOp::Slt;
            }
            Opcode::Jal => {
                sig.reg_write = true;
                sig.jump = true;
            }
            Opcode::Nop => {}
        }
        sig
    }
}
