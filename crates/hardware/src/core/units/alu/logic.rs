//! ALU logical and comparison operations.

use crate::core::pipeline::signals::AluOp;

/// Executes a bitwise or comparison operation.
///
/// `Slt` yields 1 when `a < b` as signed integers, else 0. Returns `0` for
/// non-logic opcodes.
pub const fn execute(op: AluOp, a: i32, b: i32) -> i32 {
    match op {
        AluOp::Or => a | b,
        AluOp::And => a & b,
        AluOp::Xor => a ^ b,
        AluOp::Slt => (a < b) as i32,
        _ => 0,
    }
}
