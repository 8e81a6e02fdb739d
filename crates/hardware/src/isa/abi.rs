//! Register name constants and ABI alias resolution.
//!
//! Defines the register indices used by name in the simulator and maps
//! textual register operands (`x7`, `t2`, `zero`) to indices.

use crate::common::NUM_REGS;

/// Register x0 (zero register, always zero).
pub const REG_ZERO: usize = 0;
/// Register x1 (return address, ra).
pub const REG_RA: usize = 1;
/// Register x2 (stack pointer, sp).
pub const REG_SP: usize = 2;
/// Register x10 (first argument/return value, a0).
pub const REG_A0: usize = 10;

/// ABI names indexed by register number.
pub const ABI_NAMES: [&str; NUM_REGS] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// Resolves a register operand to its index.
///
/// Accepts the architectural form `x0`..`x31`, the ABI aliases, and `fp`
/// as an alias of `s0`. Matching is case-insensitive.
///
/// # Returns
///
/// The register index, or `None` if the name is not a register.
pub fn parse_register(name: &str) -> Option<usize> {
    let name = name.trim().to_ascii_lowercase();
    if let Some(num) = name.strip_prefix('x') {
        if num.is_empty() || (num.len() > 1 && num.starts_with('0')) {
            return None;
        }
        return num.parse::<usize>().ok().filter(|&idx| idx < NUM_REGS);
    }
    if name == "fp" {
        return Some(8);
    }
    ABI_NAMES.iter().position(|&abi| abi == name)
}

/// Returns the ABI name of register `idx` (`"zero"`, `"ra"`, ...).
pub fn abi_name(idx: usize) -> &'static str {
    ABI_NAMES.get(idx).copied().unwrap_or("?")
}
