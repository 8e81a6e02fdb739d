//! General-Purpose Register File.
//!
//! This module implements the 32-entry integer register file. It performs the following:
//! 1. **Storage:** Maintains 32 signed 32-bit registers (`x0`-`x31`).
//! 2. **Invariant Enforcement:** Ensures that register `x0` is hardwired to zero.
//! 3. **Debugging:** Provides utilities for dumping the complete register state.

use std::io::{self, Write};

use serde::Serialize;

use crate::common::NUM_REGS;
use crate::isa::abi;

/// General-purpose register file.
///
/// Register `x0` is hardwired to zero: reads return 0 and writes are dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RegisterFile {
    regs: [i32; NUM_REGS],
}

impl RegisterFile {
    /// Creates a register file with every register set to zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a register.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    ///
    /// # Returns
    ///
    /// The stored value. Register `x0` always returns 0.
    pub fn read(&self, idx: usize) -> i32 {
        if idx == 0 { 0 } else { self.regs[idx] }
    }

    /// Writes a register. Writes to `x0` are ignored.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31).
    /// * `val` - The value to write.
    pub fn write(&mut self, idx: usize, val: i32) {
        if idx != 0 {
            self.regs[idx] = val;
        }
    }

    /// Returns a copy of all 32 registers.
    pub const fn snapshot(&self) -> [i32; NUM_REGS] {
        self.regs
    }

    /// Writes every register as `xN (abi) = value`, two per line.
    ///
    /// # Errors
    ///
    /// Propagates write failures from `out`.
    pub fn dump<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for i in (0..NUM_REGS).step_by(2) {
            writeln!(
                out,
                "x{:<2} ({:>4}) = {:<12} x{:<2} ({:>4}) = {}",
                i,
                abi::abi_name(i),
                self.regs[i],
                i + 1,
                abi::abi_name(i + 1),
                self.regs[i + 1]
            )?;
        }
        Ok(())
    }
}
