//! Word-Addressed Data Memory.
//!
//! This module implements the fixed-size data memory. It provides:
//! 1. **Storage:** A flat array of signed 32-bit words, indexed by word address.
//! 2. **Bounds Checking:** Every access outside the array is reported, never clamped.
//! 3. **Dumping:** The `[index] -> value` listing consumed by external viewers.

use std::io::{self, Write};

use crate::common::{AddressSpace, SimError};

/// An access outside data memory, before it is tagged with a cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutOfBounds {
    /// The requested word address.
    pub addr: i64,
    /// Number of words in memory.
    pub limit: i64,
}

impl OutOfBounds {
    /// Converts the fault into a fatal error raised in `cycle`.
    pub const fn at(self, cycle: u64) -> SimError {
        SimError::MemoryBounds {
            cycle,
            space: AddressSpace::Data,
            addr: self.addr,
            limit: self.limit,
        }
    }
}

/// Data memory of `i32` words.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataMemory {
    words: Vec<i32>,
}

impl DataMemory {
    /// Creates a zero-filled memory of `size` words.
    pub fn new(size: usize) -> Self {
        Self {
            words: vec![0; size],
        }
    }

    /// Creates a memory of `size` words with `image` copied to address 0.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfBounds`] if the image does not fit.
    pub fn with_image(size: usize, image: &[i32]) -> Result<Self, OutOfBounds> {
        if image.len() > size {
            return Err(OutOfBounds {
                addr: image.len() as i64 - 1,
                limit: size as i64,
            });
        }
        let mut mem = Self::new(size);
        mem.words[..image.len()].copy_from_slice(image);
        Ok(mem)
    }

    fn index(&self, addr: i64) -> Result<usize, OutOfBounds> {
        usize::try_from(addr)
            .ok()
            .filter(|&idx| idx < self.words.len())
            .ok_or(OutOfBounds {
                addr,
                limit: self.words.len() as i64,
            })
    }

    /// Reads the word at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfBounds`] if `addr` is negative or past the end.
    pub fn read(&self, addr: i64) -> Result<i32, OutOfBounds> {
        self.index(addr).map(|idx| self.words[idx])
    }

    /// Writes `val` to the word at `addr`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfBounds`] if `addr` is negative or past the end.
    pub fn write(&mut self, addr: i64, val: i32) -> Result<(), OutOfBounds> {
        let idx = self.index(addr)?;
        self.words[idx] = val;
        Ok(())
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns true for a zero-sized memory.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// All words, in address order.
    pub fn as_slice(&self) -> &[i32] {
        &self.words
    }

    /// Writes every word as `[NNN] -> value`, one per line.
    ///
    /// # Errors
    ///
    /// Propagates write failures from `out`.
    pub fn dump<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (idx, word) in self.words.iter().enumerate() {
            writeln!(out, "[{idx:03}] -> {word}")?;
        }
        Ok(())
    }
}
