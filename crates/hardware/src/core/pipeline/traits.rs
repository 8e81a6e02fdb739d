//! Pipeline Latch and Producer Interfaces.
//!
//! This module defines the common traits for pipeline components. It provides:
//! 1. **Pipeline Latch Interface:** Flushing and emptiness checks shared by all stages.
//! 2. **Register Writer Interface:** Lets the hazard check ask any payload which register it will write.

/// Represents a pipeline latch (a stage's held instruction).
pub trait PipelineLatch {
    /// Clears the latch.
    ///
    /// Called when a branch misprediction or jump redirects fetch.
    ///
    /// # Returns
    ///
    /// The number of program instructions discarded (bubbles are not counted).
    fn flush(&mut self) -> usize;

    /// Checks if the latch is empty.
    ///
    /// # Returns
    ///
    /// `true` if no instruction is held, `false` otherwise.
    fn is_empty(&self) -> bool;
}

/// A payload that may write a register when it commits.
pub trait RegisterWriter {
    /// The register written at commit, excluding `x0`.
    fn dest_reg(&self) -> Option<usize>;
}
