//! Branch Predictor Interface.
//!
//! This module defines the `BranchPredictor` trait that prediction strategies
//! implement, and the counters every predictor keeps.

use serde::Serialize;

/// Running prediction counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PredictorStats {
    /// Predictions made at Decode.
    pub predictions: u64,
    /// Resolved branches whose predicted target matched the actual one.
    pub correct: u64,
    /// Resolved branches that required a flush.
    pub mispredictions: u64,
}

impl PredictorStats {
    /// Branches that reached Store. Predictions squashed by an older flush never resolve.
    pub const fn resolved(&self) -> u64 {
        self.correct + self.mispredictions
    }

    /// Percentage of resolved predictions that were correct, or 0 if none resolved.
    pub fn accuracy(&self) -> f64 {
        let resolved = self.resolved();
        if resolved == 0 {
            0.0
        } else {
            self.correct as f64 / resolved as f64 * 100.0
        }
    }
}

/// Trait for branch prediction strategies.
///
/// `predict` is called once per predicted branch when it enters Decode;
/// `update` is called once when that branch commits in Store.
pub trait BranchPredictor {
    /// Predicts the direction of the branch at `pc`.
    ///
    /// # Arguments
    ///
    /// * `pc` - Byte address of the branch instruction
    ///
    /// # Returns
    ///
    /// `true` if the branch is predicted taken.
    fn predict(&mut self, pc: u32) -> bool;

    /// Records the resolved outcome of a predicted branch.
    ///
    /// # Arguments
    ///
    /// * `pc` - Byte address of the branch instruction
    /// * `taken` - Whether the branch was actually taken
    /// * `correct` - Whether the predicted target matched the actual target
    fn update(&mut self, pc: u32, taken: bool, correct: bool);

    /// Returns the running counters.
    fn stats(&self) -> PredictorStats;
}
