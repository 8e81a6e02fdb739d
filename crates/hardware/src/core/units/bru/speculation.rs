//! Speculation Tracking.
//!
//! Records the single branch currently in flight on a predicted path. The
//! state is set when a branch is predicted in Decode and cleared when that
//! branch commits or any flush squashes it.

use serde::Serialize;

/// The outstanding prediction, if any.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SpeculationState {
    /// Address of the predicted branch.
    pub branch_pc: Option<u32>,
    /// Fetch address chosen by the prediction.
    pub predicted_target: Option<u32>,
}

impl SpeculationState {
    /// Returns true while a predicted branch is unresolved.
    pub const fn is_speculative(&self) -> bool {
        self.branch_pc.is_some()
    }

    /// Enters speculation for the branch at `branch_pc`.
    pub const fn begin(&mut self, branch_pc: u32, predicted_target: u32) {
        self.branch_pc = Some(branch_pc);
        self.predicted_target = Some(predicted_target);
    }

    /// Leaves speculation.
    pub const fn clear(&mut self) {
        self.branch_pc = None;
        self.predicted_target = None;
    }
}
