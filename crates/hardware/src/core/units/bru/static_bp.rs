//! Static Branch Predictor.
//!
//! Implements the two fixed prediction policies: every predicted branch is
//! assumed taken, or every predicted branch is assumed to fall through. No
//! history is kept; only the accuracy counters change.

use super::branch_predictor::{BranchPredictor, PredictorStats};
use crate::config::BranchPredictorKind;

/// Fixed prediction direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Predict taken.
    AlwaysTaken,
    /// Predict not taken.
    AlwaysNotTaken,
}

/// Static Branch Predictor structure.
#[derive(Clone, Debug)]
pub struct StaticPredictor {
    strategy: Strategy,
    stats: PredictorStats,
}

impl StaticPredictor {
    /// Creates a predictor with the given strategy and zeroed counters.
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            stats: PredictorStats::default(),
        }
    }

    /// Builds the predictor selected by configuration, if any.
    pub fn from_kind(kind: BranchPredictorKind) -> Option<Self> {
        match kind {
            BranchPredictorKind::None => None,
            BranchPredictorKind::AlwaysTaken => Some(Self::new(Strategy::AlwaysTaken)),
            BranchPredictorKind::AlwaysNotTaken => Some(Self::new(Strategy::AlwaysNotTaken)),
        }
    }

    /// The configured strategy.
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }
}

impl BranchPredictor for StaticPredictor {
    fn predict(&mut self, _pc: u32) -> bool {
        self.stats.predictions += 1;
        self.strategy == Strategy::AlwaysTaken
    }

    fn update(&mut self, _pc: u32, _taken: bool, correct: bool) {
        if correct {
            self.stats.correct += 1;
        } else {
            self.stats.mispredictions += 1;
        }
    }

    fn stats(&self) -> PredictorStats {
        self.stats
    }
}
