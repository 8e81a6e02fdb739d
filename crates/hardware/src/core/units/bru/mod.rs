//! Branch unit implementations.
//!
//! This module contains the branch predictor interface, the static
//! always-taken / always-not-taken predictor, and the speculation state that
//! ties an outstanding prediction to its branch.

pub use self::branch_predictor::{BranchPredictor, PredictorStats};
pub use self::speculation::SpeculationState;
pub use self::static_bp::{StaticPredictor, Strategy};

/// Branch predictor trait and counters.
pub mod branch_predictor;

/// Outstanding-prediction bookkeeping.
pub mod speculation;

/// Static branch predictor (always taken / always not taken).
pub mod static_bp;
