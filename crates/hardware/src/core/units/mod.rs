//! Execution units and functional components.
//!
//! This module contains the units used by the Execute and Store stages: the
//! integer ALU and the branch unit with its predictor and speculation state.

/// Arithmetic Logic Unit for integer operations.
pub mod alu;

/// Branch unit: predictors and speculation tracking.
pub mod bru;
