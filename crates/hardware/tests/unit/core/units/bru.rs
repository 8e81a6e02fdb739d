//! Branch Unit Tests.
//!
//! Verifies the static predictor's fixed direction and accuracy counters,
//! and the speculation state's begin/clear lifecycle.

use pipesim_core::config::BranchPredictorKind;
use pipesim_core::core::units::bru::{
    BranchPredictor, PredictorStats, SpeculationState, StaticPredictor, Strategy,
};

#[test]
fn always_taken_predicts_taken() {
    let mut bp = StaticPredictor::new(Strategy::AlwaysTaken);
    assert!(bp.predict(0));
    assert!(bp.predict(64));
    assert_eq!(bp.stats().predictions, 2);
}

#[test]
fn always_not_taken_ignores_outcomes() {
    let mut bp = StaticPredictor::new(Strategy::AlwaysNotTaken);
    for _ in 0..4 {
        bp.update(8, true, false);
    }
    assert!(!bp.predict(8));
}

#[test]
fn accuracy_counts_resolved_predictions() {
    let mut bp = StaticPredictor::new(Strategy::AlwaysTaken);
    for _ in 0..4 {
        let _ = bp.predict(0);
    }
    bp.update(0, true, true);
    bp.update(0, true, true);
    bp.update(0, true, true);
    bp.update(0, false, false);
    let stats = bp.stats();
    assert_eq!(stats.correct, 3);
    assert_eq!(stats.mispredictions, 1);
    assert_eq!(stats.resolved(), 4);
    assert!((stats.accuracy() - 75.0).abs() < f64::EPSILON);
}

#[test]
fn accuracy_without_resolutions_is_zero() {
    assert!(PredictorStats::default().accuracy().abs() < f64::EPSILON);
}

#[test]
fn from_kind() {
    assert!(StaticPredictor::from_kind(BranchPredictorKind::None).is_none());
    assert_eq!(
        StaticPredictor::from_kind(BranchPredictorKind::AlwaysTaken).map(|p| p.strategy()),
        Some(Strategy::AlwaysTaken)
    );
    assert_eq!(
        StaticPredictor::from_kind(BranchPredictorKind::AlwaysNotTaken).map(|p| p.strategy()),
        Some(Strategy::AlwaysNotTaken)
    );
}

#[test]
fn speculation_lifecycle() {
    let mut spec = SpeculationState::default();
    assert!(!spec.is_speculative());
    spec.begin(8, 20);
    assert!(spec.is_speculative());
    assert_eq!(spec.branch_pc, Some(8));
    assert_eq!(spec.predicted_target, Some(20));
    spec.clear();
    assert_eq!(spec, SpeculationState::default());
}
