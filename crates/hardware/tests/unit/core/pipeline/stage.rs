//! Generic Stage Tests.
//!
//! Verifies occupancy, latency countdown, evacuation, and flushing of
//! `PipelineStage`.

use std::sync::Arc;

use pipesim_core::core::pipeline::latches::InFlight;
use pipesim_core::core::pipeline::traits::PipelineLatch;
use pipesim_core::core::pipeline::{PipelineStage, StageKind};
use pipesim_core::trace::StageStatus;

fn entry(pc: u32, text: &str) -> InFlight {
    InFlight::new(u64::from(pc), pc, Arc::from(text))
}

#[test]
fn zero_latency_is_treated_as_one() {
    let stage: PipelineStage<()> = PipelineStage::new(StageKind::Fetch, 0);
    assert_eq!(stage.base_latency(), 1);
}

#[test]
fn single_cycle_countdown() {
    let mut stage = PipelineStage::new(StageKind::Decode, 1);
    assert!(stage.is_free());
    assert!(stage.load(entry(0, "nop"), 7_u32));
    assert!(stage.is_busy());
    assert!(stage.completed_instruction().is_none());

    stage.tick();
    assert!(stage.is_complete());
    assert_eq!(stage.completed_instruction().map(|e| e.pc), Some(0));

    let slot = stage.take_completed().unwrap();
    assert_eq!(slot.payload, 7);
    assert!(stage.is_free());
}

#[test]
fn multi_cycle_latency() {
    let mut stage = PipelineStage::new(StageKind::Execute, 1);
    assert!(stage.load_with_latency(entry(4, "div x1, x2, x3"), (), 3));
    stage.tick();
    stage.tick();
    assert_eq!(stage.remaining(), 1);
    assert!(stage.take_completed().is_none());
    stage.tick();
    assert!(stage.take_completed().is_some());
}

#[test]
fn completed_instruction_waits_for_successor() {
    let mut stage = PipelineStage::new(StageKind::RegisterRead, 1);
    assert!(stage.load(entry(0, "nop"), ()));
    stage.tick();
    stage.tick();
    stage.tick();
    assert!(stage.is_complete());
    assert_eq!(stage.remaining(), 0);
}

#[test]
fn occupied_stage_rejects_load() {
    let mut stage = PipelineStage::new(StageKind::Store, 1);
    assert!(stage.load(entry(0, "nop"), ()));
    assert!(!stage.load(entry(4, "nop"), ()));
    assert_eq!(stage.entry().map(|e| e.pc), Some(0));
}

#[test]
fn flush_counts_only_program_instructions() {
    let mut stage = PipelineStage::new(StageKind::Execute, 1);
    assert!(stage.load(entry(0, "addi x1, x0, 1"), ()));
    assert_eq!(stage.flush(), 1);
    assert!(stage.is_empty());

    assert!(stage.load(InFlight::bubble(9, 0), ()));
    assert_eq!(stage.flush(), 0);
    assert_eq!(stage.flush(), 0);
}

#[test]
fn status_reports_text_and_remaining() {
    let mut stage = PipelineStage::new(StageKind::Fetch, 2);
    assert_eq!(stage.status(), StageStatus::Idle);
    assert!(stage.load(entry(0, "add x3, x1, x2"), ()));
    assert_eq!(
        stage.status(),
        StageStatus::Processing {
            text: "add x3, x1, x2".into(),
            remaining: 2,
            bubble: false,
        }
    );
    assert_eq!(
        stage.status().to_string(),
        "processing add x3, x1, x2 (2 cycles remaining)"
    );
}

#[test]
fn stage_names() {
    let names: Vec<String> = StageKind::ALL.iter().map(ToString::to_string).collect();
    assert_eq!(names, ["Fetch", "Decode", "RegisterRead", "Execute", "Store"]);
}
