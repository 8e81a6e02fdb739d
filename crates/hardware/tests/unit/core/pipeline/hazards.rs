//! Hazard Detection Tests.
//!
//! Exercises `find_hazard` and `detect` directly on hand-built stages.

use std::sync::Arc;

use pipesim_core::core::arch::SymbolTable;
use pipesim_core::core::pipeline::hazards::{Hazard, detect, find_hazard};
use pipesim_core::core::pipeline::latches::{CommitPackage, InFlight, Operands};
use pipesim_core::core::pipeline::{PipelineStage, StageKind};
use pipesim_core::isa::{Instruction, decode};

fn inst(text: &str) -> Instruction {
    decode(text, &SymbolTable::new()).unwrap()
}

fn entry() -> InFlight {
    InFlight::new(0, 0, Arc::from("x"))
}

#[test]
fn no_producers_no_hazard() {
    assert_eq!(find_hazard(&inst("add x3, x1, x2"), std::iter::empty()), None);
}

#[test]
fn youngest_conflicting_producer_reported() {
    let consumer = inst("add x3, x1, x2");
    let found = find_hazard(
        &consumer,
        [
            (StageKind::RegisterRead, Some(2)),
            (StageKind::Execute, Some(1)),
        ],
    );
    assert_eq!(
        found,
        Some(Hazard {
            reg: 2,
            producer: StageKind::RegisterRead
        })
    );
}

#[test]
fn x0_never_hazards() {
    let consumer = inst("add x3, x0, x0");
    assert_eq!(find_hazard(&consumer, [(StageKind::Execute, Some(0))]), None);
}

#[test]
fn store_value_register_is_a_source() {
    let consumer = inst("sw x5, 0(x6)");
    let found = find_hazard(&consumer, [(StageKind::Store, Some(5))]);
    assert_eq!(found.map(|h| h.reg), Some(5));
}

#[test]
fn detect_reads_every_downstream_stage() {
    let mut decode_stage = PipelineStage::new(StageKind::Decode, 1);
    let rr: PipelineStage<Operands> = PipelineStage::new(StageKind::RegisterRead, 1);
    let ex: PipelineStage<CommitPackage> = PipelineStage::new(StageKind::Execute, 1);
    let mut st: PipelineStage<CommitPackage> = PipelineStage::new(StageKind::Store, 1);

    assert_eq!(detect(&decode_stage, &rr, &ex, &st), None);

    assert!(decode_stage.load(entry(), inst("addi x4, x7, 1")));
    assert_eq!(detect(&decode_stage, &rr, &ex, &st), None);

    assert!(st.load(entry(), CommitPackage::Load { rd: 7, addr: 0 }));
    assert_eq!(
        detect(&decode_stage, &rr, &ex, &st),
        Some(Hazard {
            reg: 7,
            producer: StageKind::Store
        })
    );
}

#[test]
fn memory_writes_and_branches_produce_nothing() {
    let mut decode_stage = PipelineStage::new(StageKind::Decode, 1);
    let rr: PipelineStage<Operands> = PipelineStage::new(StageKind::RegisterRead, 1);
    let mut ex: PipelineStage<CommitPackage> = PipelineStage::new(StageKind::Execute, 1);
    let mut st: PipelineStage<CommitPackage> = PipelineStage::new(StageKind::Store, 1);
    assert!(decode_stage.load(entry(), inst("add x1, x2, x3")));
    assert!(ex.load(entry(), CommitPackage::MemWrite { addr: 2, value: 1 }));
    assert!(st.load(entry(), CommitPackage::Branch { taken: true, target: 0 }));
    assert_eq!(detect(&decode_stage, &rr, &ex, &st), None);
}
