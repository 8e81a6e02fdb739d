//! Store (Commit) Stage.
//!
//! This module implements the final stage of the pipeline. It performs the following:
//! 1. **Admission:** Moves a completed instruction from Execute into Store.
//! 2. **Commit:** Applies the commit package computed in Execute (register write,
//!    memory write, or load-then-write), or raises the fault the instruction carries.
//!    No computation happens here.
//! 3. **Control Resolution:** Checks predicted branches against their outcome,
//!    flushes and redirects on a misprediction, a taken unpredicted branch, or `jal`.

use tracing::{debug, info};

use crate::common::SimError;
use crate::core::pipeline::engine::PipelineEngine;
use crate::core::pipeline::latches::{CommitPackage, InFlight};
use crate::core::pipeline::stage::{StageKind, StageSlot};
use crate::core::units::bru::BranchPredictor;
use crate::trace::{CommitRecord, FlushCause, TraceEvent, WriteEffect};

/// Moves a completed instruction from Execute into a free Store stage.
pub fn store_stage(engine: &mut PipelineEngine) {
    if !engine.store.is_free() {
        return;
    }
    let Some(StageSlot { entry, payload }) = engine.execute.take_completed() else {
        return;
    };
    engine.log_transfer(StageKind::Store, entry.pc, &entry.text);
    let _ = engine.store.load(entry, payload);
}

/// Commits the instruction in Store, if its latency has elapsed.
///
/// # Returns
///
/// The commit record for the trace, or `None` if nothing committed.
///
/// # Errors
///
/// Returns the [`Fault`] carried by the committing instruction, or
/// [`SimError::MemoryBounds`] for an out-of-range load, store, or redirect target.
///
/// [`Fault`]: crate::core::pipeline::latches::Fault
pub fn commit_stage(engine: &mut PipelineEngine) -> Result<Option<CommitRecord>, SimError> {
    let Some(StageSlot { mut entry, payload }) = engine.store.take_completed() else {
        return Ok(None);
    };
    let cycle = engine.cycle;
    if let Some(fault) = entry.fault.take() {
        return Err(fault.raise(cycle, &entry));
    }

    let write = match payload {
        CommitPackage::Nop => None,
        CommitPackage::RegWrite { rd, value } => write_reg(engine, rd, value),
        CommitPackage::MemWrite { addr, value } => {
            engine
                .memory
                .write(addr, value)
                .map_err(|fault| fault.at(cycle))?;
            Some(WriteEffect::Memory { addr, value })
        }
        CommitPackage::Load { rd, addr } => {
            let value = engine.memory.read(addr).map_err(|fault| fault.at(cycle))?;
            write_reg(engine, rd, value)
        }
        CommitPackage::Branch { taken, target } => {
            resolve_branch(engine, &entry, taken, target)?;
            None
        }
        CommitPackage::Jump { rd, link, target } => {
            let target = engine.check_target(target)?;
            let write = write_reg(engine, rd, link);
            engine.flush_and_redirect(FlushCause::Jump, target);
            write
        }
    };

    if entry.bubble {
        engine.stats.bubbles_retired += 1;
    } else if let Some(op) = entry.opcode {
        engine.stats.record_retire(op);
    }
    debug!(cycle, pc = entry.pc, inst = &*entry.text, "commit");

    Ok(Some(CommitRecord {
        pc: entry.pc,
        text: entry.text.to_string(),
        bubble: entry.bubble,
        write,
    }))
}

fn write_reg(engine: &mut PipelineEngine, rd: usize, value: i32) -> Option<WriteEffect> {
    engine.regs.write(rd, value);
    (rd != 0).then_some(WriteEffect::Register { reg: rd, value })
}

/// Resolves a conditional branch at commit.
///
/// A predicted branch is checked against its predicted target; a mismatch
/// flushes and redirects. An unpredicted branch flushes only when taken.
fn resolve_branch(
    engine: &mut PipelineEngine,
    entry: &InFlight,
    taken: bool,
    target: i64,
) -> Result<(), SimError> {
    engine.stats.branches += 1;
    if taken {
        engine.stats.branches_taken += 1;
    }
    let actual = if taken {
        target
    } else {
        i64::from(entry.pc) + 4
    };

    match entry.prediction {
        Some(prediction) => {
            let correct = actual == i64::from(prediction.target);
            if let Some(predictor) = engine.predictor.as_mut() {
                predictor.update(entry.pc, taken, correct);
            }
            engine.sync_prediction_stats();
            engine.speculation.clear();
            if correct {
                engine
                    .events
                    .push(TraceEvent::PredictionCorrect { pc: entry.pc });
            } else {
                let redirect = engine.check_target(actual)?;
                info!(
                    cycle = engine.cycle,
                    pc = entry.pc,
                    predicted = prediction.target,
                    actual = redirect,
                    "branch mispredicted"
                );
                engine.flush_and_redirect(FlushCause::Misprediction, redirect);
            }
        }
        None if taken => {
            let redirect = engine.check_target(actual)?;
            engine.flush_and_redirect(FlushCause::TakenBranch, redirect);
        }
        None => {}
    }
    Ok(())
}
