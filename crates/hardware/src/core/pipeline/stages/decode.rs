//! Decode (ID) Stage.
//!
//! This module implements the second stage of the pipeline. It performs the following:
//! 1. **Instruction Decoding:** Parses the fetched text into an [`Instruction`],
//!    resolving `la` against the symbol table.
//! 2. **Branch Prediction:** Consults the predictor for `beq` and redirects fetch
//!    on a taken prediction, recording the outstanding speculation.
//! 3. **Speculation Limit:** Holds a second predicted branch in Fetch until the
//!    outstanding one commits.
//!
//! [`Instruction`]: crate::isa::instruction::Instruction

use tracing::{debug, info};

use crate::core::pipeline::engine::PipelineEngine;
use crate::core::pipeline::latches::{Fault, InFlight, Prediction};
use crate::core::pipeline::stage::{StageKind, StageSlot};
use crate::core::units::bru::BranchPredictor;
use crate::isa::decode::{decode, peek_opcode};
use crate::isa::instruction::{Instruction, Opcode};
use crate::trace::TraceEvent;

/// Moves a completed instruction from Fetch into a free Decode stage.
///
/// Text that does not decode, or an `la` naming a missing label, travels on
/// as a `nop` carrying a [`Fault`]. The fault is raised only if the
/// instruction commits, so a wrong-path instruction never ends the run.
pub fn decode_stage(engine: &mut PipelineEngine) {
    if !engine.decode.is_free() {
        return;
    }
    let Some(fetched) = engine.fetch.completed_instruction() else {
        return;
    };

    if engine.predictor.is_some()
        && engine.speculation.is_speculative()
        && peek_opcode(&fetched.text).is_some_and(Opcode::is_predicted)
    {
        let pc = fetched.pc;
        engine.stats.stalls_speculation += 1;
        engine.events.push(TraceEvent::SpeculationHold { pc });
        return;
    }

    let Some(StageSlot { mut entry, .. }) = engine.fetch.take_completed() else {
        return;
    };
    let cycle = engine.cycle;
    let inst = match decode(&entry.text, &engine.symbols) {
        Ok(inst) => inst,
        Err(source) => {
            debug!(cycle, pc = entry.pc, error = %source, "fault deferred to commit");
            entry.fault = Some(Fault::from(source));
            Instruction::nop()
        }
    };
    entry.opcode = entry.fault.is_none().then_some(inst.opcode);

    if inst.opcode.is_predicted() {
        predict(engine, &mut entry, &inst);
    }

    engine.log_transfer(StageKind::Decode, entry.pc, &entry.text);
    let _ = engine.decode.load(entry, inst);
}

/// Consults the predictor for a decoded `beq` and redirects fetch on a taken guess.
///
/// A taken guess whose target is unresolved or outside the program falls back
/// to not-taken; the real target is checked only if the branch commits taken.
fn predict(engine: &mut PipelineEngine, entry: &mut InFlight, inst: &Instruction) {
    let Some(guess) = engine.predictor.as_mut().map(|p| p.predict(entry.pc)) else {
        return;
    };
    let cycle = engine.cycle;
    let fallthrough = entry.pc + 4;
    let redirect = if guess {
        let resolved = match inst.target.as_ref() {
            Some(target) => engine.symbols.resolve(target, entry.pc).ok(),
            None => Some(i64::from(fallthrough)),
        };
        let valid = resolved.and_then(|t| engine.valid_target(t));
        if valid.is_none() {
            debug!(cycle, pc = entry.pc, "predicted target invalid, falling back to not-taken");
        }
        valid
    } else {
        None
    };
    let (taken, target) = match redirect {
        Some(target) => {
            engine.pc = target;
            (true, target)
        }
        None => (false, fallthrough),
    };
    engine.speculation.begin(entry.pc, target);
    engine.sync_prediction_stats();
    entry.prediction = Some(Prediction { taken, target });
    info!(cycle, pc = entry.pc, taken, target, "branch predicted");
    engine.events.push(TraceEvent::Prediction {
        pc: entry.pc,
        taken,
        target,
    });
}
