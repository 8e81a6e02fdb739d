//! Register Read (RR) Stage.
//!
//! This module implements operand read. It performs the following:
//! 1. **Operand Read:** Reads source registers from the state as it was before
//!    this cycle's commit.
//! 2. **Stall Handling:** While a hazard is pending, holds the instruction in
//!    Decode and injects a bubble into a free `RegisterRead` stage.

use tracing::debug;

use crate::core::arch::RegisterFile;
use crate::core::pipeline::engine::PipelineEngine;
use crate::core::pipeline::hazards::Hazard;
use crate::core::pipeline::latches::{InFlight, Operands};
use crate::core::pipeline::stage::{StageKind, StageSlot};
use crate::isa::instruction::Instruction;
use crate::trace::TraceEvent;

/// Reads the source operands of `inst`.
///
/// Unused sources read as 0; `x0` always reads as 0.
pub fn read_operands(inst: Instruction, regs: &RegisterFile) -> Operands {
    let rs1_val = inst.rs1.map_or(0, |r| regs.read(r));
    let rs2_val = inst.rs2.map_or(0, |r| regs.read(r));
    Operands {
        inst,
        rs1_val,
        rs2_val,
    }
}

/// Moves a completed instruction from Decode into `RegisterRead`, or stalls.
///
/// # Arguments
///
/// * `engine` - The pipeline.
/// * `snapshot` - Register state before this cycle's commit.
/// * `hazard` - The dependency found at the start of the cycle, if any.
pub fn register_read_stage(
    engine: &mut PipelineEngine,
    snapshot: &RegisterFile,
    hazard: Option<Hazard>,
) {
    if let Some(hazard) = hazard {
        // A flush this cycle may already have removed the consumer.
        let Some(waiting_pc) = engine.decode.completed_instruction().map(|e| e.pc) else {
            return;
        };
        // A busy RegisterRead would hold the consumer anyway; only a bubble
        // cycle is charged to the hazard.
        let bubble = engine.register_read.is_free();
        if bubble {
            engine.stats.stalls_data += 1;
            let seq = engine.alloc_seq();
            let _ = engine
                .register_read
                .load(InFlight::bubble(seq, waiting_pc), Operands::bubble());
            engine.stats.bubbles_inserted += 1;
        }
        debug!(
            cycle = engine.cycle,
            pc = waiting_pc,
            reg = hazard.reg,
            producer = %hazard.producer,
            bubble,
            "data hazard stall"
        );
        engine.events.push(TraceEvent::Stall {
            reg: hazard.reg,
            producer: hazard.producer,
            bubble,
        });
        return;
    }

    if !engine.register_read.is_free() {
        return;
    }
    let Some(StageSlot { entry, payload }) = engine.decode.take_completed() else {
        return;
    };
    let operands = read_operands(payload, snapshot);
    engine.log_transfer(StageKind::RegisterRead, entry.pc, &entry.text);
    let _ = engine.register_read.load(entry, operands);
}
