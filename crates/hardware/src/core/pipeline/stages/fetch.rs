//! Instruction Fetch (IF) Stage.
//!
//! This module implements the first stage of the pipeline. It performs the following:
//! 1. **Admission:** Loads the instruction at the fetch PC into a free Fetch stage.
//! 2. **PC Advance:** Moves the fetch PC to the next sequential instruction.
//!
//! Redirects (predictions at Decode, flushes at Store) happen earlier in the
//! cycle, so admission always fetches from the corrected PC.

use crate::core::pipeline::engine::PipelineEngine;
use crate::core::pipeline::latches::InFlight;
use crate::core::pipeline::stage::StageKind;
use crate::common::INSTRUCTION_BYTES;

/// Fetches the next instruction if Fetch is free and the PC is inside the program.
pub fn fetch_stage(engine: &mut PipelineEngine) {
    if !engine.fetch.is_free() {
        return;
    }
    let pc = engine.pc;
    let Some(text) = engine.line_at(pc) else {
        return;
    };
    let seq = engine.alloc_seq();
    engine.log_transfer(StageKind::Fetch, pc, &text);
    let _ = engine.fetch.load(InFlight::new(seq, pc, text), ());
    engine.pc = pc + INSTRUCTION_BYTES;
}
