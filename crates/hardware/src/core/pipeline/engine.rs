//! Pipeline Engine.
//!
//! This module owns the complete machine state and advances it one cycle at a
//! time. It provides:
//! 1. **State Ownership:** Five stages, registers, data memory, symbols, predictor, and speculation.
//! 2. **Clocking:** [`PipelineEngine::tick`] runs the fixed per-cycle order below.
//! 3. **Flush and Redirect:** Shared control-flow correction used by Store.
//! 4. **Observation:** Per-cycle trace records and the final architectural state.
//!
//! # Cycle order
//!
//! 1. Hazard check on the instruction in Decode (pre-commit state).
//! 2. Every stage's latency counter advances.
//! 3. Store commits its completed instruction.
//! 4. Execute -> Store.
//! 5. `RegisterRead` -> Execute (ALU dispatch).
//! 6. Decode -> `RegisterRead` (operand read), or a stall bubble.
//! 7. Fetch -> Decode (decode, branch prediction).
//! 8. Fetch admission at the fetch PC.
//! 9. Cycle counter increments; the trace record is emitted.
//!
//! Transfers run from Store back to Fetch so a stage vacated this cycle is
//! refilled by its predecessor in the same cycle.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::common::{AddressSpace, INSTRUCTION_BYTES, SimError};
use crate::config::{Config, LatencyConfig};
use crate::core::arch::{DataMemory, RegisterFile, SymbolTable};
use crate::core::pipeline::hazards;
use crate::core::pipeline::latches::{CommitPackage, Operands};
use crate::core::pipeline::stage::{PipelineStage, StageKind};
use crate::core::pipeline::stages;
use crate::core::pipeline::traits::PipelineLatch;
use crate::core::units::bru::{BranchPredictor, PredictorStats, SpeculationState, StaticPredictor};
use crate::isa::instruction::Instruction;
use crate::sim::loader::Program;
use crate::stats::SimStats;
use crate::trace::{CycleRecord, FlushCause, StageStatus, TraceEvent, TraceSink};

/// Architectural state at the end of a run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FinalState {
    /// All 32 registers.
    pub registers: [i32; 32],
    /// All data memory words.
    pub memory: Vec<i32>,
    /// Run statistics.
    pub stats: SimStats,
    /// Predictor counters when a predictor was active.
    pub predictor: Option<PredictorStats>,
}

/// The cycle-level pipeline: sole owner of all mutable simulation state.
#[derive(Debug)]
pub struct PipelineEngine {
    pub(crate) lines: Vec<Arc<str>>,
    pub(crate) symbols: SymbolTable,
    pub(crate) regs: RegisterFile,
    pub(crate) memory: DataMemory,
    pub(crate) predictor: Option<StaticPredictor>,
    pub(crate) speculation: SpeculationState,
    pub(crate) hazard_control: bool,
    pub(crate) latency: LatencyConfig,

    pub(crate) fetch: PipelineStage<()>,
    pub(crate) decode: PipelineStage<Instruction>,
    pub(crate) register_read: PipelineStage<Operands>,
    pub(crate) execute: PipelineStage<CommitPackage>,
    pub(crate) store: PipelineStage<CommitPackage>,

    pub(crate) pc: u32,
    pub(crate) cycle: u64,
    pub(crate) next_seq: u64,
    pub(crate) stats: SimStats,
    pub(crate) events: Vec<TraceEvent>,
}

impl PipelineEngine {
    /// Builds an engine for `program`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MemoryBounds`] if the program's data image does
    /// not fit in the configured data memory.
    pub fn new(program: &Program, config: &Config) -> Result<Self, SimError> {
        let memory = DataMemory::with_image(config.memory.data_words, &program.data)
            .map_err(|fault| fault.at(0))?;
        let predictor = StaticPredictor::from_kind(config.pipeline.branch_predictor);
        let latency = config.latency.clone();
        let stats = SimStats {
            prediction: predictor.as_ref().map(BranchPredictor::stats),
            ..SimStats::default()
        };

        Ok(Self {
            lines: program.lines.iter().map(|l| Arc::from(l.as_str())).collect(),
            symbols: program.symbols.clone(),
            regs: RegisterFile::new(),
            memory,
            predictor,
            speculation: SpeculationState::default(),
            hazard_control: config.pipeline.hazard_control,
            fetch: PipelineStage::new(StageKind::Fetch, latency.fetch),
            decode: PipelineStage::new(StageKind::Decode, latency.decode),
            register_read: PipelineStage::new(StageKind::RegisterRead, latency.register_read),
            // Execute latency is per opcode; the base is only used for bubbles.
            execute: PipelineStage::new(StageKind::Execute, latency.execute.nop),
            store: PipelineStage::new(StageKind::Store, latency.store),
            latency,
            pc: 0,
            cycle: 0,
            next_seq: 0,
            stats,
            events: Vec::new(),
        })
    }

    /// Runs one clock cycle and emits its trace record.
    ///
    /// # Errors
    ///
    /// Returns the fault of the instruction committing this cycle: a decode
    /// error or unresolved label carried from earlier stages, or an
    /// out-of-range memory access or redirect. Faults of flushed instructions
    /// are never raised. The record for the failing cycle is not emitted.
    pub fn tick(&mut self, sink: &mut dyn TraceSink) -> Result<(), SimError> {
        let hazard = if self.hazard_control {
            hazards::detect(&self.decode, &self.register_read, &self.execute, &self.store)
        } else {
            None
        };
        let snapshot = self.regs.clone();

        self.fetch.tick();
        self.decode.tick();
        self.register_read.tick();
        self.execute.tick();
        self.store.tick();

        let commit = stages::commit_stage(self)?;
        stages::store_stage(self);
        stages::execute_stage(self);
        stages::register_read_stage(self, &snapshot, hazard);
        stages::decode_stage(self);
        stages::fetch_stage(self);

        let record = CycleRecord {
            cycle: self.cycle,
            pc: self.pc,
            speculative: self.speculation.is_speculative(),
            stages: self.stage_statuses(),
            commit,
            events: std::mem::take(&mut self.events),
        };
        self.cycle += 1;
        self.stats.cycles = self.cycle;
        sink.emit(&record);
        Ok(())
    }

    /// True once the fetch PC has run past the program and every stage is empty.
    pub fn is_finished(&self) -> bool {
        self.pc >= self.program_end()
            && self.fetch.is_empty()
            && self.decode.is_empty()
            && self.register_read.is_empty()
            && self.execute.is_empty()
            && self.store.is_empty()
    }

    /// Byte address one past the last instruction.
    pub fn program_end(&self) -> u32 {
        self.lines.len() as u32 * INSTRUCTION_BYTES
    }

    /// Number of instructions in the program.
    pub fn program_len(&self) -> usize {
        self.lines.len()
    }

    /// Instruction text at byte address `pc`, if it names an instruction.
    pub(crate) fn line_at(&self, pc: u32) -> Option<Arc<str>> {
        if pc % INSTRUCTION_BYTES != 0 {
            return None;
        }
        self.lines.get((pc / INSTRUCTION_BYTES) as usize).cloned()
    }

    /// Checks that a redirect target lies in `[0, program_end]` and is aligned.
    pub(crate) fn check_target(&self, target: i64) -> Result<u32, SimError> {
        self.valid_target(target).ok_or_else(|| SimError::MemoryBounds {
            cycle: self.cycle,
            space: AddressSpace::Instruction,
            addr: target,
            limit: i64::from(self.program_end()) + i64::from(INSTRUCTION_BYTES),
        })
    }

    /// `target` as a fetch address, if it is aligned and no further than the program end.
    pub(crate) fn valid_target(&self, target: i64) -> Option<u32> {
        let end = i64::from(self.program_end());
        ((0..=end).contains(&target) && target % i64::from(INSTRUCTION_BYTES) == 0)
            .then_some(target as u32)
    }

    pub(crate) fn alloc_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Clears Fetch, Decode, `RegisterRead` and Execute, and redirects fetch.
    ///
    /// Any outstanding prediction belongs to a younger instruction, so the
    /// speculation state is cleared with it.
    pub(crate) fn flush_and_redirect(&mut self, cause: FlushCause, target: u32) {
        let squashed = self.fetch.flush()
            + self.decode.flush()
            + self.register_read.flush()
            + self.execute.flush();
        self.speculation.clear();
        self.pc = target;
        self.stats.flushes += 1;
        self.stats.squashed += squashed as u64;
        info!(cycle = self.cycle, %cause, squashed, target, "pipeline flush");
        self.events.push(TraceEvent::Flush {
            cause,
            squashed,
            target,
        });
    }

    pub(crate) fn sync_prediction_stats(&mut self) {
        self.stats.prediction = self.predictor.as_ref().map(BranchPredictor::stats);
    }

    /// Status of every stage, Fetch first.
    pub fn stage_statuses(&self) -> [StageStatus; 5] {
        [
            self.fetch.status(),
            self.decode.status(),
            self.register_read.status(),
            self.execute.status(),
            self.store.status(),
        ]
    }

    /// Status of one stage.
    pub fn stage_status(&self, kind: StageKind) -> StageStatus {
        match kind {
            StageKind::Fetch => self.fetch.status(),
            StageKind::Decode => self.decode.status(),
            StageKind::RegisterRead => self.register_read.status(),
            StageKind::Execute => self.execute.status(),
            StageKind::Store => self.store.status(),
        }
    }

    /// Cycles elapsed.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Current fetch PC (byte address).
    pub const fn pc(&self) -> u32 {
        self.pc
    }

    /// The register file.
    pub const fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    /// Data memory.
    pub const fn memory(&self) -> &DataMemory {
        &self.memory
    }

    /// The program's labels.
    pub const fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Outstanding prediction, if any.
    pub const fn speculation(&self) -> SpeculationState {
        self.speculation
    }

    /// Run statistics so far.
    pub const fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Predictor counters, when a predictor is configured.
    pub fn predictor_stats(&self) -> Option<PredictorStats> {
        self.predictor.as_ref().map(BranchPredictor::stats)
    }

    /// Snapshot of registers, memory, and statistics.
    pub fn final_state(&self) -> FinalState {
        FinalState {
            registers: self.regs.snapshot(),
            memory: self.memory.as_slice().to_vec(),
            stats: self.stats.clone(),
            predictor: self.predictor_stats(),
        }
    }

    pub(crate) fn log_transfer(&self, to: StageKind, pc: u32, text: &str) {
        debug!(cycle = self.cycle, stage = %to, pc, inst = text, "advance");
    }
}
