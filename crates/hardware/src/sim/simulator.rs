//! Simulator: the run loop around the pipeline engine.
//!
//! The engine advances one cycle per call; the simulator repeats that until
//! the pipeline drains, enforcing a cycle cap so a program that never
//! terminates yields [`SimError::NonTermination`] instead of spinning forever.

use tracing::{info, warn};

use crate::common::{CYCLES_PER_LINE, MIN_CYCLE_CAP, SimError};
use crate::config::Config;
use crate::core::pipeline::{FinalState, PipelineEngine};
use crate::sim::loader::{self, Program};
use crate::trace::TraceSink;

/// Top-level simulator: pipeline engine plus run policy.
#[derive(Debug)]
pub struct Simulator {
    engine: PipelineEngine,
    max_cycles: u64,
}

impl Simulator {
    /// Creates a simulator for `program`.
    ///
    /// The cycle cap is `config.general.max_cycles`, or
    /// [`default_cycle_cap`](Self::default_cycle_cap) when unset.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MemoryBounds`] if the data image does not fit in memory.
    pub fn new(program: &Program, config: &Config) -> Result<Self, SimError> {
        let engine = PipelineEngine::new(program, config)?;
        let max_cycles = config
            .general
            .max_cycles
            .unwrap_or_else(|| Self::default_cycle_cap(program.lines.len()));
        Ok(Self { engine, max_cycles })
    }

    /// Cycle cap derived from the program length.
    pub fn default_cycle_cap(lines: usize) -> u64 {
        (CYCLES_PER_LINE * (lines as u64 + 1)).max(MIN_CYCLE_CAP)
    }

    /// The cap applied by [`run`](Self::run).
    pub const fn max_cycles(&self) -> u64 {
        self.max_cycles
    }

    /// Advances one cycle.
    ///
    /// # Returns
    ///
    /// `true` once the pipeline has drained.
    ///
    /// # Errors
    ///
    /// Propagates any fatal error from the engine.
    pub fn step(&mut self, sink: &mut dyn TraceSink) -> Result<bool, SimError> {
        if !self.engine.is_finished() {
            self.engine.tick(sink)?;
        }
        Ok(self.engine.is_finished())
    }

    /// Runs until the pipeline drains.
    ///
    /// On error the engine is left as it was when the error was raised, so
    /// its registers, memory and stage contents remain inspectable.
    ///
    /// # Errors
    ///
    /// Returns the first fatal engine error, or [`SimError::NonTermination`]
    /// once the cycle cap is reached.
    pub fn run(&mut self, sink: &mut dyn TraceSink) -> Result<FinalState, SimError> {
        while !self.engine.is_finished() {
            if self.engine.cycle() >= self.max_cycles {
                warn!(
                    cycles = self.max_cycles,
                    pc = self.engine.pc(),
                    "cycle cap reached"
                );
                return Err(SimError::NonTermination {
                    cycles: self.max_cycles,
                });
            }
            self.engine.tick(sink)?;
        }

        let state = self.engine.final_state();
        info!(
            cycles = state.stats.cycles,
            retired = state.stats.instructions_retired,
            stalls = state.stats.stalls_data,
            flushes = state.stats.flushes,
            "simulation finished"
        );
        Ok(state)
    }

    /// The engine, for inspection.
    pub const fn engine(&self) -> &PipelineEngine {
        &self.engine
    }

    /// Consumes the simulator, returning the engine.
    pub fn into_engine(self) -> PipelineEngine {
        self.engine
    }
}

/// Assembles `source` and runs it to completion.
///
/// # Errors
///
/// Returns [`SimError::Load`] for assembly errors, otherwise any error from
/// [`Simulator::run`].
pub fn run_source(
    source: &str,
    config: &Config,
    sink: &mut dyn TraceSink,
) -> Result<FinalState, SimError> {
    let program = loader::assemble(source)?;
    Simulator::new(&program, config)?.run(sink)
}
