//! Simulation statistics collection and reporting.
//!
//! This module tracks performance metrics for the pipeline simulator. It provides:
//! 1. **Cycle and CPI:** Total cycles, retired instructions, and derived metrics.
//! 2. **Instruction mix:** Counts by category (ALU, mul/div, load, store, branch, jump).
//! 3. **Hazards:** Data-stall cycles and injected bubbles.
//! 4. **Control flow:** Flushes, squashed instructions, and branch prediction accuracy.

use std::io::{self, Write};

use serde::Serialize;

use crate::core::units::bru::PredictorStats;
use crate::isa::instruction::Opcode;

/// Simulation statistics structure tracking all performance metrics.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SimStats {
    /// Total simulator cycles elapsed.
    pub cycles: u64,
    /// Number of program instructions committed (bubbles excluded).
    pub instructions_retired: u64,
    /// Number of stall bubbles that reached Store.
    pub bubbles_retired: u64,

    /// Count of register-register and immediate ALU instructions retired.
    pub inst_alu: u64,
    /// Count of `mul`/`div` instructions retired.
    pub inst_muldiv: u64,
    /// Count of load instructions retired.
    pub inst_load: u64,
    /// Count of store instructions retired.
    pub inst_store: u64,
    /// Count of conditional branch instructions retired.
    pub inst_branch: u64,
    /// Count of `jal` instructions retired.
    pub inst_jump: u64,
    /// Count of `la` instructions retired.
    pub inst_la: u64,
    /// Count of program `nop` instructions retired.
    pub inst_nop: u64,

    /// Cycles in which a RAW hazard alone held a decoded instruction back.
    ///
    /// Cycles in which `RegisterRead` was busy anyway are not counted, so
    /// this matches the bubbles inserted.
    pub stalls_data: u64,
    /// Stall bubbles injected into `RegisterRead`.
    pub bubbles_inserted: u64,
    /// Cycles in which a second predicted branch waited in Fetch.
    pub stalls_speculation: u64,

    /// Pipeline flushes (mispredictions, jumps, and taken unpredicted branches).
    pub flushes: u64,
    /// Program instructions discarded by flushes.
    pub squashed: u64,
    /// Conditional branches resolved at Store.
    pub branches: u64,
    /// Conditional branches resolved taken.
    pub branches_taken: u64,

    /// Predictor counters, present when a predictor is configured.
    pub prediction: Option<PredictorStats>,
}

/// Valid section names for [`SimStats::print_sections`].
pub const STATS_SECTIONS: &[&str] = &["summary", "instruction_mix", "hazards", "branch"];

fn pct(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

impl SimStats {
    /// Cycles per retired instruction, or 0 if nothing retired.
    pub fn cpi(&self) -> f64 {
        if self.instructions_retired == 0 {
            0.0
        } else {
            self.cycles as f64 / self.instructions_retired as f64
        }
    }

    /// Counts one retired instruction of the given opcode.
    pub const fn record_retire(&mut self, opcode: Opcode) {
        self.instructions_retired += 1;
        match opcode {
            Opcode::Add
            | Opcode::Sub
            | Opcode::And
            | Opcode::Or
            | Opcode::Xor
            | Opcode::Slt
            | Opcode::Addi => self.inst_alu += 1,
            Opcode::Mul | Opcode::Div => self.inst_muldiv += 1,
            Opcode::Lw => self.inst_load += 1,
            Opcode::Sw => self.inst_store += 1,
            Opcode::Beq | Opcode::Blt => self.inst_branch += 1,
            Opcode::Jal => self.inst_jump += 1,
            Opcode::La => self.inst_la += 1,
            Opcode::Nop => self.inst_nop += 1,
        }
    }

    /// Writes the requested statistics sections to `out`.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`]. Pass an
    /// empty slice to write every section.
    ///
    /// # Errors
    ///
    /// Propagates write failures from `out`.
    pub fn write_sections<W: Write>(&self, out: &mut W, sections: &[String]) -> io::Result<()> {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let cyc = self.cycles;
        let instr = self.instructions_retired;
        let rule = "----------------------------------------------------------";

        writeln!(out, "\n==========================================================")?;
        writeln!(out, "PIPELINE SIMULATION STATISTICS")?;
        writeln!(out, "==========================================================")?;
        if want("summary") {
            let ipc = if cyc == 0 { 0.0 } else { instr as f64 / cyc as f64 };
            writeln!(out, "sim_cycles               {cyc}")?;
            writeln!(out, "sim_insts                {instr}")?;
            writeln!(out, "sim_bubbles              {}", self.bubbles_retired)?;
            writeln!(out, "sim_ipc                  {ipc:.4}")?;
            writeln!(out, "sim_cpi                  {:.4}", self.cpi())?;
            writeln!(out, "{rule}")?;
        }
        if want("instruction_mix") {
            writeln!(out, "INSTRUCTION MIX")?;
            for (name, count) in [
                ("op.alu", self.inst_alu),
                ("op.muldiv", self.inst_muldiv),
                ("op.load", self.inst_load),
                ("op.store", self.inst_store),
                ("op.branch", self.inst_branch),
                ("op.jump", self.inst_jump),
                ("op.la", self.inst_la),
                ("op.nop", self.inst_nop),
            ] {
                writeln!(out, "  {name:<22} {count} ({:.2}%)", pct(count, instr))?;
            }
            writeln!(out, "{rule}")?;
        }
        if want("hazards") {
            writeln!(out, "HAZARDS")?;
            writeln!(
                out,
                "  stalls.data            {} ({:.2}%)",
                self.stalls_data,
                pct(self.stalls_data, cyc)
            )?;
            writeln!(out, "  bubbles.inserted       {}", self.bubbles_inserted)?;
            writeln!(
                out,
                "  stalls.speculation     {} ({:.2}%)",
                self.stalls_speculation,
                pct(self.stalls_speculation, cyc)
            )?;
            writeln!(out, "  flushes                {}", self.flushes)?;
            writeln!(out, "  squashed               {}", self.squashed)?;
            writeln!(out, "{rule}")?;
        }
        if want("branch") {
            writeln!(out, "BRANCHES")?;
            writeln!(out, "  branches.resolved      {}", self.branches)?;
            writeln!(out, "  branches.taken         {}", self.branches_taken)?;
            if let Some(bp) = &self.prediction {
                writeln!(out, "  bp.predictions         {}", bp.predictions)?;
                writeln!(out, "  bp.correct             {}", bp.correct)?;
                writeln!(out, "  bp.mispredicts         {}", bp.mispredictions)?;
                writeln!(out, "  bp.accuracy            {:.2}%", bp.accuracy())?;
            } else {
                writeln!(out, "  bp                     disabled")?;
            }
        }
        writeln!(out, "==========================================================")
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// # Arguments
    ///
    /// * `sections` - Slice of section names to print, or empty for all.
    ///
    /// # Errors
    ///
    /// Returns any error from writing to stdout.
    pub fn print_sections(&self, sections: &[String]) -> io::Result<()> {
        self.write_sections(&mut io::stdout().lock(), sections)
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    ///
    /// # Errors
    ///
    /// Returns any error from writing to stdout.
    pub fn print(&self) -> io::Result<()> {
        self.print_sections(&[])
    }
}
