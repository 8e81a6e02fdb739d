//! Configuration system for the pipeline simulator.
//!
//! This module defines all configuration structures and enums used to parameterize
//! the simulator. It provides:
//! 1. **Defaults:** Baseline stage latencies, per-opcode Execute latencies, and memory size.
//! 2. **Structures:** Hierarchical config for general, pipeline, latency, and memory settings.
//! 3. **Enums:** Branch predictor strategy and the named presets.
//!
//! Configuration is supplied via JSON (`Config::from_json`), a named [`Preset`], or
//! `Config::default()`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::isa::instruction::Opcode;

/// Default configuration constants for the simulator.
///
/// These values define the baseline pipeline when not explicitly overridden
/// in a JSON configuration.
mod defaults {
    /// Base latency of the Fetch stage in cycles.
    pub const FETCH_LATENCY: u32 = 1;

    /// Base latency of the Decode stage in cycles.
    pub const DECODE_LATENCY: u32 = 1;

    /// Base latency of the `RegisterRead` stage in cycles.
    pub const REGISTER_READ_LATENCY: u32 = 1;

    /// Base latency of the Store (commit) stage in cycles.
    pub const STORE_LATENCY: u32 = 1;

    /// Execute latency of single-cycle ALU operations (add/sub/and/or/xor/slt/addi).
    pub const ALU_LATENCY: u32 = 1;

    /// Execute latency of `mul`.
    pub const MUL_LATENCY: u32 = 3;

    /// Execute latency of `div`.
    pub const DIV_LATENCY: u32 = 10;

    /// Execute latency of `lw`.
    ///
    /// The load occupies Execute for the whole memory access, which is what
    /// keeps dependent instructions stalled behind it.
    pub const LOAD_LATENCY: u32 = 4;

    /// Execute latency of `sw`.
    pub const STORE_OP_LATENCY: u32 = 1;

    /// Execute latency of `beq`/`blt`.
    pub const BRANCH_LATENCY: u32 = 1;

    /// Execute latency of `jal`.
    pub const JUMP_LATENCY: u32 = 1;

    /// Execute latency of `la` (already resolved at decode).
    pub const LA_LATENCY: u32 = 1;

    /// Execute latency of `nop` and stall bubbles.
    pub const NOP_LATENCY: u32 = 1;

    /// Data memory capacity in words.
    pub const DATA_WORDS: usize = crate::common::DATA_MEMORY_WORDS;

    /// Hazard control is enabled unless a configuration turns it off.
    pub const HAZARD_CONTROL: bool = true;
}

/// Branch prediction strategy.
///
/// Only `beq` is predicted. With `None` every conditional branch resolves at
/// Store and a taken branch flushes the younger stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum BranchPredictorKind {
    /// No speculation; fetch continues sequentially past every branch.
    #[default]
    None,
    /// Predict every `beq` taken and redirect fetch at Decode.
    AlwaysTaken,
    /// Predict every `beq` not taken and keep fetching sequentially.
    AlwaysNotTaken,
}

impl BranchPredictorKind {
    /// Returns the kebab-case name used on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::AlwaysTaken => "always-taken",
            Self::AlwaysNotTaken => "always-not-taken",
        }
    }
}

impl fmt::Display for BranchPredictorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BranchPredictorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "none" | "off" => Ok(Self::None),
            "always-taken" | "taken" => Ok(Self::AlwaysTaken),
            "always-not-taken" | "not-taken" => Ok(Self::AlwaysNotTaken),
            other => Err(format!("unknown branch predictor `{other}`")),
        }
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Config {
    /// General simulation settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Hazard control and branch speculation
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Stage and per-opcode latencies
    #[serde(default)]
    pub latency: LatencyConfig,
    /// Data memory configuration
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl Config {
    /// Parses a configuration from JSON; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed JSON or mistyped fields.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Returns the full configuration for a named preset.
    pub fn preset(preset: Preset) -> Self {
        let mut config = Self::default();
        let (hazard_control, branch_predictor) = match preset {
            Preset::Naive => (false, BranchPredictorKind::None),
            Preset::HazardControl => (true, BranchPredictorKind::None),
            Preset::Predicted => (false, BranchPredictorKind::AlwaysTaken),
            Preset::PredictedHazardControl => (true, BranchPredictorKind::AlwaysTaken),
        };
        config.pipeline.hazard_control = hazard_control;
        config.pipeline.branch_predictor = branch_predictor;
        config
    }
}

/// General simulation settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Hard cycle cap. `None` derives a cap from the program length.
    #[serde(default)]
    pub max_cycles: Option<u64>,
}

/// Pipeline capability flags.
///
/// The four classic pipeline variants are the combinations of these two
/// orthogonal switches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Stall consumers in Decode until their producers commit
    #[serde(default = "PipelineConfig::default_hazard_control")]
    pub hazard_control: bool,

    /// Branch predictor strategy
    #[serde(default)]
    pub branch_predictor: BranchPredictorKind,
}

impl PipelineConfig {
    fn default_hazard_control() -> bool {
        defaults::HAZARD_CONTROL
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            hazard_control: defaults::HAZARD_CONTROL,
            branch_predictor: BranchPredictorKind::default(),
        }
    }
}

/// Per-stage base latencies.
///
/// Execute ignores a base latency and uses the per-opcode table instead.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LatencyConfig {
    /// Fetch latency in cycles
    #[serde(default = "LatencyConfig::default_fetch")]
    pub fetch: u32,
    /// Decode latency in cycles
    #[serde(default = "LatencyConfig::default_decode")]
    pub decode: u32,
    /// `RegisterRead` latency in cycles
    #[serde(default = "LatencyConfig::default_register_read")]
    pub register_read: u32,
    /// Store latency in cycles
    #[serde(default = "LatencyConfig::default_store")]
    pub store: u32,
    /// Per-opcode Execute latencies
    #[serde(default)]
    pub execute: ExecuteLatency,
}

impl LatencyConfig {
    fn default_fetch() -> u32 {
        defaults::FETCH_LATENCY
    }

    fn default_decode() -> u32 {
        defaults::DECODE_LATENCY
    }

    fn default_register_read() -> u32 {
        defaults::REGISTER_READ_LATENCY
    }

    fn default_store() -> u32 {
        defaults::STORE_LATENCY
    }
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            fetch: defaults::FETCH_LATENCY,
            decode: defaults::DECODE_LATENCY,
            register_read: defaults::REGISTER_READ_LATENCY,
            store: defaults::STORE_LATENCY,
            execute: ExecuteLatency::default(),
        }
    }
}

/// Execute-stage latency per opcode class.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExecuteLatency {
    /// add/sub/and/or/xor/slt/addi
    #[serde(default = "ExecuteLatency::default_alu")]
    pub alu: u32,
    /// mul
    #[serde(default = "ExecuteLatency::default_mul")]
    pub mul: u32,
    /// div
    #[serde(default = "ExecuteLatency::default_div")]
    pub div: u32,
    /// lw
    #[serde(default = "ExecuteLatency::default_load")]
    pub load: u32,
    /// sw
    #[serde(default = "ExecuteLatency::default_store")]
    pub store: u32,
    /// beq/blt
    #[serde(default = "ExecuteLatency::default_branch")]
    pub branch: u32,
    /// jal
    #[serde(default = "ExecuteLatency::default_jump")]
    pub jump: u32,
    /// la
    #[serde(default = "ExecuteLatency::default_la")]
    pub la: u32,
    /// nop and stall bubbles
    #[serde(default = "ExecuteLatency::default_nop")]
    pub nop: u32,
}

impl ExecuteLatency {
    fn default_alu() -> u32 {
        defaults::ALU_LATENCY
    }

    fn default_mul() -> u32 {
        defaults::MUL_LATENCY
    }

    fn default_div() -> u32 {
        defaults::DIV_LATENCY
    }

    fn default_load() -> u32 {
        defaults::LOAD_LATENCY
    }

    fn default_store() -> u32 {
        defaults::STORE_OP_LATENCY
    }

    fn default_branch() -> u32 {
        defaults::BRANCH_LATENCY
    }

    fn default_jump() -> u32 {
        defaults::JUMP_LATENCY
    }

    fn default_la() -> u32 {
        defaults::LA_LATENCY
    }

    fn default_nop() -> u32 {
        defaults::NOP_LATENCY
    }

    /// Returns the Execute latency of `op`, never less than one cycle.
    pub fn for_opcode(&self, op: Opcode) -> u32 {
        let cycles = match op {
            Opcode::Add
            | Opcode::Sub
            | Opcode::And
            | Opcode::Or
            | Opcode::Xor
            | Opcode::Slt
            | Opcode::Addi => self.alu,
            Opcode::Mul => self.mul,
            Opcode::Div => self.div,
            Opcode::Lw => self.load,
            Opcode::Sw => self.store,
            Opcode::Beq | Opcode::Blt => self.branch,
            Opcode::Jal => self.jump,
            Opcode::La => self.la,
            Opcode::Nop => self.nop,
        };
        cycles.max(1)
    }
}

impl Default for ExecuteLatency {
    fn default() -> Self {
        Self {
            alu: defaults::ALU_LATENCY,
            mul: defaults::MUL_LATENCY,
            div: defaults::DIV_LATENCY,
            load: defaults::LOAD_LATENCY,
            store: defaults::STORE_OP_LATENCY,
            branch: defaults::BRANCH_LATENCY,
            jump: defaults::JUMP_LATENCY,
            la: defaults::LA_LATENCY,
            nop: defaults::NOP_LATENCY,
        }
    }
}

/// Data memory configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MemoryConfig {
    /// Data memory size in 32-bit words
    #[serde(default = "MemoryConfig::default_data_words")]
    pub data_words: usize,
}

impl MemoryConfig {
    fn default_data_words() -> usize {
        defaults::DATA_WORDS
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            data_words: defaults::DATA_WORDS,
        }
    }
}

/// Named pipeline configurations.
///
/// Each preset is one combination of the hazard-control and predictor flags
/// on top of the default latencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// No hazard control, no predictor: shows stale register reads.
    Naive,
    /// Dynamic stall insertion, no predictor.
    HazardControl,
    /// Always-taken speculation without hazard control.
    Predicted,
    /// Always-taken speculation with dynamic stall insertion.
    PredictedHazardControl,
}

impl Preset {
    /// Every preset, in presentation order.
    pub const ALL: [Self; 4] = [
        Self::Naive,
        Self::HazardControl,
        Self::Predicted,
        Self::PredictedHazardControl,
    ];

    /// Returns the kebab-case preset name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Naive => "naive",
            Self::HazardControl => "hazard-control",
            Self::Predicted => "predicted",
            Self::PredictedHazardControl => "predicted-hazard-control",
        }
    }

    /// Returns a one-line description of the preset.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Naive => "no hazard control, no branch prediction",
            Self::HazardControl => "dynamic stall insertion, no branch prediction",
            Self::Predicted => "always-taken prediction, no hazard control",
            Self::PredictedHazardControl => "always-taken prediction with stall insertion",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| format!("unknown preset `{s}`"))
    }
}
