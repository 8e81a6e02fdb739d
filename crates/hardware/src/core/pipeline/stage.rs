//! Generic Pipeline Stage.
//!
//! This module implements the state machine shared by all five stages. It provides:
//! 1. **Occupancy:** At most one instruction per stage, plus the payload it hands downstream.
//! 2. **Latency Countdown:** A stage is complete once its remaining latency reaches zero.
//! 3. **Evacuation:** A completed instruction stays put until its successor takes it.

use std::fmt;

use serde::Serialize;

use crate::core::pipeline::latches::InFlight;
use crate::core::pipeline::traits::PipelineLatch;
use crate::trace::StageStatus;

/// The five stages, in program order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum StageKind {
    /// Instruction fetch.
    Fetch,
    /// Decode (and branch prediction).
    Decode,
    /// Register read.
    RegisterRead,
    /// Execute (ALU, address generation, branch condition).
    Execute,
    /// Store (commit).
    Store,
}

impl StageKind {
    /// All stages, Fetch first.
    pub const ALL: [Self; 5] = [
        Self::Fetch,
        Self::Decode,
        Self::RegisterRead,
        Self::Execute,
        Self::Store,
    ];

    /// Display name of the stage.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Fetch => "Fetch",
            Self::Decode => "Decode",
            Self::RegisterRead => "RegisterRead",
            Self::Execute => "Execute",
            Self::Store => "Store",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An occupied stage's contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageSlot<P> {
    /// The instruction being processed.
    pub entry: InFlight,
    /// The stage's output, computed when the instruction was loaded.
    pub payload: P,
}

/// One pipeline stage holding payload `P`.
///
/// The payload is the stage's output: it is computed by the caller when the
/// instruction is loaded, modeling combinational logic latched at entry.
#[derive(Clone, Debug)]
pub struct PipelineStage<P> {
    kind: StageKind,
    base_latency: u32,
    slot: Option<StageSlot<P>>,
    remaining: u32,
}

impl<P> PipelineStage<P> {
    /// Creates an idle stage. A base latency of 0 is treated as 1.
    pub fn new(kind: StageKind, base_latency: u32) -> Self {
        Self {
            kind,
            base_latency: base_latency.max(1),
            slot: None,
            remaining: 0,
        }
    }

    /// Which stage this is.
    pub const fn kind(&self) -> StageKind {
        self.kind
    }

    /// Latency applied by [`load`](Self::load).
    pub const fn base_latency(&self) -> u32 {
        self.base_latency
    }

    /// Loads an instruction with the stage's base latency.
    ///
    /// # Returns
    ///
    /// `false` (and no change) if the stage is occupied.
    pub fn load(&mut self, entry: InFlight, payload: P) -> bool {
        self.load_with_latency(entry, payload, self.base_latency)
    }

    /// Loads an instruction with an explicit latency (at least one cycle).
    ///
    /// # Returns
    ///
    /// `false` (and no change) if the stage is occupied.
    pub fn load_with_latency(&mut self, entry: InFlight, payload: P, latency: u32) -> bool {
        if self.slot.is_some() {
            tracing::warn!(stage = %self.kind, pc = entry.pc, "load into occupied stage ignored");
            return false;
        }
        self.slot = Some(StageSlot { entry, payload });
        self.remaining = latency.max(1);
        true
    }

    /// Advances the latency countdown by one cycle.
    pub const fn tick(&mut self) {
        if self.slot.is_some() && self.remaining > 0 {
            self.remaining -= 1;
        }
    }

    /// True iff the stage holds no instruction.
    pub const fn is_free(&self) -> bool {
        self.slot.is_none()
    }

    /// True while an instruction is held and still counting down.
    pub const fn is_busy(&self) -> bool {
        self.slot.is_some() && self.remaining > 0
    }

    /// True when the held instruction has finished and waits to advance.
    pub const fn is_complete(&self) -> bool {
        self.slot.is_some() && self.remaining == 0
    }

    /// Cycles left for the held instruction.
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// The held instruction, whether or not it is complete.
    pub fn entry(&self) -> Option<&InFlight> {
        self.slot.as_ref().map(|s| &s.entry)
    }

    /// The held payload, whether or not it is complete.
    pub fn payload(&self) -> Option<&P> {
        self.slot.as_ref().map(|s| &s.payload)
    }

    /// The held instruction, only once its latency has elapsed.
    pub fn completed_instruction(&self) -> Option<&InFlight> {
        if self.is_complete() { self.entry() } else { None }
    }

    /// Evacuates a completed instruction; leaves an incomplete one in place.
    pub fn take_completed(&mut self) -> Option<StageSlot<P>> {
        if self.is_complete() {
            self.remaining = 0;
            self.slot.take()
        } else {
            None
        }
    }

    /// Discards the held instruction, returning it.
    pub fn squash(&mut self) -> Option<StageSlot<P>> {
        self.remaining = 0;
        self.slot.take()
    }

    /// Status line for the trace.
    pub fn status(&self) -> StageStatus {
        self.slot
            .as_ref()
            .map_or(StageStatus::Idle, |slot| StageStatus::Processing {
                text: slot.entry.text.to_string(),
                remaining: self.remaining,
                bubble: slot.entry.bubble,
            })
    }
}

impl<P> PipelineLatch for PipelineStage<P> {
    fn flush(&mut self) -> usize {
        self.squash()
            .map_or(0, |slot| usize::from(!slot.entry.bubble))
    }

    fn is_empty(&self) -> bool {
        self.is_free()
    }
}
