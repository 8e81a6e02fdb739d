//! Execution Trace.
//!
//! This module defines the per-cycle trace that external viewers consume. It provides:
//! 1. **Records:** One [`CycleRecord`] per cycle with stage status, commit, and events.
//! 2. **Sink Interface:** The [`TraceSink`] trait the run loop emits records into.
//! 3. **Sinks:** Collecting (`Vec`), discarding ([`NullSink`]), text ([`TextTrace`]),
//!    and JSON-lines ([`JsonTrace`]) implementations.
//!
//! The caller owns every sink; the engine only borrows it for the duration of a run.

use std::fmt;
use std::io::{self, Write};

use serde::Serialize;

use crate::core::pipeline::stage::StageKind;

/// Status of one pipeline stage at the end of a cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StageStatus {
    /// No instruction held.
    Idle,
    /// Holding an instruction.
    Processing {
        /// Instruction text as fetched.
        text: String,
        /// Cycles left before the stage completes (0 = waiting to advance).
        remaining: u32,
        /// True for a stall bubble.
        bubble: bool,
    },
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Processing {
                text,
                remaining,
                bubble,
            } => {
                let tag = if *bubble { " [stall]" } else { "" };
                write!(f, "processing {text}{tag} ({remaining} cycles remaining)")
            }
        }
    }
}

/// Architectural write performed by a commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WriteEffect {
    /// A register was written.
    Register {
        /// Register index.
        reg: usize,
        /// Value written.
        value: i32,
    },
    /// A data memory word was written.
    Memory {
        /// Word address.
        addr: i64,
        /// Value written.
        value: i32,
    },
}

impl fmt::Display for WriteEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register { reg, value } => write!(f, "x{reg} <- {value}"),
            Self::Memory { addr, value } => write!(f, "mem[{addr}] <- {value}"),
        }
    }
}

/// An instruction leaving Store in this cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    /// Byte address of the instruction.
    pub pc: u32,
    /// Instruction text as fetched.
    pub text: String,
    /// True for a stall bubble.
    pub bubble: bool,
    /// Register or memory write performed, if any.
    pub write: Option<WriteEffect>,
}

/// Why the pipeline was flushed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushCause {
    /// A predicted branch resolved to a different target.
    Misprediction,
    /// An unpredicted conditional branch was taken.
    TakenBranch,
    /// A `jal` committed.
    Jump,
}

impl fmt::Display for FlushCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Misprediction => "misprediction",
            Self::TakenBranch => "taken branch",
            Self::Jump => "jump",
        })
    }
}

/// Notable things that happened during a cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    /// The instruction in Decode waited on a producer.
    Stall {
        /// Register carrying the dependency.
        reg: usize,
        /// Stage holding the producer when the check ran.
        producer: StageKind,
        /// True if a bubble was injected into `RegisterRead`.
        bubble: bool,
    },
    /// A branch was predicted at Decode.
    Prediction {
        /// Branch address.
        pc: u32,
        /// Predicted direction.
        taken: bool,
        /// Predicted fetch target.
        target: u32,
    },
    /// A predicted branch resolved as predicted.
    PredictionCorrect {
        /// Branch address.
        pc: u32,
    },
    /// A second predicted branch was held in Fetch.
    SpeculationHold {
        /// Address of the held branch.
        pc: u32,
    },
    /// Fetch, Decode, `RegisterRead` and Execute were cleared.
    Flush {
        /// Reason for the flush.
        cause: FlushCause,
        /// Program instructions discarded.
        squashed: usize,
        /// New fetch address.
        target: u32,
    },
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stall {
                reg,
                producer,
                bubble,
            } => {
                write!(f, "stall: x{reg} pending in {producer}")?;
                if *bubble {
                    f.write_str(", bubble inserted")?;
                }
                Ok(())
            }
            Self::Prediction { pc, taken, target } => {
                let dir = if *taken { "taken" } else { "not taken" };
                write!(f, "predict branch at {pc}: {dir}, fetch {target}")
            }
            Self::PredictionCorrect { pc } => write!(f, "branch at {pc} predicted correctly"),
            Self::SpeculationHold { pc } => {
                write!(f, "branch at {pc} held: prediction outstanding")
            }
            Self::Flush {
                cause,
                squashed,
                target,
            } => write!(f, "flush ({cause}): {squashed} squashed, fetch {target}"),
        }
    }
}

/// Everything observable about one cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CycleRecord {
    /// Cycle number, starting at 0.
    pub cycle: u64,
    /// Fetch PC after the cycle.
    pub pc: u32,
    /// True while a predicted branch is outstanding.
    pub speculative: bool,
    /// Fetch, Decode, `RegisterRead`, Execute, and Store status, in that order.
    pub stages: [StageStatus; 5],
    /// Instruction committed by Store, if any.
    pub commit: Option<CommitRecord>,
    /// Stalls, predictions, and flushes.
    pub events: Vec<TraceEvent>,
}

/// Receiver of per-cycle trace records.
pub trait TraceSink {
    /// Consumes the record for one completed cycle.
    fn emit(&mut self, record: &CycleRecord);
}

impl TraceSink for Vec<CycleRecord> {
    fn emit(&mut self, record: &CycleRecord) {
        self.push(record.clone());
    }
}

/// Sink that discards every record.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn emit(&mut self, _record: &CycleRecord) {}
}

/// Human-readable trace log.
///
/// Write failures are latched: the first error stops further output and is
/// returned by [`TextTrace::finish`].
#[derive(Debug)]
pub struct TextTrace<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> TextTrace<W> {
    /// Wraps a writer.
    pub const fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// Flushes the writer and returns it, or the first write error.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error encountered while tracing or flushing.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_record(&mut self, record: &CycleRecord) -> io::Result<()> {
        let marker = if record.speculative { " [SPECULATIVE]" } else { "" };
        writeln!(self.out, "[CYCLE {}] [PC={}]{marker}", record.cycle, record.pc)?;
        for (kind, status) in StageKind::ALL.iter().zip(&record.stages) {
            writeln!(self.out, "  {:<14} {status}", format!("{kind}:"))?;
        }
        if let Some(commit) = &record.commit {
            if !commit.bubble {
                match &commit.write {
                    Some(write) => writeln!(self.out, "  COMMIT {} ({write})", commit.text)?,
                    None => writeln!(self.out, "  COMMIT {}", commit.text)?,
                }
            }
        }
        for event in &record.events {
            writeln!(self.out, "  * {event}")?;
        }
        Ok(())
    }
}

impl<W: Write> TraceSink for TextTrace<W> {
    fn emit(&mut self, record: &CycleRecord) {
        if self.error.is_none() {
            if let Err(err) = self.write_record(record) {
                self.error = Some(err);
            }
        }
    }
}

/// JSON-lines trace: one serialized [`CycleRecord`] per line.
#[derive(Debug)]
pub struct JsonTrace<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> JsonTrace<W> {
    /// Wraps a writer.
    pub const fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// Flushes the writer and returns it, or the first write error.
    ///
    /// # Errors
    ///
    /// Returns the first I/O or serialization error encountered.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> TraceSink for JsonTrace<W> {
    fn emit(&mut self, record: &CycleRecord) {
        if self.error.is_some() {
            return;
        }
        let result = serde_json::to_writer(&mut self.out, record)
            .map_err(io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"));
        if let Err(err) = result {
            self.error = Some(err);
        }
    }
}
