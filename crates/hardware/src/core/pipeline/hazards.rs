//! Data Hazard Detection.
//!
//! This module implements the dynamic read-after-write check. There is no
//! forwarding: a consumer may only read a register in `RegisterRead` after
//! every older producer of that register has committed in Store.
//!
//! The check runs once per cycle, before any stage advances. It compares the
//! sources of the instruction waiting in Decode against the destinations held
//! in `RegisterRead`, Execute, and Store. Store is included because operands
//! are read from the register state as it was before this cycle's commit.
//!
//! Variable Execute latency needs no special casing: a 4-cycle load simply
//! keeps occupying Execute, so the check keeps firing until it moves on.

use crate::core::pipeline::stage::{PipelineStage, StageKind};
use crate::core::pipeline::traits::RegisterWriter;
use crate::isa::instruction::Instruction;

/// A pending RAW dependency.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hazard {
    /// The register being waited on.
    pub reg: usize,
    /// Stage holding the youngest conflicting producer.
    pub producer: StageKind,
}

/// Returns the first producer whose destination the consumer reads.
///
/// Producers are checked youngest first; `x0` never hazards.
///
/// # Arguments
///
/// * `consumer` - The instruction about to enter `RegisterRead`.
/// * `producers` - `(stage, destination)` pairs for the occupied downstream stages.
///
/// # Returns
///
/// The conflicting register and the stage holding its producer, or `None`.
pub fn find_hazard<I>(consumer: &Instruction, producers: I) -> Option<Hazard>
where
    I: IntoIterator<Item = (StageKind, Option<usize>)>,
{
    producers.into_iter().find_map(|(stage, dest)| {
        dest.filter(|&reg| reg != 0 && consumer.reads(reg))
            .map(|reg| Hazard {
                reg,
                producer: stage,
            })
    })
}

fn dest_of<P: RegisterWriter>(stage: &PipelineStage<P>) -> (StageKind, Option<usize>) {
    (stage.kind(), stage.payload().and_then(RegisterWriter::dest_reg))
}

/// Checks whether the instruction held in Decode must wait this cycle.
///
/// # Arguments
///
/// * `decode` - The Decode stage; its payload is the consumer.
/// * `register_read`, `execute`, `store` - The stages that may hold producers.
///
/// # Returns
///
/// The pending hazard, or `None` if Decode is empty or nothing conflicts.
pub fn detect<R, E, S>(
    decode: &PipelineStage<Instruction>,
    register_read: &PipelineStage<R>,
    execute: &PipelineStage<E>,
    store: &PipelineStage<S>,
) -> Option<Hazard>
where
    R: RegisterWriter,
    E: RegisterWriter,
    S: RegisterWriter,
{
    let consumer = decode.payload()?;
    find_hazard(
        consumer,
        [dest_of(register_read), dest_of(execute), dest_of(store)],
    )
}
