//! Execute (EX) Stage.
//!
//! This module implements the ALU dispatch stage. It performs the following:
//! 1. **Arithmetic Execution:** Computes ALU results from the operands read in `RegisterRead`.
//! 2. **Address Generation:** Computes word addresses for loads and stores.
//! 3. **Branch Resolution:** Evaluates branch conditions and resolves branch and jump targets.
//!
//! The result is a [`CommitPackage`] that Store applies without further computation.
//! The stage then holds the instruction for its opcode-specific latency.

use tracing::debug;

use crate::core::arch::SymbolTable;
use crate::core::pipeline::engine::PipelineEngine;
use crate::core::pipeline::latches::{CommitPackage, Fault, Operands};
use crate::core::pipeline::signals::{BranchCond, ControlSignals, OpASrc, OpBSrc};
use crate::core::pipeline::stage::{StageKind, StageSlot};
use crate::core::units::alu::Alu;
use crate::isa::instruction::Target;

/// Moves a completed instruction from `RegisterRead` into a free Execute stage.
///
/// A branch or jump naming a missing label has no effect here; the fault
/// rides with the instruction and is raised only if it commits.
pub fn execute_stage(engine: &mut PipelineEngine) {
    if !engine.execute.is_free() {
        return;
    }
    let Some(StageSlot { mut entry, payload }) = engine.register_read.take_completed() else {
        return;
    };
    let package = if entry.fault.is_some() {
        CommitPackage::Nop
    } else {
        match execute(&payload, entry.pc, &engine.symbols) {
            Ok(package) => package,
            Err(fault) => {
                debug!(cycle = engine.cycle, pc = entry.pc, ?fault, "fault deferred to commit");
                entry.fault = Some(fault);
                CommitPackage::Nop
            }
        }
    };
    let latency = engine.latency.execute.for_opcode(payload.inst.opcode);
    engine.log_transfer(StageKind::Execute, entry.pc, &entry.text);
    let _ = engine.execute.load_with_latency(entry, package, latency);
}

/// Computes the commit package for one instruction.
///
/// # Arguments
///
/// * `ops` - The instruction and its source register values.
/// * `pc` - Byte address of the instruction.
/// * `symbols` - Labels for branch and jump targets.
///
/// # Errors
///
/// Returns [`Fault::UnresolvedLabel`] if a target label is not a text label.
pub fn execute(ops: &Operands, pc: u32, symbols: &SymbolTable) -> Result<CommitPackage, Fault> {
    let inst = &ops.inst;
    let sig = ControlSignals::for_opcode(inst.opcode);
    let imm = inst.imm.unwrap_or(0);
    let a = match sig.a_src {
        OpASrc::Reg1 => ops.rs1_val,
        OpASrc::Zero => 0,
    };
    let b = match sig.b_src {
        OpBSrc::Reg2 => ops.rs2_val,
        OpBSrc::Imm => imm,
    };
    let rd = inst.rd.unwrap_or(0);

    let resolve = |target: Option<&Target>| -> Result<i64, Fault> {
        let Some(target) = target else {
            return Ok(i64::from(pc) + 4);
        };
        symbols
            .resolve(target, pc)
            .map_err(|label| Fault::UnresolvedLabel(label.to_string()))
    };

    let package = if let Some(cond) = sig.branch {
        let result = Alu::execute(sig.alu, a, b);
        let taken = match cond {
            BranchCond::Eq => result == 0,
            BranchCond::Lt => result != 0,
        };
        CommitPackage::Branch {
            taken,
            target: resolve(inst.target.as_ref())?,
        }
    } else if sig.jump {
        CommitPackage::Jump {
            rd,
            link: pc.wrapping_add(4) as i32,
            target: resolve(inst.target.as_ref())?,
        }
    } else if sig.mem_read {
        CommitPackage::Load {
            rd,
            addr: i64::from(a) + i64::from(imm),
        }
    } else if sig.mem_write {
        CommitPackage::MemWrite {
            addr: i64::from(a) + i64::from(imm),
            value: ops.rs2_val,
        }
    } else if sig.reg_write {
        CommitPackage::RegWrite {
            rd,
            value: Alu::execute(sig.alu, a, b),
        }
    } else {
        CommitPackage::Nop
    };
    Ok(package)
}
