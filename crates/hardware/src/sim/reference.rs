//! Sequential Reference Interpreter.
//!
//! Executes a [`Program`] one instruction at a time with no pipeline, using
//! the same decoder, ALU and memory model as the engine. A hazard-controlled
//! pipeline run must end in the same registers and memory as this
//! interpreter, whatever predictor is configured.

use tracing::debug;

use crate::common::{AddressSpace, DecodeError, INSTRUCTION_BYTES, SimError};
use crate::config::Config;
use crate::core::arch::{DataMemory, RegisterFile, SymbolTable};
use crate::core::pipeline::signals::{AluOp, BranchCond, ControlSignals};
use crate::core::units::alu::Alu;
use crate::isa::decode::decode;
use crate::isa::instruction::{Instruction, Opcode};
use crate::sim::loader::Program;

/// One-instruction-per-step interpreter.
#[derive(Clone, Debug)]
pub struct ReferenceInterpreter {
    lines: Vec<String>,
    symbols: SymbolTable,
    regs: RegisterFile,
    memory: DataMemory,
    pc: u32,
    steps: u64,
}

impl ReferenceInterpreter {
    /// Creates an interpreter for `program` with the memory size from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::MemoryBounds`] if the data image does not fit.
    pub fn new(program: &Program, config: &Config) -> Result<Self, SimError> {
        let memory = DataMemory::with_image(config.memory.data_words, &program.data)
            .map_err(|fault| fault.at(0))?;
        Ok(Self {
            lines: program.lines.clone(),
            symbols: program.symbols.clone(),
            regs: RegisterFile::new(),
            memory,
            pc: 0,
            steps: 0,
        })
    }

    /// True once the PC has left the program.
    pub fn is_finished(&self) -> bool {
        self.pc as usize >= self.lines.len() * INSTRUCTION_BYTES as usize
    }

    /// Runs until the PC leaves the program.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::NonTermination`] after `max_steps` instructions,
    /// or the first fault raised by [`step`](Self::step).
    pub fn run(&mut self, max_steps: u64) -> Result<(), SimError> {
        while !self.is_finished() {
            if self.steps >= max_steps {
                return Err(SimError::NonTermination { cycles: max_steps });
            }
            self.step()?;
        }
        debug!(steps = self.steps, "reference run finished");
        Ok(())
    }

    /// Executes the instruction at the PC.
    ///
    /// # Errors
    ///
    /// Returns the same error kinds as the pipeline; the `cycle` field holds
    /// the step number.
    pub fn step(&mut self) -> Result<(), SimError> {
        let step = self.steps;
        let pc = self.pc;
        let Some(text) = self.lines.get((pc / INSTRUCTION_BYTES) as usize) else {
            return Ok(());
        };
        let inst = decode(text, &self.symbols).map_err(|source| match source {
            DecodeError::UnresolvedLabel(label) => SimError::UnresolvedLabel { cycle: step, label },
            source => SimError::Decode {
                cycle: step,
                pc,
                text: text.clone(),
                source,
            },
        })?;

        let next = self.execute(&inst, pc, step)?;
        self.pc = self.check_target(next, step)?;
        self.steps += 1;
        Ok(())
    }

    fn execute(&mut self, inst: &Instruction, pc: u32, step: u64) -> Result<i64, SimError> {
        let sig = ControlSignals::for_opcode(inst.opcode);
        let rs1 = inst.rs1.map_or(0, |r| self.regs.read(r));
        let rs2 = inst.rs2.map_or(0, |r| self.regs.read(r));
        let imm = inst.imm.unwrap_or(0);
        let rd = inst.rd.unwrap_or(0);
        let fallthrough = i64::from(pc) + i64::from(INSTRUCTION_BYTES);

        match inst.opcode {
            Opcode::Nop => {}
            Opcode::La => self.regs.write(rd, imm),
            Opcode::Addi => self.regs.write(rd, Alu::execute(AluOp::Add, rs1, imm)),
            Opcode::Lw => {
                let value = self
                    .memory
                    .read(i64::from(rs1) + i64::from(imm))
                    .map_err(|fault| fault.at(step))?;
                self.regs.write(rd, value);
            }
            Opcode::Sw => self
                .memory
                .write(i64::from(rs1) + i64::from(imm), rs2)
                .map_err(|fault| fault.at(step))?,
            Opcode::Beq | Opcode::Blt => {
                let taken = match sig.branch {
                    Some(BranchCond::Eq) => rs1 == rs2,
                    Some(BranchCond::Lt) => rs1 < rs2,
                    None => false,
                };
                if taken {
                    return self.resolve(inst, pc, step);
                }
            }
            Opcode::Jal => {
                let target = self.resolve(inst, pc, step)?;
                self.regs.write(rd, fallthrough as i32);
                return Ok(target);
            }
            _ => self.regs.write(rd, Alu::execute(sig.alu, rs1, rs2)),
        }
        Ok(fallthrough)
    }

    fn resolve(&self, inst: &Instruction, pc: u32, step: u64) -> Result<i64, SimError> {
        let Some(target) = inst.target.as_ref() else {
            return Ok(i64::from(pc) + i64::from(INSTRUCTION_BYTES));
        };
        self.symbols
            .resolve(target, pc)
            .map_err(|label| SimError::UnresolvedLabel {
                cycle: step,
                label: label.to_string(),
            })
    }

    fn check_target(&self, target: i64, step: u64) -> Result<u32, SimError> {
        let end = (self.lines.len() * INSTRUCTION_BYTES as usize) as i64;
        if (0..=end).contains(&target) && target % i64::from(INSTRUCTION_BYTES) == 0 {
            Ok(target as u32)
        } else {
            Err(SimError::MemoryBounds {
                cycle: step,
                space: AddressSpace::Instruction,
                addr: target,
                limit: end + i64::from(INSTRUCTION_BYTES),
            })
        }
    }

    /// Instructions executed so far.
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Current PC (byte address).
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
}
