//! Textual Instruction Decoder.
//!
//! This module turns one trimmed line of assembly into an [`Instruction`]. It
//! validates the mnemonic and operand count, resolves register names, parses
//! immediates and `offset(base)` memory operands, and resolves `la` labels
//! against the symbol table on the spot.

use crate::common::DecodeError;
use crate::core::arch::SymbolTable;
use crate::isa::abi::parse_register;
use crate::isa::instruction::{Instruction, Opcode, Target};

/// Returns the opcode named by the first token of `line`, if any.
///
/// Used ahead of full decoding, e.g. to hold a second predicted branch in Fetch.
pub fn peek_opcode(line: &str) -> Option<Opcode> {
    line.split_whitespace().next().and_then(Opcode::from_mnemonic)
}

/// Decodes one instruction line.
///
/// # Arguments
///
/// * `line` - Instruction text with comments and labels already stripped.
/// * `symbols` - Program labels, used to resolve `la`.
///
/// # Returns
///
/// The decoded instruction.
///
/// # Errors
///
/// Returns a [`DecodeError`] for an unknown opcode, a wrong operand count, or
/// a malformed operand.
pub fn decode(line: &str, symbols: &SymbolTable) -> Result<Instruction, DecodeError> {
    let line = line.trim();
    let (mnemonic, rest) = line
        .split_once(char::is_whitespace)
        .unwrap_or((line, ""));
    if mnemonic.is_empty() {
        return Err(DecodeError::Empty);
    }
    let opcode = Opcode::from_mnemonic(mnemonic)
        .ok_or_else(|| DecodeError::UnknownOpcode(mnemonic.to_string()))?;
    let ops = operands(rest);

    let mut inst = Instruction::nop();
    inst.opcode = opcode;

    match opcode {
        op if op.is_register_alu() => {
            expect_count(op, &ops, 3)?;
            inst.rd = Some(register(ops[0])?);
            inst.rs1 = Some(register(ops[1])?);
            inst.rs2 = Some(register(ops[2])?);
        }
        Opcode::Addi => {
            expect_count(opcode, &ops, 3)?;
            inst.rd = Some(register(ops[0])?);
            inst.rs1 = Some(register(ops[1])?);
            inst.imm = Some(immediate(ops[2])?);
        }
        Opcode::Lw => {
            expect_count(opcode, &ops, 2)?;
            let (offset, base) = memory_operand(ops[1])?;
            inst.rd = Some(register(ops[0])?);
            inst.rs1 = Some(base);
            inst.imm = Some(offset);
        }
        Opcode::Sw => {
            expect_count(opcode, &ops, 2)?;
            let (offset, base) = memory_operand(ops[1])?;
            inst.rs2 = Some(register(ops[0])?);
            inst.rs1 = Some(base);
            inst.imm = Some(offset);
        }
        Opcode::La => {
            expect_count(opcode, &ops, 2)?;
            let label = ops[1];
            let addr = symbols
                .address_of(label)
                .ok_or_else(|| DecodeError::UnresolvedLabel(label.to_string()))?;
            inst.rd = Some(register(ops[0])?);
            inst.imm = Some(addr);
            inst.target = Some(Target::Label(label.to_string()));
        }
        Opcode::Beq | Opcode::Blt => {
            expect_count(opcode, &ops, 3)?;
            inst.rs1 = Some(register(ops[0])?);
            inst.rs2 = Some(register(ops[1])?);
            inst.target = Some(target(ops[2])?);
        }
        Opcode::Jal => {
            expect_count(opcode, &ops, 2)?;
            inst.rd = Some(register(ops[0])?);
            inst.target = Some(target(ops[1])?);
        }
        _ => expect_count(opcode, &ops, 0)?,
    }

    Ok(inst)
}

/// Splits an operand list on commas and whitespace.
fn operands(rest: &str) -> Vec<&str> {
    rest.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect()
}

const fn expect_count(opcode: Opcode, ops: &[&str], expected: usize) -> Result<(), DecodeError> {
    if ops.len() == expected {
        Ok(())
    } else {
        Err(DecodeError::OperandCount {
            opcode: opcode.mnemonic(),
            expected,
            found: ops.len(),
        })
    }
}

fn register(token: &str) -> Result<usize, DecodeError> {
    parse_register(token).ok_or_else(|| DecodeError::InvalidRegister(token.to_string()))
}

/// Parses a decimal or `0x` hexadecimal immediate, optionally negative.
///
/// Hex literals up to `0xFFFF_FFFF` wrap into the signed 32-bit range.
pub fn parse_immediate(token: &str) -> Option<i32> {
    let (negative, body) = match token.strip_prefix('-') {
        Some(body) => (true, body),
        None => (false, token.strip_prefix('+').unwrap_or(token)),
    };
    let magnitude = if let Some(hex) = body
        .strip_prefix("0x")
        .or_else(|| body.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16).ok()?
    } else {
        if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        body.parse::<i64>().ok()?
    };
    let value = if negative { -magnitude } else { magnitude };
    if (i64::from(i32::MIN)..=i64::from(u32::MAX)).contains(&value) {
        Some(value as i32)
    } else {
        None
    }
}

fn immediate(token: &str) -> Result<i32, DecodeError> {
    parse_immediate(token).ok_or_else(|| DecodeError::InvalidImmediate(token.to_string()))
}

/// Parses `offset(base)`; an empty offset means zero.
fn memory_operand(token: &str) -> Result<(i32, usize), DecodeError> {
    let bad = || DecodeError::InvalidMemoryOperand(token.to_string());
    let (offset, tail) = token.split_once('(').ok_or_else(bad)?;
    let base = tail.strip_suffix(')').ok_or_else(bad)?;
    let offset = if offset.is_empty() {
        0
    } else {
        immediate(offset)?
    };
    Ok((offset, register(base)?))
}

/// Parses a branch target: a numeric instruction offset or a label name.
fn target(token: &str) -> Result<Target, DecodeError> {
    if let Some(offset) = parse_immediate(token) {
        return Ok(Target::Offset(offset));
    }
    let starts_like_number = token
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '+');
    if starts_like_number {
        return Err(DecodeError::InvalidImmediate(token.to_string()));
    }
    Ok(Target::Label(token.to_string()))
}
