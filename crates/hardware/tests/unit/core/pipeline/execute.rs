//! Execute Stage Tests.
//!
//! Checks the commit package computed for each instruction class, given
//! operand values as `RegisterRead` would deliver them.

use pipesim_core::core::arch::{RegisterFile, SymbolTable};
use pipesim_core::core::pipeline::latches::{CommitPackage, Fault, Operands};
use pipesim_core::core::pipeline::stages::execute::execute;
use pipesim_core::core::pipeline::stages::register_read::read_operands;
use pipesim_core::isa::decode;
use pretty_assertions::assert_eq;

fn symbols() -> SymbolTable {
    let mut table = SymbolTable::new();
    assert!(table.define_text("target", 20));
    assert!(table.define_data("buf", 5));
    table
}

fn ops(text: &str, rs1: i32, rs2: i32) -> Operands {
    Operands {
        inst: decode(text, &symbols()).unwrap(),
        rs1_val: rs1,
        rs2_val: rs2,
    }
}

fn run(text: &str, rs1: i32, rs2: i32, pc: u32) -> CommitPackage {
    execute(&ops(text, rs1, rs2), pc, &symbols()).unwrap()
}

#[test]
fn alu_results_become_register_writes() {
    assert_eq!(
        run("add x3, x1, x2", 5, 8, 0),
        CommitPackage::RegWrite { rd: 3, value: 13 }
    );
    assert_eq!(
        run("addi x3, x1, -10", 5, 0, 0),
        CommitPackage::RegWrite { rd: 3, value: -5 }
    );
    assert_eq!(
        run("div x3, x1, x2", 9, 0, 0),
        CommitPackage::RegWrite { rd: 3, value: -1 }
    );
}

#[test]
fn la_writes_resolved_address() {
    assert_eq!(
        run("la x5, buf", 0, 0, 0),
        CommitPackage::RegWrite { rd: 5, value: 5 }
    );
}

#[test]
fn memory_operations_compute_word_address() {
    assert_eq!(
        run("lw x6, 3(x5)", 10, 0, 0),
        CommitPackage::Load { rd: 6, addr: 13 }
    );
    assert_eq!(
        run("sw x7, -1(x5)", 10, 99, 0),
        CommitPackage::MemWrite { addr: 9, value: 99 }
    );
}

#[test]
fn address_generation_does_not_wrap() {
    assert_eq!(
        run("lw x6, 1(x5)", i32::MAX, 0, 0),
        CommitPackage::Load {
            rd: 6,
            addr: i64::from(i32::MAX) + 1
        }
    );
}

#[test]
fn branch_conditions() {
    assert_eq!(
        run("beq x1, x2, target", 4, 4, 8),
        CommitPackage::Branch {
            taken: true,
            target: 20
        }
    );
    assert_eq!(
        run("beq x1, x2, target", 4, 5, 8),
        CommitPackage::Branch {
            taken: false,
            target: 20
        }
    );
    assert_eq!(
        run("blt x1, x2, -2", -3, 1, 8),
        CommitPackage::Branch {
            taken: true,
            target: 0
        }
    );
}

#[test]
fn jal_links_and_jumps() {
    assert_eq!(
        run("jal ra, target", 0, 0, 12),
        CommitPackage::Jump {
            rd: 1,
            link: 16,
            target: 20
        }
    );
}

#[test]
fn nop_has_no_effect() {
    assert_eq!(run("nop", 0, 0, 0), CommitPackage::Nop);
}

#[test]
fn unknown_branch_label_is_a_fault() {
    let err = execute(&ops("beq x0, x0, elsewhere", 1, 2), 0, &symbols()).unwrap_err();
    assert_eq!(err, Fault::UnresolvedLabel("elsewhere".into()));
}

#[test]
fn unknown_jump_label_is_a_fault() {
    let err = execute(&ops("jal x1, elsewhere", 0, 0), 8, &symbols()).unwrap_err();
    assert_eq!(err, Fault::UnresolvedLabel("elsewhere".into()));
}

#[test]
fn register_read_skips_unused_sources() {
    let mut regs = RegisterFile::new();
    regs.write(1, 11);
    regs.write(2, 22);
    let inst = decode("addi x3, x1, 4", &SymbolTable::new()).unwrap();
    let ops = read_operands(inst, &regs);
    assert_eq!((ops.rs1_val, ops.rs2_val), (11, 0));
}
