//! Pipeline vs. Sequential Interpreter.
//!
//! With hazard control on, every predictor setting must reach the same
//! registers and memory as one-at-a-time execution. Programs are generated
//! with forward-only control flow so they always terminate, and may contain
//! invalid lines that an unconditional jump always skips.

use pipesim_core::config::{BranchPredictorKind, Preset};
use pipesim_core::sim::{Program, assemble};
use proptest::prelude::*;

use crate::common::harness::TestContext;

#[derive(Clone, Debug)]
enum Op {
    Alu(&'static str, usize, usize, usize),
    Addi(usize, usize, i32),
    Lw(usize, i32),
    Sw(usize, i32),
    Branch(&'static str, usize, usize, usize),
    Jal(usize, usize),
    Nop,
    /// `jal` over lines that must never take effect.
    Skip(Vec<&'static str>),
}

/// Lines that fault if they ever commit.
const JUNK: [&str; 5] = [
    "bogus x1, x2",
    "la x3, nowhere",
    "jal x0, nowhere",
    "beq x0, x0, 999",
    "add x1, x2",
];


fn reg() -> impl Strategy<Value = usize> {
    0usize..8
}

fn op() -> impl Strategy<Value = Op> {
    let alu = prop::sample::select(vec!["add", "sub", "and", "or", "xor", "slt", "mul", "div"]);
    prop_oneof![
        4 => (alu, reg(), reg(), reg()).prop_map(|(m, d, a, b)| Op::Alu(m, d, a, b)),
        4 => (reg(), reg(), -20i32..20).prop_map(|(d, a, i)| Op::Addi(d, a, i)),
        2 => (reg(), 0i32..16).prop_map(|(d, off)| Op::Lw(d, off)),
        2 => (reg(), 0i32..16).prop_map(|(s, off)| Op::Sw(s, off)),
        2 => (prop::sample::select(vec!["beq", "blt"]), reg(), reg(), 0usize..8)
            .prop_map(|(m, a, b, k)| Op::Branch(m, a, b, k)),
        1 => (reg(), 0usize..8).prop_map(|(d, k)| Op::Jal(d, k)),
        1 => Just(Op::Nop),
        1 => prop::collection::vec(prop::sample::select(JUNK.to_vec()), 1..3).prop_map(Op::Skip),
    ]
}

/// Renders ops as source. Branch and jump targets are clamped to the start
/// of a later op or the program end, so they never land inside a skipped block.
fn render(ops: &[Op]) -> String {
    let mut starts = Vec::with_capacity(ops.len());
    let mut len = 0;
    for op in ops {
        starts.push(len);
        len += match op {
            Op::Skip(junk) => 1 + junk.len(),
            _ => 1,
        };
    }
    let landings: Vec<usize> = starts.iter().copied().chain([len]).collect();

    ops.iter()
        .zip(&starts)
        .map(|(op, &i)| {
            let fwd = |k: usize| {
                let later: Vec<usize> = landings.iter().copied().filter(|&t| t > i).collect();
                later[k % later.len()] - i
            };
            match op {
                Op::Alu(m, d, a, b) => format!("{m} x{d}, x{a}, x{b}"),
                Op::Addi(d, a, imm) => format!("addi x{d}, x{a}, {imm}"),
                Op::Lw(d, off) => format!("lw x{d}, {off}(x0)"),
                Op::Sw(s, off) => format!("sw x{s}, {off}(x0)"),
                Op::Branch(m, a, b, k) => format!("{m} x{a}, x{b}, {}", fwd(*k)),
                Op::Jal(d, k) => format!("jal x{d}, {}", fwd(*k)),
                Op::Nop => "nop".to_string(),
                Op::Skip(junk) => std::iter::once(format!("jal x0, {}", junk.len() + 1))
                    .chain(junk.iter().map(ToString::to_string))
                    .collect::<Vec<_>>()
                    .join("\n"),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn program() -> impl Strategy<Value = (String, Program)> {
    prop::collection::vec(op(), 1..24).prop_map(|ops| {
        let source = render(&ops);
        let program = assemble(&source).unwrap();
        (source, program)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn hazard_controlled_runs_match_reference((source, program) in program()) {
        let reference = TestContext::new().reference(&program);
        let expected_regs = reference.registers().snapshot();
        let expected_mem = reference.memory().as_slice().to_vec();

        let contexts = [
            TestContext::preset(Preset::HazardControl),
            TestContext::preset(Preset::PredictedHazardControl),
            TestContext::preset(Preset::HazardControl)
                .with_predictor(BranchPredictorKind::AlwaysNotTaken),
        ];
        for ctx in contexts {
            let state = ctx.run(&source);
            prop_assert_eq!(&state.registers, &expected_regs, "{}", source);
            prop_assert_eq!(&state.memory, &expected_mem, "{}", source);
        }
    }

    #[test]
    fn x0_is_zero_under_every_preset((source, _program) in program()) {
        // Skipped lines never fault, even without hazard control.
        for preset in Preset::ALL {
            let state = TestContext::preset(preset).run(&source);
            prop_assert_eq!(state.registers[0], 0);
        }
    }
}
