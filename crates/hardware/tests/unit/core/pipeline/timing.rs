//! Pipeline Timing Tests.
//!
//! Cycle counts for straight-line code, per-opcode Execute latencies, and
//! configured stage latencies.

use pipesim_core::config::Preset;
use pipesim_core::core::pipeline::stage::StageKind;
use pipesim_core::trace::StageStatus;
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::builder::ProgramBuilder;
use crate::common::harness::{TestContext, reg};

fn processing(text: &str, remaining: u32) -> StageStatus {
    StageStatus::Processing {
        text: text.to_string(),
        remaining,
        bubble: false,
    }
}

#[test]
fn single_instruction_takes_six_cycles() {
    let (state, records) = TestContext::new().run_traced("addi x1, x0, 5");
    assert_eq!(state.stats.cycles, 6);
    assert_eq!(records.len(), 6);
    assert_eq!(records[0].pc, 4);
    let committed: Vec<u64> = records
        .iter()
        .filter(|r| r.commit.is_some())
        .map(|r| r.cycle)
        .collect();
    assert_eq!(committed, vec![5]);
    assert!(records[5].stages.iter().all(|s| *s == StageStatus::Idle));
}

#[rstest]
#[case(1)]
#[case(4)]
#[case(12)]
fn independent_instructions_retire_one_per_cycle(#[case] n: usize) {
    let mut builder = ProgramBuilder::new();
    for i in 0..n {
        builder = builder.inst(&format!("addi x{}, x0, {i}", 1 + i % 31));
    }
    let ctx = TestContext::preset(Preset::HazardControl);
    let mut records = Vec::new();
    let state = ctx
        .simulator_for(&builder.build())
        .run(&mut records)
        .unwrap();

    assert_eq!(state.stats.cycles, n as u64 + 5);
    assert_eq!(state.stats.instructions_retired, n as u64);
    for (i, r) in records.iter().filter(|r| r.commit.is_some()).enumerate() {
        assert_eq!(r.cycle, i as u64 + 5);
        assert_eq!(r.commit.as_ref().unwrap().pc, i as u32 * 4);
    }
}

#[test]
fn stages_fill_in_order() {
    let (_, records) = TestContext::new()
        .run_traced("addi x1, x0, 1\naddi x2, x0, 2\naddi x3, x0, 3");
    assert_eq!(
        records[2].stages,
        [
            processing("addi x3, x0, 3", 1),
            processing("addi x2, x0, 2", 1),
            processing("addi x1, x0, 1", 1),
            StageStatus::Idle,
            StageStatus::Idle,
        ]
    );
}

#[rstest]
#[case("mul x1, x0, x0", 8)]
#[case("div x1, x0, x0", 15)]
#[case("lw x1, 0(x0)", 9)]
#[case("sw x0, 0(x0)", 6)]
#[case("nop", 6)]
fn execute_latency_depends_on_opcode(#[case] text: &str, #[case] cycles: u64) {
    let state = TestContext::new().run(text);
    assert_eq!(state.stats.cycles, cycles, "{text}");
}

#[test]
fn divide_by_zero_yields_minus_one() {
    let state = TestContext::new().run("addi x1, x0, 9\ndiv x2, x1, x0");
    assert_eq!(reg(&state, 2), -1);
}

#[test]
fn long_execute_holds_younger_instruction_in_register_read() {
    let ctx = TestContext::new();
    let (state, records) = ctx.run_traced("mul x1, x0, x0\naddi x2, x0, 1");
    assert_eq!(state.stats.cycles, 9);
    assert_eq!(state.stats.stalls_data, 0);

    let rr = |cycle: usize| records[cycle].stages[StageKind::RegisterRead as usize].clone();
    assert_eq!(rr(4), processing("addi x2, x0, 1", 0));
    assert_eq!(rr(5), processing("addi x2, x0, 1", 0));
    assert_eq!(rr(6), StageStatus::Idle);
}

#[test]
fn stage_latency_is_configurable() {
    let ctx = TestContext::new().with_config(|c| c.latency.decode = 2);
    let state = ctx.run("addi x1, x0, 1");
    assert_eq!(state.stats.cycles, 7);

    let ctx = TestContext::new().with_config(|c| c.latency.execute.mul = 5);
    assert_eq!(ctx.run("mul x1, x0, x0").stats.cycles, 10);
}

#[test]
fn cpi_reflects_stalls() {
    let fast = TestContext::new().run("addi x1, x0, 1\naddi x2, x0, 2");
    let slow = TestContext::new().run("addi x1, x0, 1\naddi x2, x1, 2");
    assert!(slow.stats.cpi() > fast.stats.cpi());
    assert!((fast.stats.cpi() - 3.5).abs() < f64::EPSILON);
}
