//! Data Memory Pipeline Tests.
//!
//! Loads, stores and `la` through the full pipeline, including the data
//! image laid out by the assembler.

use pipesim_core::config::Preset;
use pipesim_core::trace::WriteEffect;
use pretty_assertions::assert_eq;

use crate::common::harness::{TestContext, reg};

const ARRAY: &str = "\
.data
val: .word 42
arr: .word 0, 0
.text
la x5, val
lw x6, 0(x5)
addi x7, x6, 10
la x8, arr
sw x7, 1(x8)
lw x9, 1(x8)
";

#[test]
fn load_store_through_data_labels() {
    let state = TestContext::preset(Preset::HazardControl).run(ARRAY);

    assert_eq!(reg(&state, 5), 0);
    assert_eq!(reg(&state, 6), 42);
    assert_eq!(reg(&state, 7), 52);
    assert_eq!(reg(&state, 8), 1);
    assert_eq!(reg(&state, 9), 52);
    assert_eq!(&state.memory[..3], &[42, 0, 52]);
    assert_eq!(state.stats.inst_la, 2);
    assert_eq!(state.stats.inst_load, 2);
    assert_eq!(state.stats.inst_store, 1);
}

#[test]
fn store_commit_is_traced_as_memory_write() {
    let ctx = TestContext::new();
    let (_, records) = ctx.run_traced("addi x1, x0, 5\nnop\nnop\nnop\nsw x1, 3(x0)");
    let writes: Vec<WriteEffect> = records
        .iter()
        .filter_map(|r| r.commit.as_ref().and_then(|c| c.write))
        .collect();
    assert_eq!(
        writes,
        vec![
            WriteEffect::Register { reg: 1, value: 5 },
            WriteEffect::Memory { addr: 3, value: 5 },
        ]
    );
}

#[test]
fn memory_order_holds_without_hazard_control() {
    // Stores and loads both touch memory at commit, so program order is kept.
    let source = "addi x1, x0, 7\nnop\nnop\nnop\nsw x1, 3(x0)\nlw x2, 3(x0)";
    let state = TestContext::preset(Preset::Naive).run(source);
    assert_eq!(reg(&state, 2), 7);
    assert_eq!(state.memory[3], 7);
}

#[test]
fn load_result_is_forwarded_only_by_stalling() {
    let source = "\
.data
v: .word 11
.text
lw x1, 0(x0)
addi x2, x1, 1
";
    let naive = TestContext::preset(Preset::Naive).run(source);
    assert_eq!(reg(&naive, 2), 1);

    let controlled = TestContext::preset(Preset::HazardControl).run(source);
    assert_eq!(reg(&controlled, 2), 12);
}

#[test]
fn data_image_fills_memory_from_word_zero() {
    let source = "\
.data
msg: .string \"hi\"
pad: .space 2
n: .word -3
.text
la x1, n
lw x2, 0(x1)
";
    let state = TestContext::new().run(source);
    assert_eq!(&state.memory[..6], &[104, 105, 0, 0, 0, -3]);
    assert_eq!(reg(&state, 1), 5);
    assert_eq!(reg(&state, 2), -3);
}

#[test]
fn configured_memory_size_is_respected() {
    let ctx = TestContext::new().with_config(|c| c.memory.data_words = 16);
    let state = ctx.run("sw x0, 15(x0)");
    assert_eq!(state.memory.len(), 16);
    assert!(ctx.try_run("sw x0, 16(x0)").is_err());
}
