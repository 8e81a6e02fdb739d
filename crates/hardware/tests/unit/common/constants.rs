use pipesim_core::common::{
    CYCLES_PER_LINE, DATA_MEMORY_WORDS, INSTRUCTION_BYTES, MIN_CYCLE_CAP, NUM_REGS,
};
use pipesim_core::sim::Simulator;

#[test]
fn architectural_constants() {
    assert_eq!(NUM_REGS, 32);
    assert_eq!(INSTRUCTION_BYTES, 4);
    assert_eq!(DATA_MEMORY_WORDS, 256);
}

#[test]
fn cycle_cap_has_floor() {
    assert_eq!(Simulator::default_cycle_cap(0), MIN_CYCLE_CAP);
    assert_eq!(Simulator::default_cycle_cap(3), MIN_CYCLE_CAP);
}

#[test]
fn cycle_cap_scales_with_program_length() {
    let lines = 100;
    assert_eq!(
        Simulator::default_cycle_cap(lines),
        CYCLES_PER_LINE * (lines as u64 + 1)
    );
    assert!(Simulator::default_cycle_cap(lines) > MIN_CYCLE_CAP);
}
