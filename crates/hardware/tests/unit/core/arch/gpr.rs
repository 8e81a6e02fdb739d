use pipesim_core::core::arch::RegisterFile;

#[test]
fn x0_is_hardwired_to_zero() {
    let mut regs = RegisterFile::new();
    regs.write(0, 123);
    assert_eq!(regs.read(0), 0);
    assert_eq!(regs.snapshot()[0], 0);
}

#[test]
fn writes_are_visible() {
    let mut regs = RegisterFile::new();
    regs.write(5, -9);
    regs.write(31, i32::MAX);
    assert_eq!(regs.read(5), -9);
    assert_eq!(regs.read(31), i32::MAX);
    assert_eq!(regs.read(6), 0);
}

#[test]
fn dump_lists_every_register() {
    let mut regs = RegisterFile::new();
    regs.write(1, 42);
    let mut out = Vec::new();
    regs.dump(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), 16);
    assert!(text.contains("x1  (  ra) = 42"));
    assert!(text.contains("x31 (  t6) = 0"));
}
