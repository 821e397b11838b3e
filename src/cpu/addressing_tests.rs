use super::*;

#[test]
fn test_zero_page_addressing() {
    let (mut cpu, mut bus) = setup_cpu();
    bus.write_u8(0x42, 0xAB);

    // LDA $42
    bus.load_program(&[0xA5, 0x42], 0x8000);
    let cycles = cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.a, 0xAB);
    assert_eq!(cycles, 3);
}

#[test]
fn test_zero_page_x_addressing() {
    let (mut cpu, mut bus) = setup_cpu();
    cpu.x = 0x10;
    bus.write_u8(0x52, 0xCD); // 0x42 + 0x10

    // LDA $42,X
    bus.load_program(&[0xB5, 0x42], 0x8000);
    let cycles = cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.a, 0xCD);
    assert_eq!(cycles, 4);
}

#[test]
fn test_zero_page_x_wraparound() {
    let (mut cpu, mut bus) = setup_cpu();
    cpu.x = 0xFF;
    bus.write_u8(0x41, 0xEF); // (0x42 + 0xFF) & 0xFF
    bus.write_u8(0x0141, 0x11);

    bus.load_program(&[0xB5, 0x42], 0x8000);
    cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.a, 0xEF);
}

#[test]
fn test_zero_page_y_addressing() {
    let (mut cpu, mut bus) = setup_cpu();
    cpu.y = 0x05;
    bus.write_u8(0x15, 0x77);

    // LDX $10,Y
    bus.load_program(&[0xB6, 0x10], 0x8000);
    let cycles = cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.x, 0x77);
    assert_eq!(cycles, 4);
}

#[test]
fn test_absolute_addressing() {
    let (mut cpu, mut bus) = setup_cpu();
    bus.write_u8(0x1234, 0x99);

    // LDA $1234
    bus.load_program(&[0xAD, 0x34, 0x12], 0x8000);
    let cycles = cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.a, 0x99);
    assert_eq!(cpu.pc, 0x8003);
    assert_eq!(cycles, 4);
}

#[test]
fn test_absolute_x_page_cross_costs_one_cycle() {
    // Same instruction, same index; only the base differs.
    let (mut cpu, mut bus) = setup_cpu();
    cpu.x = 0x10;
    bus.write_u8(0x1220, 0x01);
    bus.write_u8(0x1300, 0x02);
    bus.load_program(&[0xBD, 0x10, 0x12, 0xBD, 0xF0, 0x12], 0x8000);

    let no_cross = cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.a, 0x01);
    let cross = cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.a, 0x02);

    assert_eq!(no_cross, 4);
    assert_eq!(cross, no_cross + 1);
}

#[test]
fn test_absolute_y_page_cross_costs_one_cycle() {
    let (mut cpu, mut bus) = setup_cpu();
    cpu.y = 0x01;
    bus.write_u8(0x2100, 0x5A);

    // LDA $20FF,Y
    bus.load_program(&[0xB9, 0xFF, 0x20], 0x8000);
    assert_eq!(cpu.step(&mut bus).unwrap(), 5);
    assert_eq!(cpu.a, 0x5A);
}

#[test]
fn test_store_absolute_x_has_fixed_cost() {
    let (mut cpu, mut bus) = setup_cpu();
    cpu.x = 0x10;
    cpu.a = 0x3C;

    // STA $12F0,X crosses a page but always takes 5 cycles.
    bus.load_program(&[0x9D, 0xF0, 0x12, 0x9D, 0x00, 0x12], 0x8000);
    assert_eq!(cpu.step(&mut bus).unwrap(), 5);
    assert_eq!(cpu.step(&mut bus).unwrap(), 5);
    assert_eq!(bus.memory[0x1300], 0x3C);
    assert_eq!(bus.memory[0x1210], 0x3C);
}

#[test]
fn test_read_modify_write_absolute_x_has_fixed_cost() {
    let (mut cpu, mut bus) = setup_cpu();
    cpu.x = 0x01;
    bus.write_u8(0x1300, 0x40);

    // ASL $12FF,X
    bus.load_program(&[0x1E, 0xFF, 0x12], 0x8000);
    assert_eq!(cpu.step(&mut bus).unwrap(), 7);
    assert_eq!(bus.memory[0x1300], 0x80);
}

#[test]
fn test_absolute_x_wraps_at_top_of_memory() {
    let (mut cpu, mut bus) = setup_cpu();
    cpu.x = 0x02;
    bus.write_u8(0x0001, 0x66);

    // LDA $FFFF,X
    bus.load_program(&[0xBD, 0xFF, 0xFF], 0x8000);
    assert_eq!(cpu.step(&mut bus).unwrap(), 5);
    assert_eq!(cpu.a, 0x66);
}

#[test]
fn test_indexed_indirect_x() {
    let (mut cpu, mut bus) = setup_cpu();
    cpu.x = 0x04;
    bus.write_u8(0x24, 0x74);
    bus.write_u8(0x25, 0x20);
    bus.write_u8(0x2074, 0xAA);

    // LDA ($20,X)
    bus.load_program(&[0xA1, 0x20], 0x8000);
    let cycles = cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.a, 0xAA);
    assert_eq!(cycles, 6);
}

#[test]
fn test_indexed_indirect_pointer_wraps_in_zero_page() {
    let (mut cpu, mut bus) = setup_cpu();
    cpu.x = 0x00;
    bus.write_u8(0xFF, 0x34);
    bus.write_u8(0x00, 0x12);
    bus.write_u8(0x0100, 0x56);
    bus.write_u8(0x1234, 0xBE);

    // LDA ($FF,X) reads its high byte from $00, not $0100.
    bus.load_program(&[0xA1, 0xFF], 0x8000);
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.a, 0xBE);
}

#[test]
fn test_indirect_indexed_y() {
    let (mut cpu, mut bus) = setup_cpu();
    cpu.y = 0x10;
    bus.write_u8(0x86, 0x28);
    bus.write_u8(0x87, 0x40);
    bus.write_u8(0x4038, 0xBB);

    // LDA ($86),Y
    bus.load_program(&[0xB1, 0x86], 0x8000);
    let cycles = cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.a, 0xBB);
    assert_eq!(cycles, 5);
}

#[test]
fn test_indirect_indexed_y_page_cross() {
    let (mut cpu, mut bus) = setup_cpu();
    cpu.y = 0x10;
    bus.write_u8(0x86, 0xF8);
    bus.write_u8(0x87, 0x40);
    bus.write_u8(0x4108, 0xCC);

    bus.load_program(&[0xB1, 0x86], 0x8000);
    let cycles = cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.a, 0xCC);
    assert_eq!(cycles, 6);
}

#[test]
fn test_jmp_absolute() {
    let (mut cpu, mut bus) = setup_cpu();
    bus.load_program(&[0x4C, 0x34, 0x12], 0x8000);
    assert_eq!(cpu.step(&mut bus).unwrap(), 3);
    assert_eq!(cpu.pc, 0x1234);
}

#[test]
fn test_jmp_indirect() {
    let (mut cpu, mut bus) = setup_cpu();
    bus.write_u8(0x0120, 0xFC);
    bus.write_u8(0x0121, 0xBA);

    // JMP ($0120)
    bus.load_program(&[0x6C, 0x20, 0x01], 0x8000);
    assert_eq!(cpu.step(&mut bus).unwrap(), 5);
    assert_eq!(cpu.pc, 0xBAFC);
}

#[test]
fn test_jmp_indirect_page_wrap_quirk() {
    let (mut cpu, mut bus) = setup_cpu();
    bus.write_u8(0x10FF, 0x34);
    bus.write_u8(0x1000, 0x12);
    bus.write_u8(0x1100, 0x56);

    // JMP ($10FF) takes its high byte from $1000.
    bus.load_program(&[0x6C, 0xFF, 0x10], 0x8000);
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.pc, 0x1234);
}

#[test]
fn test_branch_timing() {
    // Not taken: base cost.
    let (mut cpu, mut bus) = setup_cpu();
    cpu.status.set_zero(true);
    bus.load_program(&[0xD0, 0x10], 0x8000); // BNE +16
    assert_eq!(cpu.step(&mut bus).unwrap(), 2);
    assert_eq!(cpu.pc, 0x8002);

    // Taken, same page: +1.
    let (mut cpu, mut bus) = setup_cpu();
    cpu.status.set_zero(false);
    bus.load_program(&[0xD0, 0x10], 0x8000);
    assert_eq!(cpu.step(&mut bus).unwrap(), 3);
    assert_eq!(cpu.pc, 0x8012);

    // Taken across a page: +2.
    let (mut cpu, mut bus) = setup_cpu();
    cpu.status.set_zero(false);
    bus.load_program(&[0xD0, 0x20], 0x80F0);
    cpu.pc = 0x80F0;
    assert_eq!(cpu.step(&mut bus).unwrap(), 4);
    assert_eq!(cpu.pc, 0x8112);
}

#[test]
fn test_branch_backwards_across_page() {
    let (mut cpu, mut bus) = setup_cpu();
    cpu.status.set_carry(true);
    // BCS -4 at $8100 lands on $80FE.
    bus.load_program(&[0xB0, 0xFC], 0x8100);
    cpu.pc = 0x8100;
    assert_eq!(cpu.step(&mut bus).unwrap(), 4);
    assert_eq!(cpu.pc, 0x80FE);
}

#[test]
fn test_each_branch_condition() {
    // (opcode, flag setter, taken when flag is)
    let cases: [(u8, fn(&mut StatusFlags, bool), bool); 8] = [
        (0x10, StatusFlags::set_negative, false), // BPL
        (0x30, StatusFlags::set_negative, true),  // BMI
        (0x50, StatusFlags::set_overflow, false), // BVC
        (0x70, StatusFlags::set_overflow, true),  // BVS
        (0x90, StatusFlags::set_carry, false),    // BCC
        (0xB0, StatusFlags::set_carry, true),     // BCS
        (0xD0, StatusFlags::set_zero, false),     // BNE
        (0xF0, StatusFlags::set_zero, true),      // BEQ
    ];
    for (opcode, set, taken_when) in cases {
        for flag in [false, true] {
            let (mut cpu, mut bus) = setup_cpu();
            set(&mut cpu.status, flag);
            bus.load_program(&[opcode, 0x04], 0x8000);
            cpu.step(&mut bus).unwrap();
            let expected = if flag == taken_when { 0x8006 } else { 0x8002 };
            assert_eq!(cpu.pc, expected, "opcode {opcode:02X} flag {flag}");
        }
    }
}
