use z80table_core::cpu::z80::Z80;
mod common;
use common::{cpu_with, run_instruction};

fn block_cpu(opcode: u8, hl: u16, de: u16, bc: u16) -> Z80 {
    let mut cpu = cpu_with(&[0xED, opcode]);
    cpu.set_hl(hl);
    cpu.set_de(de);
    cpu.set_bc(bc);
    cpu
}

// ============================================================
// LDI
// ============================================================

#[test]
fn test_ldi() {
    let mut cpu = block_cpu(0xA0, 0x1000, 0x2000, 0x0003);
    cpu.f = 0x01; // C set
    cpu.memory.write(0x1000, 0x42);

    let cycles = run_instruction(&mut cpu);
    assert_eq!(cycles, 16, "LDI should be 16 T-states");
    assert_eq!(cpu.memory.read(0x2000), 0x42, "Byte should be transferred");
    assert_eq!(cpu.get_hl(), 0x1001, "HL should be incremented");
    assert_eq!(cpu.get_de(), 0x2001, "DE should be incremented");
    assert_eq!(cpu.get_bc(), 0x0002, "BC should be decremented");
    assert_eq!(cpu.pc, 0x0002);
    assert_eq!(cpu.f & 0x04, 0, "PV should be clear while more bytes remain");
    assert_eq!(cpu.f & 0x02, 0, "N should be clear");
    assert_eq!(cpu.f & 0x10, 0, "H should be clear");
    assert_ne!(cpu.f & 0x01, 0, "C should be preserved");
}

#[test]
fn test_ldi_last_byte_sets_pv() {
    let mut cpu = block_cpu(0xA0, 0x1000, 0x2000, 0x0001);
    cpu.memory.write(0x1000, 0x55);

    run_instruction(&mut cpu);
    assert_eq!(cpu.get_bc(), 0x0000);
    assert_ne!(cpu.f & 0x04, 0, "PV should be set on the step that empties BC");
}

// ============================================================
// LDD
// ============================================================

#[test]
fn test_ldd() {
    let mut cpu = block_cpu(0xA8, 0x1005, 0x2005, 0x0002);
    cpu.memory.write(0x1005, 0xAA);

    let cycles = run_instruction(&mut cpu);
    assert_eq!(cycles, 16);
    assert_eq!(cpu.memory.read(0x2005), 0xAA);
    assert_eq!(cpu.get_hl(), 0x1004, "HL should be decremented");
    assert_eq!(cpu.get_de(), 0x2004, "DE should be decremented");
    assert_eq!(cpu.get_bc(), 0x0001);
}

// ============================================================
// LDIR
// ============================================================

#[test]
fn test_ldir_copies_two_bytes() {
    let mut cpu = block_cpu(0xB0, 0x1000, 0x2000, 0x0002);
    cpu.memory.load(0x1000, &[0x11, 0x22]);

    let cycles = run_instruction(&mut cpu);
    assert_eq!(cycles, 21, "repeating LDIR should be 21 T-states");
    assert_eq!(cpu.pc, 0x0000, "PC should stay on LDIR while BC != 0");
    assert_eq!(cpu.get_bc(), 0x0001);

    let cycles = run_instruction(&mut cpu);
    assert_eq!(cycles, 16, "final LDIR should be 16 T-states");
    assert_eq!(cpu.pc, 0x0002, "PC should advance once BC reaches 0");
    assert_eq!(cpu.get_bc(), 0x0000);
    assert_eq!(cpu.get_hl(), 0x1002);
    assert_eq!(cpu.get_de(), 0x2002);
    assert_eq!(cpu.memory.read_range(0x2000, 2), vec![0x11, 0x22]);
}

#[test]
fn test_ldir_does_not_retrigger() {
    let mut cpu = cpu_with(&[0xED, 0xB0, 0x3E, 0x99]); // LDIR; LD A,0x99
    cpu.set_hl(0x1000);
    cpu.set_de(0x2000);
    cpu.set_bc(0x0002);

    common::run(&mut cpu, 3);
    assert_eq!(cpu.a, 0x99, "the instruction after LDIR should run");
    assert_eq!(cpu.pc, 0x0004);
    assert_eq!(cpu.get_bc(), 0x0000);
}

// ============================================================
// LDDR
// ============================================================

#[test]
fn test_lddr() {
    let mut cpu = block_cpu(0xB8, 0x1002, 0x2002, 0x0003);
    cpu.memory.load(0x1000, &[0x01, 0x02, 0x03]);

    let cycles = common::run(&mut cpu, 3);
    assert_eq!(cycles, 21 + 21 + 16);
    assert_eq!(cpu.memory.read_range(0x2000, 3), vec![0x01, 0x02, 0x03]);
    assert_eq!(cpu.get_hl(), 0x0FFF);
    assert_eq!(cpu.get_de(), 0x1FFF);
    assert_eq!(cpu.pc, 0x0002);
}

// ============================================================
// CPI / CPD
// ============================================================

#[test]
fn test_cpi_match() {
    let mut cpu = block_cpu(0xA1, 0x1000, 0x0000, 0x0005);
    cpu.a = 0x42;
    cpu.f = 0x01; // C set
    cpu.memory.write(0x1000, 0x42);

    let cycles = run_instruction(&mut cpu);
    assert_eq!(cycles, 16);
    assert_ne!(cpu.f & 0x40, 0, "Z should be set on match");
    assert_ne!(cpu.f & 0x02, 0, "N should be set");
    assert_ne!(cpu.f & 0x04, 0, "PV should be set while BC was not 1");
    assert_ne!(cpu.f & 0x01, 0, "C should be preserved");
    assert_eq!(cpu.get_hl(), 0x1001);
    assert_eq!(cpu.get_bc(), 0x0004);
    assert_eq!(cpu.a, 0x42, "A should be unchanged");
}

#[test]
fn test_cpi_no_match_last_byte() {
    let mut cpu = block_cpu(0xA1, 0x1000, 0x0000, 0x0001);
    cpu.a = 0x10;
    cpu.memory.write(0x1000, 0x20);

    run_instruction(&mut cpu);
    assert_eq!(cpu.f & 0x40, 0, "Z should be clear");
    assert_ne!(cpu.f & 0x80, 0, "S should follow 0x10 - 0x20");
    assert_eq!(cpu.f & 0x04, 0, "PV should be clear when BC was 1");
    assert_eq!(cpu.f & 0x01, 0, "C should be preserved (clear)");
}

#[test]
fn test_cpd() {
    let mut cpu = block_cpu(0xA9, 0x1005, 0x0000, 0x0002);
    cpu.a = 0x01;
    cpu.memory.write(0x1005, 0x01);

    run_instruction(&mut cpu);
    assert_ne!(cpu.f & 0x40, 0);
    assert_eq!(cpu.get_hl(), 0x1004, "HL should be decremented");
    assert_eq!(cpu.get_bc(), 0x0001);
}

// ============================================================
// CPIR / CPDR
// ============================================================

#[test]
fn test_cpir_runs_until_bc_exhausted() {
    // A match does not end the search early; only BC does.
    let mut cpu = block_cpu(0xB1, 0x1000, 0x0000, 0x0003);
    cpu.a = 0x33;
    cpu.memory.load(0x1000, &[0x33, 0x00, 0x00]);

    let cycles = run_instruction(&mut cpu);
    assert_eq!(cycles, 21);
    assert_ne!(cpu.f & 0x40, 0, "Z should be set by the match");
    assert_eq!(cpu.pc, 0x0000, "CPIR should repeat even after a match");

    let cycles = common::run(&mut cpu, 2);
    assert_eq!(cycles, 21 + 16);
    assert_eq!(cpu.get_bc(), 0x0000);
    assert_eq!(cpu.get_hl(), 0x1003);
    assert_eq!(cpu.pc, 0x0002);
}

#[test]
fn test_cpdr_timing() {
    let mut cpu = block_cpu(0xB9, 0x1001, 0x0000, 0x0002);
    cpu.a = 0xFF;

    assert_eq!(run_instruction(&mut cpu), 21);
    assert_eq!(run_instruction(&mut cpu), 16);
    assert_eq!(cpu.get_hl(), 0x0FFF);
    assert_eq!(cpu.pc, 0x0002);
}
