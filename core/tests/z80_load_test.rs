use z80table_core::cpu::z80::Z80;
mod common;
use common::{cpu_with, run_instruction};

// ============================================================
// LD r, r'
// ============================================================

#[test]
fn test_ld_b_c() {
    let mut cpu = cpu_with(&[0x41]); // LD B,C
    cpu.c = 0x12;

    let cycles = run_instruction(&mut cpu);
    assert_eq!(cycles, 4, "LD r,r' should be 4 T-states");
    assert_eq!(cpu.b, 0x12);
    assert_eq!(cpu.c, 0x12, "source should be unchanged");
    assert_eq!(cpu.pc, 0x0001);
}

#[test]
fn test_ld_a_a_is_identity() {
    let mut cpu = cpu_with(&[0x7F]); // LD A,A
    cpu.a = 0x5A;
    cpu.f = 0xFF;
    run_instruction(&mut cpu);
    assert_eq!(cpu.a, 0x5A);
    assert_eq!(cpu.f, 0xFF, "loads do not touch flags");
}

// ============================================================
// LD r, n / LD r, (HL)
// ============================================================

#[test]
fn test_ld_r_n() {
    let mut cpu = cpu_with(&[0x3E, 0x42, 0x16, 0x99]); // LD A,0x42; LD D,0x99
    assert_eq!(run_instruction(&mut cpu), 7);
    assert_eq!(cpu.a, 0x42);
    assert_eq!(cpu.pc, 0x0002);

    run_instruction(&mut cpu);
    assert_eq!(cpu.d, 0x99);
    assert_eq!(cpu.pc, 0x0004);
}

#[test]
fn test_ld_r_hl() {
    let mut cpu = cpu_with(&[0x7E]); // LD A,(HL)
    cpu.set_hl(0x1000);
    cpu.memory.write(0x1000, 0x99);

    assert_eq!(run_instruction(&mut cpu), 7);
    assert_eq!(cpu.a, 0x99);
}

#[test]
fn test_ld_hl_r_and_hl_n() {
    let mut cpu = cpu_with(&[0x70, 0x23, 0x36, 0xAB]); // LD (HL),B; INC HL; LD (HL),0xAB
    cpu.set_hl(0x3000);
    cpu.b = 0x77;

    assert_eq!(run_instruction(&mut cpu), 7);
    assert_eq!(cpu.memory.read(0x3000), 0x77);
    run_instruction(&mut cpu);
    assert_eq!(run_instruction(&mut cpu), 10);
    assert_eq!(cpu.memory.read(0x3001), 0xAB);
}

// ============================================================
// Indexed
// ============================================================

#[test]
fn test_ld_r_ix_negative_displacement() {
    let mut cpu = cpu_with(&[0xDD, 0x46, 0xFE]); // LD B,(IX-2)
    cpu.ix = 0x1002;
    cpu.memory.write(0x1000, 0x55);

    assert_eq!(run_instruction(&mut cpu), 19);
    assert_eq!(cpu.b, 0x55);
    assert_eq!(cpu.pc, 0x0003);
}

#[test]
fn test_ld_iy_d_r() {
    let mut cpu = cpu_with(&[0xFD, 0x77, 0x10]); // LD (IY+0x10),A
    cpu.iy = 0x4000;
    cpu.a = 0xC3;

    run_instruction(&mut cpu);
    assert_eq!(cpu.memory.read(0x4010), 0xC3);
}

#[test]
fn test_ld_iy_d_n() {
    let mut cpu = cpu_with(&[0xFD, 0x36, 0x05, 0xAB]); // LD (IY+5),0xAB
    cpu.iy = 0x2000;

    assert_eq!(run_instruction(&mut cpu), 19);
    assert_eq!(cpu.memory.read(0x2005), 0xAB);
    assert_eq!(cpu.pc, 0x0004);
}

// ============================================================
// Accumulator loads
// ============================================================

#[test]
fn test_ld_a_bc() {
    let mut cpu = cpu_with(&[0x0A]); // LD A,(BC)
    cpu.set_bc(0x1000);
    cpu.memory.write(0x1000, 0x55);

    run_instruction(&mut cpu);
    assert_eq!(cpu.a, 0x55);
    assert_eq!(cpu.pc, 0x0001, "PC should advance by the instruction size");
}

#[test]
fn test_ld_de_a() {
    let mut cpu = cpu_with(&[0x12]); // LD (DE),A
    cpu.set_de(0x8000);
    cpu.a = 0x3C;
    run_instruction(&mut cpu);
    assert_eq!(cpu.memory.read(0x8000), 0x3C);
}

#[test]
fn test_ld_a_nn_and_nn_a() {
    let mut cpu = cpu_with(&[0x3A, 0x34, 0x12, 0x32, 0x00, 0x20]); // LD A,(0x1234); LD (0x2000),A
    cpu.memory.write(0x1234, 0x77);

    assert_eq!(run_instruction(&mut cpu), 13);
    assert_eq!(cpu.a, 0x77);
    assert_eq!(run_instruction(&mut cpu), 13);
    assert_eq!(cpu.memory.read(0x2000), 0x77);
    assert_eq!(cpu.pc, 0x0006);
}

// ============================================================
// I and R
// ============================================================

#[test]
fn test_ld_a_i_copies_iff2() {
    let mut cpu = cpu_with(&[0xED, 0x57]); // LD A,I
    cpu.i = 0x80;
    cpu.iff2 = true;
    cpu.f = 0x01;

    assert_eq!(run_instruction(&mut cpu), 9);
    assert_eq!(cpu.a, 0x80);
    assert_ne!(cpu.f & 0x80, 0, "S should follow bit 7");
    assert_eq!(cpu.f & 0x40, 0, "Z should be clear");
    assert_ne!(cpu.f & 0x04, 0, "PV should copy IFF2");
    assert_eq!(cpu.f & 0x12, 0, "H and N should be clear");
    assert_ne!(cpu.f & 0x01, 0, "C should be preserved");
}

#[test]
fn test_ld_i_a() {
    let mut cpu = cpu_with(&[0xED, 0x47]); // LD I,A
    cpu.a = 0x3F;
    run_instruction(&mut cpu);
    assert_eq!(cpu.i, 0x3F);
}

#[test]
fn test_ld_a_r_sees_refresh() {
    let mut cpu = cpu_with(&[0x00, 0xED, 0x5F]); // NOP; LD A,R
    run_instruction(&mut cpu);
    assert_eq!(cpu.r, 1, "one opcode fetch");
    run_instruction(&mut cpu);
    assert_eq!(cpu.a, 3, "ED 5F counts two fetches before it reads R");
}

#[test]
fn test_refresh_keeps_bit_seven() {
    let mut cpu = cpu_with(&[0xED, 0x4F, 0x00]); // LD R,A; NOP
    cpu.a = 0xFF;
    run_instruction(&mut cpu);
    assert_eq!(cpu.r, 0xFF);
    run_instruction(&mut cpu);
    assert_eq!(cpu.r, 0x80, "low seven bits wrap, bit 7 is kept");
}

// ============================================================
// 16-bit loads
// ============================================================

#[test]
fn test_ld_dd_nn() {
    let mut cpu = cpu_with(&[0x01, 0x34, 0x12, 0x31, 0x00, 0xF0]); // LD BC,0x1234; LD SP,0xF000
    assert_eq!(run_instruction(&mut cpu), 10);
    assert_eq!(cpu.get_bc(), 0x1234);
    run_instruction(&mut cpu);
    assert_eq!(cpu.sp, 0xF000);
}

#[test]
fn test_ld_ix_nn() {
    let mut cpu = cpu_with(&[0xDD, 0x21, 0x78, 0x56]); // LD IX,0x5678
    assert_eq!(run_instruction(&mut cpu), 14);
    assert_eq!(cpu.ix, 0x5678);
    assert_eq!(cpu.pc, 0x0004);
}

#[test]
fn test_ld_hl_from_memory() {
    let mut cpu = cpu_with(&[0x2A, 0x00, 0x20]); // LD HL,(0x2000)
    cpu.memory.load(0x2000, &[0x34, 0x12]);

    assert_eq!(run_instruction(&mut cpu), 16);
    assert_eq!(cpu.get_hl(), 0x1234);
}

#[test]
fn test_ld_nn_de() {
    let mut cpu = cpu_with(&[0xED, 0x53, 0x00, 0x30]); // LD (0x3000),DE
    cpu.set_de(0xBEEF);

    assert_eq!(run_instruction(&mut cpu), 20);
    assert_eq!(cpu.memory.read(0x3000), 0xEF);
    assert_eq!(cpu.memory.read(0x3001), 0xBE);
    assert_eq!(cpu.pc, 0x0004);
}

#[test]
fn test_ld_sp_from_memory() {
    let mut cpu = cpu_with(&[0xED, 0x7B, 0x10, 0x00]); // LD SP,(0x0010)
    cpu.memory.load(0x0010, &[0xFE, 0xCA]);
    run_instruction(&mut cpu);
    assert_eq!(cpu.sp, 0xCAFE);
}

#[test]
fn test_ld_iy_round_trip_through_memory() {
    let mut cpu = cpu_with(&[0xFD, 0x22, 0x00, 0x40, 0xDD, 0x2A, 0x00, 0x40]); // LD (0x4000),IY; LD IX,(0x4000)
    cpu.iy = 0x1357;
    run_instruction(&mut cpu);
    run_instruction(&mut cpu);
    assert_eq!(cpu.ix, 0x1357);
}

#[test]
fn test_ld_sp_hl_and_ix() {
    let mut cpu = cpu_with(&[0xF9, 0xDD, 0xF9]); // LD SP,HL; LD SP,IX
    cpu.set_hl(0x1111);
    cpu.ix = 0x2222;

    assert_eq!(run_instruction(&mut cpu), 6);
    assert_eq!(cpu.sp, 0x1111);
    assert_eq!(run_instruction(&mut cpu), 10);
    assert_eq!(cpu.sp, 0x2222);
}

#[test]
fn test_load_does_not_disturb_other_registers() {
    let mut cpu = cpu_with(&[0x0A]);
    cpu.set_bc(0x1000);
    let before: Z80 = cpu.clone();
    run_instruction(&mut cpu);
    assert_eq!(cpu.get_bc(), before.get_bc());
    assert_eq!(cpu.get_de(), before.get_de());
    assert_eq!(cpu.get_hl(), before.get_hl());
    assert_eq!(cpu.sp, before.sp);
}
