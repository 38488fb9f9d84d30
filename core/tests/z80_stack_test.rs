mod common;
use common::{cpu_with, run_instruction};

// ============================================================
// PUSH / POP
// ============================================================

#[test]
fn test_push_bc_pop_de() {
    let mut cpu = cpu_with(&[0xC5, 0xD1]); // PUSH BC; POP DE
    cpu.sp = 0x8000;
    cpu.set_bc(0xBEEF);

    assert_eq!(run_instruction(&mut cpu), 11, "PUSH qq should be 11 T-states");
    assert_eq!(cpu.sp, 0x7FFE);
    assert_eq!(cpu.memory.read(0x7FFF), 0xBE, "high byte at SP-1");
    assert_eq!(cpu.memory.read(0x7FFE), 0xEF, "low byte at SP-2");

    assert_eq!(run_instruction(&mut cpu), 10, "POP qq should be 10 T-states");
    assert_eq!(cpu.get_de(), 0xBEEF);
    assert_eq!(cpu.sp, 0x8000);
}

#[test]
fn test_push_pop_af() {
    let mut cpu = cpu_with(&[0xF5, 0xC1]); // PUSH AF; POP BC
    cpu.sp = 0x9000;
    cpu.a = 0x12;
    cpu.f = 0xD7;

    run_instruction(&mut cpu);
    run_instruction(&mut cpu);
    assert_eq!(cpu.get_bc(), 0x12D7);
}

#[test]
fn test_push_ix_pop_iy() {
    let mut cpu = cpu_with(&[0xDD, 0xE5, 0xFD, 0xE1]); // PUSH IX; POP IY
    cpu.sp = 0x9000;
    cpu.ix = 0x4321;

    assert_eq!(run_instruction(&mut cpu), 15);
    assert_eq!(run_instruction(&mut cpu), 14);
    assert_eq!(cpu.iy, 0x4321);
    assert_eq!(cpu.pc, 0x0004);
}

#[test]
fn test_push_wraps_below_zero() {
    let mut cpu = cpu_with(&[0xE5]); // PUSH HL
    cpu.sp = 0x0000;
    cpu.set_hl(0xA55A);

    run_instruction(&mut cpu);
    assert_eq!(cpu.sp, 0xFFFE);
    assert_eq!(cpu.memory.read(0xFFFF), 0xA5);
    assert_eq!(cpu.memory.read(0xFFFE), 0x5A);
}

// ============================================================
// Exchange
// ============================================================

#[test]
fn test_ex_de_hl() {
    let mut cpu = cpu_with(&[0xEB]);
    cpu.set_de(0x1111);
    cpu.set_hl(0x2222);

    assert_eq!(run_instruction(&mut cpu), 4);
    assert_eq!(cpu.get_de(), 0x2222);
    assert_eq!(cpu.get_hl(), 0x1111);
}

#[test]
fn test_ex_af_twice_restores() {
    let mut cpu = cpu_with(&[0x08, 0x08]); // EX AF,AF' twice
    cpu.set_af(0x1234);
    cpu.a_prime = 0x56;
    cpu.f_prime = 0x78;

    run_instruction(&mut cpu);
    assert_eq!(cpu.get_af(), 0x5678);
    assert_eq!(cpu.a_prime, 0x12);
    assert_eq!(cpu.f_prime, 0x34);

    run_instruction(&mut cpu);
    assert_eq!(cpu.get_af(), 0x1234);
}

#[test]
fn test_exx() {
    let mut cpu = cpu_with(&[0xD9]);
    cpu.set_bc(0x0102);
    cpu.set_de(0x0304);
    cpu.set_hl(0x0506);
    cpu.b_prime = 0xAA;
    cpu.l_prime = 0xBB;

    run_instruction(&mut cpu);
    assert_eq!(cpu.b, 0xAA);
    assert_eq!(cpu.l, 0xBB);
    assert_eq!(cpu.b_prime, 0x01);
    assert_eq!(cpu.c_prime, 0x02);
    assert_eq!(cpu.h_prime, 0x05);
    assert_eq!(cpu.l_prime, 0x06);
}

#[test]
fn test_ex_sp_hl() {
    let mut cpu = cpu_with(&[0xE3]); // EX (SP),HL
    cpu.sp = 0x8000;
    cpu.memory.load(0x8000, &[0x11, 0x22]);
    cpu.set_hl(0x3344);

    assert_eq!(run_instruction(&mut cpu), 19);
    assert_eq!(cpu.get_hl(), 0x2211);
    assert_eq!(cpu.memory.read(0x8000), 0x44);
    assert_eq!(cpu.memory.read(0x8001), 0x33);
    assert_eq!(cpu.sp, 0x8000, "SP should be unchanged");
}

#[test]
fn test_ex_sp_iy() {
    let mut cpu = cpu_with(&[0xFD, 0xE3]); // EX (SP),IY
    cpu.sp = 0x8000;
    cpu.memory.load(0x8000, &[0xCD, 0xAB]);
    cpu.iy = 0x1234;

    assert_eq!(run_instruction(&mut cpu), 23);
    assert_eq!(cpu.iy, 0xABCD);
    assert_eq!(cpu.memory.read_range(0x8000, 2), vec![0x34, 0x12]);
}
