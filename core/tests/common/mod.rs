#![allow(dead_code)]

use z80table_core::cpu::z80::Z80;

/// CPU with `program` loaded at 0x0000 and PC on its first byte.
pub fn cpu_with(program: &[u8]) -> Z80 {
    let mut cpu = Z80::new();
    cpu.memory.load(0, program);
    cpu
}

/// Execute one instruction and return its T-states.
pub fn run_instruction(cpu: &mut Z80) -> u32 {
    cpu.step().expect("instruction should execute")
}

/// Execute `count` instructions and return the total T-states.
pub fn run(cpu: &mut Z80, count: usize) -> u32 {
    (0..count).map(|_| run_instruction(cpu)).sum()
}
