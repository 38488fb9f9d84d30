//! CPU state snapshot types and traits

use serde::Serialize;

use crate::cpu::z80::{flag_letters, flag_letters_parity};

/// Trait for CPU types that can provide state snapshots
pub trait CpuStateTrait {
    type Snapshot;
    fn snapshot(&self) -> Self::Snapshot;
}

/// Z80 CPU state snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Z80State {
    pub a: u8,       // Accumulator
    pub f: u8,       // Flags register
    pub b: u8,       // Register B
    pub c: u8,       // Register C
    pub d: u8,       // Register D
    pub e: u8,       // Register E
    pub h: u8,       // Register H
    pub l: u8,       // Register L
    pub a_prime: u8, // Alternate accumulator
    pub f_prime: u8, // Alternate flags
    pub b_prime: u8, // Alternate B
    pub c_prime: u8, // Alternate C
    pub d_prime: u8, // Alternate D
    pub e_prime: u8, // Alternate E
    pub h_prime: u8, // Alternate H
    pub l_prime: u8, // Alternate L
    pub ix: u16,     // Index register X
    pub iy: u16,     // Index register Y
    pub sp: u16,     // Stack pointer
    pub pc: u16,     // Program counter
    pub i: u8,       // Interrupt vector register
    pub r: u8,       // Memory refresh register
    pub iff1: bool,  // Interrupt flip-flop 1
    pub iff2: bool,  // Interrupt flip-flop 2
    pub im: u8,      // Interrupt mode (0, 1, 2)
    pub halted: bool,
}

impl Z80State {
    pub fn af(&self) -> u16 { ((self.a as u16) << 8) | self.f as u16 }
    pub fn bc(&self) -> u16 { ((self.b as u16) << 8) | self.c as u16 }
    pub fn de(&self) -> u16 { ((self.d as u16) << 8) | self.e as u16 }
    pub fn hl(&self) -> u16 { ((self.h as u16) << 8) | self.l as u16 }

    /// Set flags as letters in "SZ5H3VNC" order.
    pub fn flag_letters(&self) -> String {
        flag_letters(self.f)
    }

    /// Same bits with `P` for bit 2, in "SZ5H3PNC" order.
    pub fn flag_letters_parity(&self) -> String {
        flag_letters_parity(self.f)
    }
}
