//! Reset-time configuration for a [`Z80`](crate::cpu::z80::Z80).

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Values applied by `Z80::with_config` and on every `reset`.
///
/// ```toml
/// pc = 0x0100
/// sp = 0xF000
/// memory_fill = 0x00
/// registers = 0xFF
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    pub pc: u16,          // Reset program counter
    pub sp: u16,          // Reset stack pointer
    pub memory_fill: u8,  // Byte every memory cell holds after reset
    pub registers: u8,    // Initial value of the 8-bit general registers
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            pc: 0x0000,
            sp: 0xFFFF,
            memory_fill: 0x00,
            registers: 0x00,
        }
    }
}

impl CpuConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
