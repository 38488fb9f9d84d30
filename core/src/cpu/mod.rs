use crate::error::Result;

/// Generic CPU interface
pub trait Cpu: CpuStateTrait {
    /// Restore the configured power-on state
    fn reset(&mut self);

    /// Run one instruction, returning the T-states it took
    fn step(&mut self) -> Result<u32>;

    /// Current program counter
    fn pc(&self) -> u16;

    /// Query if CPU is halted internally (HALT instruction)
    fn is_sleeping(&self) -> bool;
}

// Re-export state types
pub mod state;
pub use state::{CpuStateTrait, Z80State};

// Z80 CPU
pub mod z80;
pub use z80::Z80;
