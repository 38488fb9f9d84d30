pub mod config;
pub mod core;
pub mod cpu;
pub mod error;
pub mod listing;

pub mod prelude {
    pub use crate::config::CpuConfig;
    pub use crate::core::Memory;
    pub use crate::cpu::{Cpu, CpuStateTrait, Z80, Z80State};
    pub use crate::cpu::z80::{Flag, Flow, Instruction, OpcodeTable};
    pub use crate::error::{Result, Z80Error};
    pub use crate::listing::Listing;
}
