mod alu;
mod bit;
mod block;
mod branch;
mod general;
mod load_store;
mod shift;
mod stack;

pub mod addressing;
pub mod registers;
pub mod table;
pub mod template;

use std::sync::Arc;

use log::{trace, warn};

use crate::config::CpuConfig;
use crate::core::memory::Memory;
use crate::cpu::{
    Cpu,
    state::{CpuStateTrait, Z80State},
};
use crate::error::Result;

pub use addressing::Location;
pub use registers::{Flag, Reg8, Reg16, Register, flag_letters, flag_letters_parity};
pub use table::{Fetched, Instruction, OpcodeTable};
pub use template::{Arg, Args, Category, Code, Condition, Group, Operand, Slot, Template, Timing};

/// What the cycle does with PC once an operation body returns.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Move PC past the instruction.
    Advance,
    /// Leave PC on the instruction so the next step re-executes it.
    Repeat,
    /// The body already loaded PC.
    Jump,
}

/// Every instruction group, in registration order.
pub const GROUPS: &[Group] = &[
    Group { name: "8 bit load group", templates: load_store::EIGHT_BIT_LOAD },
    Group { name: "16 bit load group", templates: load_store::SIXTEEN_BIT_LOAD },
    Group { name: "exchange group", templates: stack::EXCHANGE },
    Group { name: "block transfer group", templates: block::BLOCK_TRANSFER },
    Group { name: "search group", templates: block::SEARCH },
    Group { name: "8 bit arithmetic group", templates: alu::EIGHT_BIT_ARITHMETIC },
    Group { name: "general purpose group", templates: general::GENERAL_PURPOSE },
    Group { name: "16 bit arithmetic group", templates: alu::SIXTEEN_BIT_ARITHMETIC },
    Group { name: "rotate and shift group", templates: shift::ROTATE_AND_SHIFT },
    Group { name: "bit set reset test group", templates: bit::BIT_SET_RESET_TEST },
    Group { name: "jump group", templates: branch::JUMP },
    Group { name: "call and return group", templates: branch::CALL_AND_RETURN },
];

/// True when `val` has an even number of set bits.
pub fn parity(val: u8) -> bool {
    val.count_ones() % 2 == 0
}

#[derive(Clone)]
pub struct Z80 {
    // Registers
    pub a: u8,
    pub f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    // Alternate Registers
    pub a_prime: u8,
    pub f_prime: u8,
    pub b_prime: u8,
    pub c_prime: u8,
    pub d_prime: u8,
    pub e_prime: u8,
    pub h_prime: u8,
    pub l_prime: u8,
    // Index & Special Registers
    pub ix: u16,
    pub iy: u16,
    pub i: u8,
    pub r: u8,
    pub sp: u16,
    pub pc: u16,

    // Interrupt state, tracked for DI/EI/IM and LD A,I only
    pub iff1: bool,
    pub iff2: bool,
    pub im: u8,
    pub halted: bool,

    pub memory: Memory,

    config: CpuConfig,
    /// `None` runs against the shared standard table.
    table: Option<Arc<OpcodeTable>>,
}

impl Default for Z80 {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Z80 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Z80")
            .field("af", &format_args!("{:04X}", self.get_af()))
            .field("bc", &format_args!("{:04X}", self.get_bc()))
            .field("de", &format_args!("{:04X}", self.get_de()))
            .field("hl", &format_args!("{:04X}", self.get_hl()))
            .field("ix", &format_args!("{:04X}", self.ix))
            .field("iy", &format_args!("{:04X}", self.iy))
            .field("sp", &format_args!("{:04X}", self.sp))
            .field("pc", &format_args!("{:04X}", self.pc))
            .finish()
    }
}

impl Z80 {
    pub fn new() -> Self {
        Self::with_config(CpuConfig::default())
    }

    pub fn with_config(config: CpuConfig) -> Self {
        let mut cpu = Self {
            a: 0,
            f: 0,
            b: 0,
            c: 0,
            d: 0,
            e: 0,
            h: 0,
            l: 0,
            a_prime: 0,
            f_prime: 0,
            b_prime: 0,
            c_prime: 0,
            d_prime: 0,
            e_prime: 0,
            h_prime: 0,
            l_prime: 0,
            ix: 0,
            iy: 0,
            i: 0,
            r: 0,
            sp: 0,
            pc: 0,
            iff1: false,
            iff2: false,
            im: 0,
            halted: false,
            memory: Memory::new(),
            config,
            table: None,
        };
        cpu.apply_config();
        cpu
    }

    /// Run against `table` instead of the standard instruction set.
    pub fn with_table(table: Arc<OpcodeTable>) -> Self {
        let mut cpu = Self::new();
        cpu.table = Some(table);
        cpu
    }

    pub fn config(&self) -> &CpuConfig {
        &self.config
    }

    fn apply_config(&mut self) {
        let v = self.config.registers;
        for reg in [Reg8::A, Reg8::F, Reg8::B, Reg8::C, Reg8::D, Reg8::E, Reg8::H, Reg8::L] {
            self.set_reg8(reg, v);
        }
        self.a_prime = v;
        self.f_prime = v;
        self.b_prime = v;
        self.c_prime = v;
        self.d_prime = v;
        self.e_prime = v;
        self.h_prime = v;
        self.l_prime = v;
        self.ix = 0;
        self.iy = 0;
        self.i = 0;
        self.r = 0;
        self.sp = self.config.sp;
        self.pc = self.config.pc;
        self.iff1 = false;
        self.iff2 = false;
        self.im = 0;
        self.halted = false;
        self.memory.fill(self.config.memory_fill);
    }

    /// The dispatch table this CPU decodes with.
    pub fn table(&self) -> Result<Arc<OpcodeTable>> {
        match &self.table {
            Some(table) => Ok(Arc::clone(table)),
            None => OpcodeTable::standard(),
        }
    }

    /// Decode the instruction at PC without executing it.
    pub fn fetch_next(&self) -> Result<Fetched> {
        self.table()?.fetch(self.pc, |addr| self.memory.read(addr))
    }

    /// One full fetch-decode-execute-advance cycle. Returns the T-states
    /// the instruction took.
    ///
    /// On error the registers and memory are as they were before the call.
    pub fn step(&mut self) -> Result<u32> {
        let instr = self.fetch_next()?;
        trace!("{:04X}  {:<12} {}", self.pc, instr.opcode_text(), instr.assembler);
        if instr.is_undefined() {
            warn!(
                "undefined opcode {:02X} {:02X} at {:04X}, executing as {}",
                self.memory.read(self.pc),
                self.memory.read(self.pc.wrapping_add(1)),
                self.pc,
                instr.assembler
            );
        }

        // R counts M1 cycles and is visible to the instruction being run.
        let r_before = self.r;
        self.refresh(instr.fetches);

        let flow = match instr.execute(self) {
            Ok(flow) => flow,
            Err(err) => {
                self.r = r_before;
                return Err(err);
            }
        };
        if flow == Flow::Advance {
            self.inc_pc(instr.size);
        }
        Ok(instr.timing.cycles(flow))
    }

    /// Increment the low seven bits of R once per opcode fetch.
    fn refresh(&mut self, fetches: u8) {
        let low = self.r.wrapping_add(fetches) & 0x7F;
        self.r = (self.r & 0x80) | low;
    }
}

impl Cpu for Z80 {
    fn reset(&mut self) {
        self.apply_config();
    }

    fn step(&mut self) -> Result<u32> {
        Z80::step(self)
    }

    fn pc(&self) -> u16 {
        self.pc
    }

    fn is_sleeping(&self) -> bool {
        self.halted
    }
}

impl CpuStateTrait for Z80 {
    type Snapshot = Z80State;

    fn snapshot(&self) -> Z80State {
        Z80State {
            a: self.a,
            f: self.f,
            b: self.b,
            c: self.c,
            d: self.d,
            e: self.e,
            h: self.h,
            l: self.l,
            a_prime: self.a_prime,
            f_prime: self.f_prime,
            b_prime: self.b_prime,
            c_prime: self.c_prime,
            d_prime: self.d_prime,
            e_prime: self.e_prime,
            h_prime: self.h_prime,
            l_prime: self.l_prime,
            ix: self.ix,
            iy: self.iy,
            sp: self.sp,
            pc: self.pc,
            i: self.i,
            r: self.r,
            iff1: self.iff1,
            iff2: self.iff2,
            im: self.im,
            halted: self.halted,
        }
    }
}
