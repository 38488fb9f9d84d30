use std::fmt;
use std::str::FromStr;

use crate::cpu::z80::Z80;
use crate::error::{Result, Z80Error};

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flag {
    C = 0x01,  // Carry
    N = 0x02,  // Add/Subtract
    PV = 0x04, // Parity/Overflow
    X = 0x08,  // Undocumented bit 3
    H = 0x10,  // Half Carry
    Y = 0x20,  // Undocumented bit 5
    Z = 0x40,  // Zero
    S = 0x80,  // Sign
}

impl Flag {
    /// Display order, most significant bit first.
    pub const ALL: [Flag; 8] = [
        Flag::S,
        Flag::Z,
        Flag::Y,
        Flag::H,
        Flag::X,
        Flag::PV,
        Flag::N,
        Flag::C,
    ];

    pub fn letter(self) -> char {
        match self {
            Flag::S => 'S',
            Flag::Z => 'Z',
            Flag::Y => '5',
            Flag::H => 'H',
            Flag::X => '3',
            Flag::PV => 'V',
            Flag::N => 'N',
            Flag::C => 'C',
        }
    }
}

/// Letters of the flags set in `f`, in "SZ5H3VNC" order.
pub fn flag_letters(f: u8) -> String {
    letters(f, 'V')
}

/// Letters of the flags set in `f`, in "SZ5H3PNC" order.
pub fn flag_letters_parity(f: u8) -> String {
    letters(f, 'P')
}

fn letters(f: u8, pv: char) -> String {
    Flag::ALL
        .iter()
        .filter(|&&flag| f & flag as u8 != 0)
        .map(|&flag| if flag == Flag::PV { pv } else { flag.letter() })
        .collect()
}

/// 8-bit registers of the main set plus I and R.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Reg8 {
    A,
    F,
    B,
    C,
    D,
    E,
    H,
    L,
    I,
    R,
}

/// 16-bit registers: the four pair views plus IX, IY, SP and PC.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Reg16 {
    AF,
    BC,
    DE,
    HL,
    IX,
    IY,
    SP,
    PC,
}

impl Reg16 {
    pub fn is_index(self) -> bool {
        matches!(self, Reg16::IX | Reg16::IY)
    }
}

/// Any register name accepted by [`Z80::get`] and [`Z80::set`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Register {
    Byte(Reg8),
    Word(Reg16),
}

impl fmt::Display for Reg8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reg8::A => "A",
            Reg8::F => "F",
            Reg8::B => "B",
            Reg8::C => "C",
            Reg8::D => "D",
            Reg8::E => "E",
            Reg8::H => "H",
            Reg8::L => "L",
            Reg8::I => "I",
            Reg8::R => "R",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Reg16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reg16::AF => "AF",
            Reg16::BC => "BC",
            Reg16::DE => "DE",
            Reg16::HL => "HL",
            Reg16::IX => "IX",
            Reg16::IY => "IY",
            Reg16::SP => "SP",
            Reg16::PC => "PC",
        };
        f.write_str(name)
    }
}

impl FromStr for Register {
    type Err = Z80Error;

    fn from_str(s: &str) -> Result<Self> {
        let reg = match s.trim().to_ascii_uppercase().as_str() {
            "A" => Register::Byte(Reg8::A),
            "F" => Register::Byte(Reg8::F),
            "B" => Register::Byte(Reg8::B),
            "C" => Register::Byte(Reg8::C),
            "D" => Register::Byte(Reg8::D),
            "E" => Register::Byte(Reg8::E),
            "H" => Register::Byte(Reg8::H),
            "L" => Register::Byte(Reg8::L),
            "I" => Register::Byte(Reg8::I),
            "R" => Register::Byte(Reg8::R),
            "AF" => Register::Word(Reg16::AF),
            "BC" => Register::Word(Reg16::BC),
            "DE" => Register::Word(Reg16::DE),
            "HL" => Register::Word(Reg16::HL),
            "IX" => Register::Word(Reg16::IX),
            "IY" => Register::Word(Reg16::IY),
            "SP" => Register::Word(Reg16::SP),
            "PC" => Register::Word(Reg16::PC),
            _ => return Err(Z80Error::operand(s, "unknown register name")),
        };
        Ok(reg)
    }
}

impl FromStr for Flag {
    type Err = Z80Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "S" => Ok(Flag::S),
            "Z" => Ok(Flag::Z),
            "5" => Ok(Flag::Y),
            "H" => Ok(Flag::H),
            "3" => Ok(Flag::X),
            "P" | "V" => Ok(Flag::PV),
            "N" => Ok(Flag::N),
            "C" => Ok(Flag::C),
            _ => Err(Z80Error::operand(s, "unknown flag name")),
        }
    }
}

impl Z80 {
    pub fn get_bc(&self) -> u16 { ((self.b as u16) << 8) | self.c as u16 }
    pub fn set_bc(&mut self, val: u16) { self.b = (val >> 8) as u8; self.c = val as u8; }

    pub fn get_de(&self) -> u16 { ((self.d as u16) << 8) | self.e as u16 }
    pub fn set_de(&mut self, val: u16) { self.d = (val >> 8) as u8; self.e = val as u8; }

    pub fn get_hl(&self) -> u16 { ((self.h as u16) << 8) | self.l as u16 }
    pub fn set_hl(&mut self, val: u16) { self.h = (val >> 8) as u8; self.l = val as u8; }

    pub fn get_af(&self) -> u16 { ((self.a as u16) << 8) | self.f as u16 }
    pub fn set_af(&mut self, val: u16) { self.a = (val >> 8) as u8; self.f = val as u8; }

    pub fn reg8(&self, reg: Reg8) -> u8 {
        match reg {
            Reg8::A => self.a,
            Reg8::F => self.f,
            Reg8::B => self.b,
            Reg8::C => self.c,
            Reg8::D => self.d,
            Reg8::E => self.e,
            Reg8::H => self.h,
            Reg8::L => self.l,
            Reg8::I => self.i,
            Reg8::R => self.r,
        }
    }

    pub fn set_reg8(&mut self, reg: Reg8, val: u8) {
        match reg {
            Reg8::A => self.a = val,
            Reg8::F => self.f = val,
            Reg8::B => self.b = val,
            Reg8::C => self.c = val,
            Reg8::D => self.d = val,
            Reg8::E => self.e = val,
            Reg8::H => self.h = val,
            Reg8::L => self.l = val,
            Reg8::I => self.i = val,
            Reg8::R => self.r = val,
        }
    }

    pub fn reg16(&self, reg: Reg16) -> u16 {
        match reg {
            Reg16::AF => self.get_af(),
            Reg16::BC => self.get_bc(),
            Reg16::DE => self.get_de(),
            Reg16::HL => self.get_hl(),
            Reg16::IX => self.ix,
            Reg16::IY => self.iy,
            Reg16::SP => self.sp,
            Reg16::PC => self.pc,
        }
    }

    pub fn set_reg16(&mut self, reg: Reg16, val: u16) {
        match reg {
            Reg16::AF => self.set_af(val),
            Reg16::BC => self.set_bc(val),
            Reg16::DE => self.set_de(val),
            Reg16::HL => self.set_hl(val),
            Reg16::IX => self.ix = val,
            Reg16::IY => self.iy = val,
            Reg16::SP => self.sp = val,
            Reg16::PC => self.pc = val,
        }
    }

    // --- Flag Helpers ---

    pub fn flag(&self, flag: Flag) -> bool {
        self.f & flag as u8 != 0
    }

    pub fn set_flag(&mut self, flag: Flag, on: bool) {
        if on {
            self.f |= flag as u8;
        } else {
            self.f &= !(flag as u8);
        }
    }

    pub fn flag_letters(&self) -> String {
        flag_letters(self.f)
    }

    pub fn flag_letters_parity(&self) -> String {
        flag_letters_parity(self.f)
    }

    // --- Named Access ---

    /// Read a register or register pair by name.
    pub fn get(&self, name: &str) -> Result<u16> {
        Ok(match name.parse::<Register>()? {
            Register::Byte(r) => self.reg8(r) as u16,
            Register::Word(r) => self.reg16(r),
        })
    }

    /// Write a register or register pair by name.
    ///
    /// The value is range-checked against the target width before anything
    /// is written.
    pub fn set(&mut self, name: &str, value: u32) -> Result<()> {
        match name.parse::<Register>()? {
            Register::Byte(r) => {
                let val = u8::try_from(value)
                    .map_err(|_| Z80Error::operand(format!("{:#X}", value), format!("{} holds one byte", r)))?;
                self.set_reg8(r, val);
            }
            Register::Word(r) => {
                let val = u16::try_from(value)
                    .map_err(|_| Z80Error::operand(format!("{:#X}", value), format!("{} holds one word", r)))?;
                self.set_reg16(r, val);
            }
        }
        Ok(())
    }

    /// Read a flag by name ("S", "Z", "5", "H", "3", "P", "V", "N", "C").
    pub fn get_flag(&self, name: &str) -> Result<bool> {
        Ok(self.flag(name.parse::<Flag>()?))
    }

    pub fn set_flag_named(&mut self, name: &str, on: bool) -> Result<()> {
        let flag = name.parse::<Flag>()?;
        self.set_flag(flag, on);
        Ok(())
    }

    /// Read one memory byte; `addr` must lie inside the 64 KiB space.
    pub fn peek(&self, addr: u32) -> Result<u8> {
        let addr = u16::try_from(addr)
            .map_err(|_| Z80Error::operand(format!("{:#X}", addr), "address outside 0x0000..=0xFFFF"))?;
        Ok(self.memory.read(addr))
    }

    /// Write one memory byte with both address and value range-checked.
    pub fn poke(&mut self, addr: u32, value: u32) -> Result<()> {
        let addr = u16::try_from(addr)
            .map_err(|_| Z80Error::operand(format!("{:#X}", addr), "address outside 0x0000..=0xFFFF"))?;
        let val = u8::try_from(value)
            .map_err(|_| Z80Error::operand(format!("{:#X}", value), "memory holds one byte per address"))?;
        self.memory.write(addr, val);
        Ok(())
    }

    /// Swap AF with AF'.
    pub fn swap_af(&mut self) {
        std::mem::swap(&mut self.a, &mut self.a_prime);
        std::mem::swap(&mut self.f, &mut self.f_prime);
    }

    /// Swap BC, DE and HL with their alternates.
    pub fn swap_main(&mut self) {
        std::mem::swap(&mut self.b, &mut self.b_prime);
        std::mem::swap(&mut self.c, &mut self.c_prime);
        std::mem::swap(&mut self.d, &mut self.d_prime);
        std::mem::swap(&mut self.e, &mut self.e_prime);
        std::mem::swap(&mut self.h, &mut self.h_prime);
        std::mem::swap(&mut self.l, &mut self.l_prime);
    }

    // --- Wrapping Pointer Helpers ---

    pub fn inc_pc(&mut self, n: u16) { self.pc = self.pc.wrapping_add(n); }
    pub fn inc_sp(&mut self, n: u16) { self.sp = self.sp.wrapping_add(n); }
    pub fn dec_sp(&mut self, n: u16) { self.sp = self.sp.wrapping_sub(n); }
}
