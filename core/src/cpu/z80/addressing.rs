use crate::cpu::z80::Z80;
use crate::cpu::z80::registers::{Reg8, Reg16};
use crate::error::{Result, Z80Error};

/// Where an operand lives.
///
/// Offsets are relative to the first opcode byte of the instruction being
/// executed, i.e. to the current PC.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Location {
    Reg(Reg8),
    Pair(Reg16),
    Address(u16),        // Direct memory address
    Indirect(Reg16),     // (BC), (DE), (HL), (SP)
    Indexed(Reg16, u16), // (IX+d), (IY+d); d is the byte at PC+offset
    Immediate(u16),      // Byte or word at PC+offset
    Absolute(u16),       // (nn); nn is the little-endian word at PC+offset
}

impl Z80 {
    /// Signed displacement byte at PC+`offset`.
    pub fn displacement(&self, offset: u16) -> i8 {
        self.memory.read(self.pc.wrapping_add(offset)) as i8
    }

    /// `reg` + `d` for an index register, rejecting displacements that do
    /// not fit a signed byte.
    pub fn index_address(&self, reg: Reg16, d: i16) -> Result<u16> {
        if !reg.is_index() {
            return Err(Z80Error::operand(reg.to_string(), "indexed addressing needs IX or IY"));
        }
        if !(-128..=127).contains(&d) {
            return Err(Z80Error::operand(d.to_string(), "displacement outside -128..=127"));
        }
        Ok(self.reg16(reg).wrapping_add(d as u16))
    }

    /// Target of a relative jump whose offset byte sits at PC+`offset`;
    /// the base is the address following the `size`-byte instruction.
    pub fn relative_target(&self, offset: u16, size: u16) -> u16 {
        let e = self.displacement(offset);
        self.pc.wrapping_add(size).wrapping_add(e as i16 as u16)
    }

    /// Memory address a location refers to. Registers have none.
    pub fn effective_address(&self, loc: Location) -> Result<u16> {
        match loc {
            Location::Address(addr) => Ok(addr),
            Location::Indirect(reg) => match reg {
                Reg16::AF | Reg16::PC => {
                    Err(Z80Error::operand(reg.to_string(), "not usable as a pointer"))
                }
                _ => Ok(self.reg16(reg)),
            },
            Location::Indexed(reg, offset) => {
                self.index_address(reg, self.displacement(offset) as i16)
            }
            Location::Immediate(offset) => Ok(self.pc.wrapping_add(offset)),
            Location::Absolute(offset) => Ok(self.memory.read_u16(self.pc.wrapping_add(offset))),
            Location::Reg(r) => Err(Z80Error::operand(r.to_string(), "register has no address")),
            Location::Pair(r) => Err(Z80Error::operand(r.to_string(), "register has no address")),
        }
    }

    pub fn read8(&self, loc: Location) -> Result<u8> {
        match loc {
            Location::Reg(r) => Ok(self.reg8(r)),
            Location::Pair(r) => Err(Z80Error::operand(r.to_string(), "16-bit register used as a byte")),
            _ => Ok(self.memory.read(self.effective_address(loc)?)),
        }
    }

    pub fn write8(&mut self, loc: Location, val: u8) -> Result<()> {
        match loc {
            Location::Reg(r) => self.set_reg8(r, val),
            Location::Pair(r) => {
                return Err(Z80Error::operand(r.to_string(), "16-bit register used as a byte"));
            }
            Location::Immediate(_) => {
                return Err(Z80Error::operand("n", "immediate operands are read-only"));
            }
            _ => {
                let addr = self.effective_address(loc)?;
                self.memory.write(addr, val);
            }
        }
        Ok(())
    }

    pub fn read16(&self, loc: Location) -> Result<u16> {
        match loc {
            Location::Pair(r) => Ok(self.reg16(r)),
            Location::Reg(r) => Err(Z80Error::operand(r.to_string(), "8-bit register used as a word")),
            _ => Ok(self.memory.read_u16(self.effective_address(loc)?)),
        }
    }

    pub fn write16(&mut self, loc: Location, val: u16) -> Result<()> {
        match loc {
            Location::Pair(r) => self.set_reg16(r, val),
            Location::Reg(r) => {
                return Err(Z80Error::operand(r.to_string(), "8-bit register used as a word"));
            }
            Location::Immediate(_) => {
                return Err(Z80Error::operand("nn", "immediate operands are read-only"));
            }
            _ => {
                let addr = self.effective_address(loc)?;
                self.memory.write_u16(addr, val);
            }
        }
        Ok(())
    }
}
