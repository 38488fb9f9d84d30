use crate::cpu::z80::addressing::Location;
use crate::cpu::z80::registers::{Flag, Reg16};
use crate::cpu::z80::template::{Args, D, Slot, Template, Timing};
use crate::cpu::z80::{Flow, Z80};
use crate::error::Result;

pub(super) const BIT_SET_RESET_TEST: &[Template] = &[
    Template::new("BIT {0},{1}", &[Slot::Byte(0xCB), Slot::Pattern("01{0}{1}")], &["b", "r"], Timing::Fixed(8), "Z <- ~{1}{0}", Z80::op_bit_r),
    Template::new("BIT {0},(HL)", &[Slot::Byte(0xCB), Slot::Pattern("01{0}110")], &["b"], Timing::Fixed(12), "Z <- ~(HL){0}", Z80::op_bit_hl),
    Template::new("BIT {0},({1}+d)", &[Slot::Pattern("11{1}101"), Slot::Byte(0xCB), D, Slot::Pattern("01{0}110")], &["b", "ii"], Timing::Fixed(20), "Z <- ~({1}+d){0}", Z80::op_bit_idx),
    Template::new("SET {0},{1}", &[Slot::Byte(0xCB), Slot::Pattern("11{0}{1}")], &["b", "r"], Timing::Fixed(8), "{1}{0} <- 1", Z80::op_set_r),
    Template::new("SET {0},(HL)", &[Slot::Byte(0xCB), Slot::Pattern("11{0}110")], &["b"], Timing::Fixed(15), "(HL){0} <- 1", Z80::op_set_hl),
    Template::new("SET {0},({1}+d)", &[Slot::Pattern("11{1}101"), Slot::Byte(0xCB), D, Slot::Pattern("11{0}110")], &["b", "ii"], Timing::Fixed(23), "({1}+d){0} <- 1", Z80::op_set_idx),
    Template::new("RES {0},{1}", &[Slot::Byte(0xCB), Slot::Pattern("10{0}{1}")], &["b", "r"], Timing::Fixed(8), "{1}{0} <- 0", Z80::op_res_r),
    Template::new("RES {0},(HL)", &[Slot::Byte(0xCB), Slot::Pattern("10{0}110")], &["b"], Timing::Fixed(15), "(HL){0} <- 0", Z80::op_res_hl),
    Template::new("RES {0},({1}+d)", &[Slot::Pattern("11{1}101"), Slot::Byte(0xCB), D, Slot::Pattern("10{0}110")], &["b", "ii"], Timing::Fixed(23), "({1}+d){0} <- 0", Z80::op_res_idx),
];

impl Z80 {
    /// BIT b: Z is set when the bit is clear, H set, N cleared. The rest of
    /// F is untouched.
    fn test_bit(&mut self, bit: u8, val: u8) {
        let mut f = (self.f & !(Flag::Z as u8 | Flag::N as u8)) | Flag::H as u8;
        if val & (1 << bit) == 0 { f |= Flag::Z as u8; }
        self.f = f;
    }

    fn op_bit_r(&mut self, args: Args<'_>) -> Result<Flow> {
        let val = self.reg8(args.reg(1)?);
        self.test_bit(args.bit(0)?, val);
        Ok(Flow::Advance)
    }

    fn op_bit_hl(&mut self, args: Args<'_>) -> Result<Flow> {
        let val = self.read8(Location::Indirect(Reg16::HL))?;
        self.test_bit(args.bit(0)?, val);
        Ok(Flow::Advance)
    }

    fn op_bit_idx(&mut self, args: Args<'_>) -> Result<Flow> {
        let val = self.read8(Location::Indexed(args.pair(1)?, 2))?;
        self.test_bit(args.bit(0)?, val);
        Ok(Flow::Advance)
    }

    // --- SET / RES ---
    // Flags are not affected.

    fn op_set_r(&mut self, args: Args<'_>) -> Result<Flow> {
        let mask = 1u8 << args.bit(0)?;
        self.modify8(Location::Reg(args.reg(1)?), |_, val| val | mask)?;
        Ok(Flow::Advance)
    }

    fn op_set_hl(&mut self, args: Args<'_>) -> Result<Flow> {
        let mask = 1u8 << args.bit(0)?;
        self.modify8(Location::Indirect(Reg16::HL), |_, val| val | mask)?;
        Ok(Flow::Advance)
    }

    fn op_set_idx(&mut self, args: Args<'_>) -> Result<Flow> {
        let mask = 1u8 << args.bit(0)?;
        self.modify8(Location::Indexed(args.pair(1)?, 2), |_, val| val | mask)?;
        Ok(Flow::Advance)
    }

    fn op_res_r(&mut self, args: Args<'_>) -> Result<Flow> {
        let mask = !(1u8 << args.bit(0)?);
        self.modify8(Location::Reg(args.reg(1)?), |_, val| val & mask)?;
        Ok(Flow::Advance)
    }

    fn op_res_hl(&mut self, args: Args<'_>) -> Result<Flow> {
        let mask = !(1u8 << args.bit(0)?);
        self.modify8(Location::Indirect(Reg16::HL), |_, val| val & mask)?;
        Ok(Flow::Advance)
    }

    fn op_res_idx(&mut self, args: Args<'_>) -> Result<Flow> {
        let mask = !(1u8 << args.bit(0)?);
        self.modify8(Location::Indexed(args.pair(1)?, 2), |_, val| val & mask)?;
        Ok(Flow::Advance)
    }
}
