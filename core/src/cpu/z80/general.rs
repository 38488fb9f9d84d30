use crate::cpu::z80::registers::Flag;
use crate::cpu::z80::template::{Args, Slot, Template, Timing};
use crate::cpu::z80::{Flow, Z80};
use crate::error::Result;

pub(super) const GENERAL_PURPOSE: &[Template] = &[
    Template::new("NOP", &[Slot::Byte(0x00)], &[], Timing::Fixed(4), "", Z80::op_nop),
    Template::new("DAA", &[Slot::Byte(0x27)], &[], Timing::Fixed(4), "A <- BCD(A)", Z80::op_daa),
    Template::new("CPL", &[Slot::Byte(0x2F)], &[], Timing::Fixed(4), "A <- ~A", Z80::op_cpl),
    Template::new("NEG", &[Slot::Byte(0xED), Slot::Byte(0x44)], &[], Timing::Fixed(8), "A <- 0 - A", Z80::op_neg),
    Template::new("CCF", &[Slot::Byte(0x3F)], &[], Timing::Fixed(4), "CY <- ~CY", Z80::op_ccf),
    Template::new("SCF", &[Slot::Byte(0x37)], &[], Timing::Fixed(4), "CY <- 1", Z80::op_scf),
    Template::new("HALT", &[Slot::Byte(0x76)], &[], Timing::Fixed(4), "halt", Z80::op_halt),
    Template::new("DI", &[Slot::Byte(0xF3)], &[], Timing::Fixed(4), "IFF1 <- 0, IFF2 <- 0", Z80::op_di),
    Template::new("EI", &[Slot::Byte(0xFB)], &[], Timing::Fixed(4), "IFF1 <- 1, IFF2 <- 1", Z80::op_ei),
    Template::new("IM 0", &[Slot::Byte(0xED), Slot::Byte(0x46)], &[], Timing::Fixed(8), "IM <- 0", Z80::op_im::<0>),
    Template::new("IM 1", &[Slot::Byte(0xED), Slot::Byte(0x56)], &[], Timing::Fixed(8), "IM <- 1", Z80::op_im::<1>),
    Template::new("IM 2", &[Slot::Byte(0xED), Slot::Byte(0x5E)], &[], Timing::Fixed(8), "IM <- 2", Z80::op_im::<2>),
];

impl Z80 {
    fn op_nop(&mut self, _args: Args<'_>) -> Result<Flow> {
        Ok(Flow::Advance)
    }

    /// DAA: BCD-correct A after an add or subtract.
    ///
    /// After a subtract, C and H hold the carries of the two's-complement
    /// sum, so a clear flag means a borrow. The adjusted flags are written
    /// back in the same sense.
    fn op_daa(&mut self, _args: Args<'_>) -> Result<Flow> {
        let a = self.a;
        let n = self.flag(Flag::N);
        let h = self.flag(Flag::H) != n;
        let mut carry = self.flag(Flag::C) != n;

        let mut correction = 0u8;
        if h || (a & 0x0F) > 9 { correction |= 0x06; }
        if carry || a > 0x99 {
            correction |= 0x60;
            carry = true;
        }

        let (result, half) = if n {
            (a.wrapping_sub(correction), h && (a & 0x0F) < 6)
        } else {
            (a.wrapping_add(correction), (a & 0x0F) > 9)
        };

        let mut f = Self::sz53p(result);
        if half != n { f |= Flag::H as u8; }
        if n { f |= Flag::N as u8; }
        if carry != n { f |= Flag::C as u8; }
        self.a = result;
        self.f = f;
        Ok(Flow::Advance)
    }

    /// CPL: H and N set, bits 5 and 3 copied from the new A.
    fn op_cpl(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.a = !self.a;
        let kept = self.f & (Flag::S as u8 | Flag::Z as u8 | Flag::PV as u8 | Flag::C as u8);
        self.f = kept | Flag::H as u8 | Flag::N as u8 | (self.a & (Flag::Y as u8 | Flag::X as u8));
        Ok(Flow::Advance)
    }

    /// NEG: 0 - A through the shared subtractor, so C is never set and V
    /// follows the same sign rule as SUB.
    fn op_neg(&mut self, _args: Args<'_>) -> Result<Flow> {
        let val = self.a;
        self.a = 0;
        self.a = self.add8(val, false, true, true);
        Ok(Flow::Advance)
    }

    /// CCF: H takes the old carry, then C is inverted.
    fn op_ccf(&mut self, _args: Args<'_>) -> Result<Flow> {
        let carry = self.flag(Flag::C);
        let mut f = self.f & (Flag::S as u8 | Flag::Z as u8 | Flag::PV as u8);
        f |= self.a & (Flag::Y as u8 | Flag::X as u8);
        if carry { f |= Flag::H as u8; } else { f |= Flag::C as u8; }
        self.f = f;
        Ok(Flow::Advance)
    }

    fn op_scf(&mut self, _args: Args<'_>) -> Result<Flow> {
        let mut f = self.f & (Flag::S as u8 | Flag::Z as u8 | Flag::PV as u8);
        f |= self.a & (Flag::Y as u8 | Flag::X as u8);
        self.f = f | Flag::C as u8;
        Ok(Flow::Advance)
    }

    /// HALT leaves PC on itself; stepping a halted CPU re-runs it.
    fn op_halt(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.halted = true;
        Ok(Flow::Repeat)
    }

    fn op_di(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.iff1 = false;
        self.iff2 = false;
        Ok(Flow::Advance)
    }

    fn op_ei(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.iff1 = true;
        self.iff2 = true;
        Ok(Flow::Advance)
    }

    fn op_im<const MODE: u8>(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.im = MODE;
        Ok(Flow::Advance)
    }
}
