use crate::cpu::z80::addressing::Location;
use crate::cpu::z80::registers::{Flag, Reg16};
use crate::cpu::z80::template::{Args, D, N, Slot, Template, Timing};
use crate::cpu::z80::{Flow, Z80, parity};
use crate::error::Result;

// ALU operation selectors, in opcode bit order (bits 5-3 of 10ooo___).
const ADD: u8 = 0;
const ADC: u8 = 1;
const SUB: u8 = 2;
const SBC: u8 = 3;
const AND: u8 = 4;
const XOR: u8 = 5;
const OR: u8 = 6;
const CP: u8 = 7;

pub(super) const EIGHT_BIT_ARITHMETIC: &[Template] = &[
    Template::new("ADD A,{0}", &[Slot::Pattern("10000{0}")], &["r"], Timing::Fixed(4), "A <- A + {0}", Z80::op_alu_r::<ADD>),
    Template::new("ADD A,n", &[Slot::Byte(0xC6), N], &[], Timing::Fixed(7), "A <- A + n", Z80::op_alu_n::<ADD>),
    Template::new("ADD A,(HL)", &[Slot::Byte(0x86)], &[], Timing::Fixed(7), "A <- A + (HL)", Z80::op_alu_hl::<ADD>),
    Template::new("ADD A,({0}+d)", &[Slot::Pattern("11{0}101"), Slot::Byte(0x86), D], &["ii"], Timing::Fixed(19), "A <- A + ({0}+d)", Z80::op_alu_idx::<ADD>),
    Template::new("ADC A,{0}", &[Slot::Pattern("10001{0}")], &["r"], Timing::Fixed(4), "A <- A + {0} + CY", Z80::op_alu_r::<ADC>),
    Template::new("ADC A,n", &[Slot::Byte(0xCE), N], &[], Timing::Fixed(7), "A <- A + n + CY", Z80::op_alu_n::<ADC>),
    Template::new("ADC A,(HL)", &[Slot::Byte(0x8E)], &[], Timing::Fixed(7), "A <- A + (HL) + CY", Z80::op_alu_hl::<ADC>),
    Template::new("ADC A,({0}+d)", &[Slot::Pattern("11{0}101"), Slot::Byte(0x8E), D], &["ii"], Timing::Fixed(19), "A <- A + ({0}+d) + CY", Z80::op_alu_idx::<ADC>),
    Template::new("SUB A,{0}", &[Slot::Pattern("10010{0}")], &["r"], Timing::Fixed(4), "A <- A - {0}", Z80::op_alu_r::<SUB>),
    Template::new("SUB A,n", &[Slot::Byte(0xD6), N], &[], Timing::Fixed(7), "A <- A - n", Z80::op_alu_n::<SUB>),
    Template::new("SUB A,(HL)", &[Slot::Byte(0x96)], &[], Timing::Fixed(7), "A <- A - (HL)", Z80::op_alu_hl::<SUB>),
    Template::new("SUB A,({0}+d)", &[Slot::Pattern("11{0}101"), Slot::Byte(0x96), D], &["ii"], Timing::Fixed(19), "A <- A - ({0}+d)", Z80::op_alu_idx::<SUB>),
    Template::new("SBC A,{0}", &[Slot::Pattern("10011{0}")], &["r"], Timing::Fixed(4), "A <- A - {0} - CY", Z80::op_alu_r::<SBC>),
    Template::new("SBC A,n", &[Slot::Byte(0xDE), N], &[], Timing::Fixed(7), "A <- A - n - CY", Z80::op_alu_n::<SBC>),
    Template::new("SBC A,(HL)", &[Slot::Byte(0x9E)], &[], Timing::Fixed(7), "A <- A - (HL) - CY", Z80::op_alu_hl::<SBC>),
    Template::new("SBC A,({0}+d)", &[Slot::Pattern("11{0}101"), Slot::Byte(0x9E), D], &["ii"], Timing::Fixed(19), "A <- A - ({0}+d) - CY", Z80::op_alu_idx::<SBC>),
    Template::new("AND A,{0}", &[Slot::Pattern("10100{0}")], &["r"], Timing::Fixed(4), "A <- A & {0}", Z80::op_alu_r::<AND>),
    Template::new("AND A,n", &[Slot::Byte(0xE6), N], &[], Timing::Fixed(7), "A <- A & n", Z80::op_alu_n::<AND>),
    Template::new("AND A,(HL)", &[Slot::Byte(0xA6)], &[], Timing::Fixed(7), "A <- A & (HL)", Z80::op_alu_hl::<AND>),
    Template::new("AND A,({0}+d)", &[Slot::Pattern("11{0}101"), Slot::Byte(0xA6), D], &["ii"], Timing::Fixed(19), "A <- A & ({0}+d)", Z80::op_alu_idx::<AND>),
    Template::new("OR A,{0}", &[Slot::Pattern("10110{0}")], &["r"], Timing::Fixed(4), "A <- A | {0}", Z80::op_alu_r::<OR>),
    Template::new("OR A,n", &[Slot::Byte(0xF6), N], &[], Timing::Fixed(7), "A <- A | n", Z80::op_alu_n::<OR>),
    Template::new("OR A,(HL)", &[Slot::Byte(0xB6)], &[], Timing::Fixed(7), "A <- A | (HL)", Z80::op_alu_hl::<OR>),
    Template::new("OR A,({0}+d)", &[Slot::Pattern("11{0}101"), Slot::Byte(0xB6), D], &["ii"], Timing::Fixed(19), "A <- A | ({0}+d)", Z80::op_alu_idx::<OR>),
    Template::new("XOR A,{0}", &[Slot::Pattern("10101{0}")], &["r"], Timing::Fixed(4), "A <- A ^ {0}", Z80::op_alu_r::<XOR>),
    Template::new("XOR A,n", &[Slot::Byte(0xEE), N], &[], Timing::Fixed(7), "A <- A ^ n", Z80::op_alu_n::<XOR>),
    Template::new("XOR A,(HL)", &[Slot::Byte(0xAE)], &[], Timing::Fixed(7), "A <- A ^ (HL)", Z80::op_alu_hl::<XOR>),
    Template::new("XOR A,({0}+d)", &[Slot::Pattern("11{0}101"), Slot::Byte(0xAE), D], &["ii"], Timing::Fixed(19), "A <- A ^ ({0}+d)", Z80::op_alu_idx::<XOR>),
    Template::new("CP {0}", &[Slot::Pattern("10111{0}")], &["r"], Timing::Fixed(4), "A - {0}", Z80::op_alu_r::<CP>),
    Template::new("CP n", &[Slot::Byte(0xFE), N], &[], Timing::Fixed(7), "A - n", Z80::op_alu_n::<CP>),
    Template::new("CP (HL)", &[Slot::Byte(0xBE)], &[], Timing::Fixed(7), "A - (HL)", Z80::op_alu_hl::<CP>),
    Template::new("CP ({0}+d)", &[Slot::Pattern("11{0}101"), Slot::Byte(0xBE), D], &["ii"], Timing::Fixed(19), "A - ({0}+d)", Z80::op_alu_idx::<CP>),
    Template::new("INC {0}", &[Slot::Pattern("00{0}100")], &["r"], Timing::Fixed(4), "{0} <- {0} + 1", Z80::op_inc_r),
    Template::new("INC (HL)", &[Slot::Byte(0x34)], &[], Timing::Fixed(11), "(HL) <- (HL) + 1", Z80::op_inc_hl),
    Template::new("INC ({0}+d)", &[Slot::Pattern("11{0}101"), Slot::Byte(0x34), D], &["ii"], Timing::Fixed(23), "({0}+d) <- ({0}+d) + 1", Z80::op_inc_idx),
    Template::new("DEC {0}", &[Slot::Pattern("00{0}101")], &["r"], Timing::Fixed(4), "{0} <- {0} - 1", Z80::op_dec_r),
    Template::new("DEC (HL)", &[Slot::Byte(0x35)], &[], Timing::Fixed(11), "(HL) <- (HL) - 1", Z80::op_dec_hl),
    Template::new("DEC ({0}+d)", &[Slot::Pattern("11{0}101"), Slot::Byte(0x35), D], &["ii"], Timing::Fixed(23), "({0}+d) <- ({0}+d) - 1", Z80::op_dec_idx),
];

pub(super) const SIXTEEN_BIT_ARITHMETIC: &[Template] = &[
    Template::new("ADD HL,{0}", &[Slot::Pattern("00{0}1001")], &["ss"], Timing::Fixed(11), "HL <- HL + {0}", Z80::op_add_hl_ss),
    Template::new("ADC HL,{0}", &[Slot::Byte(0xED), Slot::Pattern("01{0}1010")], &["ss"], Timing::Fixed(15), "HL <- HL + {0} + CY", Z80::op_adc_hl_ss),
    Template::new("SBC HL,{0}", &[Slot::Byte(0xED), Slot::Pattern("01{0}0010")], &["ss"], Timing::Fixed(15), "HL <- HL - {0} - CY", Z80::op_sbc_hl_ss),
    Template::new("ADD IX,{0}", &[Slot::Byte(0xDD), Slot::Pattern("00{0}1001")], &["pp"], Timing::Fixed(15), "IX <- IX + {0}", Z80::op_add_ix_pp),
    Template::new("ADD IY,{0}", &[Slot::Byte(0xFD), Slot::Pattern("00{0}1001")], &["rr"], Timing::Fixed(15), "IY <- IY + {0}", Z80::op_add_iy_rr),
    Template::new("INC {0}", &[Slot::Pattern("00{0}0011")], &["ss"], Timing::Fixed(6), "{0} <- {0} + 1", Z80::op_inc_pair),
    Template::new("INC {0}", &[Slot::Pattern("11{0}101"), Slot::Byte(0x23)], &["ii"], Timing::Fixed(10), "{0} <- {0} + 1", Z80::op_inc_pair),
    Template::new("DEC {0}", &[Slot::Pattern("00{0}1011")], &["ss"], Timing::Fixed(6), "{0} <- {0} - 1", Z80::op_dec_pair),
    Template::new("DEC {0}", &[Slot::Pattern("11{0}101"), Slot::Byte(0x2B)], &["ii"], Timing::Fixed(10), "{0} <- {0} - 1", Z80::op_dec_pair),
];

impl Z80 {
    // --- Flag Helpers ---

    /// S and Z from `val`, plus its copies of bits 5 and 3.
    pub(super) fn sz53(val: u8) -> u8 {
        let mut f = val & (Flag::S as u8 | Flag::Y as u8 | Flag::X as u8);
        if val == 0 { f |= Flag::Z as u8; }
        f
    }

    /// [`Z80::sz53`] with P/V holding the parity of `val`.
    pub(super) fn sz53p(val: u8) -> u8 {
        let mut f = Self::sz53(val);
        if parity(val) { f |= Flag::PV as u8; }
        f
    }

    fn update_flags_logic(&mut self, result: u8) {
        // H is set for OR and XOR as well as AND.
        self.f = Self::sz53p(result) | Flag::H as u8;
    }

    // --- 8-bit Arithmetic ---

    /// Add `n` and `carry` to A's value and return the sum, setting flags.
    ///
    /// Subtraction adds the two's complement `256 - n` instead, so C and H
    /// are the carries out of bits 7 and 3 of that sum. An incoming carry
    /// on a subtract is taken away from the sum. With `set_c_v` clear, C and
    /// P/V keep their previous values.
    pub(super) fn add8(&mut self, n: u8, carry: bool, subtract: bool, set_c_v: bool) -> u8 {
        let a = self.a;
        let operand = if subtract { n.wrapping_neg() } else { n };
        let c_val: i16 = match (carry, subtract) {
            (false, _) => 0,
            (true, false) => 1,
            (true, true) => -1,
        };
        let raw = a as i16 + operand as i16 + c_val;
        let result = raw as u8;

        let half = (a & 0x0F) as i16 + (operand & 0x0F) as i16 + c_val > 0x0F;
        let overflow = (a ^ operand) & 0x80 == 0 && (a ^ result) & 0x80 != 0;

        let mut f = Self::sz53(result);
        if half { f |= Flag::H as u8; }
        if subtract { f |= Flag::N as u8; }
        if set_c_v {
            if overflow { f |= Flag::PV as u8; }
            if raw > 0xFF { f |= Flag::C as u8; }
        } else {
            f |= self.f & (Flag::PV as u8 | Flag::C as u8);
        }
        self.f = f;
        result
    }

    /// Compare `n` against A without storing the difference.
    pub(super) fn compare(&mut self, n: u8, set_c_v: bool) {
        self.add8(n, false, true, set_c_v);
    }

    fn perform_alu_op(&mut self, op: u8, val: u8) {
        let carry = self.flag(Flag::C);
        match op {
            ADD => self.a = self.add8(val, false, false, true),
            ADC => self.a = self.add8(val, carry, false, true),
            SUB => self.a = self.add8(val, false, true, true),
            SBC => self.a = self.add8(val, carry, true, true),
            AND => {
                self.a &= val;
                self.update_flags_logic(self.a);
            }
            XOR => {
                self.a ^= val;
                self.update_flags_logic(self.a);
            }
            OR => {
                self.a |= val;
                self.update_flags_logic(self.a);
            }
            _ => self.compare(val, true),
        }
    }

    fn op_alu_r<const OP: u8>(&mut self, args: Args<'_>) -> Result<Flow> {
        let val = self.reg8(args.reg(0)?);
        self.perform_alu_op(OP, val);
        Ok(Flow::Advance)
    }

    fn op_alu_n<const OP: u8>(&mut self, _args: Args<'_>) -> Result<Flow> {
        let val = self.read8(Location::Immediate(1))?;
        self.perform_alu_op(OP, val);
        Ok(Flow::Advance)
    }

    fn op_alu_hl<const OP: u8>(&mut self, _args: Args<'_>) -> Result<Flow> {
        let val = self.read8(Location::Indirect(Reg16::HL))?;
        self.perform_alu_op(OP, val);
        Ok(Flow::Advance)
    }

    fn op_alu_idx<const OP: u8>(&mut self, args: Args<'_>) -> Result<Flow> {
        let val = self.read8(Location::Indexed(args.pair(0)?, 2))?;
        self.perform_alu_op(OP, val);
        Ok(Flow::Advance)
    }

    // --- Increment / Decrement ---

    /// `n + 1` with flags. V is raised only for an operand of 0x7E.
    fn inc8(&mut self, n: u8) -> u8 {
        let result = n.wrapping_add(1);
        let mut f = (self.f & Flag::C as u8) | Self::sz53(result);
        if n & 0x0F == 0x0F { f |= Flag::H as u8; }
        if n == 0x7E { f |= Flag::PV as u8; }
        self.f = f;
        result
    }

    /// `n - 1` with flags, computed as `n + 0xFF`: H is the carry out of
    /// bit 3 of that sum. V is raised for an operand of 0x80.
    fn dec8(&mut self, n: u8) -> u8 {
        let result = n.wrapping_sub(1);
        let mut f = (self.f & Flag::C as u8) | Self::sz53(result) | Flag::N as u8;
        if n & 0x0F != 0x00 { f |= Flag::H as u8; }
        if n == 0x80 { f |= Flag::PV as u8; }
        self.f = f;
        result
    }

    /// Read-modify-write of an 8-bit location.
    pub(super) fn modify8(&mut self, loc: Location, op: impl FnOnce(&mut Self, u8) -> u8) -> Result<()> {
        let val = self.read8(loc)?;
        let result = op(self, val);
        self.write8(loc, result)
    }

    fn op_inc_r(&mut self, args: Args<'_>) -> Result<Flow> {
        self.modify8(Location::Reg(args.reg(0)?), Self::inc8)?;
        Ok(Flow::Advance)
    }

    fn op_inc_hl(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.modify8(Location::Indirect(Reg16::HL), Self::inc8)?;
        Ok(Flow::Advance)
    }

    fn op_inc_idx(&mut self, args: Args<'_>) -> Result<Flow> {
        self.modify8(Location::Indexed(args.pair(0)?, 2), Self::inc8)?;
        Ok(Flow::Advance)
    }

    fn op_dec_r(&mut self, args: Args<'_>) -> Result<Flow> {
        self.modify8(Location::Reg(args.reg(0)?), Self::dec8)?;
        Ok(Flow::Advance)
    }

    fn op_dec_hl(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.modify8(Location::Indirect(Reg16::HL), Self::dec8)?;
        Ok(Flow::Advance)
    }

    fn op_dec_idx(&mut self, args: Args<'_>) -> Result<Flow> {
        self.modify8(Location::Indexed(args.pair(0)?, 2), Self::dec8)?;
        Ok(Flow::Advance)
    }

    // --- 16-bit Arithmetic ---

    /// ADD HL/IX/IY: only H (carry out of bit 11) and C change.
    fn add16(&mut self, x: u16, y: u16) -> u16 {
        let raw = x as u32 + y as u32;
        let mut f = self.f & !(Flag::H as u8 | Flag::C as u8);
        if (x & 0x0FFF) + (y & 0x0FFF) > 0x0FFF { f |= Flag::H as u8; }
        if raw > 0xFFFF { f |= Flag::C as u8; }
        self.f = f;
        raw as u16
    }

    /// ADC/SBC HL: every flag follows from the 16-bit result. SBC adds the
    /// two's complement of `y` and takes the incoming carry away, like
    /// [`Z80::add8`].
    fn add16_carry(&mut self, x: u16, y: u16, subtract: bool) -> u16 {
        let operand = if subtract { y.wrapping_neg() } else { y };
        let c_val: i32 = match (self.flag(Flag::C), subtract) {
            (false, _) => 0,
            (true, false) => 1,
            (true, true) => -1,
        };
        let raw = x as i32 + operand as i32 + c_val;
        let result = raw as u16;

        let half = (x & 0x0FFF) as i32 + (operand & 0x0FFF) as i32 + c_val > 0x0FFF;
        let overflow = (x ^ operand) & 0x8000 == 0 && (x ^ result) & 0x8000 != 0;

        let mut f = ((result >> 8) as u8) & (Flag::S as u8 | Flag::Y as u8 | Flag::X as u8);
        if result == 0 { f |= Flag::Z as u8; }
        if half { f |= Flag::H as u8; }
        if overflow { f |= Flag::PV as u8; }
        if subtract { f |= Flag::N as u8; }
        if raw > 0xFFFF { f |= Flag::C as u8; }
        self.f = f;
        result
    }

    fn op_add_hl_ss(&mut self, args: Args<'_>) -> Result<Flow> {
        let val = self.reg16(args.pair(0)?);
        let result = self.add16(self.get_hl(), val);
        self.set_hl(result);
        Ok(Flow::Advance)
    }

    fn op_adc_hl_ss(&mut self, args: Args<'_>) -> Result<Flow> {
        let val = self.reg16(args.pair(0)?);
        let result = self.add16_carry(self.get_hl(), val, false);
        self.set_hl(result);
        Ok(Flow::Advance)
    }

    fn op_sbc_hl_ss(&mut self, args: Args<'_>) -> Result<Flow> {
        let val = self.reg16(args.pair(0)?);
        let result = self.add16_carry(self.get_hl(), val, true);
        self.set_hl(result);
        Ok(Flow::Advance)
    }

    fn op_add_ix_pp(&mut self, args: Args<'_>) -> Result<Flow> {
        let val = self.reg16(args.pair(0)?);
        self.ix = self.add16(self.ix, val);
        Ok(Flow::Advance)
    }

    fn op_add_iy_rr(&mut self, args: Args<'_>) -> Result<Flow> {
        let val = self.reg16(args.pair(0)?);
        self.iy = self.add16(self.iy, val);
        Ok(Flow::Advance)
    }

    fn op_inc_pair(&mut self, args: Args<'_>) -> Result<Flow> {
        let reg = args.pair(0)?;
        self.set_reg16(reg, self.reg16(reg).wrapping_add(1));
        Ok(Flow::Advance)
    }

    fn op_dec_pair(&mut self, args: Args<'_>) -> Result<Flow> {
        let reg = args.pair(0)?;
        self.set_reg16(reg, self.reg16(reg).wrapping_sub(1));
        Ok(Flow::Advance)
    }
}
