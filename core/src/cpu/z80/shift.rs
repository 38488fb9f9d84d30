use crate::cpu::z80::addressing::Location;
use crate::cpu::z80::registers::{Flag, Reg8, Reg16};
use crate::cpu::z80::template::{Args, D, Slot, Template, Timing};
use crate::cpu::z80::{Flow, Z80};
use crate::error::Result;

// Rotate/shift selectors, in CB opcode bit order (bits 5-3 of 00ooo___).
const RLC: u8 = 0;
const RRC: u8 = 1;
const RL: u8 = 2;
const RR: u8 = 3;
const SLA: u8 = 4;
const SRA: u8 = 5;
const SRL: u8 = 7;

pub(super) const ROTATE_AND_SHIFT: &[Template] = &[
    Template::new("RLCA", &[Slot::Byte(0x07)], &[], Timing::Fixed(4), "RLC A", Z80::op_shift_a::<RLC>),
    Template::new("RLA", &[Slot::Byte(0x17)], &[], Timing::Fixed(4), "RL A", Z80::op_shift_a::<RL>),
    Template::new("RRCA", &[Slot::Byte(0x0F)], &[], Timing::Fixed(4), "RRC A", Z80::op_shift_a::<RRC>),
    Template::new("RRA", &[Slot::Byte(0x1F)], &[], Timing::Fixed(4), "RR A", Z80::op_shift_a::<RR>),
    Template::new("RLC {0}", &[Slot::Byte(0xCB), Slot::Pattern("00000{0}")], &["r"], Timing::Fixed(8), "CY <- {0}7, {0} <- {0} << 1 | {0}7", Z80::op_shift_r::<RLC>),
    Template::new("RLC (HL)", &[Slot::Byte(0xCB), Slot::Byte(0x06)], &[], Timing::Fixed(15), "CY <- (HL)7, (HL) <- (HL) << 1 | (HL)7", Z80::op_shift_hl::<RLC>),
    Template::new("RLC ({0}+d)", &[Slot::Pattern("11{0}101"), Slot::Byte(0xCB), D, Slot::Byte(0x06)], &["ii"], Timing::Fixed(23), "CY <- ({0}+d)7, ({0}+d) <- ({0}+d) << 1 | ({0}+d)7", Z80::op_shift_idx::<RLC>),
    Template::new("RL {0}", &[Slot::Byte(0xCB), Slot::Pattern("00010{0}")], &["r"], Timing::Fixed(8), "CY <- {0}7, {0} <- {0} << 1 | CY", Z80::op_shift_r::<RL>),
    Template::new("RL (HL)", &[Slot::Byte(0xCB), Slot::Byte(0x16)], &[], Timing::Fixed(15), "CY <- (HL)7, (HL) <- (HL) << 1 | CY", Z80::op_shift_hl::<RL>),
    Template::new("RL ({0}+d)", &[Slot::Pattern("11{0}101"), Slot::Byte(0xCB), D, Slot::Byte(0x16)], &["ii"], Timing::Fixed(23), "CY <- ({0}+d)7, ({0}+d) <- ({0}+d) << 1 | CY", Z80::op_shift_idx::<RL>),
    Template::new("RRC {0}", &[Slot::Byte(0xCB), Slot::Pattern("00001{0}")], &["r"], Timing::Fixed(8), "CY <- {0}0, {0} <- {0}0 | {0} >> 1", Z80::op_shift_r::<RRC>),
    Template::new("RRC (HL)", &[Slot::Byte(0xCB), Slot::Byte(0x0E)], &[], Timing::Fixed(15), "CY <- (HL)0, (HL) <- (HL)0 | (HL) >> 1", Z80::op_shift_hl::<RRC>),
    Template::new("RRC ({0}+d)", &[Slot::Pattern("11{0}101"), Slot::Byte(0xCB), D, Slot::Byte(0x0E)], &["ii"], Timing::Fixed(23), "CY <- ({0}+d)0, ({0}+d) <- ({0}+d)0 | ({0}+d) >> 1", Z80::op_shift_idx::<RRC>),
    Template::new("RR {0}", &[Slot::Byte(0xCB), Slot::Pattern("00011{0}")], &["r"], Timing::Fixed(8), "CY <- {0}0, {0} <- CY | {0} >> 1", Z80::op_shift_r::<RR>),
    Template::new("RR (HL)", &[Slot::Byte(0xCB), Slot::Byte(0x1E)], &[], Timing::Fixed(15), "CY <- (HL)0, (HL) <- CY | (HL) >> 1", Z80::op_shift_hl::<RR>),
    Template::new("RR ({0}+d)", &[Slot::Pattern("11{0}101"), Slot::Byte(0xCB), D, Slot::Byte(0x1E)], &["ii"], Timing::Fixed(23), "CY <- ({0}+d)0, ({0}+d) <- CY | ({0}+d) >> 1", Z80::op_shift_idx::<RR>),
    Template::new("SLA {0}", &[Slot::Byte(0xCB), Slot::Pattern("00100{0}")], &["r"], Timing::Fixed(8), "CY <- {0}7, {0} <- {0} << 1", Z80::op_shift_r::<SLA>),
    Template::new("SLA (HL)", &[Slot::Byte(0xCB), Slot::Byte(0x26)], &[], Timing::Fixed(15), "CY <- (HL)7, (HL) <- (HL) << 1", Z80::op_shift_hl::<SLA>),
    Template::new("SLA ({0}+d)", &[Slot::Pattern("11{0}101"), Slot::Byte(0xCB), D, Slot::Byte(0x26)], &["ii"], Timing::Fixed(23), "CY <- ({0}+d)7, ({0}+d) <- ({0}+d) << 1", Z80::op_shift_idx::<SLA>),
    Template::new("SRA {0}", &[Slot::Byte(0xCB), Slot::Pattern("00101{0}")], &["r"], Timing::Fixed(8), "CY <- {0}0, {0} <- {0}7 | {0} >> 1", Z80::op_shift_r::<SRA>),
    Template::new("SRA (HL)", &[Slot::Byte(0xCB), Slot::Byte(0x2E)], &[], Timing::Fixed(15), "CY <- (HL)0, (HL) <- (HL)7 | (HL) >> 1", Z80::op_shift_hl::<SRA>),
    Template::new("SRA ({0}+d)", &[Slot::Pattern("11{0}101"), Slot::Byte(0xCB), D, Slot::Byte(0x2E)], &["ii"], Timing::Fixed(23), "CY <- ({0}+d)0, ({0}+d) <- ({0}+d)7 | ({0}+d) >> 1", Z80::op_shift_idx::<SRA>),
    Template::new("SRL {0}", &[Slot::Byte(0xCB), Slot::Pattern("00111{0}")], &["r"], Timing::Fixed(8), "CY <- {0}0, {0} <- {0} >> 1", Z80::op_shift_r::<SRL>),
    Template::new("SRL (HL)", &[Slot::Byte(0xCB), Slot::Byte(0x3E)], &[], Timing::Fixed(15), "CY <- (HL)0, (HL) <- (HL) >> 1", Z80::op_shift_hl::<SRL>),
    Template::new("SRL ({0}+d)", &[Slot::Pattern("11{0}101"), Slot::Byte(0xCB), D, Slot::Byte(0x3E)], &["ii"], Timing::Fixed(23), "CY <- ({0}+d)0, ({0}+d) <- ({0}+d) >> 1", Z80::op_shift_idx::<SRL>),
    Template::new("RLD", &[Slot::Byte(0xED), Slot::Byte(0x6F)], &[], Timing::Fixed(18), "A3-0 <- (HL)7-4, (HL)7-4 <- (HL)3-0, (HL)3-0 <- A3-0", Z80::op_rld),
    Template::new("RRD", &[Slot::Byte(0xED), Slot::Byte(0x67)], &[], Timing::Fixed(18), "A3-0 <- (HL)3-0, (HL)7-4 <- A3-0, (HL)3-0 <- (HL)7-4", Z80::op_rrd),
];

impl Z80 {
    /// S, Z and P (parity) of `val`. Bits 5, 3, H and N stay clear.
    fn szp(val: u8) -> u8 {
        Self::sz53p(val) & !(Flag::Y as u8 | Flag::X as u8)
    }

    /// Rotate or shift `val` and return the result.
    /// S, Z and P (parity) follow the result, C takes the bit shifted out,
    /// and the other flags are cleared.
    fn rotate_shift(&mut self, op: u8, val: u8) -> u8 {
        let carry_in = self.flag(Flag::C) as u8;
        let (result, carry) = match op {
            RLC => (val.rotate_left(1), val >> 7),
            RRC => (val.rotate_right(1), val & 1),
            RL => ((val << 1) | carry_in, val >> 7),
            RR => ((val >> 1) | (carry_in << 7), val & 1),
            SLA => (val << 1, val >> 7),
            SRA => ((val >> 1) | (val & 0x80), val & 1),
            _ => (val >> 1, val & 1),
        };

        let mut f = Self::szp(result);
        if carry != 0 { f |= Flag::C as u8; }
        self.f = f;
        result
    }

    /// RLCA, RLA, RRCA and RRA behave as their CB forms applied to A.
    fn op_shift_a<const OP: u8>(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.modify8(Location::Reg(Reg8::A), |cpu, val| cpu.rotate_shift(OP, val))?;
        Ok(Flow::Advance)
    }

    fn op_shift_r<const OP: u8>(&mut self, args: Args<'_>) -> Result<Flow> {
        self.modify8(Location::Reg(args.reg(0)?), |cpu, val| cpu.rotate_shift(OP, val))?;
        Ok(Flow::Advance)
    }

    fn op_shift_hl<const OP: u8>(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.modify8(Location::Indirect(Reg16::HL), |cpu, val| cpu.rotate_shift(OP, val))?;
        Ok(Flow::Advance)
    }

    /// DD CB d op: the displacement sits before the final opcode byte.
    fn op_shift_idx<const OP: u8>(&mut self, args: Args<'_>) -> Result<Flow> {
        let loc = Location::Indexed(args.pair(0)?, 2);
        self.modify8(loc, |cpu, val| cpu.rotate_shift(OP, val))?;
        Ok(Flow::Advance)
    }

    // --- Digit Rotation ---

    fn digit_flags(&mut self) {
        self.f = (self.f & Flag::C as u8) | Self::szp(self.a);
    }

    /// RLD 18 T: the low nibble of A and both nibbles of (HL) rotate left.
    fn op_rld(&mut self, _args: Args<'_>) -> Result<Flow> {
        let addr = self.get_hl();
        let mem = self.memory.read(addr);
        self.memory.write(addr, (mem << 4) | (self.a & 0x0F));
        self.a = (self.a & 0xF0) | (mem >> 4);
        self.digit_flags();
        Ok(Flow::Advance)
    }

    /// RRD 18 T: the same three nibbles rotate right.
    fn op_rrd(&mut self, _args: Args<'_>) -> Result<Flow> {
        let addr = self.get_hl();
        let mem = self.memory.read(addr);
        self.memory.write(addr, (self.a << 4) | (mem >> 4));
        self.a = (self.a & 0xF0) | (mem & 0x0F);
        self.digit_flags();
        Ok(Flow::Advance)
    }
}
