use crate::cpu::z80::addressing::Location;
use crate::cpu::z80::registers::{Flag, Reg8, Reg16};
use crate::cpu::z80::template::{Args, D, N, NH, NL, Slot, Template, Timing};
use crate::cpu::z80::{Flow, Z80};
use crate::error::Result;

pub(super) const EIGHT_BIT_LOAD: &[Template] = &[
    Template::new("LD {0},{1}", &[Slot::Pattern("01{0}{1}")], &["r", "r"], Timing::Fixed(4), "{0} <- {1}", Z80::op_ld_r_r),
    Template::new("LD {0},n", &[Slot::Pattern("00{0}110"), N], &["r"], Timing::Fixed(7), "{0} <- n", Z80::op_ld_r_n),
    Template::new("LD {0},(HL)", &[Slot::Pattern("01{0}110")], &["r"], Timing::Fixed(7), "{0} <- (HL)", Z80::op_ld_r_hl),
    Template::new("LD {0},({1}+d)", &[Slot::Pattern("11{1}101"), Slot::Pattern("01{0}110"), D], &["r", "ii"], Timing::Fixed(19), "{0} <- ({1}+d)", Z80::op_ld_r_idx),
    Template::new("LD (HL),{0}", &[Slot::Pattern("01110{0}")], &["r"], Timing::Fixed(7), "(HL) <- {0}", Z80::op_ld_hl_r),
    Template::new("LD ({0}+d),{1}", &[Slot::Pattern("11{0}101"), Slot::Pattern("01110{1}"), D], &["ii", "r"], Timing::Fixed(19), "({0}+d) <- {1}", Z80::op_ld_idx_r),
    Template::new("LD (HL),n", &[Slot::Byte(0x36), N], &[], Timing::Fixed(10), "(HL) <- n", Z80::op_ld_hl_n),
    Template::new("LD ({0}+d),n", &[Slot::Pattern("11{0}101"), Slot::Byte(0x36), D, N], &["ii"], Timing::Fixed(19), "({0}+d) <- n", Z80::op_ld_idx_n),
    Template::new("LD A,(BC)", &[Slot::Byte(0x0A)], &[], Timing::Fixed(7), "A <- (BC)", Z80::op_ld_a_bc),
    Template::new("LD A,(DE)", &[Slot::Byte(0x1A)], &[], Timing::Fixed(7), "A <- (DE)", Z80::op_ld_a_de),
    Template::new("LD A,(nn)", &[Slot::Byte(0x3A), NL, NH], &[], Timing::Fixed(13), "A <- (nn)", Z80::op_ld_a_nn),
    Template::new("LD (BC),A", &[Slot::Byte(0x02)], &[], Timing::Fixed(7), "(BC) <- A", Z80::op_ld_bc_a),
    Template::new("LD (DE),A", &[Slot::Byte(0x12)], &[], Timing::Fixed(7), "(DE) <- A", Z80::op_ld_de_a),
    Template::new("LD (nn),A", &[Slot::Byte(0x32), NL, NH], &[], Timing::Fixed(13), "(nn) <- A", Z80::op_ld_nn_a),
    Template::new("LD A,I", &[Slot::Byte(0xED), Slot::Byte(0x57)], &[], Timing::Fixed(9), "A <- I", Z80::op_ld_a_i),
    Template::new("LD A,R", &[Slot::Byte(0xED), Slot::Byte(0x5F)], &[], Timing::Fixed(9), "A <- R", Z80::op_ld_a_r),
    Template::new("LD I,A", &[Slot::Byte(0xED), Slot::Byte(0x47)], &[], Timing::Fixed(9), "I <- A", Z80::op_ld_i_a),
    Template::new("LD R,A", &[Slot::Byte(0xED), Slot::Byte(0x4F)], &[], Timing::Fixed(9), "R <- A", Z80::op_ld_r_a),
];

pub(super) const SIXTEEN_BIT_LOAD: &[Template] = &[
    Template::new("LD {0},nn", &[Slot::Pattern("00{0}0001"), NL, NH], &["dd"], Timing::Fixed(10), "{0} <- nn", Z80::op_ld_dd_nn),
    Template::new("LD {0},nn", &[Slot::Pattern("11{0}101"), Slot::Byte(0x21), NL, NH], &["ii"], Timing::Fixed(14), "{0} <- nn", Z80::op_ld_ii_nn),
    Template::new("LD HL,(nn)", &[Slot::Byte(0x2A), NL, NH], &[], Timing::Fixed(16), "H <- (nn+1), L <- (nn)", Z80::op_ld_hl_ind_nn),
    Template::new("LD {0},(nn)", &[Slot::Byte(0xED), Slot::Pattern("01{0}1011"), NL, NH], &["dd"], Timing::Fixed(20), "{0} <- (nn)", Z80::op_ld_pair_ind_nn),
    Template::new("LD {0},(nn)", &[Slot::Pattern("11{0}101"), Slot::Byte(0x2A), NL, NH], &["ii"], Timing::Fixed(20), "{0} <- (nn)", Z80::op_ld_pair_ind_nn),
    Template::new("LD (nn),HL", &[Slot::Byte(0x22), NL, NH], &[], Timing::Fixed(16), "(nn+1) <- H, (nn) <- L", Z80::op_ld_ind_nn_hl),
    Template::new("LD (nn),{0}", &[Slot::Byte(0xED), Slot::Pattern("01{0}0011"), NL, NH], &["dd"], Timing::Fixed(20), "(nn) <- {0}", Z80::op_ld_ind_nn_pair),
    Template::new("LD (nn),{0}", &[Slot::Pattern("11{0}101"), Slot::Byte(0x22), NL, NH], &["ii"], Timing::Fixed(20), "(nn) <- {0}", Z80::op_ld_ind_nn_pair),
    Template::new("LD SP,HL", &[Slot::Byte(0xF9)], &[], Timing::Fixed(6), "SP <- HL", Z80::op_ld_sp_hl),
    Template::new("LD SP,{0}", &[Slot::Pattern("11{0}101"), Slot::Byte(0xF9)], &["ii"], Timing::Fixed(10), "SP <- {0}", Z80::op_ld_sp_ii),
    Template::new("PUSH {0}", &[Slot::Pattern("11{0}0101")], &["qq"], Timing::Fixed(11), "(SP-2) <- {0}, SP <- SP - 2", Z80::op_push),
    Template::new("PUSH {0}", &[Slot::Pattern("11{0}101"), Slot::Byte(0xE5)], &["ii"], Timing::Fixed(15), "(SP-2) <- {0}, SP <- SP - 2", Z80::op_push),
    Template::new("POP {0}", &[Slot::Pattern("11{0}0001")], &["qq"], Timing::Fixed(10), "{0} <- (SP), SP <- SP + 2", Z80::op_pop),
    Template::new("POP {0}", &[Slot::Pattern("11{0}101"), Slot::Byte(0xE1)], &["ii"], Timing::Fixed(14), "{0} <- (SP), SP <- SP + 2", Z80::op_pop),
];

impl Z80 {
    fn load8(&mut self, dst: Location, src: Location) -> Result<Flow> {
        let val = self.read8(src)?;
        self.write8(dst, val)?;
        Ok(Flow::Advance)
    }

    fn load16(&mut self, dst: Location, src: Location) -> Result<Flow> {
        let val = self.read16(src)?;
        self.write16(dst, val)?;
        Ok(Flow::Advance)
    }

    // --- 8-bit Loads ---

    /// LD r,r' 4 T. Opcode mask: 01 rrr rrr
    fn op_ld_r_r(&mut self, args: Args<'_>) -> Result<Flow> {
        self.load8(Location::Reg(args.reg(0)?), Location::Reg(args.reg(1)?))
    }

    /// LD r,n 7 T. Opcode mask: 00 rrr 110
    fn op_ld_r_n(&mut self, args: Args<'_>) -> Result<Flow> {
        self.load8(Location::Reg(args.reg(0)?), Location::Immediate(1))
    }

    fn op_ld_r_hl(&mut self, args: Args<'_>) -> Result<Flow> {
        self.load8(Location::Reg(args.reg(0)?), Location::Indirect(Reg16::HL))
    }

    /// LD r,(IX+d) 19 T. The displacement follows the second opcode byte.
    fn op_ld_r_idx(&mut self, args: Args<'_>) -> Result<Flow> {
        self.load8(Location::Reg(args.reg(0)?), Location::Indexed(args.pair(1)?, 2))
    }

    fn op_ld_hl_r(&mut self, args: Args<'_>) -> Result<Flow> {
        self.load8(Location::Indirect(Reg16::HL), Location::Reg(args.reg(0)?))
    }

    fn op_ld_idx_r(&mut self, args: Args<'_>) -> Result<Flow> {
        self.load8(Location::Indexed(args.pair(0)?, 2), Location::Reg(args.reg(1)?))
    }

    fn op_ld_hl_n(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.load8(Location::Indirect(Reg16::HL), Location::Immediate(1))
    }

    /// LD (IX+d),n 19 T: DD 36 d n
    fn op_ld_idx_n(&mut self, args: Args<'_>) -> Result<Flow> {
        self.load8(Location::Indexed(args.pair(0)?, 2), Location::Immediate(3))
    }

    fn op_ld_a_bc(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.load8(Location::Reg(Reg8::A), Location::Indirect(Reg16::BC))
    }

    fn op_ld_a_de(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.load8(Location::Reg(Reg8::A), Location::Indirect(Reg16::DE))
    }

    fn op_ld_a_nn(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.load8(Location::Reg(Reg8::A), Location::Absolute(1))
    }

    fn op_ld_bc_a(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.load8(Location::Indirect(Reg16::BC), Location::Reg(Reg8::A))
    }

    fn op_ld_de_a(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.load8(Location::Indirect(Reg16::DE), Location::Reg(Reg8::A))
    }

    fn op_ld_nn_a(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.load8(Location::Absolute(1), Location::Reg(Reg8::A))
    }

    /// LD A,I / LD A,R: S and Z follow the value, H and N clear, P/V copies
    /// IFF2. C is preserved.
    fn load_a_special(&mut self, val: u8) {
        self.a = val;
        let mut f = (self.f & Flag::C as u8) | Self::sz53(val);
        if self.iff2 { f |= Flag::PV as u8; }
        self.f = f;
    }

    fn op_ld_a_i(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.load_a_special(self.i);
        Ok(Flow::Advance)
    }

    fn op_ld_a_r(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.load_a_special(self.r);
        Ok(Flow::Advance)
    }

    fn op_ld_i_a(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.load8(Location::Reg(Reg8::I), Location::Reg(Reg8::A))
    }

    fn op_ld_r_a(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.load8(Location::Reg(Reg8::R), Location::Reg(Reg8::A))
    }

    // --- 16-bit Loads ---

    fn op_ld_dd_nn(&mut self, args: Args<'_>) -> Result<Flow> {
        self.load16(Location::Pair(args.pair(0)?), Location::Immediate(1))
    }

    fn op_ld_ii_nn(&mut self, args: Args<'_>) -> Result<Flow> {
        self.load16(Location::Pair(args.pair(0)?), Location::Immediate(2))
    }

    fn op_ld_hl_ind_nn(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.load16(Location::Pair(Reg16::HL), Location::Absolute(1))
    }

    /// ED- and DD/FD-prefixed forms: the address follows two opcode bytes.
    fn op_ld_pair_ind_nn(&mut self, args: Args<'_>) -> Result<Flow> {
        self.load16(Location::Pair(args.pair(0)?), Location::Absolute(2))
    }

    fn op_ld_ind_nn_hl(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.load16(Location::Absolute(1), Location::Pair(Reg16::HL))
    }

    fn op_ld_ind_nn_pair(&mut self, args: Args<'_>) -> Result<Flow> {
        self.load16(Location::Absolute(2), Location::Pair(args.pair(0)?))
    }

    fn op_ld_sp_hl(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.load16(Location::Pair(Reg16::SP), Location::Pair(Reg16::HL))
    }

    fn op_ld_sp_ii(&mut self, args: Args<'_>) -> Result<Flow> {
        self.load16(Location::Pair(Reg16::SP), Location::Pair(args.pair(0)?))
    }
}
