use crate::cpu::z80::registers::Reg16;
use crate::cpu::z80::template::{Args, Slot, Template, Timing};
use crate::cpu::z80::{Flow, Z80};
use crate::error::Result;

pub(super) const EXCHANGE: &[Template] = &[
    Template::new("EX DE,HL", &[Slot::Byte(0xEB)], &[], Timing::Fixed(4), "DE <-> HL", Z80::op_ex_de_hl),
    Template::new("EX AF,AF'", &[Slot::Byte(0x08)], &[], Timing::Fixed(4), "AF <-> AF'", Z80::op_ex_af_af),
    Template::new("EXX", &[Slot::Byte(0xD9)], &[], Timing::Fixed(4), "BC <-> BC', DE <-> DE', HL <-> HL'", Z80::op_exx),
    Template::new("EX (SP),HL", &[Slot::Byte(0xE3)], &[], Timing::Fixed(19), "H <-> (SP+1), L <-> (SP)", Z80::op_ex_sp_hl),
    Template::new("EX (SP),{0}", &[Slot::Pattern("11{0}101"), Slot::Byte(0xE3)], &["ii"], Timing::Fixed(23), "{0} <-> (SP)", Z80::op_ex_sp_ii),
];

impl Z80 {
    // --- Stack Helpers ---

    /// High byte goes to SP-1, low byte to SP-2.
    pub(super) fn push16(&mut self, val: u16) {
        self.dec_sp(1);
        self.memory.write(self.sp, (val >> 8) as u8);
        self.dec_sp(1);
        self.memory.write(self.sp, val as u8);
    }

    pub(super) fn pop16(&mut self) -> u16 {
        let lo = self.memory.read(self.sp);
        self.inc_sp(1);
        let hi = self.memory.read(self.sp);
        self.inc_sp(1);
        ((hi as u16) << 8) | lo as u16
    }

    /// PUSH qq 11 T, PUSH IX 15 T. Opcode mask: 11 qq0 101
    pub(super) fn op_push(&mut self, args: Args<'_>) -> Result<Flow> {
        let val = self.reg16(args.pair(0)?);
        self.push16(val);
        Ok(Flow::Advance)
    }

    /// POP qq 10 T, POP IX 14 T. Opcode mask: 11 qq0 001
    pub(super) fn op_pop(&mut self, args: Args<'_>) -> Result<Flow> {
        let reg = args.pair(0)?;
        let val = self.pop16();
        self.set_reg16(reg, val);
        Ok(Flow::Advance)
    }

    // --- Exchange ---

    fn op_ex_de_hl(&mut self, _args: Args<'_>) -> Result<Flow> {
        std::mem::swap(&mut self.d, &mut self.h);
        std::mem::swap(&mut self.e, &mut self.l);
        Ok(Flow::Advance)
    }

    fn op_ex_af_af(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.swap_af();
        Ok(Flow::Advance)
    }

    fn op_exx(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.swap_main();
        Ok(Flow::Advance)
    }

    fn exchange_top(&mut self, reg: Reg16) {
        let top = self.memory.read_u16(self.sp);
        let val = self.reg16(reg);
        self.memory.write_u16(self.sp, val);
        self.set_reg16(reg, top);
    }

    fn op_ex_sp_hl(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.exchange_top(Reg16::HL);
        Ok(Flow::Advance)
    }

    fn op_ex_sp_ii(&mut self, args: Args<'_>) -> Result<Flow> {
        self.exchange_top(args.pair(0)?);
        Ok(Flow::Advance)
    }
}
