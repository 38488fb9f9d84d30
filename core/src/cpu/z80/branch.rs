use crate::cpu::z80::addressing::Location;
use crate::cpu::z80::template::{Args, E, NH, NL, Slot, Template, Timing};
use crate::cpu::z80::{Flow, Z80};
use crate::error::Result;

pub(super) const JUMP: &[Template] = &[
    Template::new("JP nn", &[Slot::Byte(0xC3), NL, NH], &[], Timing::Fixed(10), "PC <- nn", Z80::op_jp_nn),
    Template::new("JP {0},nn", &[Slot::Pattern("11{0}010"), NL, NH], &["cc"], Timing::Fixed(10), "if {0} then PC <- nn", Z80::op_jp_cc_nn),
    Template::new("JR e", &[Slot::Byte(0x18), E], &[], Timing::Fixed(12), "PC <- PC + e", Z80::op_jr_e),
    Template::new("JR {0},e", &[Slot::Pattern("001{0}000"), E], &["jj"], Timing::Branch { taken: 12, not_taken: 7 }, "if {0} then PC <- PC + e", Z80::op_jr_cc_e),
    Template::new("JP (HL)", &[Slot::Byte(0xE9)], &[], Timing::Fixed(4), "PC <- HL", Z80::op_jp_hl),
    Template::new("JP ({0})", &[Slot::Pattern("11{0}101"), Slot::Byte(0xE9)], &["ii"], Timing::Fixed(8), "PC <- {0}", Z80::op_jp_ii),
    Template::new("DJNZ e", &[Slot::Byte(0x10), E], &[], Timing::Branch { taken: 13, not_taken: 8 }, "B <- B - 1, if B != 0 then PC <- PC + e", Z80::op_djnz),
];

pub(super) const CALL_AND_RETURN: &[Template] = &[
    Template::new("CALL nn", &[Slot::Byte(0xCD), NL, NH], &[], Timing::Fixed(17), "(SP-2) <- PC, SP <- SP - 2, PC <- nn", Z80::op_call_nn),
    Template::new("CALL {0},nn", &[Slot::Pattern("11{0}100"), NL, NH], &["cc"], Timing::Branch { taken: 17, not_taken: 10 }, "if {0} then CALL nn", Z80::op_call_cc_nn),
    Template::new("RET", &[Slot::Byte(0xC9)], &[], Timing::Fixed(10), "PC <- (SP), SP <- SP + 2", Z80::op_ret),
    Template::new("RET {0}", &[Slot::Pattern("11{0}000")], &["cc"], Timing::Branch { taken: 11, not_taken: 5 }, "if {0} then RET", Z80::op_ret_cc),
    Template::new("RETI", &[Slot::Byte(0xED), Slot::Byte(0x4D)], &[], Timing::Fixed(14), "return from interrupt", Z80::op_ret),
    Template::new("RETN", &[Slot::Byte(0xED), Slot::Byte(0x45)], &[], Timing::Fixed(14), "return from NMI, IFF1 <- IFF2", Z80::op_retn),
    Template::new("RST {0}", &[Slot::Pattern("11{0}111")], &["p"], Timing::Fixed(11), "(SP-2) <- PC, SP <- SP - 2, PC <- {0}", Z80::op_rst),
];

impl Z80 {
    // --- Jumps ---

    /// JP nn 10 T
    fn op_jp_nn(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.pc = self.read16(Location::Immediate(1))?;
        Ok(Flow::Jump)
    }

    /// JP cc,nn 10 T whether taken or not. Opcode mask: 11 ccc 010
    fn op_jp_cc_nn(&mut self, args: Args<'_>) -> Result<Flow> {
        if !args.cond(0)?.holds(self.f) {
            return Ok(Flow::Advance);
        }
        self.op_jp_nn(args)
    }

    /// JR e 12 T. The offset is relative to the following instruction.
    fn op_jr_e(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.pc = self.relative_target(1, 2);
        Ok(Flow::Jump)
    }

    /// JR cc,e 12 T taken / 7 T not taken. Opcode mask: 001 cc 000
    fn op_jr_cc_e(&mut self, args: Args<'_>) -> Result<Flow> {
        if !args.cond(0)?.holds(self.f) {
            return Ok(Flow::Advance);
        }
        self.op_jr_e(args)
    }

    fn op_jp_hl(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.pc = self.get_hl();
        Ok(Flow::Jump)
    }

    fn op_jp_ii(&mut self, args: Args<'_>) -> Result<Flow> {
        self.pc = self.reg16(args.pair(0)?);
        Ok(Flow::Jump)
    }

    /// DJNZ e 13 T taken / 8 T not taken
    fn op_djnz(&mut self, args: Args<'_>) -> Result<Flow> {
        self.b = self.b.wrapping_sub(1);
        if self.b == 0 {
            return Ok(Flow::Advance);
        }
        self.op_jr_e(args)
    }

    // --- Calls ---

    /// CALL nn 17 T: pushes the address of the next instruction.
    fn op_call_nn(&mut self, _args: Args<'_>) -> Result<Flow> {
        let target = self.read16(Location::Immediate(1))?;
        self.push16(self.pc.wrapping_add(3));
        self.pc = target;
        Ok(Flow::Jump)
    }

    /// CALL cc,nn 17 T taken / 10 T not taken. Opcode mask: 11 ccc 100
    fn op_call_cc_nn(&mut self, args: Args<'_>) -> Result<Flow> {
        if !args.cond(0)?.holds(self.f) {
            return Ok(Flow::Advance);
        }
        self.op_call_nn(args)
    }

    /// RET 10 T, RETI 14 T
    fn op_ret(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.pc = self.pop16();
        Ok(Flow::Jump)
    }

    /// RET cc 11 T taken / 5 T not taken. Opcode mask: 11 ccc 000
    fn op_ret_cc(&mut self, args: Args<'_>) -> Result<Flow> {
        if !args.cond(0)?.holds(self.f) {
            return Ok(Flow::Advance);
        }
        self.op_ret(args)
    }

    /// RETN 14 T: also restores IFF1 from IFF2.
    fn op_retn(&mut self, args: Args<'_>) -> Result<Flow> {
        self.iff1 = self.iff2;
        self.op_ret(args)
    }

    /// RST p 11 T. Opcode mask: 11 ttt 111
    fn op_rst(&mut self, args: Args<'_>) -> Result<Flow> {
        let vector = args.vector(0)?;
        self.push16(self.pc.wrapping_add(1));
        self.pc = vector as u16;
        Ok(Flow::Jump)
    }
}
