use crate::cpu::z80::registers::Flag;
use crate::cpu::z80::template::{Args, Slot, Template, Timing};
use crate::cpu::z80::{Flow, Z80};
use crate::error::Result;

const REPEAT: Timing = Timing::Branch { taken: 21, not_taken: 16 };

pub(super) const BLOCK_TRANSFER: &[Template] = &[
    Template::new("LDI", &[Slot::Byte(0xED), Slot::Byte(0xA0)], &[], Timing::Fixed(16), "(DE) <- (HL), DE <- DE + 1, HL <- HL + 1, BC <- BC - 1", Z80::op_ldi),
    Template::new("LDIR", &[Slot::Byte(0xED), Slot::Byte(0xB0)], &[], REPEAT, "LDI until BC = 0", Z80::op_ldir),
    Template::new("LDD", &[Slot::Byte(0xED), Slot::Byte(0xA8)], &[], Timing::Fixed(16), "(DE) <- (HL), DE <- DE - 1, HL <- HL - 1, BC <- BC - 1", Z80::op_ldd),
    Template::new("LDDR", &[Slot::Byte(0xED), Slot::Byte(0xB8)], &[], REPEAT, "LDD until BC = 0", Z80::op_lddr),
];

pub(super) const SEARCH: &[Template] = &[
    Template::new("CPI", &[Slot::Byte(0xED), Slot::Byte(0xA1)], &[], Timing::Fixed(16), "A - (HL), HL <- HL + 1, BC <- BC - 1", Z80::op_cpi),
    Template::new("CPIR", &[Slot::Byte(0xED), Slot::Byte(0xB1)], &[], REPEAT, "CPI until BC = 0", Z80::op_cpir),
    Template::new("CPD", &[Slot::Byte(0xED), Slot::Byte(0xA9)], &[], Timing::Fixed(16), "A - (HL), HL <- HL - 1, BC <- BC - 1", Z80::op_cpd),
    Template::new("CPDR", &[Slot::Byte(0xED), Slot::Byte(0xB9)], &[], REPEAT, "CPD until BC = 0", Z80::op_cpdr),
];

impl Z80 {
    /// Repeat the instruction while BC is non-zero.
    fn repeat_while_bc(&self) -> Flow {
        if self.get_bc() != 0 { Flow::Repeat } else { Flow::Advance }
    }

    // --- Block Transfer ---

    /// One LDI/LDD step. `delta` is added to HL and DE.
    ///
    /// P/V is set when BC was 1 going in, i.e. on the step that empties it.
    fn block_transfer(&mut self, delta: u16) {
        let val = self.memory.read(self.get_hl());
        self.memory.write(self.get_de(), val);
        self.set_hl(self.get_hl().wrapping_add(delta));
        self.set_de(self.get_de().wrapping_add(delta));

        let bc = self.get_bc();
        self.set_bc(bc.wrapping_sub(1));

        let mut f = self.f & !(Flag::H as u8 | Flag::N as u8 | Flag::PV as u8);
        if bc == 1 { f |= Flag::PV as u8; }
        self.f = f;
    }

    /// LDI 16 T: ED A0
    fn op_ldi(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.block_transfer(1);
        Ok(Flow::Advance)
    }

    /// LDIR 21 T repeating / 16 T when done: ED B0
    fn op_ldir(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.block_transfer(1);
        Ok(self.repeat_while_bc())
    }

    fn op_ldd(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.block_transfer(0xFFFF);
        Ok(Flow::Advance)
    }

    fn op_lddr(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.block_transfer(0xFFFF);
        Ok(self.repeat_while_bc())
    }

    // --- Search ---

    /// One CPI/CPD step: compare A with (HL), leaving C alone.
    ///
    /// P/V is set while BC was not 1 going in.
    fn block_compare(&mut self, delta: u16) {
        let val = self.memory.read(self.get_hl());
        self.compare(val, false);
        self.set_hl(self.get_hl().wrapping_add(delta));

        let bc = self.get_bc();
        self.set_bc(bc.wrapping_sub(1));
        self.set_flag(Flag::PV, bc != 1);
    }

    fn op_cpi(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.block_compare(1);
        Ok(Flow::Advance)
    }

    /// CPIR repeats until BC runs out. A match does not stop it.
    fn op_cpir(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.block_compare(1);
        Ok(self.repeat_while_bc())
    }

    fn op_cpd(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.block_compare(0xFFFF);
        Ok(Flow::Advance)
    }

    fn op_cpdr(&mut self, _args: Args<'_>) -> Result<Flow> {
        self.block_compare(0xFFFF);
        Ok(self.repeat_while_bc())
    }
}
