use crate::cpu::opcodes::{AluOp, Operand, Reg16};
use crate::cpu::{Bus, Cpu, Flag};

impl Cpu {
    pub(super) fn exec_alu<B: Bus>(&mut self, bus: &mut B, op: AluOp, src: Operand) {
        let value = self.read_operand(bus, src);
        self.alu(op, value);
    }

    /// INC rr / DEC rr; `delta` is 1 or 0xFFFF. No flags.
    pub(super) fn exec_step16(&mut self, reg: Reg16, delta: u16) {
        let value = self.regs.get16(reg).wrapping_add(delta);
        self.regs.set16(reg, value);
    }

    pub(super) fn exec_add_sp_offset<B: Bus>(&mut self, bus: &mut B) {
        let offset = self.fetch8(bus);
        self.regs.sp = self.sp_plus_offset(offset);
    }

    pub(super) fn exec_cpl(&mut self) {
        self.regs.a = !self.regs.a;
        self.set_flag(Flag::N, true);
        self.set_flag(Flag::H, true);
    }

    pub(super) fn exec_scf(&mut self) {
        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, false);
        self.set_flag(Flag::C, true);
    }

    pub(super) fn exec_ccf(&mut self) {
        let carry = self.get_flag(Flag::C);
        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, false);
        self.set_flag(Flag::C, !carry);
    }
}
