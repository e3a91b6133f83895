use crate::cpu::opcodes::{Operand, Reg16};
use crate::cpu::{Bus, Cpu};

impl Cpu {
    /// 8-bit transfer; never touches flags.
    pub(super) fn exec_load<B: Bus>(&mut self, bus: &mut B, dst: Operand, src: Operand) {
        let value = self.read_operand(bus, src);
        self.write_operand(bus, dst, value);
    }

    pub(super) fn exec_load_imm16<B: Bus>(&mut self, bus: &mut B, reg: Reg16) {
        let value = self.fetch16(bus);
        self.regs.set16(reg, value);
    }

    /// LD (a16),SP stores SP little-endian.
    pub(super) fn exec_store_sp<B: Bus>(&mut self, bus: &mut B) {
        let addr = self.fetch16(bus);
        let [lo, hi] = self.regs.sp.to_le_bytes();
        bus.write8(addr, lo);
        bus.write8(addr.wrapping_add(1), hi);
    }

    pub(super) fn exec_load_hl_sp_offset<B: Bus>(&mut self, bus: &mut B) {
        let offset = self.fetch8(bus);
        let value = self.sp_plus_offset(offset);
        self.regs.set_hl(value);
    }
}
