use crate::cpu::opcodes::Condition;
use crate::cpu::{Bus, Cpu};

impl Cpu {
    /// JP cc,a16. The operand is always consumed, taken or not.
    pub(super) fn exec_jump<B: Bus>(&mut self, bus: &mut B, cond: Condition) -> bool {
        let addr = self.fetch16(bus);
        let taken = self.condition(cond);
        if taken {
            self.regs.pc = addr;
        }
        taken
    }

    pub(super) fn exec_jump_relative<B: Bus>(&mut self, bus: &mut B, cond: Condition) -> bool {
        let offset = self.fetch8(bus) as i8;
        let taken = self.condition(cond);
        if taken {
            self.regs.pc = self.regs.pc.wrapping_add_signed(offset as i16);
        }
        taken
    }

    pub(super) fn exec_call<B: Bus>(&mut self, bus: &mut B, cond: Condition) -> bool {
        let addr = self.fetch16(bus);
        let taken = self.condition(cond);
        if taken {
            self.push_u16(bus, self.regs.pc);
            self.regs.pc = addr;
        }
        taken
    }

    pub(super) fn exec_return<B: Bus>(&mut self, bus: &mut B, cond: Condition) -> bool {
        let taken = self.condition(cond);
        if taken {
            self.regs.pc = self.pop_u16(bus);
        }
        taken
    }

    pub(super) fn exec_reti<B: Bus>(&mut self, bus: &mut B) {
        self.regs.pc = self.pop_u16(bus);
        self.ime = true;
    }

    pub(super) fn exec_restart<B: Bus>(&mut self, bus: &mut B, vector: u8) {
        self.push_u16(bus, self.regs.pc);
        self.regs.pc = vector as u16;
    }
}
