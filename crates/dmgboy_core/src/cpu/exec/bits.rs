use crate::cpu::opcodes::Operand;
use crate::cpu::{Bus, Cpu};

impl Cpu {
    /// BIT b,r / BIT b,(HL). Reads only; the target is never written back.
    pub(super) fn exec_bit<B: Bus>(&mut self, bus: &mut B, bit: u8, target: Operand) {
        let value = self.read_operand(bus, target);
        self.bit(bit, value);
    }
}
