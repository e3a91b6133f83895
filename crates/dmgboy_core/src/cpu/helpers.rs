use super::opcodes::{Condition, Operand};
use super::{Bus, Cpu, Flag};

impl Cpu {
    #[inline]
    pub(super) fn fetch8<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read8(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    #[inline]
    pub(super) fn fetch16<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch8(bus);
        let hi = self.fetch8(bus);
        u16::from_le_bytes([lo, hi])
    }

    /// Push a word, high byte first, with SP moving downward.
    #[inline]
    pub(super) fn push_u16<B: Bus>(&mut self, bus: &mut B, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, lo);
    }

    #[inline]
    pub(super) fn pop_u16<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = bus.read8(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let hi = bus.read8(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        u16::from_le_bytes([lo, hi])
    }

    /// Resolve a memory operand to its address, consuming immediates and
    /// applying the HL post-increment/decrement. Register operands and `d8`
    /// have no address.
    fn operand_address<B: Bus>(&mut self, bus: &mut B, operand: Operand) -> Option<u16> {
        let addr = match operand {
            Operand::Reg(_) | Operand::Imm8 => return None,
            Operand::IndHl => self.regs.hl(),
            Operand::IndBc => self.regs.bc(),
            Operand::IndDe => self.regs.de(),
            Operand::IndHlInc => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_add(1));
                hl
            }
            Operand::IndHlDec => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_sub(1));
                hl
            }
            Operand::IndImm16 => self.fetch16(bus),
            Operand::HighImm8 => 0xFF00 | self.fetch8(bus) as u16,
            Operand::HighC => 0xFF00 | self.regs.c as u16,
        };
        Some(addr)
    }

    pub(super) fn read_operand<B: Bus>(&mut self, bus: &mut B, operand: Operand) -> u8 {
        match operand {
            Operand::Reg(reg) => self.regs.get8(reg),
            Operand::Imm8 => self.fetch8(bus),
            _ => match self.operand_address(bus, operand) {
                Some(addr) => bus.read8(addr),
                None => unreachable!("{operand} has no address"),
            },
        }
    }

    pub(super) fn write_operand<B: Bus>(&mut self, bus: &mut B, operand: Operand, value: u8) {
        match operand {
            Operand::Reg(reg) => self.regs.set8(reg, value),
            Operand::Imm8 => unreachable!("immediate operand is not writable"),
            _ => {
                if let Some(addr) = self.operand_address(bus, operand) {
                    bus.write8(addr, value);
                }
            }
        }
    }

    /// Read-modify-write of a register or (HL), used by INC/DEC and the CB
    /// group. The address is resolved once.
    pub(super) fn modify_operand<B: Bus>(
        &mut self,
        bus: &mut B,
        operand: Operand,
        f: impl FnOnce(&mut Self, u8) -> u8,
    ) {
        match operand {
            Operand::Reg(reg) => {
                let old = self.regs.get8(reg);
                let value = f(self, old);
                self.regs.set8(reg, value);
            }
            _ => {
                if let Some(addr) = self.operand_address(bus, operand) {
                    let old = bus.read8(addr);
                    let value = f(self, old);
                    bus.write8(addr, value);
                }
            }
        }
    }

    #[inline]
    pub(super) fn condition(&self, condition: Condition) -> bool {
        match condition {
            Condition::Always => true,
            Condition::NotZero => !self.get_flag(Flag::Z),
            Condition::Zero => self.get_flag(Flag::Z),
            Condition::NotCarry => !self.get_flag(Flag::C),
            Condition::Carry => self.get_flag(Flag::C),
        }
    }
}
