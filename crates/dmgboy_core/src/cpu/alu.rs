use super::opcodes::{AluOp, ShiftOp};
use super::{Cpu, Flag};

impl Cpu {
    /// Apply one of the eight accumulator operations to A and `value`.
    pub(super) fn alu(&mut self, op: AluOp, value: u8) {
        match op {
            AluOp::Add => self.alu_add(value, false),
            AluOp::Adc => self.alu_add(value, true),
            AluOp::Sub => self.regs.a = self.alu_sub(value, false),
            AluOp::Sbc => self.regs.a = self.alu_sub(value, self.get_flag(Flag::C)),
            AluOp::And => {
                self.regs.a &= value;
                self.set_flags(self.regs.a == 0, false, true, false);
            }
            AluOp::Xor => {
                self.regs.a ^= value;
                self.set_flags(self.regs.a == 0, false, false, false);
            }
            AluOp::Or => {
                self.regs.a |= value;
                self.set_flags(self.regs.a == 0, false, false, false);
            }
            AluOp::Cp => {
                let _ = self.alu_sub(value, false);
            }
        }
    }

    fn alu_add(&mut self, value: u8, use_carry: bool) {
        let a = self.regs.a;
        let carry_in = u8::from(use_carry && self.get_flag(Flag::C));

        let half = (a & 0x0F) + (value & 0x0F) + carry_in;
        let full = a as u16 + value as u16 + carry_in as u16;
        let result = full as u8;

        self.regs.a = result;
        self.set_flags(result == 0, false, half > 0x0F, full > 0xFF);
    }

    /// A - value (- borrow), updating all four flags and returning the
    /// difference without storing it, so CP can share the path.
    fn alu_sub(&mut self, value: u8, borrow: bool) -> u8 {
        let a = self.regs.a;
        let borrow_in = i16::from(borrow);

        let half = (a & 0x0F) as i16 - (value & 0x0F) as i16 - borrow_in;
        let full = a as i16 - value as i16 - borrow_in;
        let result = full as u8;

        self.set_flags(result == 0, true, half < 0, full < 0);
        result
    }

    /// Standard post-arithmetic BCD correction of A.
    ///
    /// Uses N, H and C from the previous operation; updates Z and C, clears
    /// H and leaves N alone.
    pub(super) fn daa(&mut self) {
        let mut a = self.regs.a;
        let mut adjust = if self.get_flag(Flag::C) { 0x60 } else { 0x00 };
        if self.get_flag(Flag::H) {
            adjust |= 0x06;
        }

        if self.get_flag(Flag::N) {
            a = a.wrapping_sub(adjust);
        } else {
            if a & 0x0F > 0x09 {
                adjust |= 0x06;
            }
            if a > 0x99 {
                adjust |= 0x60;
            }
            a = a.wrapping_add(adjust);
        }

        self.set_flag(Flag::C, adjust >= 0x60);
        self.set_flag(Flag::H, false);
        self.set_flag(Flag::Z, a == 0);
        self.regs.a = a;
    }

    /// INC on an 8-bit value. C is preserved.
    pub(super) fn inc8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.set_flag(Flag::Z, result == 0);
        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, value & 0x0F == 0x0F);
        result
    }

    /// DEC on an 8-bit value. C is preserved.
    pub(super) fn dec8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.set_flag(Flag::Z, result == 0);
        self.set_flag(Flag::N, true);
        self.set_flag(Flag::H, value & 0x0F == 0);
        result
    }

    pub(super) fn add_hl(&mut self, value: u16) {
        let hl = self.regs.hl();

        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, (hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF);
        self.set_flag(Flag::C, hl as u32 + value as u32 > 0xFFFF);

        self.regs.set_hl(hl.wrapping_add(value));
    }

    /// SP plus a signed 8-bit displacement, shared by ADD SP,r8 and
    /// LD HL,SP+r8. Z and N are cleared; H and C come from the unsigned low
    /// byte addition.
    pub(super) fn sp_plus_offset(&mut self, offset: u8) -> u16 {
        let sp = self.regs.sp;
        let wide = offset as i8 as i16 as u16;
        self.set_flags(
            false,
            false,
            (sp & 0x000F) + (wide & 0x000F) > 0x000F,
            (sp & 0x00FF) + (wide & 0x00FF) > 0x00FF,
        );
        sp.wrapping_add(wide)
    }

    /// Rotate/shift `value` one bit, returning the result. Z is taken from the
    /// result, N and H are cleared and the bit shifted out lands in C.
    pub(super) fn shift(&mut self, op: ShiftOp, value: u8) -> u8 {
        let carry_in = u8::from(self.get_flag(Flag::C));
        let (result, carry) = match op {
            ShiftOp::Rlc => (value.rotate_left(1), value & 0x80 != 0),
            ShiftOp::Rrc => (value.rotate_right(1), value & 0x01 != 0),
            ShiftOp::Rl => ((value << 1) | carry_in, value & 0x80 != 0),
            ShiftOp::Rr => ((value >> 1) | (carry_in << 7), value & 0x01 != 0),
            ShiftOp::Sla => (value << 1, value & 0x80 != 0),
            ShiftOp::Sra => ((value >> 1) | (value & 0x80), value & 0x01 != 0),
            ShiftOp::Swap => (value.rotate_left(4), false),
            ShiftOp::Srl => (value >> 1, value & 0x01 != 0),
        };
        self.set_flags(result == 0, false, false, carry);
        result
    }

    /// RLCA/RRCA/RLA/RRA: like the CB rotates on A but Z is left as it was.
    pub(super) fn rotate_a(&mut self, op: ShiftOp) {
        let zero = self.get_flag(Flag::Z);
        self.regs.a = self.shift(op, self.regs.a);
        self.set_flag(Flag::Z, zero);
    }

    pub(super) fn bit(&mut self, bit: u8, value: u8) {
        self.set_flag(Flag::Z, value & (1 << bit) == 0);
        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, true);
    }
}
