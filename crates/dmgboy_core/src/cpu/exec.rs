mod arith;
mod bits;
mod control;
mod ld;
mod system;

use super::opcodes::Instruction;
use super::{Bus, Cpu};

impl Cpu {
    /// Run one decoded instruction. Returns true when a conditional branch
    /// was taken, which selects the longer table cost.
    pub(super) fn execute<B: Bus>(&mut self, bus: &mut B, instruction: Instruction) -> bool {
        use Instruction as I;

        match instruction {
            I::Nop | I::Prefix | I::Invalid => {}

            I::Load { dst, src } => self.exec_load(bus, dst, src),
            I::LoadImm16(reg) => self.exec_load_imm16(bus, reg),
            I::StoreSp => self.exec_store_sp(bus),
            I::LoadSpHl => self.regs.sp = self.regs.hl(),
            I::LoadHlSpOffset => self.exec_load_hl_sp_offset(bus),

            I::Alu { op, src } => self.exec_alu(bus, op, src),
            I::Inc(target) => self.modify_operand(bus, target, Cpu::inc8),
            I::Dec(target) => self.modify_operand(bus, target, Cpu::dec8),
            I::Inc16(reg) => self.exec_step16(reg, 1),
            I::Dec16(reg) => self.exec_step16(reg, u16::MAX),
            I::AddHl(reg) => self.add_hl(self.regs.get16(reg)),
            I::AddSpOffset => self.exec_add_sp_offset(bus),
            I::Daa => self.daa(),
            I::Cpl => self.exec_cpl(),
            I::Scf => self.exec_scf(),
            I::Ccf => self.exec_ccf(),

            I::RotateA(op) => self.rotate_a(op),
            I::Shift { op, target } => self.modify_operand(bus, target, |cpu, v| cpu.shift(op, v)),
            I::Bit { bit, target } => self.exec_bit(bus, bit, target),
            I::Res { bit, target } => self.modify_operand(bus, target, |_, v| v & !(1 << bit)),
            I::Set { bit, target } => self.modify_operand(bus, target, |_, v| v | (1 << bit)),

            I::Push(reg) => self.push_u16(bus, self.regs.get16(reg)),
            I::Pop(reg) => {
                let value = self.pop_u16(bus);
                self.regs.set16(reg, value);
            }
            I::Jump(cond) => return self.exec_jump(bus, cond),
            I::JumpHl => self.regs.pc = self.regs.hl(),
            I::JumpRelative(cond) => return self.exec_jump_relative(bus, cond),
            I::Call(cond) => return self.exec_call(bus, cond),
            I::Return(cond) => return self.exec_return(bus, cond),
            I::ReturnInterrupt => self.exec_reti(bus),
            I::Restart(vector) => self.exec_restart(bus, vector),

            I::Halt => self.exec_halt(),
            I::Stop => self.exec_stop(),
            I::DisableInterrupts => self.ime = false,
            I::EnableInterrupts => self.ime = true,
        }
        false
    }
}
