mod alu;
mod exec;
mod helpers;
mod init;
mod interrupts;
pub mod opcodes;
mod regs;


pub use interrupts::InterruptFlags;
pub use opcodes::{AluOp, Condition, Instruction, Opcode, Operand, Reg16, Reg8, ShiftOp};
pub use regs::{Flag, Registers};

/// Read/write view of the 16-bit address space as seen by the CPU.
///
/// The machine bus implements this; CPU unit tests use a flat 64 KiB array.
pub trait Bus {
    fn read8(&mut self, addr: u16) -> u8;
    fn write8(&mut self, addr: u16, value: u8);
}

/// Sharp LR35902 core.
///
/// The CPU is driven one master-clock step at a time: an instruction is
/// executed in full when its slot opens and the returned T-state cost is
/// then burned down one step per call.
#[derive(Clone, Debug)]
pub struct Cpu {
    pub regs: Registers,
    /// Interrupt master enable.
    pub ime: bool,
    pub halted: bool,
    cycles_remaining: u32,
    invalid_opcodes: u64,
}

impl Cpu {
    /// Advance the CPU by one master-clock step.
    ///
    /// When the previous instruction's cost has been paid and the CPU is not
    /// halted, the next instruction is fetched and executed immediately.
    pub fn step<B: Bus>(&mut self, bus: &mut B) {
        if self.cycles_remaining == 0 && !self.halted {
            self.cycles_remaining = self.execute_next(bus);
        }
        self.cycles_remaining = self.cycles_remaining.saturating_sub(1);
    }

    /// Fetch, decode and execute one instruction at PC, returning its cost in
    /// T-states.
    pub fn execute_next<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let pc = self.regs.pc;
        let byte = self.fetch8(bus);
        let opcode = if byte == 0xCB {
            let cb = self.fetch8(bus);
            &opcodes::CB_OPCODES[cb as usize]
        } else {
            &opcodes::OPCODES[byte as usize]
        };

        log::trace!("{pc:04X}: {}", opcode.instruction);

        if opcode.instruction == Instruction::Invalid {
            self.invalid_opcodes += 1;
            log::warn!("invalid opcode {byte:02X} at {pc:04X}");
            return 0;
        }

        let taken = self.execute(bus, opcode.instruction);
        if taken {
            opcode.taken_cycles as u32
        } else {
            opcode.cycles as u32
        }
    }

    /// T-states still owed by the instruction currently in flight.
    pub fn cycles_remaining(&self) -> u32 {
        self.cycles_remaining
    }

    /// Number of architecturally undefined opcodes executed so far.
    pub fn invalid_opcode_count(&self) -> u64 {
        self.invalid_opcodes
    }
}
