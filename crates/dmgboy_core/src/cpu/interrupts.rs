use bitflags::bitflags;

use super::{Bus, Cpu};

/// Interrupt-flag register (0xFF0F).
pub const IF_ADDR: u16 = 0xFF0F;
/// Interrupt-enable register (0xFFFF).
pub const IE_ADDR: u16 = 0xFFFF;

/// Cost of a serviced interrupt in T-states.
const DISPATCH_CYCLES: u32 = 20;
/// Cost of leaving HALT on a pending line while IME is clear.
const WAKE_CYCLES: u32 = 8;

bitflags! {
    /// The five interrupt lines as laid out in IE and IF. Lower bits win.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct InterruptFlags: u8 {
        const VBLANK = 1 << 0;
        const LCD_STAT = 1 << 1;
        const TIMER = 1 << 2;
        const SERIAL = 1 << 3;
        const JOYPAD = 1 << 4;
    }
}

impl InterruptFlags {
    /// Vector of the highest-priority line in the set.
    pub fn vector(self) -> Option<u16> {
        let index = self.bits().trailing_zeros();
        (index < 5).then(|| 0x0040 + index as u16 * 8)
    }
}

impl Cpu {
    /// Check IE & IF once per master-clock step.
    ///
    /// Any pending enabled line wakes a halted CPU. With IME set, the lowest
    /// pending line is serviced: PC is pushed, IME and that IF bit are
    /// cleared, and PC jumps to the line's vector. The T-state charge is added
    /// to the instruction countdown and returned.
    pub fn handle_interrupt<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let iflags = bus.read8(IF_ADDR);
        let pending = InterruptFlags::from_bits_truncate(bus.read8(IE_ADDR) & iflags);
        if pending.is_empty() {
            return 0;
        }

        let was_halted = self.halted;
        self.halted = false;

        let cycles = if self.ime {
            // `pending` is non-empty, so it has a lowest line and a vector.
            let line = InterruptFlags::from_bits_retain(1 << pending.bits().trailing_zeros());
            let vector = line.vector().unwrap_or(0x0040);
            log::trace!("interrupt {line:?} from {:04X} to {vector:04X}", self.regs.pc);

            self.push_u16(bus, self.regs.pc);
            self.ime = false;
            bus.write8(IF_ADDR, iflags & !line.bits());
            self.regs.pc = vector;
            DISPATCH_CYCLES
        } else if was_halted {
            WAKE_CYCLES
        } else {
            // Running with IME clear: the line stays pending and costs nothing.
            0
        };

        self.cycles_remaining += cycles;
        cycles
    }
}
