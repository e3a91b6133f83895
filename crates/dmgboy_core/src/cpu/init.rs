use super::{Bus, Cpu, Flag, Registers};

/// Cartridge header checksum byte.
const HEADER_CHECKSUM_ADDR: u16 = 0x014D;

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// A CPU in the state the DMG boot ROM leaves behind at 0x0100.
    pub fn new() -> Self {
        let mut cpu = Self {
            regs: Registers::default(),
            ime: false,
            halted: false,
            cycles_remaining: 0,
            invalid_opcodes: 0,
        };
        cpu.apply_dmg_boot_state();
        cpu
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn apply_dmg_boot_state(&mut self) {
        self.regs.a = 0x01;
        self.regs.f = 0xB0;
        self.regs.b = 0x00;
        self.regs.c = 0x13;
        self.regs.d = 0x00;
        self.regs.e = 0xD8;
        self.regs.h = 0x01;
        self.regs.l = 0x4D;
        self.regs.sp = 0xFFFE;
        self.regs.pc = 0x0100;
        self.ime = false;
    }

    /// The boot ROM leaves H and C set unless the header checksum is zero.
    /// Call once the cartridge is mapped.
    pub fn apply_header_checksum<B: Bus>(&mut self, bus: &mut B) {
        let nonzero = bus.read8(HEADER_CHECKSUM_ADDR) != 0;
        self.set_flag(Flag::H, nonzero);
        self.set_flag(Flag::C, nonzero);
    }
}
