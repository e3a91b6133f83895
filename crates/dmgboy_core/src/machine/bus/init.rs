use super::MemoryBus;

/// I/O block contents after the DMG boot ROM hands over at 0x0100.
/// Addresses not listed power up as zero.
const DMG_POST_BOOT_IO: &[(u16, u8)] = &[
    (0xFF00, 0xCF),
    (0xFF01, 0x00),
    (0xFF02, 0x7E),
    (0xFF04, 0xAB),
    (0xFF05, 0x00),
    (0xFF06, 0x00),
    (0xFF07, 0xF8),
    (0xFF0F, 0xE1),
    // Sound.
    (0xFF10, 0x80),
    (0xFF11, 0xBF),
    (0xFF12, 0xF3),
    (0xFF13, 0xFF),
    (0xFF14, 0xBF),
    (0xFF16, 0x3F),
    (0xFF17, 0x00),
    (0xFF18, 0xFF),
    (0xFF19, 0xBF),
    (0xFF1A, 0x7F),
    (0xFF1B, 0xFF),
    (0xFF1C, 0x9F),
    (0xFF1D, 0xFF),
    (0xFF1E, 0xBF),
    (0xFF20, 0xFF),
    (0xFF21, 0x00),
    (0xFF22, 0x00),
    (0xFF23, 0xBF),
    (0xFF24, 0x77),
    (0xFF25, 0xF3),
    (0xFF26, 0xF1),
    // LCD.
    (0xFF40, 0x91),
    (0xFF41, 0x85),
    (0xFF42, 0x00),
    (0xFF43, 0x00),
    (0xFF44, 0x00),
    (0xFF45, 0x00),
    (0xFF46, 0xFF),
    (0xFF47, 0xFC),
    (0xFF48, 0xFF),
    (0xFF49, 0xFF),
    (0xFF4A, 0x00),
    (0xFF4B, 0x00),
    // CGB-only registers, unconnected on DMG.
    (0xFF4D, 0xFF),
    (0xFF4F, 0xFF),
    (0xFF51, 0xFF),
    (0xFF52, 0xFF),
    (0xFF53, 0xFF),
    (0xFF54, 0xFF),
    (0xFF55, 0xFF),
    (0xFF56, 0xFF),
    (0xFF68, 0xFF),
    (0xFF69, 0xFF),
    (0xFF6A, 0xFF),
    (0xFF6B, 0xFF),
    (0xFF70, 0xFF),
];

impl MemoryBus {
    pub(super) fn apply_dmg_initial_io_state(&mut self) {
        for &(addr, value) in DMG_POST_BOOT_IO {
            self.io[(addr - 0xFF00) as usize] = value;
        }
        self.ie = 0x00;
    }
}
