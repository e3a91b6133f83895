use crate::cpu::{Bus, InterruptFlags};
use crate::error::CartridgeError;

use super::cartridge::Cartridge;

mod dma;
mod init;
mod io;
mod joypad;

pub use io::{IoRegister, LcdControl, LcdStatus};
pub use joypad::JoypadButton;
use joypad::Joypad;

/// The DMG memory map.
///
/// Owns every addressable region and the cartridge bank state. The CPU goes
/// through [`Bus`]; the PPU and timer also use the raw register accessors,
/// which bypass the write side effects a CPU store would have.
pub struct MemoryBus {
    cartridge: Cartridge,
    vram: [u8; 0x2000],
    wram: [u8; 0x2000],
    oam: [u8; 0xA0],
    io: [u8; 0x80],
    hram: [u8; 0x7F],
    ie: u8,
    dma_cycles: u32,
    joypad: Joypad,
}

impl MemoryBus {
    pub fn new(cartridge: Cartridge) -> Self {
        let mut bus = Self {
            cartridge,
            vram: [0; 0x2000],
            wram: [0; 0x2000],
            oam: [0; 0xA0],
            io: [0; 0x80],
            hram: [0; 0x7F],
            ie: 0,
            dma_cycles: 0,
            joypad: Joypad::default(),
        };
        bus.apply_dmg_initial_io_state();
        bus
    }

    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF => self.cartridge.read_rom(addr),
            0x8000..=0x9FFF => self.vram[(addr - 0x8000) as usize],
            0xA000..=0xBFFF => self.cartridge.read_ram(addr),
            0xC000..=0xDFFF => self.wram[(addr - 0xC000) as usize],
            0xE000..=0xFDFF => self.wram[(addr - 0xE000) as usize],
            0xFE00..=0xFE9F => self.oam[(addr - 0xFE00) as usize],
            0xFEA0..=0xFEFF => 0x00,
            0xFF00 => self.read_joyp(),
            0xFF01..=0xFF7F => self.io[(addr - 0xFF00) as usize],
            0xFF80..=0xFFFE => self.hram[(addr - 0xFF80) as usize],
            0xFFFF => self.ie,
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x7FFF => self.cartridge.write_control(addr, value),
            0x8000..=0x9FFF => self.vram[(addr - 0x8000) as usize] = value,
            0xA000..=0xBFFF => self.cartridge.write_ram(addr, value),
            0xC000..=0xDFFF => self.wram[(addr - 0xC000) as usize] = value,
            0xE000..=0xFDFF => self.wram[(addr - 0xE000) as usize] = value,
            0xFE00..=0xFE9F => self.oam[(addr - 0xFE00) as usize] = value,
            0xFEA0..=0xFEFF => {}
            0xFF00..=0xFF7F => self.write_io(addr, value),
            0xFF80..=0xFFFE => self.hram[(addr - 0xFF80) as usize] = value,
            0xFFFF => self.ie = value,
        }
    }

    fn write_io(&mut self, addr: u16, value: u8) {
        let index = (addr - 0xFF00) as usize;
        match IoRegister::from_address(addr) {
            Some(IoRegister::JOYP) => self.write_joyp(value),
            Some(IoRegister::DIV) => self.io[index] = 0,
            Some(IoRegister::STAT) => {
                let writable = LcdStatus::WRITABLE.bits();
                self.io[index] = (self.io[index] & !writable) | (value & writable);
            }
            Some(IoRegister::LY) => {}
            Some(IoRegister::DMA) => self.start_dma(value),
            _ => self.io[index] = value,
        }
    }

    /// Raw register read, without joypad composition.
    #[inline]
    pub fn io(&self, register: IoRegister) -> u8 {
        self.io[register.index()]
    }

    /// Raw register write for the PPU and timer. Bypasses the CPU-side masks
    /// and side effects.
    #[inline]
    pub fn set_io(&mut self, register: IoRegister, value: u8) {
        self.io[register.index()] = value;
    }

    pub fn lcd_control(&self) -> LcdControl {
        LcdControl::from_bits_retain(self.io(IoRegister::LCDC))
    }

    pub fn lcd_status(&self) -> LcdStatus {
        LcdStatus::from_bits_retain(self.io(IoRegister::STAT))
    }

    pub fn set_lcd_status(&mut self, status: LcdStatus) {
        self.set_io(IoRegister::STAT, status.bits());
    }

    pub fn request_interrupt(&mut self, interrupt: InterruptFlags) {
        let flags = self.io(IoRegister::IF) | interrupt.bits();
        self.set_io(IoRegister::IF, flags);
    }

    pub fn increment_div(&mut self) {
        let div = self.io(IoRegister::DIV).wrapping_add(1);
        self.set_io(IoRegister::DIV, div);
    }

    pub fn interrupt_enable(&self) -> u8 {
        self.ie
    }

    pub fn vram(&self) -> &[u8; 0x2000] {
        &self.vram
    }

    pub fn oam(&self) -> &[u8; 0xA0] {
        &self.oam
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    pub fn external_ram(&self) -> &[u8] {
        self.cartridge.external_ram()
    }

    pub fn load_external_ram(&mut self, data: &[u8]) -> Result<(), CartridgeError> {
        self.cartridge.load_external_ram(data)
    }
}

impl Bus for MemoryBus {
    #[inline]
    fn read8(&mut self, addr: u16) -> u8 {
        self.read(addr)
    }

    #[inline]
    fn write8(&mut self, addr: u16, value: u8) {
        self.write(addr, value)
    }
}
