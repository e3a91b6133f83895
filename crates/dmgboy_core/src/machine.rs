mod bus;
mod cartridge;
mod gameboy;
mod ppu;
mod timer;

pub use bus::{IoRegister, JoypadButton, LcdControl, LcdStatus, MemoryBus};
pub use cartridge::{Cartridge, CartridgeHeader};
pub use gameboy::GameBoy;
pub use ppu::{Ppu, PpuMode};
pub use timer::Timer;

/// Master clock rate of the DMG in T-states per second.
pub const CLOCK_HZ: u32 = 4_194_304;

/// Master-clock steps in one full LCD frame.
pub const STEPS_PER_FRAME: u32 = 70_224;

#[cfg(test)]
mod tests;
