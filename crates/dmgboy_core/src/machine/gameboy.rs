use dmgboy_common::key::Key;

use crate::cpu::Cpu;
use crate::error::CartridgeError;

use super::bus::{JoypadButton, MemoryBus};
use super::cartridge::Cartridge;
use super::ppu::Ppu;
use super::timer::Timer;
use super::STEPS_PER_FRAME;

/// High-level Game Boy machine.
///
/// Owns the bus and the three components that share it, and drives them in
/// lock-step: one call to [`GameBoy::step`] is one master-clock tick for
/// every component, in a fixed order.
pub struct GameBoy {
    pub cpu: Cpu,
    bus: MemoryBus,
    ppu: Ppu,
    timer: Timer,
    steps: u64,
    frames: u64,
}

impl GameBoy {
    pub fn new(cartridge: Cartridge) -> Self {
        let mut bus = MemoryBus::new(cartridge);
        let mut cpu = Cpu::new();
        cpu.apply_header_checksum(&mut bus);

        Self {
            cpu,
            bus,
            ppu: Ppu::new(),
            timer: Timer::new(),
            steps: 0,
            frames: 0,
        }
    }

    pub fn from_rom(rom: Vec<u8>) -> Result<Self, CartridgeError> {
        Ok(Self::new(Cartridge::new(rom)?))
    }

    /// One master-clock step: interrupt check, PPU, timer, DMA, CPU.
    ///
    /// Returns true when this step completed a frame.
    pub fn step(&mut self) -> bool {
        self.cpu.handle_interrupt(&mut self.bus);
        let frame_done = self.ppu.clock(&mut self.bus);
        self.timer.clock(&mut self.bus);
        self.bus.dma_clock();
        self.cpu.step(&mut self.bus);

        self.steps += 1;
        if frame_done {
            self.frames += 1;
        }
        frame_done
    }

    /// Step until the PPU hands over a frame. Bounded by one frame period.
    pub fn step_frame(&mut self) {
        for _ in 0..STEPS_PER_FRAME {
            if self.step() {
                return;
            }
        }
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn bus(&self) -> &MemoryBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut MemoryBus {
        &mut self.bus
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Last completed frame as 160x144 ARGB pixels.
    pub fn screen(&self) -> &[u32] {
        self.ppu.screen()
    }

    /// Copy the last completed frame into `buffer` as packed RGB24.
    pub fn video_frame(&self, buffer: &mut [u8]) {
        for (rgb, &argb) in buffer.chunks_exact_mut(3).zip(self.ppu.screen()) {
            let [_, r, g, b] = argb.to_be_bytes();
            rgb.copy_from_slice(&[r, g, b]);
        }
    }

    pub fn set_button(&mut self, button: JoypadButton, pressed: bool) {
        self.bus.set_button(button, pressed);
    }

    /// Update joypad state from a frontend key event.
    ///
    /// Z => A, X => B, A => Select, S => Start, arrows => D-pad.
    pub fn handle_key(&mut self, key: Key, pressed: bool) {
        let button = match key {
            Key::Right => JoypadButton::Right,
            Key::Left => JoypadButton::Left,
            Key::Up => JoypadButton::Up,
            Key::Down => JoypadButton::Down,
            Key::Z => JoypadButton::A,
            Key::X => JoypadButton::B,
            Key::A => JoypadButton::Select,
            Key::S => JoypadButton::Start,
            _ => return,
        };
        self.set_button(button, pressed);
    }

    pub fn external_ram(&self) -> &[u8] {
        self.bus.external_ram()
    }

    pub fn load_external_ram(&mut self, data: &[u8]) -> Result<(), CartridgeError> {
        self.bus.load_external_ram(data)
    }
}
