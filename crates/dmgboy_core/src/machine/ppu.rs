//! Scanline PPU.
//!
//! The PPU is a four-state machine advanced once per master-clock step. A
//! state's work happens in full on the step that enters it; the remaining
//! steps of the state just burn down a countdown. One frame is 144 visible
//! lines of OAM scan (80), draw (172) and HBlank (204), followed by a single
//! 4560-step VBlank during which LY ticks through the ten blank lines.

mod render;

use dmgboy_common::color::Color;

use crate::cpu::InterruptFlags;
use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};

use super::bus::{IoRegister, LcdStatus, MemoryBus};

const OAM_SCAN_CYCLES: u32 = 80;
const DRAW_CYCLES: u32 = 172;
const HBLANK_CYCLES: u32 = 204;
const VBLANK_CYCLES: u32 = 4560;
const LINE_CYCLES: u32 = 456;
/// First line of VBlank.
const VBLANK_LINE: u8 = 144;
/// Last VBlank line before LY wraps to 0.
const LAST_LINE: u8 = 153;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PpuMode {
    HBlank = 0,
    VBlank = 1,
    OamScan = 2,
    Drawing = 3,
}

/// One OAM entry selected for the current line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Sprite {
    pub(crate) y: u8,
    pub(crate) x: u8,
    pub(crate) tile: u8,
    pub(crate) flags: u8,
}

pub struct Ppu {
    /// State entered when the countdown next reaches zero.
    mode: PpuMode,
    /// Mode last mirrored into STAT.
    current: PpuMode,
    cycles: u32,
    /// Palette-mapped shades for the line being drawn.
    line: [u8; SCREEN_WIDTH],
    /// Raw background color indices, for sprite priority.
    line_raw: [u8; SCREEN_WIDTH],
    /// Shade indices (0..=3) of the frame being built.
    frame: Vec<u8>,
    /// Last completed frame as ARGB.
    screen: Vec<u32>,
    sprites: Vec<Sprite>,
    /// Sprite height in effect when `sprites` was selected.
    sprite_height: u8,
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

impl Ppu {
    pub fn new() -> Self {
        Self {
            mode: PpuMode::OamScan,
            current: PpuMode::OamScan,
            cycles: 0,
            line: [0; SCREEN_WIDTH],
            line_raw: [0; SCREEN_WIDTH],
            frame: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT],
            screen: vec![Color::DMG_SHADES[0].to_argb(); SCREEN_WIDTH * SCREEN_HEIGHT],
            sprites: Vec::with_capacity(render::MAX_SPRITES_PER_LINE),
            sprite_height: 8,
        }
    }

    /// The mode software currently sees in STAT bits 1..0.
    pub fn mode(&self) -> PpuMode {
        self.current
    }

    /// The last completed frame, 160x144 ARGB pixels in row-major order.
    pub fn screen(&self) -> &[u32] {
        &self.screen
    }

    /// Advance one master-clock step. Returns true on the step that completes
    /// a frame.
    pub fn clock(&mut self, bus: &mut MemoryBus) -> bool {
        let mut frame_done = false;

        if self.cycles == 0 {
            self.update_coincidence(bus);

            match self.mode {
                PpuMode::OamScan => {
                    self.enter_mode(bus, PpuMode::OamScan, LcdStatus::OAM_INT);
                    self.scan_oam(bus);
                    self.cycles += OAM_SCAN_CYCLES;
                    self.mode = PpuMode::Drawing;
                }
                PpuMode::Drawing => {
                    self.set_stat_mode(bus, PpuMode::Drawing);
                    let ly = bus.io(IoRegister::LY) as usize;
                    self.render_line(bus);
                    let row = ly * SCREEN_WIDTH;
                    self.frame[row..row + SCREEN_WIDTH].copy_from_slice(&self.line);
                    self.line = [0; SCREEN_WIDTH];
                    self.line_raw = [0; SCREEN_WIDTH];
                    self.cycles += DRAW_CYCLES;
                    self.mode = PpuMode::HBlank;
                }
                PpuMode::HBlank => {
                    self.enter_mode(bus, PpuMode::HBlank, LcdStatus::HBLANK_INT);
                    let ly = bus.io(IoRegister::LY).wrapping_add(1);
                    bus.set_io(IoRegister::LY, ly);
                    self.cycles += HBLANK_CYCLES;
                    self.mode = if ly == VBLANK_LINE {
                        PpuMode::VBlank
                    } else {
                        PpuMode::OamScan
                    };
                }
                PpuMode::VBlank => {
                    bus.request_interrupt(InterruptFlags::VBLANK);
                    self.enter_mode(bus, PpuMode::VBlank, LcdStatus::VBLANK_INT);
                    self.present_frame();
                    self.cycles += VBLANK_CYCLES;
                    frame_done = true;
                }
            }
        } else if self.mode == PpuMode::VBlank {
            let ly = bus.io(IoRegister::LY);
            if ly == LAST_LINE {
                bus.set_io(IoRegister::LY, 0);
                self.mode = PpuMode::OamScan;
                self.set_stat_mode(bus, PpuMode::OamScan);
            } else if self.cycles % LINE_CYCLES == 0 {
                bus.set_io(IoRegister::LY, ly + 1);
            }
        }

        self.cycles -= 1;
        frame_done
    }

    /// Mirror `mode` into STAT and raise the STAT line if `source` is enabled.
    fn enter_mode(&mut self, bus: &mut MemoryBus, mode: PpuMode, source: LcdStatus) {
        if bus.lcd_status().contains(source) {
            bus.request_interrupt(InterruptFlags::LCD_STAT);
        }
        self.set_stat_mode(bus, mode);
    }

    fn set_stat_mode(&mut self, bus: &mut MemoryBus, mode: PpuMode) {
        self.current = mode;
        let status = bus.lcd_status().difference(LcdStatus::MODE);
        bus.set_lcd_status(status | LcdStatus::from_bits_retain(mode as u8));
    }

    /// Recompute STAT bit 2, raising the STAT line when LY becomes equal to
    /// LYC and the source is enabled.
    fn update_coincidence(&self, bus: &mut MemoryBus) {
        let mut status = bus.lcd_status();
        let equal = bus.io(IoRegister::LY) == bus.io(IoRegister::LYC);

        if equal
            && !status.contains(LcdStatus::COINCIDENCE)
            && status.contains(LcdStatus::COINCIDENCE_INT)
        {
            bus.request_interrupt(InterruptFlags::LCD_STAT);
        }
        status.set(LcdStatus::COINCIDENCE, equal);
        bus.set_lcd_status(status);
    }

    fn present_frame(&mut self) {
        for (pixel, &shade) in self.screen.iter_mut().zip(&self.frame) {
            *pixel = Color::DMG_SHADES[shade as usize & 0x03].to_argb();
        }
        self.frame.fill(0);
    }
}
