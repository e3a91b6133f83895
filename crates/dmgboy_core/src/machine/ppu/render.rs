use crate::machine::bus::{IoRegister, LcdControl, MemoryBus};
use crate::SCREEN_WIDTH;

use super::{Ppu, Sprite};

pub(super) const MAX_SPRITES_PER_LINE: usize = 10;
const OAM_ENTRIES: usize = 40;

/// Sprite attribute bits.
const FLAG_BG_PRIORITY: u8 = 1 << 7;
const FLAG_Y_FLIP: u8 = 1 << 6;
const FLAG_X_FLIP: u8 = 1 << 5;
const FLAG_PALETTE: u8 = 1 << 4;

/// 2-bit color index of pixel `col` (0 = leftmost) in a tile row.
#[inline]
fn tile_pixel(lo: u8, hi: u8, col: u8) -> u8 {
    let bit = 7 - col;
    (((hi >> bit) & 1) << 1) | ((lo >> bit) & 1)
}

/// Map a color index through a palette register.
#[inline]
fn shade(palette: u8, color: u8) -> u8 {
    (palette >> (color * 2)) & 0x03
}

fn sprite_height(lcdc: LcdControl) -> u8 {
    if lcdc.contains(LcdControl::OBJ_SIZE) {
        16
    } else {
        8
    }
}

impl Ppu {
    /// Select the sprites covering the current line.
    ///
    /// At most ten entries in the vertical range are considered, in OAM
    /// order; those with an off-screen x are counted but not kept. The
    /// result is ordered for drawing: descending x, and for equal x the
    /// later OAM entry first, so the sprite drawn last (and therefore on
    /// top) is the one with the lowest x and, on ties, the lowest OAM index.
    pub(super) fn scan_oam(&mut self, bus: &MemoryBus) {
        self.sprites.clear();

        let ly = bus.io(IoRegister::LY) as u16;
        self.sprite_height = sprite_height(bus.lcd_control());
        let height = self.sprite_height as u16;
        let oam = bus.oam();

        let mut in_range = 0;
        for entry in oam.chunks_exact(4).take(OAM_ENTRIES) {
            let y = entry[0] as u16;
            if ly + 16 < y || ly + 16 >= y + height {
                continue;
            }

            in_range += 1;
            if in_range > MAX_SPRITES_PER_LINE {
                break;
            }

            let x = entry[1];
            if x > 0 && x < 168 {
                self.sprites.push(Sprite {
                    y: entry[0],
                    x,
                    tile: entry[2],
                    flags: entry[3],
                });
            }
        }

        self.sprites.reverse();
        self.sprites.sort_by(|a, b| b.x.cmp(&a.x));
    }

    /// Draw the current line into `line`/`line_raw`.
    pub(super) fn render_line(&mut self, bus: &MemoryBus) {
        let lcdc = bus.lcd_control();
        self.render_background(bus, lcdc);
        if lcdc.contains(LcdControl::OBJ_ENABLE) {
            self.render_sprites(bus);
        }
    }

    fn render_background(&mut self, bus: &MemoryBus, lcdc: LcdControl) {
        // A disabled background is white whatever BGP holds.
        if !lcdc.contains(LcdControl::BG_ENABLE) {
            self.line = [0; SCREEN_WIDTH];
            self.line_raw = [0; SCREEN_WIDTH];
            return;
        }

        let bgp = bus.io(IoRegister::BGP);

        let vram = bus.vram();
        let ly = bus.io(IoRegister::LY);
        let scx = bus.io(IoRegister::SCX);
        let scy = bus.io(IoRegister::SCY);
        let wx = bus.io(IoRegister::WX) as usize;
        let wy = bus.io(IoRegister::WY);
        let window_on_line = lcdc.contains(LcdControl::WINDOW_ENABLE) && ly >= wy;

        let bg_map = if lcdc.contains(LcdControl::BG_MAP) { 0x1C00 } else { 0x1800 };
        let window_map = if lcdc.contains(LcdControl::WINDOW_MAP) { 0x1C00 } else { 0x1800 };

        for column in 0..SCREEN_WIDTH / 8 {
            for px in 0..8 {
                let x = column * 8 + px;

                let (map, map_x, map_y) = if window_on_line && x + 7 >= wx {
                    (window_map, (x + 7 - wx) as u8, ly - wy)
                } else {
                    (bg_map, (x as u8).wrapping_add(scx), ly.wrapping_add(scy))
                };

                let map_index = map + (map_y as usize / 8) * 32 + map_x as usize / 8;
                let tile = vram[map_index];
                let row_addr = tile_data_offset(lcdc, tile) + (map_y as usize % 8) * 2;
                let color = tile_pixel(vram[row_addr], vram[row_addr + 1], map_x % 8);

                self.line_raw[x] = color;
                self.line[x] = shade(bgp, color);
            }
        }
    }

    /// Sprites are drawn with the height they were selected with, even if
    /// LCDC bit 2 changed since the OAM scan.
    fn render_sprites(&mut self, bus: &MemoryBus) {
        let vram = bus.vram();
        let ly = bus.io(IoRegister::LY);
        let height = self.sprite_height;
        let obp = [bus.io(IoRegister::OBP0), bus.io(IoRegister::OBP1)];

        for sprite in &self.sprites {
            let mut row = ly + 16 - sprite.y;
            if sprite.flags & FLAG_Y_FLIP != 0 {
                row = height - 1 - row;
            }
            let tile = if height == 16 { sprite.tile & 0xFE } else { sprite.tile };
            let row_addr = tile as usize * 16 + row as usize * 2;
            let (lo, hi) = (vram[row_addr], vram[row_addr + 1]);
            let palette = obp[usize::from(sprite.flags & FLAG_PALETTE != 0)];

            for px in 0..8u8 {
                let screen_x = sprite.x as i16 - 8 + px as i16;
                if !(0..SCREEN_WIDTH as i16).contains(&screen_x) {
                    continue;
                }
                let screen_x = screen_x as usize;

                let col = if sprite.flags & FLAG_X_FLIP != 0 { 7 - px } else { px };
                let color = tile_pixel(lo, hi, col);
                if color == 0 {
                    continue;
                }
                if sprite.flags & FLAG_BG_PRIORITY != 0 && self.line_raw[screen_x] != 0 {
                    continue;
                }
                self.line[screen_x] = shade(palette, color);
            }
        }
    }
}

/// VRAM offset of a tile's data for background/window maps.
fn tile_data_offset(lcdc: LcdControl, tile: u8) -> usize {
    if lcdc.contains(LcdControl::TILE_DATA) {
        tile as usize * 16
    } else {
        (0x1000 + (tile as i8 as isize) * 16) as usize
    }
}
