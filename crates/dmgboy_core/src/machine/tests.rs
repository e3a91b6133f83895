use super::*;
use crate::cpu::{Bus, InterruptFlags};
use crate::error::CartridgeError;
use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};
use dmgboy_common::color::Color;
use dmgboy_common::key::Key;
use once_cell::sync::OnceCell;

/// A ROM of `2 << rom_code` banks whose first byte in each bank is the bank
/// number.
fn make_rom(rom_code: u8, ram_code: u8) -> Vec<u8> {
    let banks = 2usize << rom_code;
    let mut rom = vec![0u8; banks * 0x4000];
    for bank in 0..banks {
        rom[bank * 0x4000] = bank as u8;
    }
    rom[0x134..0x138].copy_from_slice(b"TEST");
    rom[0x147] = 0x03;
    rom[0x148] = rom_code;
    rom[0x149] = ram_code;
    rom
}

static LARGE_ROM: OnceCell<Vec<u8>> = OnceCell::new();

/// 128 banks (2 MiB) with four RAM banks.
fn large_rom() -> Vec<u8> {
    LARGE_ROM.get_or_init(|| make_rom(0x06, 0x03)).clone()
}

fn small_bus() -> MemoryBus {
    MemoryBus::new(Cartridge::new(make_rom(0x00, 0x00)).expect("valid rom"))
}

fn fill_tile(bus: &mut MemoryBus, tile: u16, lo: u8, hi: u8) {
    let base = 0x8000 + tile * 16;
    for row in 0..8 {
        bus.write(base + row * 2, lo);
        bus.write(base + row * 2 + 1, hi);
    }
}

fn run_frame(ppu: &mut Ppu, bus: &mut MemoryBus) {
    for _ in 0..STEPS_PER_FRAME {
        ppu.clock(bus);
    }
}

const WHITE: u32 = 0xFFFF_FFFF;
const LIGHT: u32 = 0xFFC0_C0C0;
const BLACK: u32 = 0xFF00_0000;

#[test]
fn cartridge_rejects_bad_images() {
    assert_eq!(Cartridge::new(Vec::new()).err(), Some(CartridgeError::Empty));
    assert_eq!(
        Cartridge::new(vec![0; 0x100]).err(),
        Some(CartridgeError::HeaderTooShort { len: 0x100 })
    );

    let mut rom = make_rom(0x01, 0x00);
    rom.truncate(0x8000);
    assert_eq!(
        Cartridge::new(rom).err(),
        Some(CartridgeError::Truncated {
            expected: 0x10000,
            actual: 0x8000
        })
    );
}

#[test]
fn header_is_decoded() {
    let cart = Cartridge::new(make_rom(0x02, 0x03)).expect("valid rom");
    let header = cart.header();
    assert_eq!(header.title, "TEST");
    assert_eq!(header.cartridge_type, 0x03);
    assert_eq!(header.rom_banks, 8);
    assert_eq!(header.ram_banks, 4);
}

#[test]
fn ram_size_codes_map_to_bank_counts() {
    for (code, banks) in [(0x00, 0), (0x01, 0), (0x02, 1), (0x03, 4), (0x04, 16), (0x05, 8)] {
        let cart = Cartridge::new(make_rom(0x00, code)).expect("valid rom");
        assert_eq!(cart.header().ram_banks, banks, "code {code:#04X}");
    }
}

#[test]
fn two_bank_rom_ignores_bank_select() {
    let mut bus = small_bus();
    assert_eq!(bus.read(0x4000), 1);
    bus.write(0x2000, 0x00);
    assert_eq!(bus.read(0x4000), 1);
    bus.write(0x2000, 0x01);
    assert_eq!(bus.read(0x4000), 1);
}

#[test]
fn small_rom_masks_bank_select_and_maps_zero_to_one() {
    // 32 banks.
    let mut bus = MemoryBus::new(Cartridge::new(make_rom(0x04, 0x00)).expect("valid rom"));
    bus.write(0x2000, 0x25);
    assert_eq!(bus.read(0x4000), 0x05);
    bus.write(0x3FFF, 0x20);
    assert_eq!(bus.read(0x4000), 0x01);
    bus.write(0x2000, 0x1F);
    assert_eq!(bus.read(0x4000), 0x1F);
    assert_eq!(bus.read(0x0000), 0x00);

    // 4 banks mask to two bits.
    let mut bus = MemoryBus::new(Cartridge::new(make_rom(0x01, 0x00)).expect("valid rom"));
    bus.write(0x2000, 0x07);
    assert_eq!(bus.read(0x4000), 0x03);
    bus.write(0x2000, 0x04);
    assert_eq!(bus.read(0x4000), 0x01);
}

#[test]
fn large_rom_bank_zero_select_maps_to_bank_one() {
    let mut bus = MemoryBus::new(Cartridge::new(large_rom()).expect("valid rom"));
    bus.write(0x2000, 0x00);
    assert_eq!(bus.cartridge().rom_bank(), 1);
    assert_eq!(bus.read(0x4000), 1);
}

#[test]
fn large_rom_upper_bits_and_mode_one_bank_zero() {
    let mut bus = MemoryBus::new(Cartridge::new(large_rom()).expect("valid rom"));

    bus.write(0x2000, 0x05);
    assert_eq!(bus.read(0x4000), 5);

    bus.write(0x4000, 0x02);
    assert_eq!(bus.cartridge().rom_bank(), 0x45);
    assert_eq!(bus.read(0x4000), 0x45);

    // The low field is replaced, the high bits stay.
    bus.write(0x2000, 0x00);
    assert_eq!(bus.read(0x4000), 0x41);

    assert_eq!(bus.read(0x0000), 0);
    bus.write(0x6000, 0x01);
    assert_eq!(bus.cartridge().banking_mode(), 1);
    assert_eq!(bus.read(0x0000), 0x40);
    bus.write(0x6000, 0x00);
    assert_eq!(bus.read(0x0000), 0);
}

#[test]
#[should_panic(expected = "index out of bounds")]
fn rom_bank_past_end_of_image_panics() {
    // 64 banks; upper bits 0b11 select bank 0x61.
    let mut bus = MemoryBus::new(Cartridge::new(make_rom(0x05, 0x00)).expect("valid rom"));
    bus.write(0x4000, 0x03);
    let _ = bus.read(0x4000);
}

#[test]
#[should_panic(expected = "index out of bounds")]
fn mode_one_bank_zero_past_end_of_image_panics() {
    let mut bus = MemoryBus::new(Cartridge::new(make_rom(0x05, 0x00)).expect("valid rom"));
    bus.write(0x4000, 0x03);
    bus.write(0x6000, 0x01);
    let _ = bus.read(0x0000);
}

#[test]
fn external_ram_enable_and_banking() {
    let mut bus = MemoryBus::new(Cartridge::new(large_rom()).expect("valid rom"));

    assert_eq!(bus.read(0xA000), 0xFF);
    bus.write(0xA000, 0x42);
    bus.write(0x0000, 0x0A);
    assert_eq!(bus.read(0xA000), 0x00);

    bus.write(0xA000, 0x11);
    assert_eq!(bus.read(0xA000), 0x11);

    bus.write(0x6000, 0x01);
    bus.write(0x4000, 0x02);
    assert_eq!(bus.cartridge().ram_bank(), 2);
    bus.write(0xA000, 0x22);
    assert_eq!(bus.read(0xA000), 0x22);

    // Mode 0 ignores the RAM bank.
    bus.write(0x6000, 0x00);
    assert_eq!(bus.read(0xA000), 0x11);

    assert_eq!(bus.external_ram()[0], 0x11);
    assert_eq!(bus.external_ram()[2 * 0x2000], 0x22);

    // Only the low nibble matters.
    bus.write(0x1FFF, 0x00);
    assert!(!bus.cartridge().ram_enabled());
    bus.write(0x0000, 0x1A);
    assert!(bus.cartridge().ram_enabled());
}

#[test]
fn save_ram_round_trip_and_size_check() {
    let mut gb = GameBoy::from_rom(make_rom(0x00, 0x02)).expect("valid rom");
    assert_eq!(gb.external_ram().len(), 0x2000);

    gb.load_external_ram(&[1, 2, 3]).expect("fits");
    assert_eq!(&gb.external_ram()[..3], &[1, 2, 3]);

    assert_eq!(
        gb.load_external_ram(&[0; 0x2001]),
        Err(CartridgeError::SaveRamTooLarge {
            expected: 0x2000,
            actual: 0x2001
        })
    );

    let gb = GameBoy::from_rom(make_rom(0x00, 0x00)).expect("valid rom");
    assert!(gb.external_ram().is_empty());
}

#[test]
fn memory_map_regions() {
    let mut bus = small_bus();

    bus.write(0x8123, 0x01);
    bus.write(0xC010, 0x02);
    bus.write(0xFE10, 0x03);
    bus.write(0xFF90, 0x04);
    bus.write(0xFFFF, 0x1F);

    assert_eq!(bus.read(0x8123), 0x01);
    assert_eq!(bus.read(0xE010), 0x02);
    bus.write(0xF000, 0x05);
    assert_eq!(bus.read(0xD000), 0x05);
    assert_eq!(bus.oam()[0x10], 0x03);
    assert_eq!(bus.read(0xFF90), 0x04);
    assert_eq!(bus.interrupt_enable(), 0x1F);

    bus.write(0xFEA0, 0x77);
    assert_eq!(bus.read(0xFEA0), 0x00);
    assert_eq!(bus.read(0xFEFF), 0x00);

    // ROM writes never change ROM contents.
    bus.write(0x0100, 0xAA);
    assert_eq!(bus.read(0x0100), 0x00);
}

#[test]
fn power_on_io_values() {
    let bus = small_bus();
    assert_eq!(bus.read(0xFF00), 0xCF);
    assert_eq!(bus.io(IoRegister::DIV), 0xAB);
    assert_eq!(bus.io(IoRegister::TAC), 0xF8);
    assert_eq!(bus.io(IoRegister::IF), 0xE1);
    assert_eq!(bus.io(IoRegister::LCDC), 0x91);
    assert_eq!(bus.io(IoRegister::STAT), 0x85);
    assert_eq!(bus.io(IoRegister::BGP), 0xFC);
    assert_eq!(bus.read(0xFF26), 0xF1);
    assert_eq!(bus.read(0xFF70), 0xFF);
    assert_eq!(bus.interrupt_enable(), 0x00);
}

#[test]
fn cpu_writes_respect_register_side_effects() {
    let mut bus = small_bus();

    bus.write(0xFF04, 0x55);
    assert_eq!(bus.read(0xFF04), 0x00);

    bus.write(0xFF44, 0x33);
    assert_eq!(bus.read(0xFF44), 0x00);

    // Mode and coincidence bits are PPU-owned.
    bus.write(0xFF41, 0x78);
    assert_eq!(bus.read(0xFF41), 0xFD);
    bus.write(0xFF41, 0x00);
    assert_eq!(bus.read(0xFF41), 0x85);
}

#[test]
fn joypad_composes_selected_group() {
    let mut bus = small_bus();
    bus.write(0xFF0F, 0x00);

    bus.set_button(JoypadButton::Right, true);
    assert_eq!(bus.read(0xFF0F) & InterruptFlags::JOYPAD.bits(), InterruptFlags::JOYPAD.bits());

    // Direction group selected (bit 4 low).
    bus.write(0xFF00, 0x20);
    assert_eq!(bus.read(0xFF00) & 0x0F, 0x0E);

    // Action group selected: Right is not visible.
    bus.write(0xFF00, 0x10);
    assert_eq!(bus.read(0xFF00) & 0x0F, 0x0F);
    bus.set_button(JoypadButton::Start, true);
    assert_eq!(bus.read(0xFF00) & 0x0F, 0x07);

    // Nothing selected.
    bus.write(0xFF00, 0x30);
    assert_eq!(bus.read(0xFF00), 0xFF);

    // Holding or releasing does not raise the interrupt again.
    bus.write(0xFF0F, 0x00);
    bus.set_button(JoypadButton::Start, true);
    bus.set_button(JoypadButton::Start, false);
    assert_eq!(bus.read(0xFF0F), 0x00);
}

#[test]
fn set_buttons_replaces_both_groups() {
    let mut bus = small_bus();
    bus.set_buttons([true, false, false, false], [false, false, false, true]);
    bus.write(0xFF00, 0x00);
    // A (bit 0) and Down (bit 3) both pull their lines low.
    assert_eq!(bus.read(0xFF00) & 0x0F, 0x06);

    bus.set_buttons([false; 4], [false; 4]);
    assert_eq!(bus.read(0xFF00) & 0x0F, 0x0F);
}

#[test]
fn dma_copies_vram_into_oam() {
    let mut bus = small_bus();
    for i in 0..0xA0u16 {
        bus.write(0x8000 + i, (i as u8) ^ 0x5A);
    }

    bus.write(0xFF46, 0x80);

    let expected: Vec<u8> = (0..0xA0u16).map(|i| (i as u8) ^ 0x5A).collect();
    assert_eq!(&bus.oam()[..], &expected[..]);
    assert_eq!(bus.io(IoRegister::DMA), 0x80);
    assert!(bus.dma_active());
}

#[test]
fn dma_trigger_during_transfer_is_ignored() {
    let mut bus = small_bus();
    for i in 0..0xA0u16 {
        bus.write(0xC000 + i, 0xEE);
    }

    bus.write(0xFF46, 0x80);
    bus.write(0xFF46, 0xC0);
    assert_eq!(bus.io(IoRegister::DMA), 0x80);
    assert!(bus.oam().iter().all(|&b| b == 0));

    for _ in 0..159 {
        bus.dma_clock();
    }
    assert!(bus.dma_active());
    bus.dma_clock();
    assert!(!bus.dma_active());
    bus.dma_clock();
    assert!(!bus.dma_active());

    bus.write(0xFF46, 0xC0);
    assert!(bus.oam().iter().all(|&b| b == 0xEE));
}

#[test]
fn timer_overflow_reloads_four_steps_after_wrap() {
    let mut bus = small_bus();
    let mut timer = Timer::new();
    bus.write(0xFF0F, 0x00);
    bus.write(0xFF06, 0x42);
    bus.write(0xFF05, 0xFF);
    bus.write(0xFF07, 0x05);

    for _ in 0..15 {
        timer.clock(&mut bus);
    }
    assert_eq!(bus.io(IoRegister::TIMA), 0xFF);

    timer.clock(&mut bus);
    assert_eq!(bus.io(IoRegister::TIMA), 0x00);
    assert_eq!(bus.io(IoRegister::IF) & 0x04, 0);
    assert!(timer.overflow_pending());

    for _ in 0..3 {
        timer.clock(&mut bus);
        assert_eq!(bus.io(IoRegister::IF) & 0x04, 0);
        assert_eq!(bus.io(IoRegister::TIMA), 0x00);
    }

    timer.clock(&mut bus);
    assert_eq!(bus.io(IoRegister::IF) & 0x04, 0x04);
    assert_eq!(bus.io(IoRegister::TIMA), 0x42);
    assert!(!timer.overflow_pending());
}

#[test]
fn timer_rates_follow_tac_low_bits() {
    for (tac, increments) in [(0x04u8, 1u8), (0x05, 64), (0x06, 16), (0x07, 4)] {
        let mut bus = small_bus();
        let mut timer = Timer::new();
        bus.write(0xFF05, 0x00);
        bus.write(0xFF07, tac);

        for _ in 0..1024 {
            timer.clock(&mut bus);
        }
        assert_eq!(bus.io(IoRegister::TIMA), increments, "TAC {tac:#04X}");
        assert_eq!(Timer::tima_period(tac) * increments as u32, 1024);
    }
}

#[test]
fn timer_disabled_leaves_tima_alone_but_div_runs() {
    let mut bus = small_bus();
    let mut timer = Timer::new();
    bus.write(0xFF05, 0x10);
    bus.write(0xFF07, 0x01);

    for _ in 0..255 {
        timer.clock(&mut bus);
    }
    assert_eq!(bus.io(IoRegister::DIV), 0xAB);
    timer.clock(&mut bus);
    assert_eq!(bus.io(IoRegister::DIV), 0xAC);
    assert_eq!(bus.io(IoRegister::TIMA), 0x10);
}

#[test]
fn ppu_frame_is_70224_steps_and_ly_wraps() {
    let mut bus = small_bus();
    let mut ppu = Ppu::new();
    bus.write(0xFF0F, 0x00);

    let mut completed_at = Vec::new();
    let mut max_ly = 0;
    for step in 1..=STEPS_PER_FRAME {
        if ppu.clock(&mut bus) {
            completed_at.push(step);
        }
        max_ly = max_ly.max(bus.io(IoRegister::LY));
    }

    assert_eq!(completed_at, vec![144 * 456 + 1]);
    assert_eq!(max_ly, 153);
    assert_eq!(bus.io(IoRegister::LY), 0);
    assert_eq!(ppu.mode(), PpuMode::OamScan);
    assert_eq!(bus.io(IoRegister::IF) & 0x01, 0x01);

    // The next step opens line 0 of the following frame.
    ppu.clock(&mut bus);
    assert_eq!(bus.io(IoRegister::STAT) & 0x03, 2);
    assert_eq!(bus.io(IoRegister::LY), 0);
}

#[test]
fn ppu_stat_mode_tracks_line_phases() {
    let mut bus = small_bus();
    let mut ppu = Ppu::new();

    ppu.clock(&mut bus);
    assert_eq!(bus.io(IoRegister::STAT) & 0x03, 2);
    for _ in 0..80 {
        ppu.clock(&mut bus);
    }
    assert_eq!(bus.io(IoRegister::STAT) & 0x03, 3);
    assert_eq!(ppu.mode(), PpuMode::Drawing);
    for _ in 0..172 {
        ppu.clock(&mut bus);
    }
    assert_eq!(bus.io(IoRegister::STAT) & 0x03, 0);
    assert_eq!(ppu.mode(), PpuMode::HBlank);
    assert_eq!(bus.io(IoRegister::LY), 1);
}

#[test]
fn ppu_hblank_stat_source_raises_interrupt() {
    let mut bus = small_bus();
    let mut ppu = Ppu::new();
    bus.write(0xFF41, LcdStatus::HBLANK_INT.bits());
    bus.write(0xFF0F, 0x00);

    for _ in 0..(80 + 172) {
        ppu.clock(&mut bus);
    }
    assert_eq!(bus.io(IoRegister::IF) & 0x02, 0);
    ppu.clock(&mut bus);
    assert_eq!(bus.io(IoRegister::IF) & 0x02, 0x02);
}

#[test]
fn ppu_lyc_match_raises_stat_once_per_frame() {
    let mut bus = small_bus();
    let mut ppu = Ppu::new();
    bus.write(0xFF45, 5);
    bus.write(0xFF41, LcdStatus::COINCIDENCE_INT.bits());
    bus.write(0xFF0F, 0x00);

    let mut raised = 0;
    let mut saw_coincidence_on_line_5 = false;
    for _ in 0..STEPS_PER_FRAME {
        ppu.clock(&mut bus);
        if bus.io(IoRegister::IF) & 0x02 != 0 {
            raised += 1;
            bus.write(0xFF0F, 0x00);
        }
        if bus.io(IoRegister::LY) == 5 && bus.lcd_status().contains(LcdStatus::COINCIDENCE) {
            saw_coincidence_on_line_5 = true;
        }
    }

    assert_eq!(raised, 1);
    assert!(saw_coincidence_on_line_5);
}

#[test]
fn ppu_renders_background_with_fine_scroll() {
    let mut bus = small_bus();
    let mut ppu = Ppu::new();
    fill_tile(&mut bus, 1, 0xFF, 0xFF);
    bus.write(0x9800, 1);
    bus.write(0xFF47, 0xE4);
    bus.write(0xFF40, 0x91);
    bus.write(0xFF43, 4);

    run_frame(&mut ppu, &mut bus);

    let screen = ppu.screen();
    assert_eq!(screen.len(), SCREEN_WIDTH * SCREEN_HEIGHT);
    assert_eq!(screen[0], BLACK);
    assert_eq!(screen[3], BLACK);
    assert_eq!(screen[4], WHITE);
    // Map row 0 covers the first eight lines.
    assert_eq!(screen[7 * SCREEN_WIDTH], BLACK);
    assert_eq!(screen[8 * SCREEN_WIDTH], WHITE);
}

#[test]
fn ppu_signed_tile_data_addresses_below_0x9000() {
    let mut bus = small_bus();
    let mut ppu = Ppu::new();
    // Tile -1 sits at 0x8FF0 in signed mode.
    fill_tile(&mut bus, 0xFF, 0xFF, 0xFF);
    bus.write(0x9800, 0xFF);
    bus.write(0xFF47, 0xE4);
    bus.write(0xFF40, 0x81);

    run_frame(&mut ppu, &mut bus);

    assert_eq!(ppu.screen()[0], BLACK);
    assert_eq!(ppu.screen()[8], WHITE);
}

#[test]
fn ppu_window_overrides_background_from_wx() {
    let mut bus = small_bus();
    let mut ppu = Ppu::new();
    fill_tile(&mut bus, 1, 0xFF, 0xFF);
    bus.write(0x9C00, 1);
    bus.write(0xFF47, 0xE4);
    bus.write(0xFF4A, 0);
    bus.write(0xFF4B, 87);
    bus.write(0xFF40, 0xF1);

    run_frame(&mut ppu, &mut bus);

    let screen = ppu.screen();
    assert_eq!(screen[79], WHITE);
    assert_eq!(screen[80], BLACK);
    assert_eq!(screen[87], BLACK);
    assert_eq!(screen[88], WHITE);
}

#[test]
fn ppu_window_starts_mid_tile_for_unaligned_wx() {
    let mut bus = small_bus();
    let mut ppu = Ppu::new();
    fill_tile(&mut bus, 1, 0xFF, 0xFF);
    bus.write(0x9C00, 1);
    bus.write(0xFF47, 0xE4);
    bus.write(0xFF4A, 0);
    bus.write(0xFF4B, 90);
    bus.write(0xFF40, 0xF1);

    run_frame(&mut ppu, &mut bus);

    // WX=90 puts the window's left edge at x=83, inside the 80..88 column.
    let screen = ppu.screen();
    assert_eq!(screen[80], WHITE);
    assert_eq!(screen[82], WHITE);
    assert_eq!(screen[83], BLACK);
    assert_eq!(screen[90], BLACK);
    assert_eq!(screen[91], WHITE);
}

#[test]
fn ppu_disabled_background_is_white_whatever_bgp_holds() {
    let mut bus = small_bus();
    let mut ppu = Ppu::new();
    fill_tile(&mut bus, 0, 0xFF, 0xFF);
    bus.write(0xFF47, 0xE7);
    bus.write(0xFF40, 0x90);

    run_frame(&mut ppu, &mut bus);
    run_frame(&mut ppu, &mut bus);

    assert!(ppu.screen().iter().all(|&pixel| pixel == WHITE));

    // With the background back on, tile 0 maps through BGP to black.
    bus.write(0xFF40, 0x91);
    run_frame(&mut ppu, &mut bus);
    assert_eq!(ppu.screen()[0], BLACK);
}

#[test]
fn ppu_keeps_running_with_lcd_enable_clear() {
    let mut bus = small_bus();
    let mut ppu = Ppu::new();
    fill_tile(&mut bus, 0, 0xFF, 0xFF);
    bus.write(0xFF47, 0xE4);
    bus.write(0xFF40, 0x11);

    run_frame(&mut ppu, &mut bus);
    run_frame(&mut ppu, &mut bus);

    assert_eq!(ppu.screen()[0], BLACK);
    assert_eq!(ppu.screen()[SCREEN_WIDTH * SCREEN_HEIGHT - 1], BLACK);
}

#[test]
fn ppu_sprite_keeps_scan_height_when_obj_size_changes_before_draw() {
    let mut bus = small_bus();
    let mut ppu = Ppu::new();
    fill_tile(&mut bus, 4, 0xFF, 0x00);
    fill_tile(&mut bus, 5, 0xFF, 0xFF);
    bus.write(0xFF47, 0xE4);
    bus.write(0xFF48, 0xE4);
    bus.write(0xFF40, 0x97);

    // Y-flipped 8x16 sprite covering lines 0..16.
    bus.write(0xFE00, 16);
    bus.write(0xFE01, 8);
    bus.write(0xFE02, 4);
    bus.write(0xFE03, 0x40);

    let line_12_scan = 12 * 456 + 1;
    for _ in 0..line_12_scan {
        ppu.clock(&mut bus);
    }
    assert_eq!(bus.io(IoRegister::LY), 12);
    assert_eq!(ppu.mode(), PpuMode::OamScan);

    // Back to 8x8 sprites between the scan and the draw.
    bus.write(0xFF40, 0x93);
    for _ in line_12_scan..144 * 456 + 1 {
        ppu.clock(&mut bus);
    }

    // Line 12 of a flipped 8x16 sprite is row 3 of the upper tile.
    assert_eq!(ppu.screen()[12 * SCREEN_WIDTH], LIGHT);
    // Line 13 was scanned with 8x8 sprites and misses it.
    assert_eq!(ppu.screen()[13 * SCREEN_WIDTH], WHITE);
}

#[test]
fn ppu_sprite_palette_and_background_priority() {
    let mut bus = small_bus();
    let mut ppu = Ppu::new();
    fill_tile(&mut bus, 1, 0xFF, 0xFF);
    fill_tile(&mut bus, 2, 0xFF, 0x00);
    bus.write(0xFF47, 0xE4);
    bus.write(0xFF48, 0xE4);
    bus.write(0xFF40, 0x93);

    bus.write(0xFE00, 16);
    bus.write(0xFE01, 8);
    bus.write(0xFE02, 2);
    bus.write(0xFE03, 0x00);

    run_frame(&mut ppu, &mut bus);
    assert_eq!(ppu.screen()[0], LIGHT);
    assert_eq!(ppu.screen()[8], WHITE);

    // Behind a non-zero background pixel the sprite is hidden.
    bus.write(0x9800, 1);
    bus.write(0xFE03, 0x80);
    run_frame(&mut ppu, &mut bus);
    assert_eq!(ppu.screen()[0], BLACK);

    // Without the priority flag it wins again.
    bus.write(0xFE03, 0x00);
    run_frame(&mut ppu, &mut bus);
    assert_eq!(ppu.screen()[0], LIGHT);
}

#[test]
fn ppu_sprite_overlap_prefers_lower_x_then_lower_oam_index() {
    let mut bus = small_bus();
    let mut ppu = Ppu::new();
    fill_tile(&mut bus, 2, 0xFF, 0x00);
    fill_tile(&mut bus, 3, 0xFF, 0xFF);
    bus.write(0xFF47, 0xE4);
    bus.write(0xFF48, 0xE4);
    bus.write(0xFF40, 0x93);

    // Same x: OAM 0 (light) beats OAM 1 (black).
    for (i, tile) in [(0u16, 2u8), (1, 3)] {
        bus.write(0xFE00 + i * 4, 16);
        bus.write(0xFE01 + i * 4, 8);
        bus.write(0xFE02 + i * 4, tile);
    }
    run_frame(&mut ppu, &mut bus);
    assert_eq!(ppu.screen()[0], LIGHT);

    // Different x: the lower x (OAM 1, light) is on top.
    bus.write(0xFE01, 12);
    bus.write(0xFE02, 3);
    bus.write(0xFE05, 8);
    bus.write(0xFE06, 2);
    run_frame(&mut ppu, &mut bus);
    assert_eq!(ppu.screen()[4], LIGHT);
    assert_eq!(ppu.screen()[8], BLACK);
}

#[test]
fn ppu_draws_at_most_ten_sprites_per_line() {
    let mut bus = small_bus();
    let mut ppu = Ppu::new();
    fill_tile(&mut bus, 2, 0xFF, 0x00);
    bus.write(0xFF47, 0xE4);
    bus.write(0xFF48, 0xE4);
    bus.write(0xFF40, 0x93);

    for i in 0..12u16 {
        bus.write(0xFE00 + i * 4, 16);
        bus.write(0xFE01 + i * 4, 8 + 8 * i as u8);
        bus.write(0xFE02 + i * 4, 2);
    }
    run_frame(&mut ppu, &mut bus);

    for i in 0..10 {
        assert_eq!(ppu.screen()[i * 8], LIGHT, "sprite {i}");
    }
    assert_eq!(ppu.screen()[80], WHITE);
    assert_eq!(ppu.screen()[88], WHITE);
}

#[test]
fn ppu_tall_sprites_use_even_tile_pair_and_flip() {
    let mut bus = small_bus();
    let mut ppu = Ppu::new();
    // Tile 4 light, tile 5 black: an 8x16 sprite naming tile 5 uses 4 then 5.
    fill_tile(&mut bus, 4, 0xFF, 0x00);
    fill_tile(&mut bus, 5, 0xFF, 0xFF);
    bus.write(0xFF47, 0xE4);
    bus.write(0xFF48, 0xE4);
    bus.write(0xFF40, 0x97);

    bus.write(0xFE00, 16);
    bus.write(0xFE01, 8);
    bus.write(0xFE02, 5);
    run_frame(&mut ppu, &mut bus);
    assert_eq!(ppu.screen()[0], LIGHT);
    assert_eq!(ppu.screen()[8 * SCREEN_WIDTH], BLACK);

    bus.write(0xFE03, 0x40);
    run_frame(&mut ppu, &mut bus);
    assert_eq!(ppu.screen()[0], BLACK);
    assert_eq!(ppu.screen()[8 * SCREEN_WIDTH], LIGHT);
}

/// ROM that enables VBlank, then sleeps in a HALT loop counting interrupts in B.
fn vblank_counter_rom() -> Vec<u8> {
    let mut rom = make_rom(0x00, 0x00);
    // 0x0040: INC B; RETI
    rom[0x0040..0x0042].copy_from_slice(&[0x04, 0xD9]);
    // 0x0100: LD A,1; LDH (FF),A; EI; HALT; JR -3
    rom[0x0100..0x0108].copy_from_slice(&[0x3E, 0x01, 0xE0, 0xFF, 0xFB, 0x76, 0x18, 0xFD]);
    rom[0x014D] = 0x00;
    rom
}

#[test]
fn gameboy_boot_flags_follow_header_checksum() {
    let gb = GameBoy::from_rom(vblank_counter_rom()).expect("valid rom");
    assert_eq!(gb.cpu.regs.f, 0x80);

    let mut rom = vblank_counter_rom();
    rom[0x014D] = 0x01;
    let gb = GameBoy::from_rom(rom).expect("valid rom");
    assert_eq!(gb.cpu.regs.f, 0xB0);
}

#[test]
fn gameboy_services_vblank_from_halt() {
    let mut gb = GameBoy::from_rom(vblank_counter_rom()).expect("valid rom");

    for _ in 0..3 {
        gb.step_frame();
    }

    assert_eq!(gb.frames(), 3);
    assert_eq!(gb.steps(), 65_665 + 2 * STEPS_PER_FRAME as u64);
    // One for the VBlank already pending at power-on, one for each of the
    // first two frames; the third is still pending.
    assert_eq!(gb.cpu.regs.b, 3);
    assert!(gb.cpu.halted);
    assert_eq!(gb.cpu.invalid_opcode_count(), 0);
}

#[test]
fn gameboy_video_frame_is_rgb24() {
    let mut gb = GameBoy::from_rom(vblank_counter_rom()).expect("valid rom");
    gb.step_frame();

    let mut buffer = vec![0u8; SCREEN_WIDTH * SCREEN_HEIGHT * 3];
    gb.video_frame(&mut buffer);
    assert!(buffer.iter().all(|&b| b == 0xFF));
    assert_eq!(gb.screen()[0], Color::WHITE.to_argb());
}

#[test]
fn gameboy_key_mapping_reaches_joypad() {
    let mut gb = GameBoy::from_rom(vblank_counter_rom()).expect("valid rom");
    gb.bus_mut().write8(0xFF00, 0x10);

    gb.handle_key(Key::Z, true);
    gb.handle_key(Key::S, true);
    assert_eq!(gb.bus_mut().read8(0xFF00) & 0x0F, 0x06);

    gb.handle_key(Key::Return, true);
    gb.handle_key(Key::Z, false);
    assert_eq!(gb.bus_mut().read8(0xFF00) & 0x0F, 0x07);
}
