use crate::{GameBoy, SCREEN_HEIGHT, SCREEN_SCALE, SCREEN_WIDTH};
use dmgboy_common::app::App;
use dmgboy_common::key::Key;

/// Frames between status lines in the log.
const STATUS_INTERVAL: u64 = 600;

/// Adapter that lets a frontend drive a [`GameBoy`] through the shared
/// [`App`] trait.
pub struct GameBoyApp {
    pub gb: GameBoy,
    scale: u32,
    should_exit: bool,
    reported_invalid: u64,
}

impl GameBoyApp {
    pub fn new(gb: GameBoy) -> Self {
        Self {
            gb,
            scale: SCREEN_SCALE,
            should_exit: false,
            reported_invalid: 0,
        }
    }

    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale.max(1);
        self
    }

    pub fn into_inner(self) -> GameBoy {
        self.gb
    }
}

impl App for GameBoyApp {
    fn init(&mut self) {
        let header = self.gb.bus().cartridge().header();
        log::info!("starting \"{}\"", header.title);
    }

    fn update(&mut self, screen: &mut [u8]) {
        self.gb.step_frame();
        self.gb.video_frame(screen);

        let frames = self.gb.frames();
        if frames % STATUS_INTERVAL == 0 {
            let regs = &self.gb.cpu.regs;
            log::debug!(
                "frame={} pc={:04X} sp={:04X} af={:04X} ime={} halted={}",
                frames,
                regs.pc,
                regs.sp,
                regs.af(),
                self.gb.cpu.ime,
                self.gb.cpu.halted,
            );
        }

        let invalid = self.gb.cpu.invalid_opcode_count();
        if invalid != self.reported_invalid {
            log::warn!("{} invalid opcodes executed so far", invalid);
            self.reported_invalid = invalid;
        }
    }

    fn handle_key_event(&mut self, key: Key, is_down: bool) {
        log::trace!("key {:?} down={}", key, is_down);
        if key == Key::Escape && is_down {
            self.should_exit = true;
            return;
        }
        self.gb.handle_key(key, is_down);
    }

    fn should_exit(&self) -> bool {
        self.should_exit
    }

    fn exit(&mut self) {
        log::info!("stopping after {} frames", self.gb.frames());
    }

    fn width(&self) -> u32 {
        SCREEN_WIDTH as u32
    }

    fn height(&self) -> u32 {
        SCREEN_HEIGHT as u32
    }

    fn scale(&self) -> u32 {
        self.scale
    }

    fn title(&self) -> String {
        let title = &self.gb.bus().cartridge().header().title;
        if title.is_empty() {
            "DMGBoy".to_string()
        } else {
            format!("DMGBoy - {title}")
        }
    }
}
