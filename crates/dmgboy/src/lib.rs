use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dmgboy_core::app::GameBoyApp;
use dmgboy_core::GameBoy;
use dmgboy_core::{SCREEN_HEIGHT, SCREEN_SCALE, SCREEN_WIDTH};
use typed_builder::TypedBuilder;

pub use dmgboy_common::app::App;

/// Frames run when no count is given for a headless session.
pub const DEFAULT_HEADLESS_FRAMES: u64 = 600;

/// Size of one RGB24 frame in bytes.
pub const FRAME_BYTES: usize = SCREEN_WIDTH * SCREEN_HEIGHT * 3;

#[derive(Debug, Clone, TypedBuilder)]
pub struct RunConfig {
    pub rom: PathBuf,
    /// Raw external-RAM image, loaded at start and written back on exit.
    #[builder(default)]
    pub save: Option<PathBuf>,
    #[builder(default = false)]
    pub headless: bool,
    #[builder(default = DEFAULT_HEADLESS_FRAMES)]
    pub frames: u64,
    /// Where a headless run writes its last frame as raw RGB24.
    #[builder(default)]
    pub dump: Option<PathBuf>,
    #[builder(default = SCREEN_SCALE)]
    pub scale: u32,
}

pub fn run(config: &RunConfig) -> Result<()> {
    let rom = fs::read(&config.rom)
        .with_context(|| format!("failed to read ROM {}", config.rom.display()))?;
    let mut gb = GameBoy::from_rom(rom)
        .with_context(|| format!("failed to load ROM {}", config.rom.display()))?;

    if let Some(save) = &config.save {
        load_save(&mut gb, save)?;
    }

    let gb = if config.headless {
        let (gb, frame) = run_headless(gb, config.frames);
        if let Some(dump) = &config.dump {
            fs::write(dump, &frame)
                .with_context(|| format!("failed to write frame dump {}", dump.display()))?;
            log::info!("wrote last frame to {}", dump.display());
        }
        gb
    } else {
        run_window(gb, config.scale)?
    };

    if let Some(save) = &config.save {
        write_save(&gb, save)?;
    }
    Ok(())
}

/// Run `frames` frames as fast as the host allows. Returns the machine and
/// its last frame as RGB24.
pub fn run_headless(gb: GameBoy, frames: u64) -> (GameBoy, Vec<u8>) {
    let mut app = GameBoyApp::new(gb);
    let mut frame = vec![0u8; FRAME_BYTES];

    app.init();
    for _ in 0..frames {
        app.update(&mut frame);
    }
    app.exit();

    let gb = app.into_inner();
    log::info!(
        "headless run finished: frames={} steps={} invalid_opcodes={}",
        gb.frames(),
        gb.steps(),
        gb.cpu.invalid_opcode_count()
    );
    (gb, frame)
}

#[cfg(feature = "sdl")]
pub fn run_window(gb: GameBoy, scale: u32) -> Result<GameBoy> {
    use dmgboy_sdl2::{SdlContext, SdlInitInfo};

    let mut app = GameBoyApp::new(gb).with_scale(scale);
    let init_info = SdlInitInfo::builder()
        .width(app.width())
        .height(app.height())
        .scale(app.scale())
        .title(app.title())
        .build();
    SdlContext::run(init_info, &mut app)?;
    Ok(app.into_inner())
}

#[cfg(not(feature = "sdl"))]
pub fn run_window(_gb: GameBoy, _scale: u32) -> Result<GameBoy> {
    anyhow::bail!("this build has no window frontend; rebuild with `--features sdl` or pass --headless")
}

/// Load a save image if one exists. A missing file is a fresh save.
fn load_save(gb: &mut GameBoy, path: &Path) -> Result<()> {
    match fs::read(path) {
        Ok(data) => {
            gb.load_external_ram(&data)
                .with_context(|| format!("failed to load save {}", path.display()))?;
            log::info!("loaded {} bytes of save RAM from {}", data.len(), path.display());
            Ok(())
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            log::info!("no save at {}, starting fresh", path.display());
            Ok(())
        }
        Err(err) => Err(err).with_context(|| format!("failed to read save {}", path.display())),
    }
}

fn write_save(gb: &GameBoy, path: &Path) -> Result<()> {
    let ram = gb.external_ram();
    if ram.is_empty() {
        log::warn!("cartridge has no external RAM, not writing {}", path.display());
        return Ok(());
    }
    fs::write(path, ram).with_context(|| format!("failed to write save {}", path.display()))?;
    log::info!("wrote {} bytes of save RAM to {}", ram.len(), path.display());
    Ok(())
}
