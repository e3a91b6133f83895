use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use dmgboy::{RunConfig, DEFAULT_HEADLESS_FRAMES};
use dmgboy_core::SCREEN_SCALE;

/// Lock-step DMG Game Boy emulator.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Cartridge ROM image.
    rom: PathBuf,

    /// Raw external-RAM image, loaded at start and written back on exit.
    #[arg(long)]
    save: Option<PathBuf>,

    /// Run without a window.
    #[arg(long)]
    headless: bool,

    /// Frames to run in headless mode.
    #[arg(long, default_value_t = DEFAULT_HEADLESS_FRAMES)]
    frames: u64,

    /// Write the last headless frame to this path as raw RGB24.
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Window scale factor.
    #[arg(long, default_value_t = SCREEN_SCALE)]
    scale: u32,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    log::info!("playing ROM '{}'", cli.rom.display());

    let config = RunConfig::builder()
        .rom(cli.rom)
        .save(cli.save)
        .headless(cli.headless)
        .frames(cli.frames)
        .dump(cli.dump)
        .scale(cli.scale)
        .build();
    dmgboy::run(&config)
}
