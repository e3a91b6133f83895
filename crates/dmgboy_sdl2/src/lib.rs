use anyhow::{anyhow, Context, Result};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::WindowCanvas;
use typed_builder::TypedBuilder;

pub use dmgboy_common;
pub use dmgboy_common::app::App;
pub use sdl2;

use dmgboy_common::key::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    RGB24,
}

#[derive(TypedBuilder)]
pub struct SdlInitInfo {
    pub width: u32,
    pub height: u32,
    pub scale: u32,
    pub title: String,
    #[builder(default = PixelFormat::RGB24)]
    pub pixel_format: PixelFormat,
    /// Present in step with the display refresh. This is the only pacing the
    /// emulator gets.
    #[builder(default = true)]
    pub vsync: bool,
}

pub struct SdlContext {
    pub sdl_context: sdl2::Sdl,
    pub event_pump: sdl2::EventPump,
    pub canvas: WindowCanvas,
    pub width: u32,
    pub height: u32,
    pub scale: u32,
    pub pixel_format: PixelFormat,
}

impl SdlContext {
    pub fn new(sdl_init_info: SdlInitInfo) -> Result<Self> {
        let SdlInitInfo {
            width,
            height,
            scale,
            title,
            pixel_format,
            vsync,
        } = sdl_init_info;

        let sdl_context = sdl2::init()
            .map_err(|e| anyhow!(e))
            .context("failed to initialise SDL")?;
        let video_subsystem = sdl_context
            .video()
            .map_err(|e| anyhow!(e))
            .context("failed to initialise the SDL video subsystem")?;
        let window = video_subsystem
            .window(&title, width * scale, height * scale)
            .position_centered()
            .build()
            .context("failed to create window")?;

        let canvas_builder = window.into_canvas();
        let canvas_builder = if vsync {
            canvas_builder.present_vsync()
        } else {
            canvas_builder
        };
        let mut canvas = canvas_builder.build().context("failed to create canvas")?;
        canvas
            .set_scale(scale as f32, scale as f32)
            .map_err(|e| anyhow!(e))?;

        let event_pump = sdl_context.event_pump().map_err(|e| anyhow!(e))?;

        Ok(Self {
            sdl_context,
            event_pump,
            canvas,
            width,
            height,
            scale,
            pixel_format,
        })
    }

    pub fn run(sdl_init_info: SdlInitInfo, app: impl App) -> Result<()> {
        let mut context = Self::new(sdl_init_info)?;
        context.run_app(app)
    }

    /// Poll input, advance one frame and present it until the app or the
    /// window asks to stop.
    pub fn run_app(&mut self, mut app: impl App) -> Result<()> {
        let texture_creator = self.canvas.texture_creator();
        let mut texture = texture_creator
            .create_texture_streaming(map_pixel_format(self.pixel_format), self.width, self.height)
            .context("failed to create frame texture")?;

        let color_size = map_pixel_format_size(self.pixel_format);
        let pitch = (self.width * color_size) as usize;
        let mut screen_state = vec![0u8; pitch * self.height as usize];

        app.init();
        loop {
            if app.should_exit() {
                app.exit();
                break;
            }

            for event in self.event_pump.poll_iter() {
                match event {
                    Event::Quit { .. } => {
                        app.exit();
                        return Ok(());
                    }
                    Event::KeyDown {
                        keycode: Some(keycode),
                        repeat: false,
                        ..
                    } => app.handle_key_event(map_keycode(keycode), true),
                    Event::KeyUp {
                        keycode: Some(keycode),
                        ..
                    } => app.handle_key_event(map_keycode(keycode), false),
                    _ => {}
                }
            }

            app.update(&mut screen_state);

            texture
                .update(None, &screen_state, pitch)
                .context("failed to upload frame")?;
            self.canvas.clear();
            self.canvas
                .copy(&texture, None, None)
                .map_err(|e| anyhow!(e))?;
            self.canvas.present();
        }

        log::debug!("SDL loop finished");
        Ok(())
    }
}

pub fn map_pixel_format(pixel_format: PixelFormat) -> PixelFormatEnum {
    match pixel_format {
        PixelFormat::RGB24 => PixelFormatEnum::RGB24,
    }
}

pub fn map_pixel_format_size(pixel_format: PixelFormat) -> u32 {
    match pixel_format {
        PixelFormat::RGB24 => 3,
    }
}

pub fn map_keycode(keycode: Keycode) -> Key {
    match keycode {
        Keycode::Up => Key::Up,
        Keycode::Down => Key::Down,
        Keycode::Left => Key::Left,
        Keycode::Right => Key::Right,
        Keycode::A => Key::A,
        Keycode::S => Key::S,
        Keycode::X => Key::X,
        Keycode::Z => Key::Z,
        Keycode::Return => Key::Return,
        Keycode::Escape => Key::Escape,
        _ => Key::None,
    }
}
