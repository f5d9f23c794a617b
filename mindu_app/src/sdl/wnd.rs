pub mod canvas;

use std::ops::Deref;
use mindu_lib::{DisplayMode, Surface};
use sdl3::pixels::PixelFormat;
use sdl3::sys::pixels::SDL_PixelFormat;
use tracing::warn;
use crate::error::{AppError, AppResult};
use crate::sdl;

pub(crate) fn pixel_format(format: SDL_PixelFormat) -> PixelFormat {
    unsafe { PixelFormat::from_ll(format) }
}

/// Packs straight RGBA bytes into native-endian 0xAARRGGBB words
pub(crate) fn pack_argb(rgba: &[u8]) -> Vec<u32> {
    rgba.chunks_exact(4)
        .map(|p| u32::from_be_bytes([p[3], p[0], p[1], p[2]]))
        .collect()
}

pub struct Window {
    wnd: sdl3::video::Window,
}

impl Window {
    pub fn new(ctx: &sdl::Context, mode: &DisplayMode) -> AppResult<Self> {
        let video = ctx.video()?;
        let mut builder = video.window(&mode.title, mode.width, mode.height);
        builder.position_centered();
        if mode.fullscreen {
            builder.fullscreen();
        }

        let sdl_window = builder.build().map_err(AppError::sdl)?;

        Ok(Window {
            wnd: sdl_window,
        })
    }

    pub fn wnd(&self) -> &sdl3::video::Window {
        &self.wnd
    }

    pub fn width(&self) -> u32 {
        self.wnd.size_in_pixels().0
    }

    pub fn height(&self) -> u32 {
        self.wnd.size_in_pixels().1
    }

    pub fn set_title(&mut self, title: &str) -> AppResult<()> {
        self.wnd.set_title(title).map_err(AppError::sdl)
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) -> AppResult<()> {
        self.wnd.set_fullscreen(fullscreen).map_err(AppError::sdl)
    }

    pub fn set_icon(&mut self, icon: &Surface) -> AppResult<()> {
        let (w, h) = icon.size();
        let mut words = pack_argb(icon.as_bytes());
        let pixel_bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut words);

        let surface = sdl3::surface::Surface::from_data(
            pixel_bytes,
            w,
            h,
            w * size_of::<u32>() as u32,
            pixel_format(SDL_PixelFormat::ARGB8888),
        )
        .map_err(AppError::sdl)?;

        if !self.wnd.set_icon(surface) {
            warn!("Failed to set the window icon: {}", sdl3::get_error());
        }
        Ok(())
    }
}

impl Deref for Window {
    type Target = sdl3::video::Window;
    fn deref(&self) -> &Self::Target {
        &self.wnd
    }
}
