use std::ops::Deref;
use mindu_lib::Surface;
use crate::error::{AppError, AppResult};
use sdl3::sys::pixels::SDL_PixelFormat;
use super::{pack_argb, pixel_format, Window};

pub struct Canvas {
    pub canvas: sdl3::render::WindowCanvas,
}

impl From<&Window> for Canvas {
    fn from(window: &Window) -> Self {
        Canvas { canvas: window.wnd().clone().into_canvas() }
    }
}

impl Deref for Canvas {
    type Target = sdl3::render::WindowCanvas;
    fn deref(&self) -> &Self::Target {
        &self.canvas
    }
}

impl Canvas {
    pub fn clear(&mut self) {
        self.canvas.clear();
    }

    pub fn present(&mut self) {
        self.canvas.present();
    }

    /// Uploads `frame` and stretches it over the whole window
    pub fn show(&mut self, frame: &Surface) -> AppResult<()> {
        let (w, h) = frame.size();
        let texture_creator = self.canvas.texture_creator();

        let mut texture = texture_creator
            .create_texture_streaming(pixel_format(SDL_PixelFormat::XRGB8888), w, h)
            .map_err(AppError::sdl)?;

        let pitch = w as usize * size_of::<u32>();
        let words = pack_argb(frame.as_bytes());
        let pixel_bytes: &[u8] = bytemuck::cast_slice(words.as_slice());

        texture.update(None, pixel_bytes, pitch).map_err(AppError::sdl)?;

        self.clear();
        self.canvas.copy(&texture, None, None).map_err(AppError::sdl)?;
        self.present();

        Ok(())
    }
}
