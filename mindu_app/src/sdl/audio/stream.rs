use std::ops::Deref;
use sdl3::audio::{AudioFormat, AudioSpec};
use mindu_lib::SAMPLE_RATE;
use crate::error::{AppError, AppResult};
use crate::sdl::audio::Device;

/// Mono output stream fed once per frame by the mixer
pub struct Stream {
    stream: sdl3::audio::AudioStreamOwner,
}

impl Stream {
    pub fn open(dev: &Device) -> AppResult<Self> {
        let spec = AudioSpec {
            freq: Some(SAMPLE_RATE as i32),
            channels: Some(1),
            format: Some(AudioFormat::s16_sys())
        };

        let stream = dev.deref().clone().open_device_stream(Some(&spec)).map_err(AppError::sdl)?;

        Ok(Stream {
            stream
        })
    }

    pub fn play(&mut self, data: &[i16]) -> AppResult<()> {
        self.stream.put_data_i16(data).map_err(AppError::sdl)
    }

    pub fn resume(&mut self) -> AppResult<()> {
        self.stream.resume().map_err(AppError::sdl)
    }
}
