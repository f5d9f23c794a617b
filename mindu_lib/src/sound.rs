use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::rc::Rc;
use rodio::{Decoder, Source};
use tracing::debug;
use crate::error::{extension_upper, MinduError, MinduResult};

/// Rate every sound is converted to and the mixer runs at
pub const SAMPLE_RATE: u32 = 44100;

pub const SOUND_EXTENSIONS: [&str; 2] = ["OGG", "WAV"];

/// Decoded mono sound. Clones share the samples and compare equal to each other only.
#[derive(Clone)]
pub struct Sound {
    samples: Rc<[i16]>,
    name: String,
}

impl Sound {
    pub fn load<P: AsRef<Path>>(path: P) -> MinduResult<Sound> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(MinduError::load(path, "no such file"));
        }

        match extension_upper(path) {
            Some(ext) if SOUND_EXTENSIONS.contains(&ext.as_str()) => (),
            _ => return Err(MinduError::load(path, "sound format must be OGG or WAV")),
        }

        let file = File::open(path).map_err(|e| MinduError::load(path, e))?;
        let decoder = Decoder::new(BufReader::new(file)).map_err(|e| MinduError::load(path, e))?;

        let channels = decoder.channels().max(1) as usize;
        let rate = decoder.sample_rate();
        let interleaved: Vec<i16> = decoder.collect();

        let mono = downmix(&interleaved, channels);
        let samples = resample(&mono, rate, SAMPLE_RATE);

        debug!(
            "Loaded {} ({} channels at {} Hz, {} samples)",
            path.display(),
            channels,
            rate,
            samples.len()
        );

        Ok(Sound {
            samples: samples.into(),
            name: path.display().to_string(),
        })
    }

    /// Wraps mono samples already at [`SAMPLE_RATE`]
    pub fn from_samples(samples: Vec<i16>) -> Sound {
        Sound {
            samples: samples.into(),
            name: String::from("<samples>"),
        }
    }

    /// Duration in milliseconds
    pub fn length(&self) -> u32 {
        (self.samples.len() as u64 * 1000 / SAMPLE_RATE as u64) as u32
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl PartialEq for Sound {
    fn eq(&self, other: &Sound) -> bool {
        Rc::ptr_eq(&self.samples, &other.samples)
    }
}

impl fmt::Debug for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sound({}, {} ms)", self.name, self.length())
    }
}

fn downmix(interleaved: &[i16], channels: usize) -> Vec<i16> {
    if channels == 1 {
        return interleaved.to_vec();
    }

    interleaved
        .chunks(channels)
        .map(|frame| (frame.iter().map(|&s| s as i32).sum::<i32>() / frame.len() as i32) as i16)
        .collect()
}

/// Linear interpolation between neighbouring samples
fn resample(samples: &[i16], from: u32, to: u32) -> Vec<i16> {
    if from == to || from == 0 || samples.is_empty() {
        return samples.to_vec();
    }

    let out_len = (samples.len() as u64 * to as u64 / from as u64) as usize;
    let step = from as f64 / to as f64;

    (0..out_len)
        .map(|i| {
            let pos = i as f64 * step;
            let i0 = pos.floor() as usize;
            let i1 = (i0 + 1).min(samples.len() - 1);
            let frac = pos - i0 as f64;
            let a = samples[i0.min(samples.len() - 1)] as f64;
            let b = samples[i1] as f64;
            (a + (b - a) * frac).round() as i16
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::TempDir;

    #[test]
    fn identity_comparison() {
        let a = Sound::from_samples(vec![1, 2, 3]);
        let b = a.clone();
        let c = Sound::from_samples(vec![1, 2, 3]);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn length_in_ms() {
        let s = Sound::from_samples(vec![0; SAMPLE_RATE as usize / 2]);
        assert_eq!(s.length(), 500);
    }

    #[test]
    fn load_errors() {
        let dir = TempDir::new("sound_errors");

        assert!(matches!(
            Sound::load(dir.path().join("missing.ogg")),
            Err(MinduError::Load { .. })
        ));

        let mp3 = dir.path().join("song.mp3");
        std::fs::write(&mp3, b"ID3").unwrap();
        assert!(matches!(Sound::load(&mp3), Err(MinduError::Load { .. })));

        let garbage = dir.path().join("noise.WAV");
        std::fs::write(&garbage, b"definitely not a wave file").unwrap();
        assert!(matches!(Sound::load(&garbage), Err(MinduError::Load { .. })));
    }

    #[test]
    fn stereo_is_averaged() {
        assert_eq!(downmix(&[100, 300, -50, 50], 2), vec![200, 0]);
    }

    #[test]
    fn resampling_changes_length() {
        let up = resample(&[0; 22050], 22050, 44100);
        assert_eq!(up.len(), 44100);

        let ramp = resample(&[0, 100], 1, 2);
        assert_eq!(ramp, vec![0, 50, 100, 100]);
    }
}
