//! Software channel mixer.
//!
//! A fixed pool of channels, each playing at most one [`Sound`] with an optional one-deep queue.
//! The frontend pulls mixed blocks with [`Mixer::mix`] once per frame and hands them to the
//! audio device.

use tracing::debug;
use crate::error::{MinduError, MinduResult};
use crate::sound::{Sound, SAMPLE_RATE};

pub const DEFAULT_CHANNELS: usize = 100;

fn ms_to_samples(ms: u32) -> u64 {
    ms as u64 * SAMPLE_RATE as u64 / 1000
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Fade {
    Steady,
    In { len: u64, pos: u64 },
    Out { len: u64, pos: u64 },
}

impl Fade {
    /// Gain for the next sample. Advances the fade.
    fn step(&mut self) -> f32 {
        match self {
            Fade::Steady => 1.0,
            Fade::In { len, pos } => {
                let gain = *pos as f32 / *len as f32;
                *pos += 1;
                if *pos >= *len {
                    *self = Fade::Steady;
                }
                gain
            }
            Fade::Out { len, pos } => {
                let gain = 1.0 - (*pos as f32 / *len as f32);
                *pos += 1;
                gain
            }
        }
    }

    fn finished(&self) -> bool {
        matches!(self, Fade::Out { len, pos } if pos >= len)
    }
}

#[derive(Debug)]
pub struct Channel {
    id: usize,
    sound: Option<Sound>,
    queued: Option<Sound>,
    pos: usize,
    /// Repeats left after the current pass, -1 forever
    loops: i32,
    /// Samples left before a forced stop
    remaining: Option<u64>,
    fade: Fade,
    paused: bool,
    volume: f32,
    running: bool,
}

impl Channel {
    fn new(id: usize) -> Channel {
        Channel {
            id,
            sound: None,
            queued: None,
            pos: 0,
            loops: 0,
            remaining: None,
            fade: Fade::Steady,
            paused: false,
            volume: 1.0,
            running: false,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Plays `sound` `loops + 1` times (forever with -1), cut after `maxtime` ms unless it's 0,
    /// ramping up from silence over `fadein` ms.
    pub fn play(&mut self, sound: &Sound, loops: i32, maxtime: u32, fadein: u32) -> MinduResult<()> {
        if !self.running {
            return Err(MinduError::invalid_state("play(): the loop is not running"));
        }
        if loops < -1 {
            return Err(MinduError::invalid_argument(format!(
                "play(): loops must be greater than or equal to -1, got {}",
                loops
            )));
        }

        self.start(sound.clone(), loops, maxtime, fadein);
        Ok(())
    }

    fn start(&mut self, sound: Sound, loops: i32, maxtime: u32, fadein: u32) {
        self.sound = Some(sound);
        self.pos = 0;
        self.loops = loops;
        self.remaining = if maxtime > 0 { Some(ms_to_samples(maxtime)) } else { None };
        self.fade = match ms_to_samples(fadein) {
            0 => Fade::Steady,
            len => Fade::In { len, pos: 0 },
        };
        self.paused = false;
    }

    /// Stops playback and drops the queued sound
    pub fn stop(&mut self) {
        self.sound = None;
        self.queued = None;
        self.pos = 0;
        self.loops = 0;
        self.remaining = None;
        self.fade = Fade::Steady;
        self.paused = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn unpause(&mut self) {
        self.paused = false;
    }

    /// Fades the current sound to silence over `time` ms, then stops
    pub fn fadeout(&mut self, time: u32) -> MinduResult<()> {
        if time == 0 {
            return Err(MinduError::invalid_argument("fadeout(): time must be greater than 0"));
        }

        if self.sound.is_some() {
            self.fade = Fade::Out {
                len: ms_to_samples(time).max(1),
                pos: 0,
            };
        }
        Ok(())
    }

    /// True while a sound is loaded, even if paused
    pub fn busy(&self) -> bool {
        self.sound.is_some()
    }

    pub fn sound(&self) -> Option<&Sound> {
        self.sound.as_ref()
    }

    /// Plays `sound` right away if the channel is idle, otherwise after the current one
    pub fn queue(&mut self, sound: &Sound) -> MinduResult<()> {
        if !self.running {
            return Err(MinduError::invalid_state("queue(): the loop is not running"));
        }

        if self.sound.is_none() {
            self.start(sound.clone(), 0, 0, 0);
        } else {
            self.queued = Some(sound.clone());
        }
        Ok(())
    }

    pub fn queued(&self) -> Option<&Sound> {
        self.queued.as_ref()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Clamped into [0, 1]
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = num_traits::clamp(volume, 0.0, 1.0);
    }

    /// The current sound ran out, move on to the queued one
    fn finish(&mut self) {
        match self.queued.take() {
            Some(next) => self.start(next, 0, 0, 0),
            None => self.stop(),
        }
    }

    fn next_sample(&mut self) -> Option<i32> {
        if self.paused {
            return None;
        }

        let sample = loop {
            let sound = self.sound.as_ref()?;

            if self.remaining == Some(0) {
                self.finish();
                continue;
            }

            if self.pos >= sound.len() {
                if self.loops != 0 && !sound.is_empty() {
                    if self.loops > 0 {
                        self.loops -= 1;
                    }
                    self.pos = 0;
                } else {
                    self.finish();
                    continue;
                }
            }

            break sound.samples()[self.pos];
        };

        self.pos += 1;
        if let Some(r) = self.remaining.as_mut() {
            *r -= 1;
        }

        let gain = self.volume * self.fade.step();

        if self.fade.finished() {
            self.stop();
        }

        Some((sample as f32 * gain) as i32)
    }
}

#[derive(Debug)]
pub struct Mixer {
    channels: Vec<Channel>,
    running: bool,
}

impl Mixer {
    pub fn new(count: usize) -> Mixer {
        Mixer {
            channels: (0..count).map(Channel::new).collect(),
            running: false,
        }
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel(&self, id: usize) -> Option<&Channel> {
        self.channels.get(id)
    }

    pub fn channel_mut(&mut self, id: usize) -> Option<&mut Channel> {
        self.channels.get_mut(id)
    }

    /// First channel with nothing loaded
    pub fn idle_channel(&mut self) -> Option<&mut Channel> {
        self.channels.iter_mut().find(|c| !c.busy())
    }

    pub fn count(&self) -> usize {
        self.channels.len()
    }

    pub(crate) fn set_running(&mut self, running: bool) {
        self.running = running;
        for c in self.channels.iter_mut() {
            c.running = running;
        }
    }

    pub fn running(&self) -> bool {
        self.running
    }

    /// How many channels are playing `sound` right now
    pub fn playing_count(&self, sound: &Sound) -> usize {
        self.channels
            .iter()
            .filter(|c| c.sound.as_ref() == Some(sound))
            .count()
    }

    pub fn stop_all(&mut self) {
        for c in self.channels.iter_mut() {
            c.stop();
        }
        debug!("Stopped all {} channels", self.channels.len());
    }

    /// Renders the next `out.len()` mono samples at [`SAMPLE_RATE`]
    pub fn mix(&mut self, out: &mut [i16]) {
        for o in out.iter_mut() {
            let mut acc = 0i32;

            for c in self.channels.iter_mut().filter(|c| c.sound.is_some()) {
                acc += c.next_sample().unwrap_or(0);
            }

            *o = acc.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        }
    }
}

impl Default for Mixer {
    fn default() -> Mixer {
        Mixer::new(DEFAULT_CHANNELS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixer() -> Mixer {
        let mut m = Mixer::new(4);
        m.set_running(true);
        m
    }

    fn tone(len: usize, value: i16) -> Sound {
        Sound::from_samples(vec![value; len])
    }

    #[test]
    fn play_requires_running_loop() {
        let mut m = Mixer::new(1);
        let s = tone(4, 1);

        let c = m.channel_mut(0).unwrap();
        assert!(matches!(c.play(&s, 0, 0, 0), Err(MinduError::InvalidState(_))));
        assert!(matches!(c.queue(&s), Err(MinduError::InvalidState(_))));
    }

    #[test]
    fn invalid_arguments() {
        let mut m = mixer();
        let s = tone(4, 1);
        let c = m.channel_mut(0).unwrap();

        assert!(matches!(c.play(&s, -2, 0, 0), Err(MinduError::InvalidArgument(_))));
        assert!(matches!(c.fadeout(0), Err(MinduError::InvalidArgument(_))));
    }

    #[test]
    fn plays_loops_plus_one_times() {
        let mut m = mixer();
        let s = tone(3, 100);

        m.channel_mut(0).unwrap().play(&s, 1, 0, 0).unwrap();

        let mut out = [0i16; 8];
        m.mix(&mut out);

        assert_eq!(out, [100, 100, 100, 100, 100, 100, 0, 0]);
        assert!(!m.channel(0).unwrap().busy());
    }

    #[test]
    fn endless_loop_keeps_going() {
        let mut m = mixer();
        let s = tone(2, 7);

        m.channel_mut(1).unwrap().play(&s, -1, 0, 0).unwrap();

        let mut out = [0i16; 100];
        m.mix(&mut out);

        assert!(out.iter().all(|&v| v == 7));
        assert_eq!(m.playing_count(&s), 1);
    }

    #[test]
    fn queue_follows_current_sound() {
        let mut m = mixer();
        let a = tone(2, 10);
        let b = tone(2, 20);

        let c = m.channel_mut(0).unwrap();
        c.queue(&a).unwrap();
        assert_eq!(c.sound(), Some(&a));

        c.queue(&b).unwrap();
        assert_eq!(c.queued(), Some(&b));

        let mut out = [0i16; 5];
        m.mix(&mut out);

        assert_eq!(out, [10, 10, 20, 20, 0]);
    }

    #[test]
    fn channels_are_summed_with_saturation() {
        let mut m = mixer();
        let loud = tone(2, 30000);

        m.channel_mut(0).unwrap().play(&loud, 0, 0, 0).unwrap();
        m.channel_mut(1).unwrap().play(&loud, 0, 0, 0).unwrap();

        let mut out = [0i16; 3];
        m.mix(&mut out);

        assert_eq!(out, [i16::MAX, i16::MAX, 0]);
        assert_eq!(m.playing_count(&loud), 0);
    }

    #[test]
    fn paused_channel_is_silent_but_busy() {
        let mut m = mixer();
        let s = tone(10, 5);

        m.channel_mut(0).unwrap().play(&s, 0, 0, 0).unwrap();
        m.channel_mut(0).unwrap().pause();

        let mut out = [1i16; 4];
        m.mix(&mut out);
        assert_eq!(out, [0; 4]);
        assert!(m.channel(0).unwrap().busy());

        m.channel_mut(0).unwrap().unpause();
        m.mix(&mut out);
        assert_eq!(out, [5; 4]);
    }

    #[test]
    fn maxtime_cuts_playback() {
        let mut m = mixer();
        let s = tone(SAMPLE_RATE as usize, 1);

        // 1 ms is 44 samples at 44.1 kHz
        m.channel_mut(0).unwrap().play(&s, 0, 1, 0).unwrap();

        let mut out = vec![0i16; 100];
        m.mix(&mut out);

        assert_eq!(out.iter().filter(|&&v| v == 1).count(), 44);
        assert!(!m.channel(0).unwrap().busy());
    }

    #[test]
    fn fades() {
        let mut m = mixer();
        let s = tone(SAMPLE_RATE as usize, 1000);

        m.channel_mut(0).unwrap().play(&s, 0, 0, 10).unwrap();

        // 10 ms is 441 samples
        let mut out = vec![0i16; 442];
        m.mix(&mut out);
        assert_eq!(out[0], 0);
        assert!(out[220] > 400 && out[220] < 600);
        assert_eq!(out[441], 1000);

        m.channel_mut(0).unwrap().fadeout(10).unwrap();
        m.mix(&mut out);
        assert_eq!(out[0], 1000);
        assert!(out[439] < 10);
        assert!(!m.channel(0).unwrap().busy());
    }

    #[test]
    fn volume_is_clamped() {
        let mut m = mixer();
        let c = m.channel_mut(0).unwrap();

        c.set_volume(3.0);
        assert_eq!(c.volume(), 1.0);
        c.set_volume(-1.0);
        assert_eq!(c.volume(), 0.0);
    }

    #[test]
    fn stop_all_silences_everything() {
        let mut m = mixer();
        let s = tone(10, 1);

        for id in 0..4 {
            m.channel_mut(id).unwrap().play(&s, -1, 0, 0).unwrap();
        }
        assert_eq!(m.playing_count(&s), 4);

        m.stop_all();
        assert_eq!(m.playing_count(&s), 0);
        assert!(m.idle_channel().is_some());
    }
}
