use std::time::{Duration, Instant};

/// Paces the frame loop to a fixed number of iterations per second
#[derive(Debug)]
pub struct Clock {
    frame: Duration,
    last: Option<Instant>,
    paced: bool,
}

impl Clock {
    pub fn new(ips: u32) -> Clock {
        Clock {
            frame: frame_duration(ips),
            last: None,
            paced: true,
        }
    }

    pub fn set_ips(&mut self, ips: u32) {
        self.frame = frame_duration(ips);
    }

    pub fn frame(&self) -> Duration {
        self.frame
    }

    /// An unpaced clock never sleeps
    pub fn set_paced(&mut self, paced: bool) {
        self.paced = paced;
    }

    pub fn paced(&self) -> bool {
        self.paced
    }

    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Sleeps until a full frame has passed since the previous tick, returns the time the frame
    /// actually took
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();

        let elapsed = match self.last {
            Some(last) => now.duration_since(last),
            None => self.frame,
        };

        if self.paced && elapsed < self.frame {
            std::thread::sleep(self.frame - elapsed);
        }

        let end = Instant::now();
        let took = self.last.map(|last| end.duration_since(last)).unwrap_or(elapsed);
        self.last = Some(end);

        took
    }
}

fn frame_duration(ips: u32) -> Duration {
    Duration::from_nanos(1_000_000_000 / ips.max(1) as u64)
}
