use std::time::{SystemTime, UNIX_EPOCH};

/// xorshift64* generator, plenty for deciding when ships show up
#[derive(Clone, Debug)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Rng {
        // Zero is the one state xorshift never leaves
        Rng { state: if seed == 0 { 0x9e37_79b9_7f4a_7c15 } else { seed } }
    }

    pub fn from_time() -> Rng {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);

        Rng::new(seed)
    }

    fn next(&mut self) -> u64 {
        self.state ^= self.state >> 12;
        self.state ^= self.state << 25;
        self.state ^= self.state >> 27;
        self.state.wrapping_mul(0x2545_f491_4f6c_dd1d)
    }

    /// Uniform integer in `low..=high`
    pub fn randint(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }

        let span = (high - low) as u64 + 1;
        low + (self.next() % span) as u32
    }

    /// True once every `n + 1` draws on average
    pub fn one_in(&mut self, n: u32) -> bool {
        self.randint(0, n) == 0
    }
}
