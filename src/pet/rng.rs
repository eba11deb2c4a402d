/// Source of the random draws the behavior state machine makes.
///
/// Production uses `fastrand::Rng`; tests plug in a seeded generator or a
/// scripted sequence so transitions are reproducible.
pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn unit(&mut self) -> f32;
    /// Uniform integer in `lo..=hi`.
    fn int_in(&mut self, lo: i32, hi: i32) -> i32;
    /// Uniform index in `0..len`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize;
}

impl RandomSource for fastrand::Rng {
    fn unit(&mut self) -> f32 {
        self.f32()
    }

    fn int_in(&mut self, lo: i32, hi: i32) -> i32 {
        self.i32(lo..=hi)
    }

    fn index(&mut self, len: usize) -> usize {
        self.usize(0..len)
    }
}

/// Replays a fixed list of unit draws, then repeats `fallback` forever.
/// Integer and index draws are derived from the same unit value.
#[cfg(test)]
pub struct Scripted {
    draws: std::collections::VecDeque<f32>,
    fallback: f32,
}

#[cfg(test)]
impl Scripted {
    pub fn new(draws: &[f32]) -> Self {
        Self {
            draws: draws.iter().copied().collect(),
            fallback: 0.99,
        }
    }

    fn next(&mut self) -> f32 {
        self.draws.pop_front().unwrap_or(self.fallback)
    }
}

#[cfg(test)]
impl RandomSource for Scripted {
    fn unit(&mut self) -> f32 {
        self.next()
    }

    fn int_in(&mut self, lo: i32, hi: i32) -> i32 {
        let span = hi - lo + 1;
        lo + ((self.next() * span as f32) as i32).min(span - 1)
    }

    fn index(&mut self, len: usize) -> usize {
        ((self.next() * len as f32) as usize).min(len - 1)
    }
}
