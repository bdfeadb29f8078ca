//! Mulberry32 seeded PRNG
//!
//! Bit-identical to the `mulberry32` used by the browser layers: all state
//! updates are wrapping `u32` arithmetic, so the stream cannot drift across
//! platforms or between the JS and wasm sides.

use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

const MULBERRY_INCREMENT: u32 = 0x6D2B_79F5;
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Deterministic random stream from a 32-bit seed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededRng {
    seed: u32,
    state: u32,
}

impl SeededRng {
    pub fn new(seed: u32) -> Self {
        Self { seed, state: seed }
    }

    /// Seed this stream was created from (or last reseeded with)
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Current internal counter
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Rewind to the original seed
    pub fn reset(&mut self) {
        self.state = self.seed;
    }

    /// Reseed and rewind in one step
    pub fn set_seed(&mut self, seed: u32) {
        self.seed = seed;
        self.state = seed;
    }

    /// Next raw 32-bit output
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(MULBERRY_INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Uniform float in [0, 1)
    pub fn next(&mut self) -> f64 {
        f64::from(self.next_u32()) / TWO_POW_32
    }

    /// Uniform float between `min` and `max`
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        let (min, max) = (f64::from(min), f64::from(max));
        (min + (max - min) * self.next()) as f32
    }

    /// Uniform integer in [min, max], both bounds inclusive.
    /// Swapped bounds are reordered rather than rejected.
    pub fn range_int(&mut self, min: i32, max: i32) -> i32 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        let span = i64::from(hi) - i64::from(lo) + 1;
        let offset = (self.next() * span as f64).floor() as i64;
        (i64::from(lo) + offset.min(span - 1)) as i32
    }

    /// Fair coin flip
    pub fn bool(&mut self) -> bool {
        self.next() < 0.5
    }

    /// Uniformly chosen element, `None` for an empty slice
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let last = items.len() as i32 - 1;
        let index = self.range_int(0, last) as usize;
        items.get(index)
    }
}

impl Default for SeededRng {
    fn default() -> Self {
        Self::new(crate::consts::DEFAULT_SEED)
    }
}

impl RngCore for SeededRng {
    fn next_u32(&mut self) -> u32 {
        SeededRng::next_u32(self)
    }

    fn next_u64(&mut self) -> u64 {
        let hi = u64::from(SeededRng::next_u32(self));
        let lo = u64::from(SeededRng::next_u32(self));
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let bytes = SeededRng::next_u32(self).to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

impl SeedableRng for SeededRng {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}

/// Coerce an arbitrary numeric seed to u32 the way `x >>> 0` does:
/// truncate toward zero, wrap modulo 2^32, non-finite becomes 0.
pub fn coerce_seed(value: f64) -> u32 {
    if !value.is_finite() {
        log::warn!("Non-finite seed {value} coerced to 0");
        return 0;
    }
    let wrapped = value.trunc() % TWO_POW_32;
    let wrapped = if wrapped < 0.0 { wrapped + TWO_POW_32 } else { wrapped };
    wrapped as u32
}
