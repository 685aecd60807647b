//! Seeded random stream used for reproducible floor layouts.

use rand::{RngCore, SeedableRng};

/// Small 32-bit generator (mulberry32) with no hidden entropy.
///
/// The same seed always yields the same sequence, so a floor layout is fully
/// determined by `(base_seed, floor)`. Implements [`RngCore`], so choices and
/// shuffles go through the usual `rand` helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomStream {
    state: u32,
}

impl RandomStream {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Stream for a given floor: `base + floor * 1337`, wrapping.
    pub fn for_floor(base_seed: u32, floor: u32) -> Self {
        Self::new(base_seed.wrapping_add(floor.wrapping_mul(1337)))
    }

    pub fn seed(&mut self, value: u32) {
        self.state = value;
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }
}

impl RngCore for RandomStream {
    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    fn next_u64(&mut self) -> u64 {
        let low = u64::from(self.next_u32());
        let high = u64::from(self.next_u32());
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for RandomStream {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}
