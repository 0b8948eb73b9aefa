// Deterministic, portable pseudo-random number generator for cave generation.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding.
// Hand-rolled so that the same seed yields the same cave on every platform,
// compiler version, and optimization level.
//
// Every random decision in `cavern_gen` (room center jitter, frontier wall
// picks, maze wall picks, winding passage steps) draws from one `CaveRng`
// owned by the generator. Given a non-zero seed, two runs are identical.
//
// The one non-deterministic entry point is `resolve_seed(0)`, which turns the
// "pick a seed for me" sentinel into a time-derived seed. Callers resolve the
// seed once, up front, and log it so a run can be reproduced.
//
// **Critical constraint: determinism.** The generator core uses integer
// arithmetic only. Do not introduce floating point, stdlib hashing, or OS
// entropy into `next_u64` or the range helpers.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Seed used when the system clock is unavailable and the caller asked for a
/// time-based seed.
const FALLBACK_SEED: u64 = 0x5eed_cafe_f00d_d00d;

/// Xoshiro256++ PRNG, the generator's sole source of randomness.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaveRng {
    s: [u64; 4],
}

impl CaveRng {
    /// Create a new PRNG seeded from a `u64`.
    ///
    /// Uses SplitMix64 to expand the seed into the 256-bit internal state.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Generate a uniform random integer in `[low, high)`.
    ///
    /// Uses rejection sampling to avoid modulo bias.
    /// Panics if `low >= high`.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "range_u64: low must be less than high");
        let range = high - low;
        if range.is_power_of_two() {
            return low + (self.next_u64() & (range - 1));
        }
        let threshold = range.wrapping_neg() % range; // = (2^64 - range) % range
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % range);
            }
        }
    }

    /// Generate a uniform random `usize` in `[low, high)`.
    ///
    /// Panics if `low >= high`.
    pub fn range_usize(&mut self, low: usize, high: usize) -> usize {
        self.range_u64(low as u64, high as u64) as usize
    }

    /// Generate a uniform random `i32` in `[low, high)`.
    ///
    /// An empty or inverted range yields `low` without consuming randomness,
    /// so a zero-width jitter window collapses onto its minimum corner.
    pub fn range_i32(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        let span = (high as i64 - low as i64) as u64;
        (low as i64 + self.range_u64(0, span) as i64) as i32
    }

    /// Pick a uniform index into a collection of `len` items.
    ///
    /// Returns `None` for an empty collection.
    pub fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.range_usize(0, len))
        }
    }
}

/// Turn a configured seed into the seed actually used.
///
/// Zero means "randomize": the current wall-clock time is folded into a
/// non-zero seed. Any other value is returned unchanged.
pub fn resolve_seed(seed: u64) -> u64 {
    if seed != 0 {
        return seed;
    }
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(FALLBACK_SEED);
    let mut sm = nanos;
    match splitmix64(&mut sm) {
        0 => FALLBACK_SEED,
        s => s,
    }
}

/// SplitMix64, used only for seeding xoshiro256++ from a single `u64`.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
