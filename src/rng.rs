// Injected random source for draft order, auto-picks, and bot variety.
//
// The engines never reach for ambient randomness: every operation that makes
// a uniform choice takes an `&mut dyn Rng`, so tests can seed a generator and
// replay identical drafts. The contract is "uniform choice among a candidate
// set", not a specific generator.

use std::time::{SystemTime, UNIX_EPOCH};

/// A source of raw random words. Implementations must be cheap to call;
/// everything else (ranges, shuffles) is built on top.
pub trait Rng: Send {
    fn next_u64(&mut self) -> u64;

    /// Uniform index into `0..len`. `len` must be non-zero.
    ///
    /// Uses rejection sampling so every index is equally likely (a plain
    /// modulo would bias small indices for lengths that don't divide 2^64).
    fn index(&mut self, len: usize) -> usize {
        assert!(len > 0, "index() requires a non-empty range");
        let len = len as u64;
        let zone = u64::MAX - (u64::MAX % len);
        loop {
            let v = self.next_u64();
            if v < zone {
                return (v % len) as usize;
            }
        }
    }

    /// Fisher-Yates shuffle in place.
    fn shuffle<T>(&mut self, items: &mut [T])
    where
        Self: Sized,
    {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
    }
}

/// xorshift64* generator. Not cryptographic; plenty for draft-order
/// permutations and fallback pick selection.
#[derive(Debug, Clone)]
pub struct XorShiftRng {
    state: u64,
}

impl XorShiftRng {
    /// Create a generator from an explicit seed. A zero seed is remapped
    /// (xorshift has a fixed point at zero).
    pub fn seeded(seed: u64) -> Self {
        XorShiftRng {
            state: if seed == 0 { 0x9E3779B97F4A7C15 } else { seed },
        }
    }

    /// Create a generator seeded from the system clock.
    pub fn from_entropy() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x5DEECE66D);
        Self::seeded(nanos)
    }
}

impl Rng for XorShiftRng {
    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }
}

/// Shuffle helper usable through a trait object (the blanket `shuffle`
/// default method requires `Self: Sized`).
pub fn shuffle<T>(rng: &mut dyn Rng, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.index(i + 1);
        items.swap(i, j);
    }
}

/// Pick a uniform element from a non-empty slice. Returns `None` when empty.
pub fn choose<'a, T>(rng: &mut dyn Rng, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        None
    } else {
        Some(&items[rng.index(items.len())])
    }
}
