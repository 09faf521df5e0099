//! Seeded pseudo-random generator for reproducible adversarial runs.
//!
//! Every identifier a server fabricates (fake response ids, synthetic
//! UUID-shaped strings) comes from this generator so that two runs with
//! the same seed produce byte-identical output. No entropy is ever read
//! from the clock or the OS.

/// Small-state deterministic generator (xorshift64* core).
///
/// Seeded from an integer or a string; string seeds are hashed with
/// FNV-1a so the mapping is stable across platforms and runs.
#[derive(Debug, Clone)]
pub struct DeterministicRng {
    state: u64,
}

/// FNV-1a 64-bit offset basis.
const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;

/// FNV-1a 64-bit prime.
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

impl DeterministicRng {
    /// Creates a generator from an integer seed.
    ///
    /// A zero seed is remapped to a fixed non-zero constant because
    /// xorshift has an all-zero fixed point.
    #[must_use]
    pub const fn from_seed(seed: u64) -> Self {
        let state = if seed == 0 { FNV_OFFSET } else { seed };
        Self { state }
    }

    /// Creates a generator from a string seed via FNV-1a hashing.
    #[must_use]
    pub fn from_seed_str(seed: &str) -> Self {
        let mut hash = FNV_OFFSET;
        for byte in seed.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        Self::from_seed(hash)
    }

    /// Returns the next pseudo-random `u64`.
    pub const fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x.wrapping_mul(0x2545_f491_4f6c_dd1d)
    }

    /// Returns the next value in `[0, 1)`.
    ///
    /// Uses the top 53 bits so the result is exactly representable.
    #[allow(clippy::cast_precision_loss)]
    pub const fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Returns a UUID-shaped identifier string.
    ///
    /// The layout mimics a version-4 UUID (fixed version nibble, RFC
    /// variant bits) but the content is fully deterministic given the
    /// seed and call sequence.
    #[allow(clippy::cast_possible_truncation)]
    pub fn uuid_like(&mut self) -> String {
        let hi = self.next_u64();
        let lo = self.next_u64();

        let time_low = (hi >> 32) as u32;
        let time_mid = (hi >> 16) as u16;
        let time_hi = ((hi as u16) & 0x0fff) | 0x4000;
        let clock_seq = ((lo >> 48) as u16 & 0x3fff) | 0x8000;
        let node = lo & 0x0000_ffff_ffff_ffff;

        format!("{time_low:08x}-{time_mid:04x}-{time_hi:04x}-{clock_seq:04x}-{node:012x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = DeterministicRng::from_seed_str("snare");
        let mut b = DeterministicRng::from_seed_str("snare");
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn uuid_sequence_is_reproducible() {
        let mut a = DeterministicRng::from_seed_str("probe-1");
        let mut b = DeterministicRng::from_seed_str("probe-1");
        let first: Vec<String> = (0..10).map(|_| a.uuid_like()).collect();
        let second: Vec<String> = (0..10).map(|_| b.uuid_like()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = DeterministicRng::from_seed_str("alpha");
        let mut b = DeterministicRng::from_seed_str("beta");
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn zero_seed_does_not_wedge() {
        let mut rng = DeterministicRng::from_seed(0);
        assert_ne!(rng.next_u64(), 0);
        assert_ne!(rng.next_u64(), rng.next_u64());
    }

    #[test]
    fn floats_stay_in_unit_interval() {
        let mut rng = DeterministicRng::from_seed(42);
        for _ in 0..1000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn uuid_shape_has_version_and_variant() {
        let mut rng = DeterministicRng::from_seed_str("shape");
        let id = rng.uuid_like();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 5);
        assert_eq!(
            parts.iter().map(|p| p.len()).collect::<Vec<_>>(),
            vec![8, 4, 4, 4, 12]
        );
        assert!(parts[2].starts_with('4'));
        assert!(matches!(parts[3].chars().next(), Some('8' | '9' | 'a' | 'b')));
    }
}
