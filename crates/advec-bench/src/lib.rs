//! Workload generators for the advec benchmarks.
//!
//! - [`insertion_positions`]: deterministic pseudo-random insert indices
//! - [`erase_positions`]: deterministic pseudo-random erase indices

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

// Knuth MMIX linear congruential step.
const LCG_MULTIPLIER: u64 = 6364136223846793005;
const LCG_INCREMENT: u64 = 1442695040888963407;

fn lcg(state: &mut u64) -> u64 {
    *state = state
        .wrapping_mul(LCG_MULTIPLIER)
        .wrapping_add(LCG_INCREMENT);
    *state >> 33
}

/// Indices for `count` inserts into a sequence that starts empty.
///
/// The `i`-th index lies in `[0, i]`, so every position is valid at the
/// moment it is used.
pub fn insertion_positions(count: usize, seed: u64) -> Vec<usize> {
    let mut state = seed;
    (0..count)
        .map(|len| (lcg(&mut state) % (len as u64 + 1)) as usize)
        .collect()
}

/// Indices for `count` erases from a sequence of `count` elements.
///
/// The `i`-th index lies in `[0, count - i)`.
pub fn erase_positions(count: usize, seed: u64) -> Vec<usize> {
    let mut state = seed;
    (0..count)
        .map(|i| (lcg(&mut state) % (count - i) as u64) as usize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_positions_are_valid() {
        let positions = insertion_positions(500, 7);
        for (len, &pos) in positions.iter().enumerate() {
            assert!(pos <= len);
        }
    }

    #[test]
    fn erase_positions_are_valid() {
        let positions = erase_positions(500, 7);
        for (i, &pos) in positions.iter().enumerate() {
            assert!(pos < 500 - i);
        }
    }

    #[test]
    fn same_seed_same_positions() {
        assert_eq!(insertion_positions(64, 42), insertion_positions(64, 42));
    }
}
