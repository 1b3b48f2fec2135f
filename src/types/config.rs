//! Strong types for configuration values
//!
//! These types keep chunk sizes from being confused with block numbers
//! or other counts flowing through the scanner.

use serde::{Deserialize, Serialize};

/// Number of blocks requested from the node in a single `eth_getLogs` call
///
/// The scanner starts at a caller-supplied size and halves it every time
/// the node rejects or fails a request. It is never grown back within a run.
///
/// # Examples
///
/// ```
/// use transferscan::ChunkSize;
///
/// let size = ChunkSize::new(1000);
/// assert_eq!(size.halve(), ChunkSize::new(500));
/// assert_eq!(size.chunk_end(1, 10_000), 1000);
/// assert_eq!(size.chunk_end(9_500, 10_000), 10_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkSize(u32);

impl ChunkSize {
    /// Chunk size used by the collector against rate-limited public endpoints
    pub const DEFAULT: Self = Self(1000);

    /// Smallest chunk worth requesting before a scan gives up
    pub const MIN_FLOOR: Self = Self(100);

    /// Creates a chunk size; zero is bumped to one block
    pub const fn new(blocks: u32) -> Self {
        if blocks == 0 {
            Self(1)
        } else {
            Self(blocks)
        }
    }

    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    pub const fn as_u64(&self) -> u64 {
        self.0 as u64
    }

    /// Returns half of this size (integer division)
    ///
    /// The result may fall below any configured floor; callers compare
    /// against their floor before using it.
    #[must_use]
    pub const fn halve(&self) -> Self {
        Self(self.0 / 2)
    }

    /// Last block of a chunk starting at `start`, clamped to `limit`
    pub fn chunk_end(&self, start: u64, limit: u64) -> u64 {
        start
            .saturating_add(self.as_u64())
            .saturating_sub(1)
            .min(limit)
    }
}

impl Default for ChunkSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u32> for ChunkSize {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for ChunkSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} blocks", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_bumped_to_one() {
        assert_eq!(ChunkSize::new(0).as_u32(), 1);
    }

    #[test]
    fn test_halving_sequence() {
        let sizes: Vec<u32> = std::iter::successors(Some(ChunkSize::new(1000)), |s| {
            let next = s.halve();
            (next >= ChunkSize::MIN_FLOOR).then_some(next)
        })
        .map(|s| s.as_u32())
        .collect();

        assert_eq!(sizes, vec![1000, 500, 250, 125]);
    }

    #[test]
    fn test_chunk_end_near_u64_max() {
        let size = ChunkSize::new(1000);
        assert_eq!(size.chunk_end(u64::MAX - 10, u64::MAX), u64::MAX);
    }

    #[test]
    fn test_single_block_chunk() {
        let size = ChunkSize::new(1);
        assert_eq!(size.chunk_end(42, 100), 42);
    }

    #[test]
    fn test_display() {
        assert_eq!(ChunkSize::new(250).to_string(), "250 blocks");
    }
}
