use std::fmt;

/// Inclusive span of block numbers, `start <= end`
///
/// # Examples
///
/// ```
/// use transferscan::BlockRange;
///
/// let range = BlockRange::new(10, 19).unwrap();
/// assert_eq!(range.len(), 10);
/// assert!(BlockRange::new(5, 4).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockRange {
    start: u64,
    end: u64,
}

impl BlockRange {
    /// Returns `None` when `start > end`
    pub fn new(start: u64, end: u64) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of blocks covered
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn contains(&self, block: u64) -> bool {
        (self.start..=self.end).contains(&block)
    }
}

impl fmt::Display for BlockRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_block_range() {
        let range = BlockRange::new(7, 7).unwrap();
        assert_eq!(range.len(), 1);
        assert!(range.contains(7));
        assert!(!range.contains(8));
        assert_eq!(range.to_string(), "7..=7");
    }

    #[test]
    fn test_len_of_widest_range() {
        let range = BlockRange::new(1, u64::MAX).unwrap();
        assert_eq!(range.len(), u64::MAX);
    }
}
