use std::fmt;

use crate::BlockAddress;

/// A diagnostic snapshot of a [`BlockPool`][crate::BlockPool], as returned by
/// [`BlockPool::stat()`][crate::BlockPool::stat].
///
/// The snapshot is best-effort and is not part of any safety contract. Under concurrent use the
/// individual fields may have been observed at slightly different moments.
///
/// The [`Display`][fmt::Display] form is a single line suitable for logging.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct PoolStats {
    /// Whether the pool was initialized when the snapshot was taken.
    pub initialized: bool,

    /// Payload bytes per block.
    pub object_size: usize,

    /// Arena bytes per block, including the header.
    pub block_size: usize,

    /// Number of blocks in the pool.
    pub block_count: usize,

    /// Size of the arena in bytes.
    pub total_size: usize,

    /// Number of blocks on the free list.
    pub free_count: usize,

    /// Number of blocks on the used list.
    pub used_count: usize,

    /// The next block to be allocated, if any.
    ///
    /// `None` if the pool is exhausted, uninitialized or was locked when the snapshot was taken.
    pub free_head: Option<BlockAddress>,

    /// The most recently allocated block, if any.
    ///
    /// `None` if no block is allocated, the pool is uninitialized or was locked when the snapshot
    /// was taken.
    pub used_head: Option<BlockAddress>,
}

impl fmt::Display for PoolStats {
    #[cfg_attr(test, mutants::skip)] // No API contract for display format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pool status: size:{}, numblocks:{}, blocksize:{}, objsize:{}, free:{}, used:{}, free_head:{}, used_head:{}",
            self.total_size,
            self.block_count,
            self.block_size,
            self.object_size,
            self.free_count,
            self.used_count,
            DisplayHead(self.free_head),
            DisplayHead(self.used_head),
        )
    }
}

struct DisplayHead(Option<BlockAddress>);

impl fmt::Display for DisplayHead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(address) => write!(f, "{}", address.get()),
            None => write!(f, "-"),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn display_is_single_line() {
        let stats = PoolStats {
            initialized: true,
            object_size: 4,
            block_size: 16,
            block_count: 2,
            total_size: 32,
            free_count: 1,
            used_count: 1,
            free_head: Some(BlockAddress::new(12)),
            used_head: None,
        };

        let line = stats.to_string();

        assert!(!line.contains('\n'));
        assert!(line.contains("numblocks:2"));
        assert!(line.contains("free_head:12"));
        assert!(line.contains("used_head:-"));
    }

    #[test]
    fn default_is_uninitialized() {
        let stats = PoolStats::default();

        assert!(!stats.initialized);
        assert_eq!(stats.block_count, 0);
        assert_eq!(stats.free_head, None);
    }
}
