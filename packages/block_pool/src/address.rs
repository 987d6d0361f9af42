use std::fmt;

/// The address of a block payload within a [`BlockPool`][crate::BlockPool] arena, expressed as a
/// byte offset from the start of the arena.
///
/// Addresses are returned by [`BlockPool::alloc()`][1] and accepted by every other pool operation.
/// They are plain values that can be copied, stored and sent between threads. The pool validates
/// an address on every use, so an address that was never issued, or that refers to a block that
/// has since been released, is rejected rather than trusted.
///
/// An address points at the payload of a block, which starts [`HEADER_SIZE`][2] bytes after the
/// start of the block's slot in the arena.
///
/// # Example
///
/// ```rust
/// use block_pool::{BlockAddress, BlockPool, HEADER_SIZE};
///
/// let pool = BlockPool::new();
/// pool.init(4, 16).unwrap();
///
/// let address = pool.alloc().unwrap();
/// assert!(pool.is_valid(address));
///
/// // One byte into the payload is not a block boundary.
/// assert!(!pool.is_valid(BlockAddress::new(address.get() + 1)));
///
/// // The start of the arena is a header, not a payload.
/// assert!(!pool.is_valid(BlockAddress::new(0)));
/// assert!(pool.is_valid(BlockAddress::new(HEADER_SIZE)));
/// # pool.release(address).unwrap();
/// ```
///
/// [1]: crate::BlockPool::alloc
/// [2]: crate::HEADER_SIZE
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct BlockAddress(usize);

impl BlockAddress {
    /// Creates an address from a raw arena offset.
    ///
    /// No validation takes place here; the pool validates addresses when they are used.
    #[must_use]
    pub const fn new(offset: usize) -> Self {
        Self(offset)
    }

    /// The arena offset of the block payload.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for BlockAddress {
    #[cfg_attr(test, mutants::skip)] // No API contract for display format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block address {}", self.0)
    }
}

impl From<BlockAddress> for usize {
    fn from(value: BlockAddress) -> Self {
        value.0
    }
}
