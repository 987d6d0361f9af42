use std::num::NonZero;

use crate::{BlockPool, PoolError, Result};

/// Builder for creating an initialized [`BlockPool`].
///
/// Both the block count and the object size must be set before calling
/// [`build()`][Self::build].
///
/// # Examples
///
/// ```
/// use std::num::NonZero;
///
/// use block_pool::BlockPool;
///
/// let pool = BlockPool::builder()
///     .block_count(NonZero::new(4).unwrap())
///     .object_size(NonZero::new(32).unwrap())
///     .build()
///     .unwrap();
///
/// assert!(pool.is_initialized());
/// ```
#[derive(Debug)]
#[must_use]
pub struct BlockPoolBuilder {
    block_count: Option<NonZero<usize>>,
    object_size: Option<NonZero<usize>>,
}

impl BlockPoolBuilder {
    pub(crate) fn new() -> Self {
        Self {
            block_count: None,
            object_size: None,
        }
    }

    /// Sets the number of blocks in the pool. The pool never grows beyond this.
    pub fn block_count(mut self, block_count: NonZero<usize>) -> Self {
        self.block_count = Some(block_count);
        self
    }

    /// Sets the number of payload bytes in each block.
    pub fn object_size(mut self, object_size: NonZero<usize>) -> Self {
        self.object_size = Some(object_size);
        self
    }

    /// Builds and initializes the pool.
    ///
    /// # Errors
    ///
    /// * [`PoolError::InvalidArgument`] if the block count or object size was not set, or the
    ///   arena size overflows.
    /// * [`PoolError::AllocationFailure`] if the arena cannot be allocated.
    pub fn build(self) -> Result<BlockPool> {
        let block_count = self
            .block_count
            .ok_or_else(|| PoolError::invalid_argument("block count was not set"))?;
        let object_size = self
            .object_size
            .ok_or_else(|| PoolError::invalid_argument("object size was not set"))?;

        let pool = BlockPool::new();
        pool.init(block_count.get(), object_size.get())?;

        Ok(pool)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn build_initializes_pool() {
        let pool = BlockPool::builder()
            .block_count(NonZero::new(3).unwrap())
            .object_size(NonZero::new(8).unwrap())
            .build()
            .unwrap();

        assert!(pool.is_initialized());
        assert_eq!(pool.block_count(), 3);
        assert_eq!(pool.object_size(), 8);
    }

    #[test]
    fn build_without_block_count_fails() {
        let result = BlockPool::builder()
            .object_size(NonZero::new(8).unwrap())
            .build();

        assert!(matches!(result, Err(PoolError::InvalidArgument { .. })));
    }

    #[test]
    fn build_without_object_size_fails() {
        let result = BlockPool::builder()
            .block_count(NonZero::new(8).unwrap())
            .build();

        assert!(matches!(result, Err(PoolError::InvalidArgument { .. })));
    }
}
