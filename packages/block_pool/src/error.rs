use std::collections::TryReserveError;

use thiserror::Error;

use crate::BlockAddress;

/// Errors that can occur when operating on a [`BlockPool`][crate::BlockPool].
///
/// None of these are retried internally. The pool state is never modified by a failed operation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PoolError {
    /// The caller supplied a zero or otherwise unusable argument.
    #[error("invalid argument: {problem}")]
    InvalidArgument {
        /// A human-readable description of the problem.
        problem: String,
    },

    /// The arena backing the pool could not be allocated.
    #[error("failed to allocate a {bytes} byte arena")]
    AllocationFailure {
        /// Size of the arena that was requested.
        bytes: usize,

        /// The underlying allocation failure.
        #[source]
        source: TryReserveError,
    },

    /// Every block in the pool is already allocated.
    #[error("all {block_count} blocks in the pool are in use")]
    PoolExhausted {
        /// Number of blocks the pool was initialized with.
        block_count: usize,
    },

    /// The pool has not been initialized or has already been destroyed.
    #[error("the pool is not initialized")]
    NotInitialized,

    /// The pool was initialized twice without being destroyed in between.
    #[error("the pool is already initialized")]
    AlreadyInitialized,

    /// The address does not identify a block that is currently allocated from this pool.
    #[error("{address} is not a valid allocated block: {reason}")]
    InvalidAddress {
        /// The address that was rejected.
        address: BlockAddress,

        /// Why the address was rejected.
        reason: &'static str,
    },
}

impl PoolError {
    pub(crate) fn invalid_argument(problem: impl Into<String>) -> Self {
        Self::InvalidArgument {
            problem: problem.into(),
        }
    }
}

/// A specialized `Result` type for pool operations, returning the crate's
/// [`PoolError`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, PoolError>;
