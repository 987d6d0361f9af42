#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A thread-safe, fixed-block memory pool.
//!
//! [`BlockPool`] owns a single contiguous arena that it divides into a fixed number of equally
//! sized blocks when it is initialized. Blocks are handed out by [`BlockPool::alloc()`] and
//! returned by [`BlockPool::release()`]. Neither operation ever touches the general-purpose heap,
//! scans the arena or waits for anything except the pool lock, which makes the pool suitable for
//! pre-allocating message buffers on hot paths.
//!
//! # Layout
//!
//! Every block occupies [`HEADER_SIZE`] bytes of header followed by the payload. The headers link
//! each block into exactly one of two doubly linked lists kept inside the arena itself:
//!
//! * The **free list** holds blocks available for allocation.
//! * The **used list** holds blocks currently handed out.
//!
//! Both lists are stacks. Allocation pops the head of the free list and the next allocation after
//! a release returns the block that was just released.
//!
//! # Addresses
//!
//! Blocks are identified by [`BlockAddress`], the byte offset of the block payload within the
//! arena. Every operation validates the address it is given, so releasing an address twice or
//! releasing an address that was never allocated is reported as an error instead of corrupting
//! the pool. Payload bytes are accessed through the pool via [`BlockPool::write()`],
//! [`BlockPool::read()`] and the closure-based [`BlockPool::with_payload()`] family.
//!
//! # Example
//!
//! ```rust
//! use block_pool::BlockPool;
//!
//! let pool = BlockPool::new();
//! pool.init(10, 256).unwrap();
//!
//! let blocks = (0..10).map(|_| pool.alloc().unwrap()).collect::<Vec<_>>();
//! assert!(pool.alloc().is_err());
//!
//! for block in blocks {
//!     pool.release(block).unwrap();
//! }
//!
//! assert_eq!(pool.free_count(), 10);
//! assert_eq!(pool.used_count(), 0);
//!
//! pool.destroy();
//! ```

mod address;
mod arena;
mod builder;
mod error;
mod header;
mod pool;
mod stats;

pub use address::*;
pub use builder::*;
pub use error::PoolError;
pub(crate) use error::Result;
pub use header::HEADER_SIZE;
pub use pool::*;
pub use stats::*;
