use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::arena::{Arena, Geometry};
use crate::{BlockAddress, BlockPoolBuilder, PoolError, PoolStats, Result};

/// A thread-safe pool of fixed-size memory blocks carved out of one contiguous arena.
///
/// The pool is created uninitialized by [`new()`][Self::new] and becomes usable after a
/// successful [`init()`][Self::init], which allocates the arena and places every block on the free
/// list. [`alloc()`][Self::alloc] hands out the most recently freed block and
/// [`release()`][Self::release] gives it back. [`destroy()`][Self::destroy] frees the arena and
/// returns the pool to the uninitialized state, after which it may be initialized again.
///
/// Use [`builder()`][Self::builder] to obtain a pool that is initialized in one step.
///
/// # Thread safety
///
/// All operations take `&self`. Allocation, release and payload access are serialized by a single
/// pool-wide mutex that is only ever held for a constant amount of work. Address validation via
/// [`is_valid()`][Self::is_valid] and the [`stat()`][Self::stat] snapshot do not take the lock.
///
/// Callers must not let [`destroy()`][Self::destroy] race with other operations they still expect
/// to succeed: doing so is memory-safe but the racing operations will fail.
///
/// # Example
///
/// ```rust
/// use block_pool::BlockPool;
///
/// let pool = BlockPool::new();
/// pool.init(2, 64).unwrap();
///
/// let a = pool.alloc().unwrap();
/// let b = pool.alloc().unwrap();
/// assert!(pool.alloc().is_err());
///
/// pool.write(a, 0, b"hello").unwrap();
///
/// let mut buffer = [0_u8; 5];
/// pool.read(a, 0, &mut buffer).unwrap();
/// assert_eq!(&buffer, b"hello");
///
/// pool.release(b).unwrap();
///
/// // The most recently released block is the next one handed out.
/// assert_eq!(pool.alloc().unwrap(), b);
///
/// pool.destroy();
/// assert!(!pool.is_initialized());
/// ```
#[derive(Debug)]
pub struct BlockPool {
    /// `None` while the pool is uninitialized.
    arena: Mutex<Option<Arena>>,

    // Mirrors of the arena state, written under the lock and read without it.
    initialized: AtomicBool,
    object_size: AtomicUsize,
    block_size: AtomicUsize,
    block_count: AtomicUsize,
    free_count: AtomicUsize,
    used_count: AtomicUsize,
}

impl BlockPool {
    /// Creates an uninitialized pool. Call [`init()`][Self::init] before allocating.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            arena: Mutex::new(None),
            initialized: AtomicBool::new(false),
            object_size: AtomicUsize::new(0),
            block_size: AtomicUsize::new(0),
            block_count: AtomicUsize::new(0),
            free_count: AtomicUsize::new(0),
            used_count: AtomicUsize::new(0),
        }
    }

    /// Starts building an initialized pool.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::num::NonZero;
    ///
    /// use block_pool::BlockPool;
    ///
    /// let pool = BlockPool::builder()
    ///     .block_count(NonZero::new(10).unwrap())
    ///     .object_size(NonZero::new(256).unwrap())
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(pool.free_count(), 10);
    /// ```
    pub fn builder() -> BlockPoolBuilder {
        BlockPoolBuilder::new()
    }

    /// Allocates the arena and links `block_count` blocks of `object_size` payload bytes each
    /// into the free list.
    ///
    /// The arena is zeroed. Each block occupies [`HEADER_SIZE`][crate::HEADER_SIZE] bytes more
    /// than `object_size` in the arena.
    ///
    /// # Errors
    ///
    /// * [`PoolError::InvalidArgument`] if either argument is zero or the arena size overflows.
    /// * [`PoolError::AllocationFailure`] if the arena cannot be allocated.
    /// * [`PoolError::AlreadyInitialized`] if the pool has not been destroyed since the last
    ///   successful initialization.
    ///
    /// On error the pool is left as it was.
    pub fn init(&self, block_count: usize, object_size: usize) -> Result<()> {
        let mut guard = self.arena.lock();

        if guard.is_some() {
            warn!(block_count, object_size, "pool is already initialized");
            return Err(PoolError::AlreadyInitialized);
        }

        let arena = Arena::new(block_count, object_size).inspect_err(|error| {
            warn!(block_count, object_size, %error, "cannot initialize pool");
        })?;

        let geometry = arena.geometry();
        *guard = Some(arena);

        self.publish_geometry(geometry);
        self.publish_counts(block_count, 0);
        self.initialized.store(true, Ordering::Release);

        debug!(
            block_count,
            object_size,
            block_size = geometry.block_size,
            total_size = geometry.total_size(),
            "pool initialized"
        );

        Ok(())
    }

    /// Frees the arena and resets the pool to the uninitialized state.
    ///
    /// Any addresses still held by callers become invalid. Destroying an uninitialized pool does
    /// nothing.
    pub fn destroy(&self) {
        let mut guard = self.arena.lock();

        let Some(arena) = guard.take() else {
            trace!("destroy called on an uninitialized pool");
            return;
        };

        self.initialized.store(false, Ordering::Release);
        self.publish_geometry(Geometry::default());
        self.publish_counts(0, 0);

        debug!(
            abandoned_blocks = arena.used_count(),
            "pool destroyed"
        );

        drop(arena);
    }

    /// Takes a block off the free list and returns the address of its payload.
    ///
    /// This never blocks beyond ordinary lock contention and never waits for a block to become
    /// free. The payload contents are whatever the previous user of the block left behind.
    ///
    /// # Errors
    ///
    /// * [`PoolError::NotInitialized`] if the pool is not initialized.
    /// * [`PoolError::PoolExhausted`] if every block is in use.
    pub fn alloc(&self) -> Result<BlockAddress> {
        let mut guard = self.arena.lock();

        let Some(arena) = guard.as_mut() else {
            warn!("alloc on an uninitialized pool");
            return Err(PoolError::NotInitialized);
        };

        let Some(address) = arena.alloc() else {
            let block_count = arena.geometry().block_count;
            warn!(block_count, "no block available to allocate");
            return Err(PoolError::PoolExhausted { block_count });
        };

        self.publish_counts(arena.free_count(), arena.used_count());

        trace!(%address, "block allocated");

        Ok(address)
    }

    /// Returns an allocated block to the free list, where it becomes the next block to be
    /// allocated.
    ///
    /// # Errors
    ///
    /// * [`PoolError::NotInitialized`] if the pool is not initialized.
    /// * [`PoolError::InvalidAddress`] if the address was never issued by this pool or the block
    ///   is not currently allocated. Releasing the same address twice is reported this way.
    ///
    /// A failed release leaves the pool untouched.
    pub fn release(&self, address: BlockAddress) -> Result<()> {
        let mut guard = self.arena.lock();

        let Some(arena) = guard.as_mut() else {
            warn!(%address, "release on an uninitialized pool");
            return Err(PoolError::NotInitialized);
        };

        arena.release(address).inspect_err(|error| {
            warn!(%address, %error, "rejected block release");
        })?;

        self.publish_counts(arena.free_count(), arena.used_count());

        trace!(%address, "block released");

        Ok(())
    }

    /// Checks whether `address` is the payload address of one of the pool's blocks.
    ///
    /// This is a structural check only: it answers whether the address is a block boundary this
    /// pool could have issued, not whether the block is currently allocated. It does not take the
    /// pool lock. An uninitialized pool rejects every address.
    #[must_use]
    pub fn is_valid(&self, address: BlockAddress) -> bool {
        self.geometry().block_index(address).is_some()
    }

    /// Copies `data` into the payload of an allocated block, starting `offset` bytes in.
    ///
    /// # Errors
    ///
    /// * [`PoolError::NotInitialized`] if the pool is not initialized.
    /// * [`PoolError::InvalidAddress`] if the block is not currently allocated.
    /// * [`PoolError::InvalidArgument`] if the write would extend past the end of the payload.
    pub fn write(&self, address: BlockAddress, offset: usize, data: &[u8]) -> Result<()> {
        self.with_payload_mut(address, |payload| -> Result<()> {
            let payload_len = payload.len();

            let target = offset
                .checked_add(data.len())
                .and_then(|end| payload.get_mut(offset..end))
                .ok_or_else(|| out_of_bounds(offset, data.len(), payload_len))?;

            target.copy_from_slice(data);
            Ok(())
        })?
    }

    /// Fills `buffer` from the payload of an allocated block, starting `offset` bytes in.
    ///
    /// # Errors
    ///
    /// * [`PoolError::NotInitialized`] if the pool is not initialized.
    /// * [`PoolError::InvalidAddress`] if the block is not currently allocated.
    /// * [`PoolError::InvalidArgument`] if the read would extend past the end of the payload.
    pub fn read(&self, address: BlockAddress, offset: usize, buffer: &mut [u8]) -> Result<()> {
        self.with_payload(address, |payload| -> Result<()> {
            let source = offset
                .checked_add(buffer.len())
                .and_then(|end| payload.get(offset..end))
                .ok_or_else(|| out_of_bounds(offset, buffer.len(), payload.len()))?;

            buffer.copy_from_slice(source);
            Ok(())
        })?
    }

    /// Calls `f` with the payload of an allocated block while holding the pool lock.
    ///
    /// Keep `f` short: every other allocation and release waits for it.
    ///
    /// # Errors
    ///
    /// * [`PoolError::NotInitialized`] if the pool is not initialized.
    /// * [`PoolError::InvalidAddress`] if the block is not currently allocated.
    pub fn with_payload<R>(&self, address: BlockAddress, f: impl FnOnce(&[u8]) -> R) -> Result<R> {
        let guard = self.arena.lock();
        let arena = guard.as_ref().ok_or(PoolError::NotInitialized)?;

        Ok(f(arena.payload(address)?))
    }

    /// Calls `f` with the payload of an allocated block for writing, while holding the pool lock.
    ///
    /// Keep `f` short: every other allocation and release waits for it.
    ///
    /// # Errors
    ///
    /// * [`PoolError::NotInitialized`] if the pool is not initialized.
    /// * [`PoolError::InvalidAddress`] if the block is not currently allocated.
    pub fn with_payload_mut<R>(
        &self,
        address: BlockAddress,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> Result<R> {
        let mut guard = self.arena.lock();
        let arena = guard.as_mut().ok_or(PoolError::NotInitialized)?;

        Ok(f(arena.payload_mut(address)?))
    }

    /// Whether the pool has been initialized and not yet destroyed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Number of blocks currently on the free list.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free_count.load(Ordering::Acquire)
    }

    /// Number of blocks currently on the used list.
    #[must_use]
    pub fn used_count(&self) -> usize {
        self.used_count.load(Ordering::Acquire)
    }

    /// Number of blocks in the pool, or zero if the pool is not initialized.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.block_count.load(Ordering::Acquire)
    }

    /// Payload bytes per block, or zero if the pool is not initialized.
    #[must_use]
    pub fn object_size(&self) -> usize {
        self.object_size.load(Ordering::Acquire)
    }

    /// Arena bytes per block including the header, or zero if the pool is not initialized.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size.load(Ordering::Acquire)
    }

    /// Total arena size in bytes, or zero if the pool is not initialized.
    #[must_use]
    pub fn total_size(&self) -> usize {
        self.geometry().total_size()
    }

    /// Addresses on the free list, head first. The first entry is the next block to be allocated.
    #[must_use]
    pub fn free_addresses(&self) -> Vec<BlockAddress> {
        self.arena
            .lock()
            .as_ref()
            .map(Arena::free_addresses)
            .unwrap_or_default()
    }

    /// Addresses on the used list, head first. The first entry is the most recent allocation.
    #[must_use]
    pub fn used_addresses(&self) -> Vec<BlockAddress> {
        self.arena
            .lock()
            .as_ref()
            .map(Arena::used_addresses)
            .unwrap_or_default()
    }

    /// Takes a best-effort diagnostic snapshot of the pool.
    ///
    /// This does not wait for the pool lock. The sizes and counts are read from values published
    /// by the last completed operation and may be momentarily inconsistent with each other under
    /// concurrent use. The list heads are only reported if the lock happens to be free.
    #[must_use]
    pub fn stat(&self) -> PoolStats {
        let (free_head, used_head) = self
            .arena
            .try_lock()
            .and_then(|guard| guard.as_ref().map(|arena| (arena.free_head(), arena.used_head())))
            .unwrap_or_default();

        let geometry = self.geometry();

        PoolStats {
            initialized: self.is_initialized(),
            object_size: geometry.object_size,
            block_size: geometry.block_size,
            block_count: geometry.block_count,
            total_size: geometry.total_size(),
            free_count: self.free_count(),
            used_count: self.used_count(),
            free_head,
            used_head,
        }
    }

    fn geometry(&self) -> Geometry {
        Geometry {
            object_size: self.object_size.load(Ordering::Acquire),
            block_size: self.block_size.load(Ordering::Acquire),
            block_count: self.block_count.load(Ordering::Acquire),
        }
    }

    fn publish_geometry(&self, geometry: Geometry) {
        // Zero the count first so a concurrent reader never pairs a new count with an old size.
        self.block_count.store(0, Ordering::Release);
        self.object_size.store(geometry.object_size, Ordering::Release);
        self.block_size.store(geometry.block_size, Ordering::Release);
        self.block_count.store(geometry.block_count, Ordering::Release);
    }

    fn publish_counts(&self, free_count: usize, used_count: usize) {
        self.free_count.store(free_count, Ordering::Release);
        self.used_count.store(used_count, Ordering::Release);
    }
}

impl Default for BlockPool {
    fn default() -> Self {
        Self::new()
    }
}

fn out_of_bounds(offset: usize, len: usize, payload_len: usize) -> PoolError {
    PoolError::invalid_argument(format!(
        "{len} bytes at offset {offset} do not fit in a {payload_len} byte payload"
    ))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    use static_assertions::assert_impl_all;

    use super::*;
    use crate::HEADER_SIZE;

    assert_impl_all!(BlockPool: Send, Sync);

    const MESSAGE_SIZE: usize = 256;

    fn initialized_pool(block_count: usize) -> BlockPool {
        let pool = BlockPool::new();
        pool.init(block_count, MESSAGE_SIZE).unwrap();
        pool
    }

    #[test]
    fn new_pool_is_uninitialized() {
        let pool = BlockPool::new();

        assert!(!pool.is_initialized());
        assert_eq!(pool.block_count(), 0);
        assert!(matches!(pool.alloc(), Err(PoolError::NotInitialized)));
    }

    #[test]
    fn init_rejects_zero_arguments() {
        let pool = BlockPool::new();

        assert!(matches!(
            pool.init(0, MESSAGE_SIZE),
            Err(PoolError::InvalidArgument { .. })
        ));
        assert!(matches!(
            pool.init(1, 0),
            Err(PoolError::InvalidArgument { .. })
        ));
        assert!(!pool.is_initialized());
    }

    #[test]
    fn init_twice_is_rejected() {
        let pool = initialized_pool(2);

        assert!(matches!(
            pool.init(4, 8),
            Err(PoolError::AlreadyInitialized)
        ));

        // The original configuration survives.
        assert_eq!(pool.block_count(), 2);
        assert_eq!(pool.object_size(), MESSAGE_SIZE);
    }

    #[test]
    fn init_makes_every_block_free() {
        for block_count in [1, 2, 7, 20] {
            let pool = initialized_pool(block_count);

            assert_eq!(pool.free_count(), block_count);
            assert_eq!(pool.used_count(), 0);
            assert_eq!(pool.free_addresses().len(), block_count);
            assert!(pool.used_addresses().is_empty());
            assert_eq!(pool.block_size(), MESSAGE_SIZE + HEADER_SIZE);
            assert_eq!(
                pool.total_size(),
                block_count * (MESSAGE_SIZE + HEADER_SIZE)
            );
        }
    }

    #[test]
    fn alloc_until_exhausted_yields_distinct_blocks() {
        let pool = initialized_pool(10);

        let addresses = (0..10).map(|_| pool.alloc().unwrap()).collect::<Vec<_>>();

        let unique = addresses.iter().copied().collect::<HashSet<_>>();
        assert_eq!(unique.len(), 10);

        // Payload ranges must not overlap.
        let mut sorted = addresses.clone();
        sorted.sort();
        for pair in sorted.windows(2) {
            assert!(pair[1].get() - pair[0].get() >= MESSAGE_SIZE);
        }

        assert!(matches!(
            pool.alloc(),
            Err(PoolError::PoolExhausted { block_count: 10 })
        ));
        assert_eq!(pool.free_count(), 0);
        assert_eq!(pool.used_count(), 10);
    }

    #[test]
    fn alloc_takes_free_head_and_becomes_used_head() {
        let pool = initialized_pool(5);

        for _ in 0..5 {
            let free_head = pool.stat().free_head;
            let address = pool.alloc().unwrap();

            assert_eq!(free_head, Some(address));
            assert_eq!(pool.stat().used_head, Some(address));
        }
    }

    #[test]
    fn released_block_is_reused_first() {
        let pool = initialized_pool(4);

        let _a = pool.alloc().unwrap();
        let b = pool.alloc().unwrap();
        let _c = pool.alloc().unwrap();

        pool.release(b).unwrap();

        assert_eq!(pool.alloc().unwrap(), b);
    }

    #[test]
    fn release_in_any_order_restores_pool() {
        let pool = initialized_pool(10);

        let addresses = (0..10).map(|_| pool.alloc().unwrap()).collect::<Vec<_>>();

        for index in [3, 0, 9, 5, 1, 8, 2, 7, 4, 6] {
            pool.release(addresses[index]).unwrap();
        }

        assert_eq!(pool.free_count(), 10);
        assert_eq!(pool.used_count(), 0);
        assert_eq!(pool.stat().used_head, None);
    }

    #[test]
    fn release_of_never_allocated_block_fails_without_mutation() {
        let pool = initialized_pool(3);
        let held = pool.alloc().unwrap();

        // A real block boundary that is currently free.
        let free_block = BlockAddress::new(pool.block_size() + HEADER_SIZE);
        assert!(pool.is_valid(free_block));
        assert_ne!(free_block, held);

        assert!(matches!(
            pool.release(free_block),
            Err(PoolError::InvalidAddress { .. })
        ));
        assert_eq!(pool.free_count(), 2);
        assert_eq!(pool.used_count(), 1);
    }

    #[test]
    fn double_release_fails_without_mutation() {
        let pool = initialized_pool(3);
        let address = pool.alloc().unwrap();

        pool.release(address).unwrap();

        assert!(matches!(
            pool.release(address),
            Err(PoolError::InvalidAddress { .. })
        ));
        assert_eq!(pool.free_count(), 3);
        assert_eq!(pool.used_count(), 0);
    }

    #[test]
    fn release_of_misaligned_address_fails() {
        let pool = initialized_pool(3);
        let address = pool.alloc().unwrap();

        let misaligned = BlockAddress::new(address.get() + 1);

        assert!(!pool.is_valid(misaligned));
        assert!(pool.release(misaligned).is_err());
        assert_eq!(pool.used_count(), 1);

        pool.release(address).unwrap();
    }

    #[test]
    fn release_on_uninitialized_pool_fails() {
        let pool = BlockPool::new();

        assert!(matches!(
            pool.release(BlockAddress::new(HEADER_SIZE)),
            Err(PoolError::NotInitialized)
        ));
    }

    #[test]
    fn is_valid_accepts_exactly_block_payloads() {
        let pool = initialized_pool(4);
        let block_size = pool.block_size();
        let total_size = pool.total_size();

        let valid = (0..4)
            .map(|index| index * block_size + HEADER_SIZE)
            .collect::<HashSet<_>>();

        // Checking every offset in and just beyond the arena is cheap at this size.
        for offset in 0..total_size + 2 * block_size {
            assert_eq!(
                pool.is_valid(BlockAddress::new(offset)),
                valid.contains(&offset),
                "offset {offset}"
            );
        }
    }

    #[test]
    fn is_valid_rejects_one_past_the_end() {
        let pool = initialized_pool(4);

        let one_past_end = BlockAddress::new(4 * pool.block_size() + HEADER_SIZE);

        assert!(!pool.is_valid(one_past_end));
        assert!(!pool.is_valid(BlockAddress::new(pool.total_size())));
    }

    #[test]
    fn is_valid_ignores_used_flag() {
        let pool = initialized_pool(2);
        let address = pool.alloc().unwrap();

        assert!(pool.is_valid(address));
        pool.release(address).unwrap();
        assert!(pool.is_valid(address));
    }

    #[test]
    fn destroy_resets_everything() {
        let pool = initialized_pool(10);
        let address = pool.alloc().unwrap();

        pool.destroy();

        let stats = pool.stat();
        assert!(!stats.initialized);
        assert_eq!(stats.block_count, 0);
        assert_eq!(stats.block_size, 0);
        assert_eq!(stats.object_size, 0);
        assert_eq!(stats.total_size, 0);
        assert_eq!(stats.free_count, 0);
        assert_eq!(stats.used_count, 0);
        assert_eq!(stats.free_head, None);
        assert_eq!(stats.used_head, None);

        assert!(!pool.is_valid(address));
        assert!(matches!(pool.alloc(), Err(PoolError::NotInitialized)));
    }

    #[test]
    fn destroy_then_init_again() {
        let pool = initialized_pool(2);
        pool.destroy();
        pool.destroy();

        pool.init(3, 8).unwrap();

        assert_eq!(pool.free_count(), 3);
        assert_eq!(pool.object_size(), 8);
    }

    #[test]
    fn write_and_read_round_trip() {
        let pool = initialized_pool(2);
        let address = pool.alloc().unwrap();

        pool.write(address, 10, b"payload").unwrap();

        let mut buffer = [0_u8; 7];
        pool.read(address, 10, &mut buffer).unwrap();
        assert_eq!(&buffer, b"payload");

        pool.with_payload(address, |payload| {
            assert_eq!(payload.len(), MESSAGE_SIZE);
            assert_eq!(&payload[10..17], b"payload");
        })
        .unwrap();
    }

    #[test]
    fn write_past_end_of_payload_fails() {
        let pool = initialized_pool(2);
        let address = pool.alloc().unwrap();

        assert!(matches!(
            pool.write(address, MESSAGE_SIZE - 1, b"ab"),
            Err(PoolError::InvalidArgument { .. })
        ));
        assert!(matches!(
            pool.write(address, usize::MAX, b"ab"),
            Err(PoolError::InvalidArgument { .. })
        ));

        let mut buffer = [0_u8; 2];
        assert!(pool.read(address, MESSAGE_SIZE - 1, &mut buffer).is_err());
    }

    #[test]
    fn payload_access_to_free_block_fails() {
        let pool = initialized_pool(2);
        let address = pool.alloc().unwrap();
        pool.release(address).unwrap();

        assert!(matches!(
            pool.write(address, 0, b"x"),
            Err(PoolError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn writes_do_not_corrupt_neighbours() {
        let pool = initialized_pool(3);
        let addresses = (0..3).map(|_| pool.alloc().unwrap()).collect::<Vec<_>>();

        for address in &addresses {
            pool.with_payload_mut(*address, |payload| payload.fill(0xAB))
                .unwrap();
        }

        // Every header is intact, so every block can still be released.
        for address in addresses {
            pool.release(address).unwrap();
        }

        assert_eq!(pool.free_count(), 3);
    }

    #[cfg_attr(miri, ignore)] // Slow under Miri.
    #[test]
    fn concurrent_alloc_release_keeps_counts() {
        let pool = Arc::new(initialized_pool(8));

        let handles = (0..4)
            .map(|_| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        if let Ok(address) = pool.alloc() {
                            pool.write(address, 0, &[1, 2, 3]).unwrap();
                            pool.release(address).unwrap();
                        }
                    }
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(pool.free_count(), 8);
        assert_eq!(pool.used_count(), 0);
    }
}
