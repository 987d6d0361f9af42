use std::any::type_name;
use std::fmt;
use std::ops::Range;

use crate::header::{BlockHeader, HEADER_SIZE, MAX_BLOCK_COUNT};
use crate::{BlockAddress, PoolError, Result};

/// The shape of an arena: how many blocks it holds and how large each one is.
///
/// This is copied out of the arena into atomics so that address validation can happen without
/// taking the pool lock. A zeroed geometry describes an uninitialized pool and rejects every
/// address.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct Geometry {
    pub(crate) object_size: usize,
    pub(crate) block_size: usize,
    pub(crate) block_count: usize,
}

impl Geometry {
    fn new(block_count: usize, object_size: usize) -> Result<Self> {
        if block_count == 0 {
            return Err(PoolError::invalid_argument("block count must be non-zero"));
        }

        if object_size == 0 {
            return Err(PoolError::invalid_argument("object size must be non-zero"));
        }

        if block_count > MAX_BLOCK_COUNT {
            return Err(PoolError::invalid_argument(format!(
                "block count {block_count} exceeds the maximum of {MAX_BLOCK_COUNT}"
            )));
        }

        let block_size = object_size.checked_add(HEADER_SIZE).ok_or_else(|| {
            PoolError::invalid_argument(format!("object size {object_size} is too large"))
        })?;

        // The arena size must be representable so that every block address is.
        block_count.checked_mul(block_size).ok_or_else(|| {
            PoolError::invalid_argument(format!(
                "{block_count} blocks of {block_size} bytes do not fit in the address space"
            ))
        })?;

        Ok(Self {
            object_size,
            block_size,
            block_count,
        })
    }

    /// Saturates rather than overflowing because a geometry assembled from concurrently updated
    /// atomics may pair the count of one arena with the block size of another.
    #[must_use]
    pub(crate) fn total_size(&self) -> usize {
        self.block_count.saturating_mul(self.block_size)
    }

    /// Maps a payload address to the index of the block it belongs to.
    ///
    /// Returns `None` unless the header of the candidate block lies inside the arena, starts on a
    /// block boundary and has an index strictly below the block count. Whether the block is
    /// currently allocated is not considered.
    #[must_use]
    pub(crate) fn block_index(&self, address: BlockAddress) -> Option<usize> {
        let header_offset = address.get().checked_sub(HEADER_SIZE)?;

        if header_offset >= self.total_size() {
            return None;
        }

        // Both checked operations fail on a zero block size, i.e. on an uninitialized geometry.
        if header_offset.checked_rem(self.block_size)? != 0 {
            return None;
        }

        let index = header_offset.checked_div(self.block_size)?;

        (index < self.block_count).then_some(index)
    }

    /// The payload address of the block at `index`.
    #[must_use]
    pub(crate) fn address_of(&self, index: usize) -> BlockAddress {
        debug_assert!(index < self.block_count);

        let header_offset = index
            .checked_mul(self.block_size)
            .expect("guarded by Geometry::new total size check");

        BlockAddress::new(
            header_offset
                .checked_add(HEADER_SIZE)
                .expect("guarded by Geometry::new total size check"),
        )
    }

    fn header_range(&self, index: usize) -> Range<usize> {
        let start = self.address_of(index).get().wrapping_sub(HEADER_SIZE);
        start..self.address_of(index).get()
    }

    fn payload_range(&self, index: usize) -> Range<usize> {
        let start = self.address_of(index).get();

        start..start.wrapping_add(self.object_size)
    }
}

/// Which of the two intrusive lists a block is being linked into or out of.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum List {
    Free,
    Used,
}

/// The storage of a pool: one contiguous byte arena divided into equally sized slots.
///
/// Each slot starts with a [`HEADER_SIZE`] byte header followed by `object_size` bytes of payload.
/// The headers thread every block onto exactly one of two doubly linked lists: the free list or
/// the used list. Both lists are stacks - blocks are always pushed onto the head - so the most
/// recently released block is the next one to be allocated.
///
/// The arena itself does no locking. The owning pool serializes all access.
pub(crate) struct Arena {
    bytes: Box<[u8]>,
    geometry: Geometry,

    free_head: Option<usize>,
    used_head: Option<usize>,

    free_count: usize,
    used_count: usize,
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("geometry", &self.geometry)
            .field("free_head", &self.free_head)
            .field("used_head", &self.used_head)
            .field("free_count", &self.free_count)
            .field("used_count", &self.used_count)
            .finish_non_exhaustive()
    }
}

impl Arena {
    /// Allocates a zeroed arena and links every block into the free list.
    ///
    /// Block `i` is pushed after block `i - 1`, so the free list ends up ordered from the last
    /// block at the head down to block 0 at the tail.
    pub(crate) fn new(block_count: usize, object_size: usize) -> Result<Self> {
        let geometry = Geometry::new(block_count, object_size)?;
        let total_size = geometry.total_size();

        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(total_size)
            .map_err(|source| PoolError::AllocationFailure {
                bytes: total_size,
                source,
            })?;
        bytes.resize(total_size, 0);

        let mut arena = Self {
            bytes: bytes.into_boxed_slice(),
            geometry,
            free_head: None,
            used_head: None,
            free_count: 0,
            used_count: 0,
        };

        for index in 0..block_count {
            arena.set_header(index, BlockHeader::VACANT);
            arena.push_front(List::Free, index);
        }

        arena.free_count = block_count;

        #[cfg(test)]
        arena.integrity_check();

        Ok(arena)
    }

    #[must_use]
    pub(crate) fn geometry(&self) -> Geometry {
        self.geometry
    }

    #[must_use]
    pub(crate) fn free_count(&self) -> usize {
        self.free_count
    }

    #[must_use]
    pub(crate) fn used_count(&self) -> usize {
        self.used_count
    }

    #[must_use]
    pub(crate) fn free_head(&self) -> Option<BlockAddress> {
        self.free_head.map(|index| self.geometry.address_of(index))
    }

    #[must_use]
    pub(crate) fn used_head(&self) -> Option<BlockAddress> {
        self.used_head.map(|index| self.geometry.address_of(index))
    }

    /// Moves the block at the head of the free list to the head of the used list.
    ///
    /// Returns `None` if no block is free.
    pub(crate) fn alloc(&mut self) -> Option<BlockAddress> {
        let index = self.free_head?;

        self.unlink(List::Free, index);
        self.push_front(List::Used, index);
        self.update_header(index, |header| header.used = true);

        self.free_count = self
            .free_count
            .checked_sub(1)
            .expect("a block was on the free list so the free count must be non-zero");
        self.used_count = self
            .used_count
            .checked_add(1)
            .expect("guarded by block count limit");

        #[cfg(test)]
        self.integrity_check();

        Some(self.geometry.address_of(index))
    }

    /// Moves an allocated block from the used list back to the head of the free list.
    pub(crate) fn release(&mut self, address: BlockAddress) -> Result<()> {
        let index = self.allocated_index(address)?;

        self.unlink(List::Used, index);
        self.push_front(List::Free, index);
        self.update_header(index, |header| header.used = false);

        self.used_count = self
            .used_count
            .checked_sub(1)
            .expect("the block was marked used so the used count must be non-zero");
        self.free_count = self
            .free_count
            .checked_add(1)
            .expect("guarded by block count limit");

        #[cfg(test)]
        self.integrity_check();

        Ok(())
    }

    /// The payload of an allocated block.
    pub(crate) fn payload(&self, address: BlockAddress) -> Result<&[u8]> {
        let index = self.allocated_index(address)?;
        let range = self.geometry.payload_range(index);

        Ok(self
            .bytes
            .get(range)
            .expect("payload ranges of valid indexes are inside the arena"))
    }

    /// The payload of an allocated block, for writing.
    pub(crate) fn payload_mut(&mut self, address: BlockAddress) -> Result<&mut [u8]> {
        let index = self.allocated_index(address)?;
        let range = self.geometry.payload_range(index);

        Ok(self
            .bytes
            .get_mut(range)
            .expect("payload ranges of valid indexes are inside the arena"))
    }

    /// Walks a list from its head, yielding payload addresses.
    pub(crate) fn free_addresses(&self) -> Vec<BlockAddress> {
        self.walk(List::Free)
    }

    pub(crate) fn used_addresses(&self) -> Vec<BlockAddress> {
        self.walk(List::Used)
    }

    fn walk(&self, list: List) -> Vec<BlockAddress> {
        let mut addresses = Vec::new();
        let mut cursor = self.head(list);

        while let Some(index) = cursor {
            addresses.push(self.geometry.address_of(index));
            cursor = self.header(index).next;
        }

        addresses
    }

    fn allocated_index(&self, address: BlockAddress) -> Result<usize> {
        let index = self
            .geometry
            .block_index(address)
            .ok_or(PoolError::InvalidAddress {
                address,
                reason: "address is not a block boundary in this pool",
            })?;

        if !self.header(index).used {
            return Err(PoolError::InvalidAddress {
                address,
                reason: "block is not allocated",
            });
        }

        Ok(index)
    }

    fn head(&self, list: List) -> Option<usize> {
        match list {
            List::Free => self.free_head,
            List::Used => self.used_head,
        }
    }

    fn head_mut(&mut self, list: List) -> &mut Option<usize> {
        match list {
            List::Free => &mut self.free_head,
            List::Used => &mut self.used_head,
        }
    }

    fn push_front(&mut self, list: List, index: usize) {
        let old_head = self.head(list);

        self.update_header(index, |header| {
            header.prev = None;
            header.next = old_head;
        });

        if let Some(old_head) = old_head {
            self.update_header(old_head, |header| header.prev = Some(index));
        }

        *self.head_mut(list) = Some(index);
    }

    fn unlink(&mut self, list: List, index: usize) {
        let BlockHeader { prev, next, .. } = self.header(index);

        match prev {
            Some(prev) => self.update_header(prev, |header| header.next = next),
            None => {
                debug_assert_eq!(self.head(list), Some(index));
                *self.head_mut(list) = next;
            }
        }

        if let Some(next) = next {
            self.update_header(next, |header| header.prev = prev);
        }

        self.update_header(index, |header| {
            header.prev = None;
            header.next = None;
        });
    }

    fn header(&self, index: usize) -> BlockHeader {
        let bytes = self
            .bytes
            .get(self.geometry.header_range(index))
            .expect("header ranges of valid indexes are inside the arena");

        BlockHeader::decode(
            bytes
                .try_into()
                .expect("header ranges are exactly HEADER_SIZE bytes"),
        )
    }

    fn set_header(&mut self, index: usize, header: BlockHeader) {
        let range = self.geometry.header_range(index);

        self.bytes
            .get_mut(range)
            .expect("header ranges of valid indexes are inside the arena")
            .copy_from_slice(&header.encode());
    }

    fn update_header(&mut self, index: usize, f: impl FnOnce(&mut BlockHeader)) {
        let mut header = self.header(index);
        f(&mut header);
        self.set_header(index, header);
    }

    /// Verifies that every block is on exactly one list, that its `used` flag matches the list it
    /// is on, that the links are symmetric and that the cached counts are accurate.
    ///
    /// This walks the whole arena, so it only runs in unit tests, where every mutation calls it.
    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(test)]
    pub(crate) fn integrity_check(&self) {
        let mut seen = vec![false; self.geometry.block_count];

        for (list, expected_count) in [
            (List::Free, self.free_count),
            (List::Used, self.used_count),
        ] {
            let mut observed_count: usize = 0;
            let mut previous = None;
            let mut cursor = self.head(list);

            while let Some(index) = cursor {
                let header = self.header(index);
                let slot = seen
                    .get_mut(index)
                    .expect("links only ever hold valid block indexes");

                assert!(
                    !*slot,
                    "block {index} appears more than once across the {list:?} list"
                );
                *slot = true;

                assert_eq!(
                    header.used,
                    list == List::Used,
                    "block {index} on the {list:?} list has a mismatched used flag"
                );
                assert_eq!(
                    header.prev, previous,
                    "block {index} on the {list:?} list has a broken back link"
                );

                observed_count = observed_count
                    .checked_add(1)
                    .expect("guarded by block count limit");
                previous = Some(index);
                cursor = header.next;
            }

            assert_eq!(
                observed_count, expected_count,
                "{list:?} list holds {observed_count} blocks but the count says {expected_count}"
            );
        }

        assert!(
            seen.iter().all(|seen| *seen),
            "some blocks are on neither the free list nor the used list"
        );
    }
}
