/// Number of bytes at the start of every arena slot reserved for the block header.
///
/// The header links the block into either the free list or the used list and records whether
/// the block is currently allocated. The payload of the block starts right after the header.
pub const HEADER_SIZE: usize = 12;

// Layout of the header within a slot. Indexes are little-endian u32 values.
const USED_OFFSET: usize = 0;
const PREV_OFFSET: usize = 4;
const NEXT_OFFSET: usize = 8;

/// Link value meaning "no block".
const NO_BLOCK: u32 = u32::MAX;

/// Largest number of blocks a pool can hold. Block indexes must be representable in a header
/// link without colliding with the `NO_BLOCK` marker.
pub(crate) const MAX_BLOCK_COUNT: usize = NO_BLOCK as usize;

/// Decoded form of the intrusive header stored at the start of every arena slot.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct BlockHeader {
    pub(crate) used: bool,
    pub(crate) prev: Option<usize>,
    pub(crate) next: Option<usize>,
}

impl BlockHeader {
    pub(crate) const VACANT: Self = Self {
        used: false,
        prev: None,
        next: None,
    };

    #[allow(
        clippy::indexing_slicing,
        reason = "offsets are compile-time constants within the header"
    )]
    pub(crate) fn decode(bytes: &[u8; HEADER_SIZE]) -> Self {
        Self {
            used: bytes[USED_OFFSET] != 0,
            prev: decode_link(bytes, PREV_OFFSET),
            next: decode_link(bytes, NEXT_OFFSET),
        }
    }

    #[allow(
        clippy::indexing_slicing,
        reason = "offsets are compile-time constants within the header"
    )]
    pub(crate) fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0_u8; HEADER_SIZE];

        bytes[USED_OFFSET] = u8::from(self.used);
        bytes[PREV_OFFSET..PREV_OFFSET + 4].copy_from_slice(&encode_link(self.prev));
        bytes[NEXT_OFFSET..NEXT_OFFSET + 4].copy_from_slice(&encode_link(self.next));

        bytes
    }
}

#[allow(
    clippy::indexing_slicing,
    reason = "offsets are compile-time constants within the header"
)]
fn decode_link(bytes: &[u8; HEADER_SIZE], offset: usize) -> Option<usize> {
    let raw = u32::from_le_bytes(
        bytes[offset..offset + 4]
            .try_into()
            .expect("link fields are exactly four bytes"),
    );

    (raw != NO_BLOCK).then_some(raw as usize)
}

fn encode_link(link: Option<usize>) -> [u8; 4] {
    let raw = link.map_or(NO_BLOCK, |index| {
        u32::try_from(index).expect("guarded by MAX_BLOCK_COUNT when the arena was created")
    });

    raw.to_le_bytes()
}
