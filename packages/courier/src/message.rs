use std::fmt;

use block_pool::BlockAddress;

use crate::{MessagingError, Result};

/// Maximum number of payload bytes in a [`Message`].
pub const MESSAGE_CAPACITY: usize = 255;

/// Size of an encoded [`Message`]: one length byte followed by [`MESSAGE_CAPACITY`] data bytes.
///
/// This is the object size of every block in the message pool.
pub const MESSAGE_SIZE: usize = 1 + MESSAGE_CAPACITY;

/// A fixed-size message: up to [`MESSAGE_CAPACITY`] bytes of payload and the payload length.
///
/// Bytes of the buffer beyond the payload length are carried along but have no meaning.
///
/// # Example
///
/// ```rust
/// use courier::Message;
///
/// let message = Message::new(b"EXIT").unwrap();
///
/// assert_eq!(message.len(), 4);
/// assert_eq!(message.payload(), b"EXIT");
/// ```
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Message {
    len: u8,
    data: [u8; MESSAGE_CAPACITY],
}

impl Message {
    /// A message with an empty payload.
    pub const EMPTY: Self = Self {
        len: 0,
        data: [0; MESSAGE_CAPACITY],
    };

    /// Creates a message holding a copy of `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::InvalidArgument`] if the payload is longer than
    /// [`MESSAGE_CAPACITY`].
    pub fn new(payload: &[u8]) -> Result<Self> {
        let mut message = Self::EMPTY;
        message.set_payload(payload)?;
        Ok(message)
    }

    /// Replaces the payload with a copy of `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::InvalidArgument`] if the payload is longer than
    /// [`MESSAGE_CAPACITY`]. The message is unchanged in that case.
    pub fn set_payload(&mut self, payload: &[u8]) -> Result<()> {
        let len = u8::try_from(payload.len()).map_err(|source| {
            MessagingError::invalid_argument(format!(
                "payload of {} bytes exceeds the message capacity of {MESSAGE_CAPACITY} bytes: {source}",
                payload.len()
            ))
        })?;

        self.data
            .get_mut(..payload.len())
            .expect("a length that fits in u8 fits in the data buffer")
            .copy_from_slice(payload);
        self.len = len;

        Ok(())
    }

    /// The payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        self.data
            .get(..usize::from(self.len))
            .expect("the length byte can never exceed the data buffer")
    }

    /// Length of the payload in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The whole data buffer, including any bytes beyond the payload length.
    #[must_use]
    pub fn data(&self) -> &[u8; MESSAGE_CAPACITY] {
        &self.data
    }

    pub(crate) fn encode(&self) -> [u8; MESSAGE_SIZE] {
        let mut bytes = [0_u8; MESSAGE_SIZE];
        let (len, data) = bytes.split_at_mut(1);

        len.copy_from_slice(&[self.len]);
        data.copy_from_slice(&self.data);

        bytes
    }

    pub(crate) fn decode(bytes: &[u8]) -> Self {
        let (len, data) = bytes
            .split_first()
            .expect("message blocks are exactly MESSAGE_SIZE bytes");

        Self {
            len: *len,
            data: data
                .try_into()
                .expect("message blocks are exactly MESSAGE_SIZE bytes"),
        }
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("len", &self.len)
            .field("payload", &String::from_utf8_lossy(self.payload()))
            .finish_non_exhaustive()
    }
}

impl TryFrom<&[u8]> for Message {
    type Error = MessagingError;

    fn try_from(value: &[u8]) -> Result<Self> {
        Self::new(value)
    }
}

/// Ownership of one message block in a [`MessagingService`][crate::MessagingService] pool.
///
/// Handles are created by [`new_message()`][1], moved into the receiver's mailbox by
/// [`send()`][2], handed to the receiver by [`recv()`][3] and returned to the pool by
/// [`delete_message()`][4]. They cannot be copied, so a message has exactly one owner at a time.
///
/// The handle remembers which service issued it, and every service rejects handles issued by
/// another one. A handle that is dropped without being deleted keeps its block allocated until the
/// service is dropped.
///
/// [1]: crate::MessagingService::new_message
/// [2]: crate::MessagingService::send
/// [3]: crate::MessagingService::recv
/// [4]: crate::MessagingService::delete_message
#[derive(Debug, Eq, PartialEq)]
#[must_use = "dropping a message handle keeps its block allocated until the service is dropped"]
pub struct MessageHandle {
    /// Identity of the issuing service.
    service: u64,
    address: BlockAddress,
}

impl MessageHandle {
    pub(crate) fn new(service: u64, address: BlockAddress) -> Self {
        Self { service, address }
    }

    pub(crate) fn service(&self) -> u64 {
        self.service
    }

    /// The address of the message block in the service's pool.
    #[must_use]
    pub fn address(&self) -> BlockAddress {
        self.address
    }
}
