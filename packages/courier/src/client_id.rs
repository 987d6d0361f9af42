use std::fmt;

use crate::{MessagingError, Result};

/// Number of distinct client identifiers, `0..MAX_CLIENTS`.
pub const MAX_CLIENTS: usize = 255;

/// Identifies a participant in a [`MessagingService`][crate::MessagingService].
///
/// Valid identifiers are `0..=254`. Each identifier owns one mailbox in the service.
///
/// # Example
///
/// ```rust
/// use courier::ClientId;
///
/// let id = ClientId::new(5).unwrap();
/// assert_eq!(id.get(), 5);
///
/// assert!(ClientId::new(255).is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ClientId(u8);

impl ClientId {
    /// The largest valid identifier.
    pub const MAX: Self = Self(254);

    /// Creates an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::InvalidArgument`] if `id` is 255.
    pub fn new(id: u8) -> Result<Self> {
        if usize::from(id) >= MAX_CLIENTS {
            return Err(MessagingError::invalid_argument(format!(
                "client id {id} is out of range, the largest valid id is {}",
                Self::MAX.0
            )));
        }

        Ok(Self(id))
    }

    /// The numeric value of the identifier.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Position of the identifier in a table of [`MAX_CLIENTS`] entries.
    #[must_use]
    pub(crate) fn index(self) -> usize {
        usize::from(self.0)
    }

    /// Every valid identifier, in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..=Self::MAX.0).map(Self)
    }
}

impl TryFrom<u8> for ClientId {
    type Error = MessagingError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ClientId> for u8 {
    fn from(value: ClientId) -> Self {
        value.0
    }
}

impl fmt::Display for ClientId {
    #[cfg_attr(test, mutants::skip)] // No API contract for display format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client {}", self.0)
    }
}
