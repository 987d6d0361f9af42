use std::num::NonZero;

use crate::{DEFAULT_POOL_CAPACITY, MessagingService};

/// Builder for creating a [`MessagingService`] with custom settings.
///
/// Every setting has a default, so [`build()`][Self::build] can be called right away.
///
/// # Examples
///
/// ```
/// use std::num::NonZero;
///
/// use courier::MessagingService;
///
/// let service = MessagingService::builder()
///     .pool_capacity(NonZero::new(64).unwrap())
///     .build();
///
/// // The pool is allocated when the first message is.
/// let message = service.new_message().unwrap();
/// assert_eq!(service.pool_stats().block_count, 64);
/// service.delete_message(message);
/// ```
#[derive(Debug)]
#[must_use]
pub struct MessagingServiceBuilder {
    pool_capacity: NonZero<usize>,
}

impl MessagingServiceBuilder {
    pub(crate) fn new() -> Self {
        Self {
            pool_capacity: DEFAULT_POOL_CAPACITY,
        }
    }

    /// Sets the number of messages in the pool, which limits how many messages can exist at the
    /// same time.
    ///
    /// Defaults to [`DEFAULT_POOL_CAPACITY`].
    pub fn pool_capacity(mut self, pool_capacity: NonZero<usize>) -> Self {
        self.pool_capacity = pool_capacity;
        self
    }

    /// Builds the service. The message pool is not allocated until the first message is.
    #[must_use]
    pub fn build(self) -> MessagingService {
        MessagingService::from_builder(self.pool_capacity)
    }
}
