use block_pool::{BlockAddress, PoolError};
use thiserror::Error;

use crate::{ClientId, MessageHandle};

/// Errors that can occur when using a [`MessagingService`][crate::MessagingService].
///
/// None of these are retried internally; callers own any retry policy.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MessagingError {
    /// The caller supplied an argument outside its valid range.
    #[error("invalid argument: {problem}")]
    InvalidArgument {
        /// A human-readable description of the problem.
        problem: String,
    },

    /// The message pool rejected the operation, e.g. because it is exhausted or the message
    /// handle does not refer to an allocated message.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// No receiver has registered under the destination identifier.
    #[error("{client_id} is not registered")]
    ClientNotFound {
        /// The identifier that was looked up.
        client_id: ClientId,
    },

    /// The calling thread is already registered under this identifier.
    #[error("{client_id} is already registered by this thread")]
    AlreadyRegistered {
        /// The identifier that was registered again.
        client_id: ClientId,
    },

    /// Another thread registered under this identifier while the caller was waiting on it.
    #[error("{client_id} was registered by another thread while waiting")]
    Reregistered {
        /// The identifier that changed hands.
        client_id: ClientId,
    },

    /// The message handle was issued by a different messaging service.
    #[error("{address} belongs to a different messaging service")]
    ForeignMessage {
        /// The address recorded in the rejected handle.
        address: BlockAddress,
    },

    /// No message arrived before the receive timeout elapsed.
    #[error("timed out waiting for a message for {client_id}")]
    TimedOut {
        /// The identifier that was waiting.
        client_id: ClientId,
    },

    /// The service has been shut down.
    #[error("the messaging service has been shut down")]
    ShutDown,
}

impl MessagingError {
    pub(crate) fn invalid_argument(problem: impl Into<String>) -> Self {
        Self::InvalidArgument {
            problem: problem.into(),
        }
    }
}

/// A failed [`send()`][crate::MessagingService::send], returning the message that could not be
/// delivered so the caller can retry or delete it.
///
/// Dropping this without recovering the message keeps the message block allocated until the
/// service itself is dropped.
#[derive(Debug, Error)]
#[error("message was not sent: {reason}")]
pub struct SendError {
    reason: MessagingError,
    message: MessageHandle,
}

impl SendError {
    pub(crate) fn new(reason: MessagingError, message: MessageHandle) -> Self {
        Self { reason, message }
    }

    /// Why the message could not be sent.
    #[must_use]
    pub fn reason(&self) -> &MessagingError {
        &self.reason
    }

    /// Recovers the message that could not be sent.
    pub fn into_message(self) -> MessageHandle {
        self.message
    }

    /// Splits the error into the reason and the message that could not be sent.
    pub fn into_parts(self) -> (MessagingError, MessageHandle) {
        (self.reason, self.message)
    }
}

/// A specialized `Result` type for messaging operations, returning the crate's
/// [`MessagingError`] type as the error value.
pub(crate) type Result<T, E = MessagingError> = std::result::Result<T, E>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(MessagingError: Send, Sync, Debug);
    assert_impl_all!(SendError: Send, Sync, Debug);

    #[test]
    fn pool_errors_convert() {
        let error: MessagingError = PoolError::NotInitialized.into();

        assert!(matches!(error, MessagingError::Pool(PoolError::NotInitialized)));
    }

    #[test]
    fn client_errors_name_the_client() {
        let error = MessagingError::ClientNotFound {
            client_id: ClientId::new(7).unwrap(),
        };

        assert!(error.to_string().contains("client 7"));
    }

    #[test]
    fn send_error_returns_message() {
        let message = MessageHandle::new(0, BlockAddress::new(12));
        let error = SendError::new(MessagingError::ShutDown, message);

        assert!(matches!(error.reason(), MessagingError::ShutDown));
        assert_eq!(error.into_message().address(), BlockAddress::new(12));
    }
}
