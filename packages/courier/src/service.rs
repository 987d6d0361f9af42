use std::num::NonZero;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use block_pool::{BlockPool, PoolError, PoolStats};
use tracing::{debug, trace, warn};

use crate::semaphore::WaitError;
use crate::{
    ClientId, ClientRegistry, MESSAGE_SIZE, Message, MessageHandle, MessagingError,
    MessagingServiceBuilder, Result, SendError,
};

/// Number of message blocks in the pool of a service built with default settings.
pub const DEFAULT_POOL_CAPACITY: NonZero<usize> = NonZero::new(20).expect("20 is not zero");

/// Source of the identities stamped into message handles.
static NEXT_SERVICE_ID: AtomicU64 = AtomicU64::new(0);

/// Passes fixed-size messages between threads.
///
/// The service owns a pool of [`MESSAGE_SIZE`]-byte message blocks and a [`ClientRegistry`] that
/// binds every receiving thread to a [`ClientId`]. A message travels as a [`MessageHandle`]:
///
/// 1. The sender obtains a handle with [`new_message()`][Self::new_message] (or
///    [`compose()`][Self::compose]) and fills it via [`store()`][Self::store].
/// 2. [`send()`][Self::send] moves the handle into the mailbox of the destination client and wakes
///    its receiver.
/// 3. The receiver gets the handle from [`recv()`][Self::recv], reads it with
///    [`load()`][Self::load] and returns the block with
///    [`delete_message()`][Self::delete_message].
///
/// Every client has a single-slot mailbox. A message sent to a client whose mailbox still holds an
/// unreceived message replaces that message, which is deleted.
///
/// The message pool is allocated on the first call to [`new_message()`][Self::new_message].
///
/// # Thread safety
///
/// The service is `Send + Sync`. Share it between threads by reference or via `Arc`.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::thread;
///
/// use courier::{ClientId, MessagingService};
///
/// let service = Arc::new(MessagingService::new());
/// let receiver_id = ClientId::new(5).unwrap();
///
/// service.register(receiver_id).unwrap();
///
/// let sender = thread::spawn({
///     let service = Arc::clone(&service);
///
///     move || {
///         let message = service.compose(b"hello").unwrap();
///         service.send(receiver_id, message).unwrap();
///     }
/// });
///
/// let message = service.recv(receiver_id).unwrap();
/// assert_eq!(service.load(&message).unwrap().payload(), b"hello");
/// service.delete_message(message);
///
/// sender.join().unwrap();
/// ```
#[derive(Debug)]
pub struct MessagingService {
    /// Stamped into every handle this service issues.
    id: u64,
    pool: BlockPool,
    pool_capacity: NonZero<usize>,
    registry: ClientRegistry,
    shut_down: AtomicBool,
}

impl MessagingService {
    /// Creates a service with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a service with custom settings.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::num::NonZero;
    ///
    /// use courier::MessagingService;
    ///
    /// let service = MessagingService::builder()
    ///     .pool_capacity(NonZero::new(4).unwrap())
    ///     .build();
    ///
    /// assert_eq!(service.pool_capacity().get(), 4);
    /// ```
    pub fn builder() -> MessagingServiceBuilder {
        MessagingServiceBuilder::new()
    }

    pub(crate) fn from_builder(pool_capacity: NonZero<usize>) -> Self {
        Self {
            id: NEXT_SERVICE_ID.fetch_add(1, Ordering::Relaxed),
            pool: BlockPool::new(),
            pool_capacity,
            registry: ClientRegistry::new(),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Allocates an empty message from the pool.
    ///
    /// The first call allocates the pool itself.
    ///
    /// # Errors
    ///
    /// * [`MessagingError::ShutDown`] if the service has been shut down.
    /// * [`MessagingError::Pool`] if every message in the pool is in use or the pool cannot be
    ///   allocated.
    pub fn new_message(&self) -> Result<MessageHandle> {
        if self.is_shut_down() {
            return Err(MessagingError::ShutDown);
        }

        self.ensure_pool()?;

        let address = self.pool.alloc()?;

        // Blocks are recycled, so clear out whatever the previous message left behind.
        self.pool.write(address, 0, &Message::EMPTY.encode())?;

        trace!(%address, "message allocated");

        Ok(MessageHandle::new(self.id, address))
    }

    /// Allocates a message and fills it with `payload`.
    ///
    /// # Errors
    ///
    /// * [`MessagingError::InvalidArgument`] if `payload` is longer than
    ///   [`MESSAGE_CAPACITY`][crate::MESSAGE_CAPACITY] bytes. No message is allocated.
    /// * Any error of [`new_message()`][Self::new_message].
    pub fn compose(&self, payload: &[u8]) -> Result<MessageHandle> {
        let contents = Message::new(payload)?;
        let handle = self.new_message()?;

        match self.store(&handle, &contents) {
            Ok(()) => Ok(handle),
            Err(error) => {
                self.delete_message(handle);
                Err(error)
            }
        }
    }

    /// Returns a message to the pool.
    ///
    /// Failures are logged and otherwise ignored, as there is nothing the caller can do about a
    /// message that cannot be returned. A handle issued by another service is never released
    /// here; its block stays allocated in the service that issued it.
    pub fn delete_message(&self, message: MessageHandle) {
        let address = message.address();

        if let Err(error) = self.check_issued_here(&message) {
            warn!(%address, %error, "refusing to delete message");
            return;
        }

        match self.pool.release(address) {
            Ok(()) => trace!(%address, "message deleted"),
            Err(error) => warn!(%address, %error, "failed to delete message"),
        }
    }

    /// Overwrites the contents of a message.
    ///
    /// # Errors
    ///
    /// * [`MessagingError::ForeignMessage`] if the handle was issued by another service.
    /// * [`MessagingError::Pool`] if the handle does not refer to an allocated message.
    pub fn store(&self, message: &MessageHandle, contents: &Message) -> Result<()> {
        self.check_issued_here(message)?;
        self.pool.write(message.address(), 0, &contents.encode())?;
        Ok(())
    }

    /// Reads the contents of a message.
    ///
    /// # Errors
    ///
    /// * [`MessagingError::ForeignMessage`] if the handle was issued by another service.
    /// * [`MessagingError::Pool`] if the handle does not refer to an allocated message.
    pub fn load(&self, message: &MessageHandle) -> Result<Message> {
        self.check_issued_here(message)?;

        let mut bytes = [0_u8; MESSAGE_SIZE];
        self.pool.read(message.address(), 0, &mut bytes)?;

        Ok(Message::decode(&bytes))
    }

    /// Binds the calling thread to `client_id`, so that messages can be sent to it before the
    /// thread first calls [`recv()`][Self::recv].
    ///
    /// # Errors
    ///
    /// * [`MessagingError::ShutDown`] if the service has been shut down.
    /// * [`MessagingError::AlreadyRegistered`] if the calling thread is already bound to
    ///   `client_id`.
    pub fn register(&self, client_id: ClientId) -> Result<()> {
        if self.is_shut_down() {
            return Err(MessagingError::ShutDown);
        }

        self.registry.register(client_id, thread::current().id())
    }

    /// Moves a message into the mailbox of `destination` and wakes its receiver.
    ///
    /// Never blocks. If the mailbox still holds a message that has not been received, that
    /// message is deleted and replaced.
    ///
    /// # Errors
    ///
    /// The message is handed back inside the [`SendError`] if:
    ///
    /// * the service has been shut down ([`MessagingError::ShutDown`]).
    /// * the handle was issued by another service ([`MessagingError::ForeignMessage`]).
    /// * no receiver has registered under `destination` ([`MessagingError::ClientNotFound`]).
    pub fn send(&self, destination: ClientId, message: MessageHandle) -> Result<(), SendError> {
        if let Err(reason) = self.check_issued_here(&message) {
            return Err(SendError::new(reason, message));
        }

        let address = message.address();

        let displaced = self
            .registry
            .deliver(destination, message)
            .inspect_err(|error| {
                warn!(%destination, %address, reason = %error.reason(), "message not sent");
            })?;

        trace!(%destination, %address, "message sent");

        if let Some(displaced) = displaced {
            warn!(
                %destination,
                address = %displaced.address(),
                "unreceived message replaced by a newer one"
            );

            self.delete_message(displaced);
        }

        Ok(())
    }

    /// Waits for a message addressed to `receiver`.
    ///
    /// If no thread has registered under `receiver` yet, the calling thread is registered first.
    ///
    /// # Errors
    ///
    /// * [`MessagingError::ShutDown`] if the service is or becomes shut down.
    /// * [`MessagingError::Reregistered`] if another thread registers under `receiver` while
    ///   this call is waiting.
    pub fn recv(&self, receiver: ClientId) -> Result<MessageHandle> {
        self.receive(receiver, None)
    }

    /// Waits at most `timeout` for a message addressed to `receiver`.
    ///
    /// # Errors
    ///
    /// * [`MessagingError::TimedOut`] if no message arrives in time.
    /// * Any error of [`recv()`][Self::recv].
    pub fn recv_timeout(&self, receiver: ClientId, timeout: Duration) -> Result<MessageHandle> {
        // A deadline beyond what `Instant` can represent is as good as none.
        let deadline = Instant::now().checked_add(timeout);

        self.receive(receiver, deadline)
    }

    fn receive(&self, receiver: ClientId, deadline: Option<Instant>) -> Result<MessageHandle> {
        if self.is_shut_down() {
            return Err(MessagingError::ShutDown);
        }

        let control = self
            .registry
            .find_or_register(receiver, thread::current().id());

        let message = control.receive(deadline).map_err(|error| match error {
            WaitError::TimedOut => MessagingError::TimedOut {
                client_id: receiver,
            },
            WaitError::Cancelled if self.is_shut_down() => MessagingError::ShutDown,
            WaitError::Cancelled => MessagingError::Reregistered {
                client_id: receiver,
            },
        })?;

        debug_assert_eq!(
            message.service(),
            self.id,
            "only handles issued here pass send() into a mailbox"
        );

        trace!(%receiver, address = %message.address(), "message received");

        Ok(message)
    }

    /// Shuts the service down.
    ///
    /// Every thread waiting in [`recv()`][Self::recv] is woken with
    /// [`MessagingError::ShutDown`] and all further sends and receives fail the same way. Messages
    /// still waiting in mailboxes are deleted. Messages held by callers stay valid and can still be
    /// read and deleted.
    ///
    /// Calling this more than once has no further effect.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }

        self.registry.close();

        let undelivered = self.registry.drain_mailboxes();
        let undelivered_count = undelivered.len();

        for message in undelivered {
            self.delete_message(message);
        }

        debug!(undelivered_count, "messaging service shut down");
    }

    /// Whether [`shutdown()`][Self::shutdown] has been called.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// The registry of clients that can receive messages.
    #[must_use]
    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    /// The number of messages the pool holds.
    #[must_use]
    pub fn pool_capacity(&self) -> NonZero<usize> {
        self.pool_capacity
    }

    /// A snapshot of the message pool, e.g. for diagnostics.
    ///
    /// The pool reports itself as uninitialized until the first message is allocated.
    #[must_use]
    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stat()
    }

    fn check_issued_here(&self, message: &MessageHandle) -> Result<()> {
        if message.service() == self.id {
            Ok(())
        } else {
            Err(MessagingError::ForeignMessage {
                address: message.address(),
            })
        }
    }

    fn ensure_pool(&self) -> Result<()> {
        if self.pool.is_initialized() {
            return Ok(());
        }

        match self.pool.init(self.pool_capacity.get(), MESSAGE_SIZE) {
            Ok(()) => {
                debug!(capacity = self.pool_capacity.get(), "message pool allocated");
                Ok(())
            }
            // Another thread got there first.
            Err(PoolError::AlreadyInitialized) => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

impl Default for MessagingService {
    fn default() -> Self {
        Self::new()
    }
}
