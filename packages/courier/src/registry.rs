use std::iter;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::ThreadId;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::semaphore::{Semaphore, WaitError};
use crate::{ClientId, MAX_CLIENTS, MessageHandle, MessagingError, Result, SendError};

/// The control block of one registered client: the thread it is bound to, the semaphore its
/// receiver waits on and the single-slot mailbox that holds the pending message.
///
/// Control blocks are shared: the registry, any number of senders and the receiver may all hold
/// one at the same time.
#[derive(Debug)]
pub struct ClientControl {
    client_id: ClientId,
    owner: ThreadId,
    semaphore: Semaphore,
    mailbox: Mutex<Option<MessageHandle>>,
}

impl ClientControl {
    fn new(client_id: ClientId, owner: ThreadId) -> Self {
        Self {
            client_id,
            owner,
            semaphore: Semaphore::new(),
            mailbox: Mutex::new(None),
        }
    }

    /// The identifier this control block is registered under.
    #[must_use]
    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    /// The thread that registered this control block.
    #[must_use]
    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    /// Number of wake-up signals waiting to be consumed by the receiver.
    ///
    /// This is zero or one: a delivery onto an occupied mailbox replaces the message without
    /// signaling again.
    #[must_use]
    pub fn pending_signals(&self) -> usize {
        self.semaphore.available()
    }

    /// Whether a message is waiting in the mailbox.
    #[must_use]
    pub fn has_pending_message(&self) -> bool {
        self.mailbox.lock().is_some()
    }

    /// Places a message in the mailbox and signals the receiver.
    ///
    /// If an unconsumed message was already in the mailbox it is replaced and returned. The
    /// receiver was already signaled for it, so no second signal is posted.
    pub(crate) fn deliver(&self, message: MessageHandle) -> Option<MessageHandle> {
        let mut mailbox = self.mailbox.lock();
        let displaced = mailbox.replace(message);

        if displaced.is_none() {
            self.semaphore.post();
        }

        displaced
    }

    /// Waits for a signal and takes the message out of the mailbox.
    pub(crate) fn receive(&self, deadline: Option<Instant>) -> Result<MessageHandle, WaitError> {
        loop {
            self.semaphore.wait(deadline)?;

            // A signal is only posted when the mailbox goes from empty to occupied, so the
            // mailbox is normally full here. If another thread waiting on the same control
            // block got to it first, wait for the next delivery.
            if let Some(message) = self.mailbox.lock().take() {
                return Ok(message);
            }
        }
    }

    fn cancel(&self) {
        self.semaphore.cancel();
    }

    fn take_pending(&self) -> Option<MessageHandle> {
        self.mailbox.lock().take()
    }
}

/// Maps client identifiers to their control blocks.
///
/// The table has one slot per possible [`ClientId`]. A slot starts out empty and is filled by the
/// first successful registration. Slots are never emptied again, though a registration by a
/// different thread replaces the control block.
///
/// Every slot has its own lock, which is held across the whole check-and-insert of a
/// registration, so concurrent registrations of the same identifier are serialized.
#[derive(Debug)]
pub struct ClientRegistry {
    slots: Box<[RwLock<Option<Arc<ClientControl>>>]>,

    /// Set on shutdown. Control blocks created afterwards start out cancelled.
    closed: AtomicBool,
}

impl ClientRegistry {
    /// Creates a registry with every slot empty.
    #[must_use]
    pub fn new() -> Self {
        let slots = iter::repeat_with(|| RwLock::new(None))
            .take(MAX_CLIENTS)
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            slots,
            closed: AtomicBool::new(false),
        }
    }

    /// Binds `client_id` to the thread `owner`, creating a fresh control block with no pending
    /// signals.
    ///
    /// If the identifier is currently bound to a different thread, the old control block is
    /// replaced. Any message pending in the old mailbox moves to the new one and is signaled
    /// again, and any thread still waiting on the old control block is woken with
    /// [`MessagingError::Reregistered`].
    ///
    /// # Errors
    ///
    /// Returns [`MessagingError::AlreadyRegistered`] if `client_id` is already bound to `owner`.
    pub fn register(&self, client_id: ClientId, owner: ThreadId) -> Result<()> {
        let mut slot = self.slot(client_id).write();

        if let Some(existing) = slot.as_ref() {
            if existing.owner == owner {
                return Err(MessagingError::AlreadyRegistered { client_id });
            }

            debug!(%client_id, ?owner, previous_owner = ?existing.owner, "client re-registered");
        } else {
            debug!(%client_id, ?owner, "client registered");
        }

        let control = Arc::new(ClientControl::new(client_id, owner));

        if let Some(previous) = slot.replace(Arc::clone(&control)) {
            if let Some(pending) = previous.take_pending() {
                let displaced = control.deliver(pending);
                debug_assert!(displaced.is_none(), "the new mailbox starts out empty");
            }

            previous.cancel();
        }

        self.cancel_if_closed(&control);

        Ok(())
    }

    /// Returns the control block registered under `client_id`, if any.
    #[must_use]
    pub fn find(&self, client_id: ClientId) -> Option<Arc<ClientControl>> {
        self.slot(client_id).read().clone()
    }

    /// Returns the identifier the thread `owner` is registered under, if any.
    ///
    /// If the thread is registered under several identifiers, the lowest is returned.
    #[must_use]
    pub fn find_by_thread(&self, owner: ThreadId) -> Option<ClientId> {
        ClientId::all().find(|client_id| {
            self.slot(*client_id)
                .read()
                .as_ref()
                .is_some_and(|control| control.owner == owner)
        })
    }

    /// Number of identifiers that have been registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.read().is_some())
            .count()
    }

    /// Whether no identifier has been registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the control block for `client_id`, registering `owner` under it if the slot is
    /// empty. The check and the insert happen under one lock.
    pub(crate) fn find_or_register(
        &self,
        client_id: ClientId,
        owner: ThreadId,
    ) -> Arc<ClientControl> {
        if let Some(existing) = self.find(client_id) {
            return existing;
        }

        let mut slot = self.slot(client_id).write();

        if let Some(existing) = slot.as_ref() {
            return Arc::clone(existing);
        }

        debug!(%client_id, ?owner, "client registered on first receive");

        let control = Arc::new(ClientControl::new(client_id, owner));
        *slot = Some(Arc::clone(&control));

        self.cancel_if_closed(&control);

        control
    }

    /// Places `message` in the mailbox of the control block currently registered under
    /// `client_id` and returns any unreceived message it displaced.
    ///
    /// The slot lock is held throughout, so the message cannot land in a control block that a
    /// concurrent registration has replaced or that shutdown has already drained.
    pub(crate) fn deliver(
        &self,
        client_id: ClientId,
        message: MessageHandle,
    ) -> Result<Option<MessageHandle>, SendError> {
        let slot = self.slot(client_id).read();

        if self.closed.load(Ordering::SeqCst) {
            return Err(SendError::new(MessagingError::ShutDown, message));
        }

        let Some(control) = slot.as_ref() else {
            return Err(SendError::new(
                MessagingError::ClientNotFound { client_id },
                message,
            ));
        };

        Ok(control.deliver(message))
    }

    /// Cancels every registered control block and every one created from now on.
    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);

        for slot in &self.slots {
            if let Some(control) = slot.read().as_ref() {
                control.cancel();
            }
        }
    }

    /// Takes every pending message out of every mailbox.
    ///
    /// Call after [`close()`][Self::close]. Each slot is locked exclusively, which waits out any
    /// delivery that checked the closed flag before it was set.
    pub(crate) fn drain_mailboxes(&self) -> Vec<MessageHandle> {
        self.slots
            .iter()
            .filter_map(|slot| slot.write().as_ref().and_then(|control| control.take_pending()))
            .collect()
    }

    // Called with the slot lock held. Either close() visits the slot after we release the lock,
    // or we observe the flag it set before visiting.
    fn cancel_if_closed(&self, control: &ClientControl) {
        if self.closed.load(Ordering::SeqCst) {
            control.cancel();
        }
    }

    fn slot(&self, client_id: ClientId) -> &RwLock<Option<Arc<ClientControl>>> {
        self.slots
            .get(client_id.index())
            .expect("the table has a slot for every valid client id")
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}
