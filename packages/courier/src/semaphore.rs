use std::time::Instant;

use parking_lot::{Condvar, Mutex};

/// A counting semaphore used to wake a receiver when a message is delivered to it.
///
/// [`post()`][Self::post] never blocks. [`wait()`][Self::wait] blocks until a permit is
/// available, an optional deadline passes or the semaphore is cancelled. Cancellation is
/// permanent and wakes every waiter; it is how a blocked receiver is released during shutdown.
///
/// A permit posted before a waiter arrives is never lost: the waiter consumes it immediately.
#[derive(Debug, Default)]
pub(crate) struct Semaphore {
    state: Mutex<SemaphoreState>,
    available: Condvar,
}

#[derive(Debug, Default)]
struct SemaphoreState {
    permits: usize,
    cancelled: bool,
}

/// Why a [`Semaphore::wait()`] returned without consuming a permit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum WaitError {
    TimedOut,
    Cancelled,
}

impl Semaphore {
    /// Creates a semaphore with no permits.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds a permit and wakes one waiter, if any.
    pub(crate) fn post(&self) {
        let mut state = self.state.lock();

        state.permits = state
            .permits
            .checked_add(1)
            .expect("more outstanding permits than there are addresses is not a realistic state");

        drop(state);
        self.available.notify_one();
    }

    /// Number of permits currently available.
    #[must_use]
    pub(crate) fn available(&self) -> usize {
        self.state.lock().permits
    }

    /// Whether the semaphore has been cancelled.
    #[must_use]
    pub(crate) fn is_cancelled(&self) -> bool {
        self.state.lock().cancelled
    }

    /// Permanently cancels the semaphore. Current and future waits fail immediately.
    pub(crate) fn cancel(&self) {
        self.state.lock().cancelled = true;
        self.available.notify_all();
    }

    /// Waits until a permit can be consumed, `deadline` passes or the semaphore is cancelled.
    ///
    /// Cancellation takes priority over available permits.
    pub(crate) fn wait(&self, deadline: Option<Instant>) -> Result<(), WaitError> {
        let mut state = self.state.lock();

        loop {
            if state.cancelled {
                return Err(WaitError::Cancelled);
            }

            if let Some(remaining) = state.permits.checked_sub(1) {
                state.permits = remaining;
                return Ok(());
            }

            match deadline {
                None => self.available.wait(&mut state),
                Some(deadline) => {
                    if self.available.wait_until(&mut state, deadline).timed_out()
                        && state.permits == 0
                        && !state.cancelled
                    {
                        return Err(WaitError::TimedOut);
                    }
                }
            }
        }
    }
}
