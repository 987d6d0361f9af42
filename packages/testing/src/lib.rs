#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))] // This is all test code, no need to test it.

//! Private helpers for testing and examples in the block pool and courier packages.
//!
//! Most tests in the workspace involve threads that block on each other. A bug in those tests
//! tends to show up as a hang rather than a failure, so everything here is about turning hangs
//! into failures.

use std::sync::mpsc;
use std::{env, panic, thread};
use std::time::{Duration, Instant};

/// How long a test may run before the watchdog declares it hung.
///
/// Miri is dramatically slower for thread synchronization, so it gets more time.
#[must_use]
pub fn default_timeout() -> Duration {
    if cfg!(miri) {
        Duration::from_secs(60)
    } else {
        Duration::from_secs(10)
    }
}

/// Runs a test on a separate thread and fails it if it does not finish within
/// [`default_timeout()`].
///
/// When the `MUTATION_TESTING` environment variable is set to "1", the watchdog is disabled and
/// the test function is executed directly so mutation testing can detect hanging mutations.
///
/// # Panics
///
/// Panics if the test exceeds the timeout. Panics inside the test are propagated.
///
/// # Example
///
/// ```rust
/// use testing::with_watchdog;
///
/// let answer = with_watchdog(|| 2 + 2);
/// assert_eq!(answer, 4);
/// ```
pub fn with_watchdog<F, R>(test_fn: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    with_watchdog_timeout(default_timeout(), test_fn)
}

/// Same as [`with_watchdog()`] but with an explicit timeout.
///
/// # Panics
///
/// Panics if the test exceeds the timeout. Panics inside the test are propagated.
pub fn with_watchdog_timeout<F, R>(timeout: Duration, test_fn: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    if env::var("MUTATION_TESTING").as_deref() == Ok("1") {
        return test_fn();
    }

    let (tx, rx) = mpsc::channel();

    let test_handle = thread::spawn(move || {
        let result = test_fn();
        // If this fails, the watchdog has already given up on us.
        drop(tx.send(result));
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => {
            test_handle.join().expect("test thread should not panic");
            result
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            panic!("test exceeded the {timeout:?} watchdog timeout");
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => match test_handle.join() {
            Ok(()) => panic!("test thread disconnected unexpectedly"),
            Err(payload) => panic::resume_unwind(payload),
        },
    }
}

/// Polls `condition` until it returns `true`, sleeping briefly between attempts.
///
/// Use this to wait for another thread to reach a state that is observable but not signaled,
/// such as a receiver having registered itself before it starts blocking.
///
/// # Panics
///
/// Panics if the condition is still false after [`default_timeout()`].
pub fn wait_until(description: &str, mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now()
        .checked_add(default_timeout())
        .expect("deadline is not far enough in the future to overflow");

    while !condition() {
        assert!(
            Instant::now() < deadline,
            "timed out waiting until {description}"
        );

        thread::sleep(Duration::from_millis(1));
    }
}
