//! Single-assignment promises.
//!
//! A [`Promise`] is the consumer view of a result that becomes available
//! exactly once. The paired [`Completer`] is the only way to move it out of
//! the pending state. Both views point at the same shared state:
//!
//! - the outcome, written once and immutable afterwards,
//! - one success, one error and one always callback slot,
//! - the wakers of async tasks awaiting the promise.
//!
//! Callbacks registered after completion run synchronously, before the
//! registration call returns. A callback panicking while the completion is
//! flushed is logged; the remaining callbacks and wakers still run.

mod callbacks;
mod completer;
mod wait;

pub use completer::Completer;
pub use wait::{NotYet, Wait};

use callbacks::Callbacks;

use crate::error::Error;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::task::Waker;

/// State shared between a [`Promise`] and its [`Completer`].
pub(crate) struct Shared<T> {
    /// Final outcome, set exactly once.
    outcome: OnceLock<Result<T, Error>>,

    /// Pending callbacks. Emptied at completion.
    callbacks: Mutex<Callbacks<T>>,

    /// Wakers of async tasks polling the promise.
    wakers: Mutex<Vec<Waker>>,
}

/// Locks a mutex, recovering the data if a previous holder panicked.
///
/// Callbacks never run while a lock is held, so a poisoned lock can only
/// come from a panic outside of user code and the data is still consistent.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T> Shared<T> {
    fn new() -> Self {
        Self {
            outcome: OnceLock::new(),
            callbacks: Mutex::new(Callbacks::new()),
            wakers: Mutex::new(Vec::new()),
        }
    }

    /// Stores the outcome and flushes callbacks and wakers.
    ///
    /// Returns [`Error::AlreadyCompleted`] if an outcome was already set; in
    /// that case `outcome` is dropped and nothing is invoked.
    pub(crate) fn complete(&self, outcome: Result<T, Error>) -> Result<(), Error> {
        let mut first = false;
        let stored = self.outcome.get_or_init(|| {
            first = true;
            outcome
        });

        if !first {
            return Err(Error::AlreadyCompleted);
        }

        // Swap-then-call: every slot and the waker list are emptied before
        // anything runs, so a callback that registers again is handled by
        // the completed path.
        let (first, always) = {
            let mut slots = lock(&self.callbacks);
            (slots.take_first(stored), slots.always.take())
        };
        let wakers = std::mem::take(&mut *lock(&self.wakers));

        if let Some(first) = first {
            contain(first.kind(), || first.call(stored));
        }
        if let Some(always) = always {
            contain("always", always);
        }

        for waker in wakers {
            waker.wake();
        }

        Ok(())
    }

    pub(crate) fn outcome(&self) -> Option<&Result<T, Error>> {
        self.outcome.get()
    }
}

/// Runs a callback flushed at completion, containing its panic.
///
/// A panicking consumer must not stop the remaining callbacks and wakers,
/// nor unwind into the completer's caller.
fn contain(kind: &'static str, callback: impl FnOnce()) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(callback)) {
        let error = Error::from_panic(payload);
        tracing::error!(callback = kind, %error, "promise callback panicked");
    }
}

/// The consumer view of a single-assignment result.
///
/// A `Promise` is created together with its [`Completer`] through
/// [`Completer::new`]. It can be cloned freely; every clone observes the
/// same outcome.
///
/// The untyped flavour is `Promise<()>`.
pub struct Promise<T> {
    pub(crate) shared: Arc<Shared<T>>,
}

impl<T> Promise<T> {
    /// Returns `true` once the paired completer succeeded or failed.
    pub fn is_done(&self) -> bool {
        self.shared.outcome().is_some()
    }

    /// Returns `true` if the promise is done and holds no error.
    ///
    /// A pending promise reports `false`.
    pub fn succeeded(&self) -> bool {
        matches!(self.shared.outcome(), Some(Ok(_)))
    }

    /// Returns `true` if the promise is done and holds an error.
    ///
    /// A pending promise reports `false`.
    pub fn failed(&self) -> bool {
        matches!(self.shared.outcome(), Some(Err(_)))
    }

    /// The error of a failed promise.
    pub fn error(&self) -> Option<&Error> {
        self.shared.outcome().and_then(|o| o.as_ref().err())
    }

    /// The value of a fulfilled promise.
    pub fn value(&self) -> Option<&T> {
        self.shared.outcome().and_then(|o| o.as_ref().ok())
    }

    /// The full outcome, once done.
    pub fn outcome(&self) -> Option<&Result<T, Error>> {
        self.shared.outcome()
    }

    /// Registers the success callback.
    ///
    /// If the promise is still pending the callback is stored, replacing any
    /// previous success callback. If it already succeeded the callback runs
    /// immediately with the value; if it failed the callback is dropped.
    pub fn on_success<F>(&self, f: F) -> &Self
    where
        F: FnOnce(&T) + Send + 'static,
    {
        {
            let mut slots = lock(&self.shared.callbacks);
            if self.shared.outcome().is_none() {
                slots.success = Some(Box::new(f));
                return self;
            }
        }

        if let Some(Ok(value)) = self.shared.outcome() {
            f(value);
        }
        self
    }

    /// Registers the error callback.
    ///
    /// Mirrors [`on_success`](Self::on_success) for the failure path.
    pub fn on_error<F>(&self, f: F) -> &Self
    where
        F: FnOnce(&Error) + Send + 'static,
    {
        {
            let mut slots = lock(&self.shared.callbacks);
            if self.shared.outcome().is_none() {
                slots.error = Some(Box::new(f));
                return self;
            }
        }

        if let Some(Err(error)) = self.shared.outcome() {
            f(error);
        }
        self
    }

    /// Registers the always callback.
    ///
    /// It runs once the promise is done, after the success or error
    /// callback, whichever way it completed. On a completed promise it runs
    /// immediately.
    pub fn on_always<F>(&self, f: F) -> &Self
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut slots = lock(&self.shared.callbacks);
            if self.shared.outcome().is_none() {
                slots.always = Some(Box::new(f));
                return self;
            }
        }

        f();
        self
    }

    /// Returns a lazy sequence yielding [`NotYet`] until the promise is done.
    ///
    /// Every call starts a fresh sequence.
    pub fn wait(&self) -> Wait<'_, T> {
        Wait::new(self)
    }
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shared.outcome() {
            None => f.write_str("Promise(Pending)"),
            Some(Ok(value)) => write!(f, "Promise(Fulfilled({value:?}))"),
            Some(Err(error)) => write!(f, "Promise(Failed({error}))"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn outcome_is_written_once() {
        let shared = Shared::new();

        assert!(shared.complete(Ok(1)).is_ok());
        assert!(matches!(
            shared.complete(Ok(2)),
            Err(Error::AlreadyCompleted)
        ));
        assert!(matches!(shared.outcome(), Some(Ok(1))));
    }

    #[test]
    fn callback_registering_again_is_not_reinvoked() {
        let completer = Completer::<u32>::new();
        let promise = completer.promise();
        let calls = Arc::new(AtomicUsize::new(0));

        let inner_promise = promise.clone();
        let counter = calls.clone();
        promise.on_success(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);

            let counter = counter.clone();
            inner_promise.on_success(move |_| {
                counter.fetch_add(10, Ordering::SeqCst);
            });
        });

        completer.succeed(5);

        assert_eq!(calls.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn debug_shows_state() {
        let completer = Completer::<u8>::new();
        let promise = completer.promise();
        assert_eq!(format!("{promise:?}"), "Promise(Pending)");

        completer.succeed(3);
        assert_eq!(format!("{promise:?}"), "Promise(Fulfilled(3))");
    }
}
