use super::{Promise, Shared};
use crate::error::{Error, Result};

use std::fmt;
use std::sync::Arc;

/// The producer view of a [`Promise`].
///
/// A `Completer` is the only party allowed to move its promise out of the
/// pending state, and it may do so exactly once. Completing twice is a
/// protocol violation:
///
/// - [`try_succeed`](Self::try_succeed) and [`try_fail`](Self::try_fail)
///   report it as [`Error::AlreadyCompleted`],
/// - [`succeed`](Self::succeed) and [`fail`](Self::fail) panic in debug
///   builds and log it in release builds.
pub struct Completer<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Completer<T> {
    /// Creates a completer and its pending promise.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::new()),
        }
    }

    /// Returns a consumer handle to the paired promise.
    pub fn promise(&self) -> Promise<T> {
        Promise {
            shared: self.shared.clone(),
        }
    }

    /// Returns `true` once the paired promise is completed.
    pub fn is_done(&self) -> bool {
        self.shared.outcome().is_some()
    }

    /// Fulfills the promise with `value`.
    ///
    /// The value is stored before any callback runs, then the success
    /// callback and the always callback are invoked in that order.
    pub fn try_succeed(&self, value: T) -> Result<()> {
        self.shared.complete(Ok(value))
    }

    /// Fails the promise with `error`.
    ///
    /// The error callback runs first, then the always callback.
    pub fn try_fail(&self, error: Error) -> Result<()> {
        self.shared.complete(Err(error))
    }

    /// Fulfills the promise, treating a second completion as a protocol
    /// violation.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the promise is already completed.
    #[track_caller]
    pub fn succeed(&self, value: T) {
        if let Err(err) = self.try_succeed(value) {
            violation(err);
        }
    }

    /// Fails the promise, treating a second completion as a protocol
    /// violation.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the promise is already completed.
    #[track_caller]
    pub fn fail(&self, error: Error) {
        if let Err(err) = self.try_fail(error) {
            violation(err);
        }
    }

    /// Fails the promise with `error`, or with [`Error::NoReason`] when no
    /// error is given.
    pub fn fail_opt(&self, error: Option<Error>) {
        self.fail(error.unwrap_or(Error::NoReason));
    }

    /// Fails the promise with a formatted [`Error::Message`].
    ///
    /// ```rust,ignore
    /// completer.fail_fmt(format_args!("asset {name} missing"));
    /// ```
    pub fn fail_fmt(&self, args: fmt::Arguments<'_>) {
        self.fail(Error::msg(args));
    }
}

impl<T> Default for Completer<T> {
    /// Same as [`Completer::new`].
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Completer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completer")
            .field("done", &self.is_done())
            .finish()
    }
}

#[track_caller]
fn violation(err: Error) {
    if cfg!(debug_assertions) {
        panic!("promise protocol violation: {err}");
    }

    tracing::error!(label = err.as_label(), "ignored second completion of a promise");
}
