use super::{Driver, Routine};
use crate::error::Error;
use crate::host::{Step, Suspension, Tick};
use crate::promise::{Completer, Promise};

use std::fmt;

/// Supervises a routine that must never stop.
///
/// `Forever` steps a single-pass [`Driver`] that completes a private
/// promise. When that inner driver finishes, the outer promise fails:
///
/// - with the inner error if the routine faulted or failed,
/// - with [`Error::LoopCancelled`] if the routine exited cleanly.
///
/// The outer promise never succeeds. Consumers decide from the error
/// callback whether to restart the routine.
pub struct Forever<R: Routine<Output = ()>> {
    inner: Driver<R>,
    completer: Completer<()>,
}

impl<R: Routine<Output = ()>> Forever<R> {
    pub(crate) fn new(completer: Completer<()>, routine: R) -> Self {
        Self {
            inner: Driver::wrap(Completer::new(), routine),
            completer,
        }
    }

    /// Returns the supervised promise.
    pub fn promise(&self) -> Promise<()> {
        self.completer.promise()
    }

    /// The suspension the inner driver handed to the host on its latest step.
    pub fn suspension(&self) -> Option<&Suspension> {
        self.inner.suspension()
    }

    /// Returns `true` once the supervised promise has failed.
    pub fn is_finished(&self) -> bool {
        self.completer.is_done()
    }

    /// The single-pass driver being supervised.
    pub fn inner(&self) -> &Driver<R> {
        &self.inner
    }
}

impl<R: Routine<Output = ()>> Step for Forever<R> {
    fn step(&mut self) -> Tick {
        if self.completer.is_done() {
            return Tick::Done;
        }

        match self.inner.step() {
            Tick::Yield(suspension) => Tick::Yield(suspension),
            Tick::Done => {
                let error = self
                    .inner
                    .promise()
                    .error()
                    .cloned()
                    .unwrap_or(Error::LoopCancelled);

                tracing::debug!(
                    advancements = self.inner.advancements(),
                    label = error.as_label(),
                    "forever routine stopped"
                );
                self.completer.fail(error);

                Tick::Done
            }
        }
    }
}

impl<R: Routine<Output = ()>> fmt::Debug for Forever<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Forever")
            .field("inner", &self.inner)
            .field("finished", &self.is_finished())
            .finish()
    }
}
