use super::forever::Forever;
use super::{Awaitable, Resume, Routine, Yield};
use crate::error::{Error, Result};
use crate::host::{Step, Suspension, Tick};
use crate::promise::{Completer, Promise};

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// Drives one [`Routine`] and completes one [`Completer`] with its outcome.
///
/// The driver is stepped by a host. Each step advances the routine until
/// it has to suspend or terminates, then reports a [`Tick`]:
///
/// - a fault while advancing (an `Err` or a panic) fails the promise,
/// - a finished routine succeeds for untyped drivers and fails with
///   [`Error::NoResult`] for typed drivers,
/// - yielded values are handled as described on [`Yield`].
///
/// Once the promise is completed the driver drops the routine and every
/// further step reports [`Tick::Done`].
pub struct Driver<R: Routine> {
    /// The routine, until it finishes or faults.
    routine: Option<R>,

    /// Producer side of the promise this driver completes.
    completer: Completer<R::Output>,

    /// Suspension handed to the host on the latest step.
    suspension: Option<Suspension>,

    /// Promise being busy-polled before the routine resumes.
    awaiting: Option<Awaitable>,

    /// Outcome used when the routine finishes without a terminal value.
    on_finished: fn() -> Result<R::Output>,

    /// Number of times the routine was advanced.
    advancements: usize,
}

impl<R> Driver<R>
where
    R: Routine<Output = ()>,
{
    /// Wraps an untyped routine.
    ///
    /// The promise succeeds when the routine finishes.
    pub fn wrap(completer: Completer<()>, routine: R) -> Self {
        Self::with_finish(completer, routine, || Ok(()))
    }

    /// Wraps a routine that is expected to run indefinitely.
    ///
    /// See [`Forever`].
    pub fn forever(completer: Completer<()>, routine: R) -> Forever<R> {
        Forever::new(completer, routine)
    }
}

impl<R: Routine> Driver<R> {
    /// Wraps a typed routine.
    ///
    /// The routine must end by yielding its result; finishing without one
    /// fails the promise with [`Error::NoResult`].
    pub fn wrap_typed(completer: Completer<R::Output>, routine: R) -> Self {
        Self::with_finish(completer, routine, || Err(Error::NoResult))
    }

    fn with_finish(
        completer: Completer<R::Output>,
        routine: R,
        on_finished: fn() -> Result<R::Output>,
    ) -> Self {
        Self {
            routine: Some(routine),
            completer,
            suspension: None,
            awaiting: None,
            on_finished,
            advancements: 0,
        }
    }

    /// Returns the promise this driver completes.
    pub fn promise(&self) -> Promise<R::Output> {
        self.completer.promise()
    }

    /// The suspension handed to the host on the latest step.
    ///
    /// Outer drivers and consumers can suspend on it directly instead of
    /// polling. It is cleared once the driver finishes.
    pub fn suspension(&self) -> Option<&Suspension> {
        self.suspension.as_ref()
    }

    /// Returns `true` once the routine finished or faulted.
    pub fn is_finished(&self) -> bool {
        self.routine.is_none()
    }

    /// Number of times the routine has been advanced so far.
    pub fn advancements(&self) -> usize {
        self.advancements
    }

    /// Completes the promise and releases the routine.
    fn finish(&mut self, outcome: Result<R::Output>) -> Tick {
        self.routine = None;
        self.suspension = None;
        self.awaiting = None;

        match outcome {
            Ok(value) => {
                tracing::debug!(advancements = self.advancements, "routine completed");
                self.completer.succeed(value);
            }
            Err(error) => {
                tracing::debug!(
                    advancements = self.advancements,
                    label = error.as_label(),
                    %error,
                    "routine failed"
                );
                self.completer.fail(error);
            }
        }

        Tick::Done
    }

    /// Parks the driver on `suspension` for the rest of this step.
    fn suspend(&mut self, suspension: Option<Suspension>) -> Tick {
        self.suspension = suspension.clone();
        Tick::Yield(suspension)
    }
}

impl<R> Step for Driver<R>
where
    R: Routine,
    R::Output: 'static,
{
    fn step(&mut self) -> Tick {
        if let Some(awaited) = &self.awaiting {
            if !awaited.is_done() {
                return Tick::Yield(None);
            }
            self.awaiting = None;
        }

        loop {
            let Some(routine) = self.routine.as_mut() else {
                return Tick::Done;
            };

            self.advancements += 1;
            let resumed = advance(routine);

            let yielded = match resumed {
                Ok(Resume::Yielded(yielded)) => yielded,
                Ok(Resume::Finished) => {
                    let outcome = (self.on_finished)();
                    return self.finish(outcome);
                }
                Err(error) => return self.finish(Err(error)),
            };

            tracing::trace!(
                advancements = self.advancements,
                kind = yielded.kind(),
                "routine yielded"
            );

            match yielded {
                Yield::NotYet => return self.suspend(None),
                Yield::Suspend(suspension) => return self.suspend(Some(suspension)),
                // Pass-through of the nested task's own suspension; the
                // routine itself checks whether the child is finished.
                Yield::Task(handle) => return self.suspend(handle.suspension()),
                Yield::Await(awaitable) => {
                    if awaitable.is_done() {
                        continue;
                    }
                    self.awaiting = Some(awaitable);
                    return self.suspend(None);
                }
                Yield::Return(value) => return self.finish(Ok(value)),
                Yield::Value(value) => {
                    let outcome = value.downcast::<R::Output>().map_err(|other| {
                        Error::UnknownYield {
                            type_name: other.type_name(),
                        }
                    });
                    return self.finish(outcome);
                }
                Yield::Fail(error) => return self.finish(Err(error)),
            }
        }
    }
}

/// Advances `routine` once, turning a panic into a fault.
fn advance<R: Routine>(routine: &mut R) -> Result<Resume<Yield<R::Output>>> {
    match panic::catch_unwind(AssertUnwindSafe(|| routine.resume())) {
        Ok(resumed) => resumed,
        Err(payload) => Err(Error::from_panic(payload)),
    }
}

impl<R: Routine> fmt::Debug for Driver<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("finished", &self.is_finished())
            .field("advancements", &self.advancements)
            .field("suspension", &self.suspension)
            .field("awaiting", &self.awaiting)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routine;

    #[test]
    fn finished_driver_keeps_reporting_done() {
        let completer = Completer::new();
        let mut driver = Driver::wrap(completer, routine::from_iter([Yield::NotYet]));

        assert!(!driver.step().is_done());
        assert!(driver.step().is_done());
        assert!(driver.step().is_done());
        assert_eq!(driver.advancements(), 2);
        assert!(driver.promise().succeeded());
    }

    #[test]
    fn suspension_is_published_then_cleared() {
        let signal = Suspension::ticks(2);
        let completer = Completer::new();
        let mut driver = Driver::wrap(
            completer,
            routine::from_iter([Yield::Suspend(signal.clone())]),
        );

        match driver.step() {
            Tick::Yield(Some(s)) => assert!(s.same(&signal)),
            other => panic!("expected pass-through suspension, got {other:?}"),
        }
        assert!(driver.suspension().is_some_and(|s| s.same(&signal)));

        assert!(driver.step().is_done());
        assert!(driver.suspension().is_none());
    }

    #[test]
    fn awaiting_a_completed_promise_does_not_suspend() {
        let done = Completer::<u8>::new();
        done.succeed(1);

        let completer = Completer::new();
        let mut driver = Driver::wrap_typed(
            completer,
            routine::from_iter([Yield::wait_for(&done.promise()), Yield::Return("ok")]),
        );

        assert!(driver.step().is_done());
        let promise = driver.promise();
        assert_eq!(promise.value(), Some(&"ok"));
        assert_eq!(driver.advancements(), 2);
    }
}
