use super::{Host, SchedulerBuilder, Step, TaskHandle, TaskId, Tick};
use crate::driver::{Driver, Routine};
use crate::error::{Error, Result};
use crate::promise::{Completer, Promise};
use crate::utils::Slab;

use std::fmt;

/// A single-threaded tick loop.
///
/// `Scheduler` is the reference [`Host`]. Each call to [`tick`](Self::tick)
/// visits every live task once:
///
/// - a task parked on a suspension that is not ready yet is skipped,
/// - otherwise its step function runs once,
/// - a task reporting [`Tick::Done`] is removed and its handle finished.
///
/// Tasks started during a tick are not visited before the next one. A
/// task nobody keeps ticking simply never completes; there is no other
/// form of cancellation.
pub struct Scheduler {
    /// Live tasks.
    tasks: Slab<Entry>,

    /// Number of ticks run so far; also the clock handed to signals.
    clock: u64,

    /// Identifier of the next task.
    next_id: u64,

    /// Tick budget for [`run_until_idle`](Self::run_until_idle).
    max_ticks: Option<usize>,
}

struct Entry {
    step: Box<dyn Step>,
    handle: TaskHandle,
}

impl Scheduler {
    /// Creates a scheduler with default configuration.
    pub fn new() -> Self {
        SchedulerBuilder::new().build()
    }

    /// Returns a builder to configure a scheduler.
    pub fn builder() -> SchedulerBuilder {
        SchedulerBuilder::new()
    }

    pub(crate) fn from_builder(builder: SchedulerBuilder) -> Self {
        Self {
            tasks: Slab::new(builder.capacity),
            clock: 0,
            next_id: 0,
            max_ticks: builder.max_ticks,
        }
    }

    /// Starts an untyped routine.
    ///
    /// The promise succeeds when the routine finishes.
    pub fn spawn<R>(&mut self, routine: R) -> (Promise<()>, TaskHandle)
    where
        R: Routine<Output = ()> + 'static,
    {
        let driver = Driver::wrap(Completer::new(), routine);
        let promise = driver.promise();

        (promise, self.start(Box::new(driver)))
    }

    /// Starts a typed routine.
    ///
    /// The promise succeeds with the value the routine yields as its result.
    pub fn spawn_typed<R>(&mut self, routine: R) -> (Promise<R::Output>, TaskHandle)
    where
        R: Routine + 'static,
        R::Output: 'static,
    {
        let driver = Driver::wrap_typed(Completer::new(), routine);
        let promise = driver.promise();

        (promise, self.start(Box::new(driver)))
    }

    /// Starts a routine that is expected to run forever.
    ///
    /// The promise only ever fails; see [`Forever`](crate::Forever).
    pub fn spawn_forever<R>(&mut self, routine: R) -> (Promise<()>, TaskHandle)
    where
        R: Routine<Output = ()> + 'static,
    {
        let forever = Driver::forever(Completer::new(), routine);
        let promise = forever.promise();

        (promise, self.start(Box::new(forever)))
    }

    /// Runs one tick and returns the number of tasks still alive.
    pub fn tick(&mut self) -> usize {
        let clock = self.clock;
        self.clock += 1;

        for key in self.tasks.keys() {
            let Some(entry) = self.tasks.get_mut(key) else {
                continue;
            };

            let parked = entry
                .handle
                .suspension()
                .is_some_and(|suspension| !suspension.is_ready(clock));
            if parked {
                continue;
            }

            match entry.step.step() {
                Tick::Yield(suspension) => entry.handle.publish(suspension),
                Tick::Done => {
                    if let Some(entry) = self.tasks.remove(key) {
                        entry.handle.finish();
                        tracing::debug!(task = %entry.handle.id(), clock, "task finished");
                    }
                }
            }
        }

        self.tasks.len()
    }

    /// Ticks until no task is left and returns the number of ticks run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Stalled`] if tasks are still alive once the
    /// configured tick budget is spent.
    pub fn run_until_idle(&mut self) -> Result<usize> {
        let mut ticks = 0;

        while !self.tasks.is_empty() {
            if let Some(max) = self.max_ticks.filter(|&max| ticks >= max) {
                tracing::debug!(active = self.tasks.len(), max, "tick budget exhausted");
                return Err(Error::Stalled { ticks: max });
            }

            self.tick();
            ticks += 1;
        }

        Ok(ticks)
    }

    /// Number of tasks still alive.
    pub fn active(&self) -> usize {
        self.tasks.len()
    }

    /// Number of ticks run so far.
    pub fn clock(&self) -> u64 {
        self.clock
    }
}

impl Host for Scheduler {
    fn start(&mut self, step: Box<dyn Step>) -> TaskHandle {
        let id = TaskId(self.next_id);
        self.next_id += 1;

        let handle = TaskHandle::new(id);
        self.tasks.insert(Entry {
            step,
            handle: handle.clone(),
        });

        tracing::debug!(task = %id, clock = self.clock, "task started");
        handle
    }
}

impl Default for Scheduler {
    /// Same as [`Scheduler::new`].
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("active", &self.tasks.len())
            .field("clock", &self.clock)
            .field("max_ticks", &self.max_ticks)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_step_functions_run_until_done() {
        let mut scheduler = Scheduler::new();
        let mut left = 3;

        let handle = scheduler.start(Box::new(move || {
            left -= 1;
            if left == 0 { Tick::Done } else { Tick::Yield(None) }
        }));

        assert_eq!(scheduler.tick(), 1);
        assert_eq!(scheduler.tick(), 1);
        assert!(!handle.is_finished());
        assert_eq!(scheduler.tick(), 0);
        assert!(handle.is_finished());
    }

    #[test]
    fn task_ids_are_unique() {
        let mut scheduler = Scheduler::new();

        let a = scheduler.start(Box::new(|| Tick::Done));
        let b = scheduler.start(Box::new(|| Tick::Done));

        assert_ne!(a.id(), b.id());
        assert_eq!(scheduler.active(), 2);
        assert_eq!(scheduler.run_until_idle().unwrap(), 1);
    }
}
