//! The host side of task stepping.
//!
//! Drivers do not schedule themselves. A host invokes their step function
//! on some future tick, again and again, until the step function reports
//! that it is done. This module defines that narrow contract:
//!
//! - [`Tick`] is what one step reports back,
//! - [`Step`] is anything the host can step,
//! - [`Host`] starts a step function and returns a [`TaskHandle`],
//! - [`Suspension`] is the opaque signal a step may park on.
//!
//! [`Scheduler`] is a single-threaded reference host driven by explicit
//! calls to [`Scheduler::tick`].

mod builder;
mod handle;
mod scheduler;
mod suspension;

pub use builder::SchedulerBuilder;
pub use handle::{TaskHandle, TaskId};
pub use scheduler::Scheduler;
pub use suspension::{Signal, Suspension};

/// Result of one step.
#[derive(Debug, Clone)]
pub enum Tick {
    /// More work remains.
    ///
    /// With `None` the step runs again on the next tick. With a suspension
    /// the host runs it again once the suspension reports ready.
    Yield(Option<Suspension>),

    /// The step function has finished and must not be invoked again.
    Done,
}

impl Tick {
    /// Returns `true` for [`Tick::Done`].
    pub fn is_done(&self) -> bool {
        matches!(self, Tick::Done)
    }
}

/// A step function the host invokes until it reports [`Tick::Done`].
pub trait Step {
    /// Runs one step.
    fn step(&mut self) -> Tick;
}

impl<F> Step for F
where
    F: FnMut() -> Tick,
{
    fn step(&mut self) -> Tick {
        self()
    }
}

/// The scheduler a driver runs on.
pub trait Host {
    /// Starts `step` and returns a handle identifying the in-flight task.
    ///
    /// The host keeps invoking the step function, honoring the suspension
    /// returned by each step, until it returns [`Tick::Done`].
    fn start(&mut self, step: Box<dyn Step>) -> TaskHandle;
}
