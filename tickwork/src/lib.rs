//! # Tickwork
//!
//! **Tickwork** provides single-assignment promises and a driver that turns
//! cooperative, tick-stepped routines into them. It is the task composition
//! layer for hosts that run work "on the next frame" or "on the next tick"
//! rather than on an async executor.
//!
//! It offers:
//!
//! - **Promises**: a [`Promise`] completed exactly once by its [`Completer`],
//!   with success, error and always callbacks that fire at most once
//! - **Drivers**: a [`Driver`] steps a [`Routine`], interprets what it
//!   yields (a suspension, a nested task, a promise, a result or an error),
//!   contains its faults and completes a promise with the outcome
//! - **Supervision**: [`Forever`] reports any stop of a routine that is
//!   meant to run indefinitely as a failure
//! - **A reference host**: [`Scheduler`], a single-threaded tick loop
//!
//! Stepping is cooperative and single-threaded; promises themselves are
//! `Send + Sync` and can be awaited from async code.
//!
//! ## Quick Start
//!
//! ```rust
//! use tickwork::{Scheduler, Yield, routine};
//!
//! let mut scheduler = Scheduler::new();
//!
//! let (promise, _handle) = scheduler.spawn_typed(routine::from_iter([
//!     Yield::NotYet,
//!     Yield::NotYet,
//!     Yield::Return(42),
//! ]));
//!
//! promise.on_success(|value| println!("got {value}"));
//!
//! scheduler.run_until_idle().unwrap();
//! assert_eq!(promise.value(), Some(&42));
//! ```
//!
//! ## Modules
//!
//! - [`routine`]: Building routines from closures and iterators
//! - [`error`]: The error type observed through promises

mod driver;
mod host;
mod promise;
mod utils;

pub mod error;

pub use driver::routine;
pub use driver::{AnyValue, Awaitable, Driver, Forever, Resume, Routine, Yield};
pub use error::{Error, Result};
pub use host::{
    Host, Scheduler, SchedulerBuilder, Signal, Step, Suspension, TaskHandle, TaskId, Tick,
};
pub use promise::{Completer, NotYet, Promise, Wait};
