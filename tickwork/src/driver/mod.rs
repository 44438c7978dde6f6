//! Task drivers.
//!
//! A [`Driver`] adapts one cooperative [`Routine`] into the completion of
//! one [`Completer`](crate::Completer). The host steps the driver; the
//! driver advances the routine, interprets what it yields, contains its
//! faults, and forwards exactly one outcome into the completer.
//!
//! [`Forever`] supervises routines that are expected to run indefinitely
//! and reports any stop as a failure.

mod forever;
mod wrap;
mod yielded;

pub mod routine;

pub use forever::Forever;
pub use routine::{Resume, Routine};
pub use wrap::Driver;
pub use yielded::{AnyValue, Awaitable, Yield};
