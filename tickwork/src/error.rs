//! Error types shared by promises, drivers and the reference scheduler.
//!
//! Every failure a consumer can observe travels through a single enum,
//! [`Error`], so error callbacks have one place to look regardless of
//! whether the fault came from the producing routine, from a misuse of the
//! driver, or from a forever task that stopped.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed producer fault, shared so the same fault can be observed by many
/// consumers without losing its identity.
pub type Fault = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// # Errors observed through a [`Promise`](crate::Promise).
///
/// `Error` is cheap to clone: producer faults are reference counted, so a
/// clone still points at the original fault object.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// A completer was asked to complete a promise that is already done.
    #[error("promise already completed")]
    AlreadyCompleted,

    /// A failure was reported without an error value.
    #[error("failed with no reason given")]
    NoReason,

    /// A failure described by a formatted message.
    #[error("{0}")]
    Message(String),

    /// A fault raised by the producing routine, kept as-is.
    #[error(transparent)]
    Routine(Fault),

    /// The routine panicked while being advanced.
    #[error("routine panicked: {0}")]
    Panicked(String),

    /// A typed routine finished without producing its result.
    #[error("routine completed without producing a result")]
    NoResult,

    /// A routine supervised forever stopped.
    #[error("forever loop cancelled unexpectedly")]
    LoopCancelled,

    /// A routine yielded a value the driver does not know how to handle.
    #[error("unknown yielded type `{type_name}`")]
    UnknownYield {
        /// Name of the offending type.
        type_name: &'static str,
    },

    /// The scheduler still had live tasks after its tick budget ran out.
    #[error("scheduler still busy after {ticks} ticks")]
    Stalled {
        /// The configured tick budget.
        ticks: usize,
    },
}

impl Error {
    /// Wraps an arbitrary error raised by a routine.
    pub fn routine<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Routine(Arc::new(error))
    }

    /// Builds an [`Error::Message`] from format arguments.
    pub fn msg(args: fmt::Arguments<'_>) -> Self {
        Error::Message(args.to_string())
    }

    /// Converts a panic payload into [`Error::Panicked`].
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };

        Error::Panicked(message)
    }

    /// Returns the producer fault as `E`, if this error wraps one of that type.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Error::Routine(fault) => fault.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Returns `true` if both errors wrap the very same producer fault.
    pub fn same_fault(&self, other: &Error) -> bool {
        match (self, other) {
            (Error::Routine(a), Error::Routine(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            Error::AlreadyCompleted => "already_completed",
            Error::NoReason => "no_reason",
            Error::Message(_) => "message",
            Error::Routine(_) => "routine_fault",
            Error::Panicked(_) => "routine_panicked",
            Error::NoResult => "no_result",
            Error::LoopCancelled => "loop_cancelled",
            Error::UnknownYield { .. } => "unknown_yield",
            Error::Stalled { .. } => "scheduler_stalled",
        }
    }
}

impl From<Fault> for Error {
    fn from(fault: Fault) -> Self {
        Error::Routine(fault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("disk on fire")]
    struct DiskOnFire;

    #[test]
    fn routine_fault_keeps_identity_across_clones() {
        let err = Error::routine(DiskOnFire);
        let copy = err.clone();

        assert!(err.same_fault(&copy));
        assert!(!err.same_fault(&Error::routine(DiskOnFire)));
        assert!(copy.downcast_ref::<DiskOnFire>().is_some());
        assert_eq!(copy.to_string(), "disk on fire");
    }

    #[test]
    fn panic_payloads_become_messages() {
        let err = Error::from_panic(Box::new("boom"));
        assert_eq!(err.to_string(), "routine panicked: boom");

        let err = Error::from_panic(Box::new(String::from("owned boom")));
        assert!(matches!(err, Error::Panicked(ref m) if m == "owned boom"));

        let err = Error::from_panic(Box::new(17_u8));
        assert!(matches!(err, Error::Panicked(ref m) if m == "unknown panic"));
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(Error::LoopCancelled.as_label(), "loop_cancelled");
        assert_eq!(
            Error::UnknownYield { type_name: "u8" }.as_label(),
            "unknown_yield"
        );
        assert_eq!(Error::msg(format_args!("x = {}", 3)).to_string(), "x = 3");
    }
}
