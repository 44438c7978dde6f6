use crate::promise::Promise;

use std::fmt;
use std::sync::{Arc, OnceLock};

/// Host-side readiness check behind a [`Suspension`].
///
/// `clock` is the host's tick counter at the time of the check. A signal
/// may be checked by several parties during the same tick, so it must not
/// assume one check per tick.
pub trait Signal: Send + Sync {
    /// Returns `true` when the suspended step may run again.
    fn is_ready(&self, clock: u64) -> bool;
}

impl<F> Signal for F
where
    F: Fn(u64) -> bool + Send + Sync,
{
    fn is_ready(&self, clock: u64) -> bool {
        self(clock)
    }
}

/// An opaque "pause until the host resumes this step" marker.
///
/// Drivers never look inside a suspension; they hand it to the host and
/// publish it so that outer drivers can suspend on the same mechanism.
/// Cloning shares the underlying signal.
#[derive(Clone)]
pub struct Suspension {
    signal: Arc<dyn Signal>,
    kind: &'static str,
}

impl Suspension {
    /// Resumes on the next host tick.
    pub fn next_tick() -> Self {
        Self::new("next_tick", |_: u64| true)
    }

    /// Resumes once `n` host ticks have checked it, counted from the first
    /// check. `ticks(1)` behaves like [`next_tick`](Self::next_tick).
    pub fn ticks(n: u64) -> Self {
        Self::new("ticks", TickCountdown::new(n))
    }

    /// Resumes once `promise` is done.
    pub fn until<T>(promise: &Promise<T>) -> Self
    where
        T: Send + Sync + 'static,
    {
        let promise = promise.clone();
        Self::new("until", move |_: u64| promise.is_done())
    }

    /// Wraps a host-specific signal.
    pub fn custom<S>(signal: S) -> Self
    where
        S: Signal + 'static,
    {
        Self::new("custom", signal)
    }

    fn new<S: Signal + 'static>(kind: &'static str, signal: S) -> Self {
        Self {
            signal: Arc::new(signal),
            kind,
        }
    }

    /// Asks the underlying signal whether the step may run at `clock`.
    pub fn is_ready(&self, clock: u64) -> bool {
        self.signal.is_ready(clock)
    }

    /// Returns `true` if both suspensions share the same signal.
    pub fn same(&self, other: &Suspension) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.signal), Arc::as_ptr(&other.signal))
    }
}

impl fmt::Debug for Suspension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Suspension").field(&self.kind).finish()
    }
}

/// Counts host ticks from the first readiness check.
struct TickCountdown {
    ticks: u64,
    start: OnceLock<u64>,
}

impl TickCountdown {
    fn new(ticks: u64) -> Self {
        Self {
            ticks,
            start: OnceLock::new(),
        }
    }
}

impl Signal for TickCountdown {
    fn is_ready(&self, clock: u64) -> bool {
        let start = *self.start.get_or_init(|| clock);
        clock.saturating_sub(start) + 1 >= self.ticks
    }
}
