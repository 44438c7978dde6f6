use super::Scheduler;

/// Builder for configuring and creating a [`Scheduler`].
///
/// # Examples
///
/// ```rust
/// use tickwork::SchedulerBuilder;
///
/// let scheduler = SchedulerBuilder::new()
///     .capacity(64)
///     .max_ticks(1_000)
///     .build();
///
/// assert_eq!(scheduler.active(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct SchedulerBuilder {
    /// Number of task slots allocated up front.
    pub(crate) capacity: usize,

    /// Tick budget for [`Scheduler::run_until_idle`].
    pub(crate) max_ticks: Option<usize>,
}

impl SchedulerBuilder {
    /// Creates a builder with default configuration.
    ///
    /// By default the task table starts with 16 slots and
    /// [`Scheduler::run_until_idle`] has no tick budget.
    pub fn new() -> Self {
        Self {
            capacity: 16,
            max_ticks: None,
        }
    }

    /// Sets the number of task slots allocated up front.
    ///
    /// The table still grows past this when needed.
    pub fn capacity(mut self, n: usize) -> Self {
        self.capacity = n;
        self
    }

    /// Bounds the number of ticks [`Scheduler::run_until_idle`] may run
    /// before giving up with [`Error::Stalled`](crate::Error::Stalled).
    ///
    /// # Panics
    ///
    /// Panics if `n == 0`.
    pub fn max_ticks(mut self, n: usize) -> Self {
        assert!(n > 0, "max_ticks must be > 0");

        self.max_ticks = Some(n);
        self
    }

    /// Builds the scheduler with the configured options.
    pub fn build(self) -> Scheduler {
        Scheduler::from_builder(self)
    }
}

impl Default for SchedulerBuilder {
    /// Creates a default `SchedulerBuilder`.
    fn default() -> Self {
        Self::new()
    }
}
