use super::Suspension;
use crate::promise::lock;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Identifier of a task started on a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// A handle to a task running on a host.
///
/// The host publishes the suspension the task is currently parked on,
/// and marks the handle finished once the task's step function reports
/// that it is done. Routines yield a `TaskHandle` to wait on a nested task.
///
/// Dropping the handle does **not** stop the task; only the host decides
/// whether it keeps stepping.
#[derive(Clone)]
pub struct TaskHandle {
    state: Arc<TaskState>,
}

struct TaskState {
    id: TaskId,
    suspension: Mutex<Option<Suspension>>,
    finished: AtomicBool,
}

impl TaskHandle {
    /// Creates the handle for a freshly started task.
    ///
    /// Intended for [`Host`](super::Host) implementations.
    pub fn new(id: TaskId) -> Self {
        Self {
            state: Arc::new(TaskState {
                id,
                suspension: Mutex::new(None),
                finished: AtomicBool::new(false),
            }),
        }
    }

    /// The identifier assigned by the host.
    pub fn id(&self) -> TaskId {
        self.state.id
    }

    /// The suspension the task handed to the host on its latest step.
    ///
    /// `None` means the task resumes on the next tick, or that it finished.
    pub fn suspension(&self) -> Option<Suspension> {
        lock(&self.state.suspension).clone()
    }

    /// Returns `true` once the task's step function reported it is done.
    pub fn is_finished(&self) -> bool {
        self.state.finished.load(Ordering::Acquire)
    }

    /// Records the suspension returned by the latest step.
    ///
    /// Intended for [`Host`](super::Host) implementations.
    pub fn publish(&self, suspension: Option<Suspension>) {
        *lock(&self.state.suspension) = suspension;
    }

    /// Marks the task finished and releases its suspension.
    ///
    /// Intended for [`Host`](super::Host) implementations.
    pub fn finish(&self) {
        lock(&self.state.suspension).take();
        self.state.finished.store(true, Ordering::Release);
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("id", &self.id())
            .field("finished", &self.is_finished())
            .finish()
    }
}
