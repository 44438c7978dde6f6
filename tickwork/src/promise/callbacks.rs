use crate::error::Error;

pub(crate) type SuccessFn<T> = Box<dyn FnOnce(&T) + Send>;
pub(crate) type ErrorFn = Box<dyn FnOnce(&Error) + Send>;
pub(crate) type AlwaysFn = Box<dyn FnOnce() + Send>;

/// The three callback slots of a pending promise.
///
/// Each slot holds at most one callback. Registering again before
/// completion replaces the previous callback rather than queueing it.
pub(crate) struct Callbacks<T> {
    pub(crate) success: Option<SuccessFn<T>>,
    pub(crate) error: Option<ErrorFn>,
    pub(crate) always: Option<AlwaysFn>,
}

impl<T> Callbacks<T> {
    pub(crate) fn new() -> Self {
        Self {
            success: None,
            error: None,
            always: None,
        }
    }

    /// Empties the slot matching `outcome` and the opposite one.
    ///
    /// The callback that does not apply is dropped without being called.
    pub(crate) fn take_first(&mut self, outcome: &Result<T, Error>) -> Option<First<T>> {
        let success = self.success.take();
        let error = self.error.take();

        match outcome {
            Ok(_) => success.map(First::Success),
            Err(_) => error.map(First::Error),
        }
    }
}

/// The callback that runs first at completion.
pub(crate) enum First<T> {
    Success(SuccessFn<T>),
    Error(ErrorFn),
}

impl<T> First<T> {
    /// Slot name, for logs.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            First::Success(_) => "success",
            First::Error(_) => "error",
        }
    }

    pub(crate) fn call(self, outcome: &Result<T, Error>) {
        match (self, outcome) {
            (First::Success(f), Ok(value)) => f(value),
            (First::Error(f), Err(error)) => f(error),
            _ => {}
        }
    }
}
