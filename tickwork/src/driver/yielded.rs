use crate::error::Error;
use crate::host::{Suspension, TaskHandle};
use crate::promise::{NotYet, Promise};

use std::any::Any;
use std::fmt;

/// What a routine hands back to its driver at a suspension point.
///
/// The driver interprets each variant as follows:
///
/// - [`NotYet`](Yield::NotYet): suspend until the next host tick.
/// - [`Suspend`](Yield::Suspend): pass the host suspension through untouched.
/// - [`Task`](Yield::Task): suspend on whatever the nested task is
///   currently suspended on.
/// - [`Await`](Yield::Await): suspend every tick until the promise is done,
///   then resume the routine. The promise's value is not consumed.
/// - [`Return`](Yield::Return): complete successfully with the value.
/// - [`Value`](Yield::Value): complete successfully if the dynamic type is
///   the driver's result type, fail with
///   [`Error::UnknownYield`] otherwise.
/// - [`Fail`](Yield::Fail): complete with the error.
pub enum Yield<T> {
    NotYet,
    Suspend(Suspension),
    Task(TaskHandle),
    Await(Awaitable),
    Return(T),
    Value(AnyValue),
    Fail(Error),
}

impl<T> Yield<T> {
    /// Yields a dynamically typed value.
    pub fn value<V: 'static>(value: V) -> Self {
        Yield::Value(AnyValue::new(value))
    }

    /// Waits for `promise` without consuming it.
    pub fn wait_for<U: 'static>(promise: &Promise<U>) -> Self {
        Yield::Await(Awaitable::from(promise.clone()))
    }

    /// Short name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Yield::NotYet => "not_yet",
            Yield::Suspend(_) => "suspend",
            Yield::Task(_) => "task",
            Yield::Await(_) => "await",
            Yield::Return(_) => "return",
            Yield::Value(_) => "value",
            Yield::Fail(_) => "fail",
        }
    }

    /// Returns `true` for the variants that end the routine.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Yield::Return(_) | Yield::Value(_) | Yield::Fail(_))
    }
}

impl<T> From<NotYet> for Yield<T> {
    fn from(_: NotYet) -> Self {
        Yield::NotYet
    }
}

impl<T> From<Suspension> for Yield<T> {
    fn from(suspension: Suspension) -> Self {
        Yield::Suspend(suspension)
    }
}

impl<T> From<TaskHandle> for Yield<T> {
    fn from(handle: TaskHandle) -> Self {
        Yield::Task(handle)
    }
}

impl<T, U: 'static> From<Promise<U>> for Yield<T> {
    fn from(promise: Promise<U>) -> Self {
        Yield::Await(Awaitable::from(promise))
    }
}

impl<T> From<Error> for Yield<T> {
    fn from(error: Error) -> Self {
        Yield::Fail(error)
    }
}

impl<T: fmt::Debug> fmt::Debug for Yield<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Yield::NotYet => f.write_str("NotYet"),
            Yield::Suspend(s) => f.debug_tuple("Suspend").field(s).finish(),
            Yield::Task(t) => f.debug_tuple("Task").field(t).finish(),
            Yield::Await(a) => f.debug_tuple("Await").field(a).finish(),
            Yield::Return(v) => f.debug_tuple("Return").field(v).finish(),
            Yield::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Yield::Fail(e) => f.debug_tuple("Fail").field(e).finish(),
        }
    }
}

/// A type-erased value together with the name of its type.
pub struct AnyValue {
    value: Box<dyn Any>,
    type_name: &'static str,
}

impl AnyValue {
    pub fn new<V: 'static>(value: V) -> Self {
        Self {
            value: Box::new(value),
            type_name: std::any::type_name::<V>(),
        }
    }

    /// Name of the erased type, as reported by [`std::any::type_name`].
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Takes the value out if it is a `T`, or gives it back unchanged.
    pub fn downcast<T: 'static>(self) -> Result<T, AnyValue> {
        match self.value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(AnyValue {
                value,
                type_name: self.type_name,
            }),
        }
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AnyValue").field(&self.type_name).finish()
    }
}

/// A promise of any result type, seen only through its completion state.
pub struct Awaitable {
    promise: Box<dyn Completion>,
}

trait Completion {
    fn is_done(&self) -> bool;
}

impl<T> Completion for Promise<T> {
    fn is_done(&self) -> bool {
        Promise::is_done(self)
    }
}

impl Awaitable {
    /// Returns `true` once the underlying promise is done.
    pub fn is_done(&self) -> bool {
        self.promise.is_done()
    }
}

impl<T: 'static> From<Promise<T>> for Awaitable {
    fn from(promise: Promise<T>) -> Self {
        Self {
            promise: Box::new(promise),
        }
    }
}

impl fmt::Debug for Awaitable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Awaitable")
            .field("done", &self.is_done())
            .finish()
    }
}
