use super::Yield;
use crate::error::Result;

/// Outcome of advancing a routine by one unit.
#[derive(Debug)]
pub enum Resume<Y> {
    /// The routine produced a value and suspended.
    Yielded(Y),

    /// The routine has no further values.
    Finished,
}

/// A cooperative routine that a [`Driver`](super::Driver) advances one unit
/// at a time.
///
/// Each call to [`resume`](Routine::resume) runs the routine up to its next
/// suspension point. Returning `Err` or panicking is a fault: the driver
/// completes its promise with it and never resumes the routine again.
pub trait Routine {
    /// Result type of a typed routine; `()` for untyped routines.
    type Output;

    /// Advances the routine to its next suspension point.
    fn resume(&mut self) -> Result<Resume<Yield<Self::Output>>>;
}

impl<R: Routine + ?Sized> Routine for Box<R> {
    type Output = R::Output;

    fn resume(&mut self) -> Result<Resume<Yield<Self::Output>>> {
        (**self).resume()
    }
}

/// Builds a routine from a closure called once per advancement.
///
/// # Examples
///
/// ```rust
/// use tickwork::{Resume, Yield, routine};
///
/// let mut left = 3;
/// let countdown = routine::from_fn(move || {
///     left -= 1;
///     Ok(if left == 0 {
///         Resume::Yielded(Yield::Return("liftoff"))
///     } else {
///         Resume::Yielded(Yield::NotYet)
///     })
/// });
/// # let _ = countdown;
/// ```
pub fn from_fn<T, F>(f: F) -> FromFn<F>
where
    F: FnMut() -> Result<Resume<Yield<T>>>,
{
    FromFn { f }
}

/// Routine returned by [`from_fn`].
pub struct FromFn<F> {
    f: F,
}

impl<T, F> Routine for FromFn<F>
where
    F: FnMut() -> Result<Resume<Yield<T>>>,
{
    type Output = T;

    fn resume(&mut self) -> Result<Resume<Yield<T>>> {
        (self.f)()
    }
}

/// Builds a routine that yields each item of `iter`, then finishes.
pub fn from_iter<T, I>(iter: I) -> FromIter<I::IntoIter>
where
    I: IntoIterator<Item = Yield<T>>,
{
    FromIter {
        iter: iter.into_iter(),
    }
}

/// Routine returned by [`from_iter`].
pub struct FromIter<I> {
    iter: I,
}

impl<T, I> Routine for FromIter<I>
where
    I: Iterator<Item = Yield<T>>,
{
    type Output = T;

    fn resume(&mut self) -> Result<Resume<Yield<T>>> {
        Ok(match self.iter.next() {
            Some(item) => Resume::Yielded(item),
            None => Resume::Finished,
        })
    }
}
