use super::{Promise, lock};
use crate::error::Error;

use std::future::Future;
use std::iter::FusedIterator;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Marker yielded while a promise is still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NotYet;

/// A lazy sequence that yields [`NotYet`] until its promise is done.
///
/// Created by [`Promise::wait`]. The sequence ends on the first call to
/// `next` that observes a completed promise, and stays ended.
pub struct Wait<'a, T> {
    promise: &'a Promise<T>,
}

impl<'a, T> Wait<'a, T> {
    pub(crate) fn new(promise: &'a Promise<T>) -> Self {
        Self { promise }
    }
}

impl<T> Iterator for Wait<'_, T> {
    type Item = NotYet;

    fn next(&mut self) -> Option<NotYet> {
        if self.promise.is_done() {
            None
        } else {
            Some(NotYet)
        }
    }
}

impl<T> FusedIterator for Wait<'_, T> {}

impl<T: Clone> Future for Promise<T> {
    /// A clone of the outcome.
    type Output = Result<T, Error>;

    /// Polls the promise.
    ///
    /// If the promise is done, its outcome is cloned out. Otherwise the
    /// current waker is registered, unless an equivalent one already is, and
    /// the outcome is checked again so a completion racing with the
    /// registration is not missed.
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(outcome) = self.shared.outcome() {
            return Poll::Ready(outcome.clone());
        }

        {
            let mut wakers = lock(&self.shared.wakers);
            if !wakers.iter().any(|waker| waker.will_wake(cx.waker())) {
                wakers.push(cx.waker().clone());
            }
        }

        if let Some(outcome) = self.shared.outcome() {
            return Poll::Ready(outcome.clone());
        }

        Poll::Pending
    }
}
