mod map;
mod mutable;
mod waiter;

pub use map::*;
pub use mutable::*;
pub use waiter::SignalWaker;

use std::{
    pin::Pin,
    task::{Context, Poll},
};

use futures::Future;

/// A value which changes over time.
///
/// Unlike a stream, intermediate values may be skipped; only the latest value is observed.
pub trait Signal {
    type Item;

    /// Polls the signal until the value changes
    fn poll_changed(self: Pin<&mut Self>, waker: SignalWaker) -> Poll<Option<Self::Item>>;

    fn next_value(&mut self) -> SignalFuture<&mut Self>
    where
        Self: Unpin,
    {
        SignalFuture { signal: self }
    }

    fn map<F, U>(self, f: F) -> Map<Self, F>
    where
        F: FnMut(Self::Item) -> U,
        Self: Sized,
    {
        Map { signal: self, f }
    }
}

impl<'s, S> Signal for &'s mut S
where
    S: Unpin + Signal + ?Sized,
{
    type Item = S::Item;

    fn poll_changed(self: Pin<&mut Self>, waker: SignalWaker) -> Poll<Option<Self::Item>> {
        let v = &mut **self.get_mut();
        Pin::new(v).poll_changed(waker)
    }
}

pub struct SignalFuture<S> {
    signal: S,
}

impl<S> Future for SignalFuture<S>
where
    S: Unpin + Signal,
{
    type Output = Option<S::Item>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let signal = Pin::new(&mut Pin::get_mut(self).signal);
        signal.poll_changed(SignalWaker::from_cx(cx))
    }
}

