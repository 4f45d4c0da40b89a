use std::{
    pin::Pin,
    task::{Context, Poll},
};

use pin_project::pin_project;

use crate::signal::{Signal, SignalWaker};

use super::Effect;

/// An effect which executes the provided function each time the signal changes.
///
/// Completes when the signal is closed.
#[pin_project]
pub struct SignalEffect<S, F> {
    #[pin]
    signal: S,
    func: F,
}

impl<S, F> SignalEffect<S, F> {
    pub fn new(signal: S, func: F) -> Self
    where
        S: Signal,
    {
        Self { signal, func }
    }
}

impl<Data: ?Sized, S, F> Effect<Data> for SignalEffect<S, F>
where
    S: Signal,
    F: FnMut(&mut Data, S::Item),
{
    fn poll_effect(self: Pin<&mut Self>, data: &mut Data, async_cx: &mut Context<'_>) -> Poll<()> {
        let p = self.project();
        let mut signal = p.signal;
        let func = p.func;

        loop {
            match signal.as_mut().poll_changed(SignalWaker::from_cx(async_cx)) {
                Poll::Ready(Some(item)) => (func)(data, item),
                Poll::Ready(None) => return Poll::Ready(()),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
