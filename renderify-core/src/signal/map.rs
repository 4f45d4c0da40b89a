use std::{pin::Pin, task::Poll};

use pin_project::pin_project;

use super::{waiter::SignalWaker, Signal};

#[pin_project]
pub struct Map<S, F> {
    #[pin]
    pub(crate) signal: S,
    pub(crate) f: F,
}

impl<S, F, U> Signal for Map<S, F>
where
    S: Signal,
    F: FnMut(S::Item) -> U,
{
    type Item = U;

    fn poll_changed(self: Pin<&mut Self>, waker: SignalWaker) -> Poll<Option<Self::Item>> {
        let p = self.project();
        match p.signal.poll_changed(waker) {
            Poll::Ready(Some(v)) => Poll::Ready(Some((p.f)(v))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}
