use std::{
    pin::Pin,
    task::{Context, Poll},
};

use futures::Future;
use pin_project::pin_project;

use super::Effect;

/// An effect which run the future to completion, and executes the provided function when finished
#[pin_project]
pub struct FutureEffect<Fut, F>
where
    Fut: Future,
{
    #[pin]
    fut: Fut,
    func: Option<F>,
}

impl<Fut, F> FutureEffect<Fut, F>
where
    Fut: Future,
{
    pub fn new(future: Fut, func: F) -> Self {
        Self {
            fut: future,
            func: Some(func),
        }
    }
}

impl<Data: ?Sized, Fut, F> Effect<Data> for FutureEffect<Fut, F>
where
    Fut: Future,
    F: FnOnce(&mut Data, Fut::Output),
{
    fn poll_effect(self: Pin<&mut Self>, data: &mut Data, async_cx: &mut Context<'_>) -> Poll<()> {
        let p = self.project();
        let Poll::Ready(item) = p.fut.poll(async_cx) else {
            return Poll::Pending;
        };

        if let Some(func) = p.func.take() {
            (func)(data, item);
        }

        Poll::Ready(())
    }
}
