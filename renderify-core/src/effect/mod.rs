mod executor;
mod future;
mod signal;
mod stream;

pub use executor::*;
pub use future::*;
pub use signal::*;
pub use stream::*;

use std::{
    pin::Pin,
    task::{Context, Poll},
};

/// A unit of asynchronous work which is polled with mutable access to `Data`.
///
/// This allows futures, streams and signals to act upon the widget tree when they produce
/// values.
pub trait Effect<Data: ?Sized> {
    fn poll_effect(self: Pin<&mut Self>, data: &mut Data, async_cx: &mut Context<'_>) -> Poll<()>;
}
