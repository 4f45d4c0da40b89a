use std::{
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use eyre::Report;
use futures::{channel::oneshot, ready, Future, FutureExt};
use parking_lot::Mutex;

use crate::{error::Result, signal::WeakMutable, Error};

use super::InteractionState;

type Outcome<T, E> = std::result::Result<T, E>;

struct Pending<T, E> {
    tx: Mutex<Option<oneshot::Sender<Outcome<T, E>>>>,
    state: WeakMutable<InteractionState<T, E>>,
}

/// The resolve and reject callbacks of a single interaction.
///
/// Cloning yields a handle to the same interaction. Once either callback has been invoked, or the
/// host has been unmounted, every clone is stale and fails with [`Error::NotInProgress`].
pub struct Completion<T, E = Report> {
    inner: Arc<Pending<T, E>>,
}

impl<T, E> Completion<T, E> {
    pub(crate) fn new(state: WeakMutable<InteractionState<T, E>>) -> (Self, Interaction<T, E>) {
        let (tx, rx) = oneshot::channel();

        let completion = Self {
            inner: Arc::new(Pending {
                tx: Mutex::new(Some(tx)),
                state,
            }),
        };

        (completion, Interaction { rx })
    }

    /// Settles the interaction with `value`
    pub fn resolve(&self, value: T) -> Result<()> {
        self.settle(Ok(value))
    }

    /// Fails the interaction with `error`
    pub fn reject(&self, error: E) -> Result<()> {
        self.settle(Err(error))
    }

    /// Returns true if both handles refer to the same interaction
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns true if the interaction has not yet been settled or abandoned
    pub fn is_live(&self) -> bool {
        self.inner.tx.lock().is_some()
    }

    fn settle(&self, outcome: Outcome<T, E>) -> Result<()> {
        let state = self.inner.state.upgrade().ok_or(Error::NotInProgress)?;

        // The slot is cleared before the future is settled, so the awaiting side is free to start
        // a new interaction immediately.
        state
            .update_if(|slot| {
                if !slot.completion().is_some_and(|v| v.ptr_eq(self)) {
                    return None;
                }

                *slot = InteractionState::Idle;
                Some(())
            })
            .ok_or(Error::NotInProgress)?;

        let tx = self.inner.tx.lock().take().ok_or(Error::NotInProgress)?;

        if tx.send(outcome).is_err() {
            tracing::debug!("Interaction settled after the future was dropped");
        }

        Ok(())
    }

    /// Drops the sender without settling, failing the future with [`Error::HostUnmounted`]
    pub(crate) fn abandon(&self) {
        if self.inner.tx.lock().take().is_some() {
            tracing::debug!("Interaction abandoned");
        }
    }
}

impl<T, E> Clone for Completion<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E> std::fmt::Debug for Completion<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("id", &Arc::as_ptr(&self.inner))
            .field("live", &self.is_live())
            .finish()
    }
}

/// Resolves once the interaction is settled by the UI.
///
/// Fails with `E::from(Error::HostUnmounted)` if the host is unmounted first.
#[must_use = "futures do nothing unless polled"]
pub struct Interaction<T, E = Report> {
    rx: oneshot::Receiver<Outcome<T, E>>,
}

impl<T, E> Future for Interaction<T, E>
where
    E: From<Error>,
{
    type Output = Outcome<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match ready!(self.rx.poll_unpin(cx)) {
            Ok(outcome) => Poll::Ready(outcome),
            Err(oneshot::Canceled) => Poll::Ready(Err(Error::HostUnmounted.into())),
        }
    }
}

impl<T, E> std::fmt::Debug for Interaction<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interaction").finish_non_exhaustive()
    }
}
