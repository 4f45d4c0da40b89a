use std::sync::Arc;

use eyre::Report;
use parking_lot::Mutex;

use crate::{error::Result, Error};

use super::{HostController, Interaction};

/// A slot through which a mounted [`InteractionHost`](super::InteractionHost) exposes its
/// controller to code outside the tree.
///
/// Empty until the host is mounted, and emptied again when the host is unmounted.
pub struct HostHandle<T, E = Report> {
    inner: Arc<Mutex<Option<HostController<T, E>>>>,
}

impl<T, E> HostHandle<T, E> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the controller of the mounted host
    pub fn get(&self) -> Option<HostController<T, E>> {
        self.inner.lock().clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.lock().is_some()
    }

    pub(crate) fn attach(&self, controller: HostController<T, E>) {
        let mut inner = self.inner.lock();
        if inner.is_some() {
            tracing::warn!("Handle is already attached to a mounted host, replacing it");
        }

        *inner = Some(controller);
    }

    /// Detaches `controller`, unless the handle has since been attached to another host
    pub(crate) fn detach(&self, controller: &HostController<T, E>) {
        let mut inner = self.inner.lock();
        if inner.as_ref().is_some_and(|v| v.ptr_eq(controller)) {
            *inner = None;
        }
    }
}

impl<T, E> Default for HostHandle<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Clone for HostHandle<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E> std::fmt::Debug for HostHandle<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostHandle")
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

/// Triggers interactions on a host from imperative code.
///
/// ```ignore
/// let confirm = Requestor::<bool>::new();
/// scope.attach(InteractionHost::builder(dialog).with_handle(confirm.handle()));
///
/// if confirm.trigger()?.await? {
///     delete_file()?;
/// }
/// ```
pub struct Requestor<T, E = Report> {
    handle: HostHandle<T, E>,
}

impl<T, E> Requestor<T, E> {
    pub fn new() -> Self {
        Self {
            handle: HostHandle::new(),
        }
    }

    /// The handle to pass to the host this requestor triggers
    pub fn handle(&self) -> HostHandle<T, E> {
        self.handle.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.handle.is_mounted()
    }

    /// Starts an interaction on the mounted host.
    ///
    /// Fails with [`Error::NotMounted`] if the host has not been mounted yet.
    pub fn trigger(&self) -> Result<Interaction<T, E>> {
        let controller = self.handle.get().ok_or(Error::NotMounted)?;
        controller.start()
    }
}

impl<T, E> Default for Requestor<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Clone for Requestor<T, E> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
        }
    }
}

impl<T, E> std::fmt::Debug for Requestor<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Requestor")
            .field("handle", &self.handle)
            .finish()
    }
}
