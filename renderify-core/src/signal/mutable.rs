use std::{
    fmt::Debug,
    pin::Pin,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Weak,
    },
    task::Poll,
};

use parking_lot::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{
    waiter::{SignalWaker, WaitList, Waiter},
    Signal,
};

/// A value which notifies its signals every time it is written to.
pub struct Mutable<T> {
    inner: Arc<MutableInner<T>>,
}

struct MutableInner<T> {
    mutable_count: AtomicUsize,
    value: RwLock<T>,
    waiters: Mutex<WaitList>,
}

impl<T> Mutable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(MutableInner {
                value: RwLock::new(value),
                mutable_count: AtomicUsize::new(1),
                waiters: Default::default(),
            }),
        }
    }

    pub fn read(&self) -> MutableReadGuard<T> {
        MutableReadGuard {
            value: self.inner.value.read(),
        }
    }

    /// Locks the value for writing.
    ///
    /// All signals are notified when the guard is dropped.
    pub fn write(&self) -> MutableWriteGuard<T> {
        let value = self.inner.value.write();
        let wake_on_drop = WakeOnDrop {
            waiters: self.inner.waiters.lock(),
        };
        MutableWriteGuard {
            value,
            _wake_on_drop: wake_on_drop,
        }
    }

    /// Conditionally modifies the value.
    ///
    /// Signals are only notified if `f` returns `Some`.
    pub fn update_if<R>(&self, f: impl FnOnce(&mut T) -> Option<R>) -> Option<R> {
        let mut value = self.inner.value.write();
        let res = f(&mut value)?;
        drop(value);

        self.inner.waiters.lock().wake_all();
        Some(res)
    }

    pub fn set(&self, value: T) {
        *self.write() = value;
    }

    /// Returns true if both handles refer to the same value
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns a handle which does not keep the value alive
    pub fn downgrade(&self) -> WeakMutable<T> {
        WeakMutable {
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn signal(&self) -> MutableSignal<T> {
        let waiter = Arc::new(Waiter::new(true));
        self.inner.waiters.lock().push(Arc::downgrade(&waiter));

        MutableSignal {
            waiter,
            state: Arc::downgrade(&self.inner),
        }
    }
}

impl<T> Drop for Mutable<T> {
    fn drop(&mut self) {
        let count = self.inner.mutable_count.fetch_sub(1, Ordering::Relaxed);
        if count == 1 {
            self.inner.waiters.lock().wake_all();
        }
    }
}

impl<T> Clone for Mutable<T> {
    fn clone(&self) -> Self {
        self.inner.mutable_count.fetch_add(1, Ordering::Relaxed);
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Debug for Mutable<T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mutable")
            .field("inner", &self.inner.value)
            .finish()
    }
}

/// Weak counterpart to [`Mutable`]
pub struct WeakMutable<T> {
    inner: Weak<MutableInner<T>>,
}

impl<T> WeakMutable<T> {
    pub fn upgrade(&self) -> Option<Mutable<T>> {
        let inner = self.inner.upgrade()?;
        inner.mutable_count.fetch_add(1, Ordering::Relaxed);
        Some(Mutable { inner })
    }
}

impl<T> Clone for WeakMutable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

struct WakeOnDrop<'a> {
    waiters: MutexGuard<'a, WaitList>,
}

impl<'a> Drop for WakeOnDrop<'a> {
    fn drop(&mut self) {
        self.waiters.wake_all()
    }
}

pub struct MutableWriteGuard<'a, T> {
    value: RwLockWriteGuard<'a, T>,
    _wake_on_drop: WakeOnDrop<'a>,
}

impl<'a, T> std::ops::Deref for MutableWriteGuard<'a, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<'a, T> std::ops::DerefMut for MutableWriteGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.value
    }
}

pub struct MutableReadGuard<'a, T> {
    value: RwLockReadGuard<'a, T>,
}

impl<'a, T> std::ops::Deref for MutableReadGuard<'a, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

/// Yields the current value of a [`Mutable`] each time it changes
pub struct MutableSignal<T> {
    waiter: Arc<Waiter>,
    state: Weak<MutableInner<T>>,
}

impl<T> Signal for MutableSignal<T>
where
    T: Clone,
{
    type Item = T;

    fn poll_changed(self: Pin<&mut Self>, waker: SignalWaker) -> Poll<Option<Self::Item>> {
        let Some(state) = self.state.upgrade() else {
            return Poll::Ready(None);
        };

        if state.mutable_count.load(Ordering::Relaxed) == 0 {
            return Poll::Ready(None);
        }

        if !self.waiter.take_changed() {
            self.waiter.set_waker(waker);

            // A write may have happened before the waker was stored
            if !self.waiter.take_changed() {
                return Poll::Pending;
            }
        }

        let item = state.value.read().clone();
        Poll::Ready(Some(item))
    }
}
