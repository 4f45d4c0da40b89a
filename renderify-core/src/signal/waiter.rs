use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Weak,
    },
    task::{Context, Waker as AsyncWaker},
};

use parking_lot::Mutex;

/// Method used to notify a signal consumer of a change
#[derive(Clone, Default)]
pub enum SignalWaker {
    #[default]
    None,
    AsyncWaker(AsyncWaker),
    Callback(Arc<dyn Fn() + Send + Sync>),
}

impl SignalWaker {
    pub fn from_cx(cx: &Context<'_>) -> Self {
        Self::AsyncWaker(cx.waker().clone())
    }

    fn wake(&self) {
        match self {
            SignalWaker::None => {}
            SignalWaker::AsyncWaker(v) => v.wake_by_ref(),
            SignalWaker::Callback(v) => v(),
        }
    }
}

impl From<AsyncWaker> for SignalWaker {
    fn from(v: AsyncWaker) -> Self {
        Self::AsyncWaker(v)
    }
}

impl std::fmt::Debug for SignalWaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::AsyncWaker(v) => f.debug_tuple("AsyncWaker").field(v).finish(),
            Self::Callback(_) => write!(f, "Callback"),
        }
    }
}

pub(crate) struct Waiter {
    changed: AtomicBool,
    // Method to use to signal the change
    waker: Mutex<SignalWaker>,
}

impl Waiter {
    pub fn new(initial_changed: bool) -> Self {
        Self {
            changed: AtomicBool::new(initial_changed),
            waker: Default::default(),
        }
    }

    pub fn take_changed(&self) -> bool {
        self.changed
            .compare_exchange(true, false, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    pub fn set_waker(&self, waker: SignalWaker) {
        *self.waker.lock() = waker;
    }

    pub fn wake(&self) {
        self.changed.store(true, Ordering::SeqCst);
        self.waker.lock().wake();
    }
}

#[derive(Default)]
pub(crate) struct WaitList {
    inner: Vec<Weak<Waiter>>,
}

impl WaitList {
    pub fn push(&mut self, value: Weak<Waiter>) {
        self.inner.push(value)
    }

    /// Wakes every live waiter, forgetting the ones which have been dropped
    pub fn wake_all(&mut self) {
        self.inner.retain(|v| {
            if let Some(w) = v.upgrade() {
                w.wake();
                true
            } else {
                false
            }
        })
    }
}
