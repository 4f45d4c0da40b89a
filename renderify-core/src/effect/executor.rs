use std::{
    mem,
    pin::Pin,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Weak,
    },
    task::{Context, Poll, Waker},
};

use futures::task::{waker_ref, ArcWake};
use parking_lot::Mutex;
use slotmap::new_key_type;

use super::Effect;

struct SharedTaskData {
    aborted: AtomicBool,
    /// Set once the task is scheduled, so that aborting wakes it for removal
    waker: Mutex<Option<Waker>>,
}

/// Represents a handle to a running task.
pub struct TaskHandle {
    shared: Weak<SharedTaskData>,
}

impl TaskHandle {
    pub fn abort_on_drop(self) -> AbortTaskHandle {
        AbortTaskHandle(self)
    }

    /// Aborts the task remotely.
    ///
    /// The task is dropped by the executor on its next update.
    pub fn abort(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.aborted.store(true, Ordering::SeqCst);

            if let Some(waker) = &*shared.waker.lock() {
                waker.wake_by_ref();
            }
        }
    }

    /// Returns true if the task has completed or been aborted
    pub fn is_finished(&self) -> bool {
        self.shared
            .upgrade()
            .map_or(true, |v| v.aborted.load(Ordering::Relaxed))
    }
}

/// Variant of a task handle which aborts the task when dropped
pub struct AbortTaskHandle(TaskHandle);

impl AbortTaskHandle {
    pub fn is_finished(&self) -> bool {
        self.0.is_finished()
    }
}

impl Drop for AbortTaskHandle {
    fn drop(&mut self) {
        self.0.abort()
    }
}

new_key_type! {
    struct TaskKey;
}

struct TaskWaker {
    key: TaskKey,
    shared: Arc<Shared>,
    sent: AtomicBool,
}

impl ArcWake for TaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        if arc_self
            .sent
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            arc_self.shared.push_ready(arc_self.key);
        } else {
            tracing::trace!("Task already woken");
        }
    }
}

/// Represents a unit of effect execution which runs using `T`
pub(crate) struct Task<T> {
    effect: Pin<Box<dyn Effect<T>>>,
    shared: Arc<SharedTaskData>,
}

impl<T> Task<T> {
    pub(crate) fn new(effect: Pin<Box<dyn Effect<T>>>) -> (Task<T>, TaskHandle) {
        let shared = Arc::new(SharedTaskData {
            aborted: AtomicBool::new(false),
            waker: Mutex::new(None),
        });

        let handle = TaskHandle {
            shared: Arc::downgrade(&shared),
        };

        let task = Self { effect, shared };

        (task, handle)
    }

    fn update(&mut self, waker: &Arc<TaskWaker>, state: &mut T) -> Poll<()> {
        if self.shared.aborted.load(Ordering::Relaxed) {
            tracing::debug!("Task aborted remotely");
            return Poll::Ready(());
        }

        let waker = waker_ref(waker);
        let mut cx = Context::from_waker(&waker);

        self.effect.as_mut().poll_effect(state, &mut cx)
    }
}

struct Shared {
    /// Task which are ready to be polled again
    ready: Mutex<Vec<TaskKey>>,
    waker: Mutex<Option<Waker>>,
    has_updates: AtomicBool,
}

impl Shared {
    fn push_ready(&self, key: TaskKey) {
        self.ready.lock().push(key);
        self.wake();
    }

    fn wake(&self) {
        self.has_updates.store(true, Ordering::SeqCst);
        if let Some(waker) = &*self.waker.lock() {
            waker.wake_by_ref();
        }
    }
}

/// Executes `Tasks`
pub struct Executor<T> {
    /// Tasks are stored inline
    tasks: slotmap::SlotMap<TaskKey, (Task<T>, Arc<TaskWaker>)>,
    new_tasks: Arc<Mutex<Vec<Task<T>>>>,
    processing: Vec<TaskKey>,
    shared: Arc<Shared>,
}

impl<T> Default for Executor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Executor<T> {
    pub fn new() -> Self {
        let shared = Arc::new(Shared {
            ready: Default::default(),
            waker: Default::default(),
            has_updates: AtomicBool::new(false),
        });

        Self {
            tasks: Default::default(),
            new_tasks: Default::default(),
            processing: Default::default(),
            shared,
        }
    }

    /// Poll until there are tasks ready to update
    pub fn poll_update(&mut self, cx: &mut Context<'_>, state: &mut T) -> Poll<()> {
        *self.shared.waker.lock() = Some(cx.waker().clone());

        if self
            .shared
            .has_updates
            .compare_exchange(true, false, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            self.update(state);
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }

    pub fn spawner(&self) -> TaskSpawner<T> {
        TaskSpawner {
            shared: Arc::downgrade(&self.shared),
            new_tasks: Arc::downgrade(&self.new_tasks),
        }
    }

    /// Returns true if there are spawned or woken tasks which have not yet been polled
    pub fn has_updates(&self) -> bool {
        self.shared.has_updates.load(Ordering::Relaxed)
    }

    /// Number of live tasks
    pub fn task_count(&self) -> usize {
        self.tasks.len() + self.new_tasks.lock().len()
    }

    /// Updates the executor, polling ready tasks using the provided state.
    ///
    /// Tasks spawned or woken while updating are polled in the same call.
    pub fn update(&mut self, state: &mut T) {
        loop {
            {
                let mut ready = self.shared.ready.lock();
                self.shared.has_updates.store(false, Ordering::SeqCst);

                mem::swap(&mut *ready, &mut self.processing);
            }

            // Drain all new tasks and put them into the slotmap
            let new_tasks = mem::take(&mut *self.new_tasks.lock());
            for new_task in new_tasks {
                let key = self.tasks.insert_with_key(|key| {
                    (
                        new_task,
                        Arc::new(TaskWaker {
                            key,
                            shared: self.shared.clone(),
                            sent: AtomicBool::new(false),
                        }),
                    )
                });

                if let Some((task, waker)) = self.tasks.get(key) {
                    *task.shared.waker.lock() = Some(futures::task::waker(waker.clone()));
                }

                self.processing.push(key);
            }

            if self.processing.is_empty() {
                break;
            }

            for key in mem::take(&mut self.processing) {
                let Some((task, waker)) = self.tasks.get_mut(key) else {
                    tracing::warn!(?key, "No such task");
                    continue;
                };

                // Reset the waker so that it is ready to use again
                waker.sent.store(false, Ordering::SeqCst);

                // Poll the task, removing the task if ready
                if task.update(waker, state).is_ready() {
                    self.tasks.remove(key);
                }
            }
        }
    }
}

/// Allows spawning tasks
pub struct TaskSpawner<T> {
    new_tasks: Weak<Mutex<Vec<Task<T>>>>,
    shared: Weak<Shared>,
}

impl<T> Clone for TaskSpawner<T> {
    fn clone(&self) -> Self {
        Self {
            new_tasks: self.new_tasks.clone(),
            shared: self.shared.clone(),
        }
    }
}

impl<T> std::fmt::Debug for TaskSpawner<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskSpawner").finish_non_exhaustive()
    }
}

impl<T> TaskSpawner<T> {
    /// Spawns a new task.
    pub fn spawn<E>(&self, effect: E) -> TaskHandle
    where
        E: 'static + Effect<T>,
    {
        self.spawn_boxed(Box::pin(effect))
    }

    /// Spawns a new task.
    ///
    /// If the executor is no longer running the task is dropped and the returned handle reports
    /// the task as finished.
    pub fn spawn_boxed(&self, effect: Pin<Box<dyn Effect<T>>>) -> TaskHandle {
        let (task, handle) = Task::new(effect);

        match (self.shared.upgrade(), self.new_tasks.upgrade()) {
            (Some(shared), Some(new_tasks)) => {
                new_tasks.lock().push(task);
                shared.wake();
            }
            _ => tracing::warn!("Spawning task without a running executor"),
        }

        handle
    }
}
