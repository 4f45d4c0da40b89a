use crate::effect::{AbortTaskHandle, TaskHandle};

/// Runs when a widget is unmounted/detached
#[derive(Default)]
pub(crate) struct OnCleanup(Vec<Box<dyn FnOnce() + Send + Sync>>);

impl std::fmt::Debug for OnCleanup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("OnCleanup").field(&self.0.len()).finish()
    }
}

impl OnCleanup {
    pub fn push(&mut self, func: Box<dyn FnOnce() + Send + Sync>) {
        self.0.push(func);
    }
}

impl Drop for OnCleanup {
    fn drop(&mut self) {
        self.0.drain(..).for_each(|func| func());
    }
}

/// Aborts the stored effects when dropped
#[derive(Default)]
pub(crate) struct Tasks(Vec<AbortTaskHandle>);

impl std::fmt::Debug for Tasks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Tasks").field(&self.0.len()).finish()
    }
}

impl Tasks {
    pub fn push(&mut self, handle: TaskHandle) {
        // Finished tasks have nothing left to abort
        self.0.retain(|v| !v.is_finished());
        self.0.push(handle.abort_on_drop());
    }
}
