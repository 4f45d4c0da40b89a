use std::sync::Arc;

use eyre::Report;

use crate::{
    error::Result,
    signal::{Mutable, Signal},
    Scope, Widget,
};

use super::{completion_key, Completion, HostHandle, Interaction, InteractionState};

/// Owning side of an interaction host's state.
///
/// Starting, resolving and rejecting all go through here; the host widget re-renders whenever the
/// state changes.
pub struct HostController<T, E = Report> {
    state: Mutable<InteractionState<T, E>>,
}

impl<T, E> HostController<T, E> {
    pub fn new() -> Self {
        Self {
            state: Mutable::new(InteractionState::Idle),
        }
    }

    /// Begins a new interaction.
    ///
    /// Fails with [`AlreadyInProgress`](crate::Error::AlreadyInProgress) if the previous
    /// interaction has not been settled. The outstanding interaction is left untouched.
    pub fn start(&self) -> Result<Interaction<T, E>> {
        let (completion, interaction) = Completion::new(self.state.downgrade());

        self.state
            .update_if(|slot| {
                if slot.is_active() {
                    return None;
                }

                *slot = InteractionState::Active(completion);
                Some(())
            })
            .ok_or(crate::Error::AlreadyInProgress)?;

        tracing::debug!("Interaction started");
        Ok(interaction)
    }

    /// Settles the active interaction with `value`
    pub fn resolve(&self, value: T) -> Result<()> {
        self.active()?.resolve(value)
    }

    /// Fails the active interaction with `error`
    pub fn reject(&self, error: E) -> Result<()> {
        self.active()?.reject(error)
    }

    pub fn is_active(&self) -> bool {
        self.state.read().is_active()
    }

    /// Returns the completion of the active interaction
    pub fn completion(&self) -> Option<Completion<T, E>> {
        self.state.read().completion().cloned()
    }

    fn active(&self) -> Result<Completion<T, E>> {
        self.completion().ok_or(crate::Error::NotInProgress)
    }

    /// Returns the host to idle, failing the outstanding future
    pub(crate) fn abandon(&self) {
        if let Some(completion) = self.state.update_if(|slot| slot.take()) {
            completion.abandon();
        }
    }

    /// Yields the active completion each time the state changes
    pub(crate) fn signal(&self) -> impl Signal<Item = Option<Completion<T, E>>> {
        self.state
            .signal()
            .map(|mut state: InteractionState<T, E>| state.take())
    }

    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        self.state.ptr_eq(&other.state)
    }
}

impl<T, E> Default for HostController<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Clone for HostController<T, E> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T, E> std::fmt::Debug for HostController<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostController")
            .field("state", &*self.state.read())
            .finish()
    }
}

type StaticChildren = Arc<dyn Fn(&mut Scope<'_>) + Send + Sync>;
type ChildrenBuilder<T, E> = Arc<dyn Fn(&mut Scope<'_>, &Completion<T, E>) + Send + Sync>;

/// Content rendered by a host while an interaction is active
pub enum Children<T, E> {
    /// Rendered as-is. Descendants reach the callbacks through
    /// [`use_response`](super::use_response).
    Static(StaticChildren),
    /// Invoked with the completion of the active interaction
    Builder(ChildrenBuilder<T, E>),
}

impl<T, E> Children<T, E> {
    fn render(&self, scope: &mut Scope<'_>, completion: &Completion<T, E>) {
        match self {
            Children::Static(render) => render(scope),
            Children::Builder(build) => build(scope, completion),
        }
    }
}

impl<T, E> Clone for Children<T, E> {
    fn clone(&self) -> Self {
        match self {
            Self::Static(v) => Self::Static(v.clone()),
            Self::Builder(v) => Self::Builder(v.clone()),
        }
    }
}

/// Renders nothing while idle, and its children while an interaction is active.
///
/// The active completion is published to all descendants for the duration of the interaction.
pub struct InteractionHost<T, E = Report> {
    children: Children<T, E>,
    handle: Option<HostHandle<T, E>>,
}

impl<T, E> InteractionHost<T, E> {
    /// Creates a host which renders `children` as-is
    pub fn new(children: impl 'static + Fn(&mut Scope<'_>) + Send + Sync) -> Self {
        Self {
            children: Children::Static(Arc::new(children)),
            handle: None,
        }
    }

    /// Creates a host which builds its children from the active completion
    pub fn builder(
        build: impl 'static + Fn(&mut Scope<'_>, &Completion<T, E>) + Send + Sync,
    ) -> Self {
        Self {
            children: Children::Builder(Arc::new(build)),
            handle: None,
        }
    }

    /// Exposes the host's controller through `handle` while mounted
    pub fn with_handle(mut self, handle: HostHandle<T, E>) -> Self {
        self.handle = Some(handle);
        self
    }
}

impl<T, E> Widget for InteractionHost<T, E>
where
    T: 'static + Send,
    E: 'static + Send,
{
    fn mount(self, scope: &mut Scope<'_>) {
        let controller = HostController::<T, E>::new();

        if let Some(handle) = &self.handle {
            handle.attach(controller.clone());
        }

        let handle = self.handle;
        let c = controller.clone();
        scope.on_cleanup(move || {
            if let Some(handle) = handle {
                handle.detach(&c);
            }

            c.abandon();
        });

        let children = self.children;
        scope.use_signal(controller.signal(), move |scope, completion| {
            scope.detach_children();

            match completion {
                Some(completion) => {
                    scope.provide_context(completion_key(), completion.clone());

                    // Rendered into their own node so that everything they attach, effects
                    // included, is unmounted with them
                    let children = children.clone();
                    scope.attach(move |scope: &mut Scope<'_>| {
                        children.render(scope, &completion)
                    });
                }
                None => {
                    scope.remove_context(completion_key::<T, E>());
                }
            }
        });
    }
}

#[cfg(test)]
mod test {
    use futures::FutureExt;

    use crate::Error;

    use super::*;

    #[derive(Debug, PartialEq, thiserror::Error)]
    enum DialogError {
        #[error("Dismissed: {0}")]
        Dismissed(String),
        #[error(transparent)]
        Host(#[from] Error),
    }

    #[test]
    fn settle_while_idle() {
        let host = HostController::<i32, DialogError>::new();

        assert_eq!(host.resolve(1), Err(Error::NotInProgress));
        assert_eq!(
            host.reject(DialogError::Dismissed("escape".into())),
            Err(Error::NotInProgress)
        );

        let interaction = host.start().unwrap();
        host.resolve(1).unwrap();
        assert_eq!(interaction.now_or_never(), Some(Ok(1)));

        assert_eq!(host.resolve(2), Err(Error::NotInProgress));
        assert!(!host.is_active());
    }

    #[test]
    fn start_twice() {
        let host = HostController::<&str, DialogError>::new();

        let mut first = host.start().unwrap();
        assert_eq!(host.start().err(), Some(Error::AlreadyInProgress));

        assert!(host.is_active());
        assert_eq!((&mut first).now_or_never(), None);

        host.resolve("first").unwrap();
        assert_eq!(first.now_or_never(), Some(Ok("first")));
    }

    #[test]
    fn values_pass_through() {
        #[derive(Debug, PartialEq)]
        struct Choice {
            id: u32,
            tags: Vec<&'static str>,
        }

        let host = HostController::<Option<Choice>, DialogError>::new();

        let interaction = host.start().unwrap();
        host.resolve(None).unwrap();
        assert_eq!(interaction.now_or_never(), Some(Ok(None)));

        let interaction = host.start().unwrap();
        host.resolve(Some(Choice {
            id: 7,
            tags: vec!["a", "b"],
        }))
        .unwrap();

        assert_eq!(
            interaction.now_or_never(),
            Some(Ok(Some(Choice {
                id: 7,
                tags: vec!["a", "b"]
            })))
        );

        let unit = HostController::<(), DialogError>::new();
        let interaction = unit.start().unwrap();
        unit.resolve(()).unwrap();
        assert_eq!(interaction.now_or_never(), Some(Ok(())));
    }

    #[test]
    fn reject_passes_error() {
        let host = HostController::<bool, DialogError>::new();

        let interaction = host.start().unwrap();
        host.reject(DialogError::Dismissed("escape".into())).unwrap();

        assert_eq!(
            interaction.now_or_never(),
            Some(Err(DialogError::Dismissed("escape".into())))
        );
        assert!(!host.is_active());
    }

    #[test]
    fn fresh_interaction_after_settle() {
        let host = HostController::<u32, DialogError>::new();

        let first = host.start().unwrap();
        let stale = host.completion().unwrap();
        host.resolve(1).unwrap();

        let mut second = host.start().unwrap();
        assert!(!stale.ptr_eq(&host.completion().unwrap()));
        assert_eq!(first.now_or_never(), Some(Ok(1)));
        assert_eq!((&mut second).now_or_never(), None);

        // A completion of a settled interaction must not settle the next one
        assert_eq!(stale.resolve(5), Err(Error::NotInProgress));
        assert!(!stale.is_live());
        assert!(host.is_active());

        host.resolve(2).unwrap();
        assert_eq!(second.now_or_never(), Some(Ok(2)));
    }

    #[test]
    fn idle_before_continuation() {
        let host = HostController::<u32, DialogError>::new();
        let interaction = host.start().unwrap();

        host.resolve(1).unwrap();

        // The future has not been polled yet, but the host already accepts a new interaction
        let next = host.start().unwrap();
        assert_eq!(interaction.now_or_never(), Some(Ok(1)));

        host.abandon();
        assert_eq!(
            next.now_or_never(),
            Some(Err(DialogError::Host(Error::HostUnmounted)))
        );
    }

    #[test]
    fn dropped_future() {
        let host = HostController::<u32>::new();
        drop(host.start().unwrap());

        assert!(host.is_active());
        host.resolve(3).unwrap();
        assert!(!host.is_active());
    }

    #[tokio::test]
    async fn await_from_task() {
        let host = HostController::<String>::new();
        let interaction = host.start().unwrap();

        let task = tokio::spawn(interaction);

        tokio::task::yield_now().await;
        host.resolve("done".into()).unwrap();

        assert_eq!(task.await.unwrap().unwrap(), "done");
    }
}
