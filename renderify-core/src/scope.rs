use std::task::{Context, Poll};

use futures::{Future, Stream};
use pin_project::pin_project;

use crate::{
    context::ContextKey,
    effect::{Effect, FutureEffect, SignalEffect, StreamEffect, TaskSpawner},
    events::{EventHandler, EventState},
    signal::Signal,
    tree::{Node, NodeId, Nodes},
    App, Widget,
};

/// Represents the scope of a widget.
pub struct Scope<'a> {
    nodes: &'a mut Nodes,
    spawner: &'a TaskSpawner<App>,
    id: NodeId,
}

impl<'a> Scope<'a> {
    /// Creates a new scope
    pub(crate) fn spawn(
        nodes: &'a mut Nodes,
        spawner: &'a TaskSpawner<App>,
        parent: Option<NodeId>,
    ) -> Self {
        let id = nodes.spawn(parent);
        Self { nodes, spawner, id }
    }

    /// Reconstruct the scope for a node
    fn reconstruct(nodes: &'a mut Nodes, spawner: &'a TaskSpawner<App>, id: NodeId) -> Option<Self> {
        if !nodes.contains(id) {
            return None;
        }

        Some(Self { nodes, spawner, id })
    }

    pub fn use_signal<S, F>(&mut self, signal: S, func: F)
    where
        S: 'static + Signal,
        F: 'static + FnMut(&mut Scope<'_>, S::Item),
    {
        self.use_effect(SignalEffect::new(signal, func))
    }

    pub fn use_future<Fut, F>(&mut self, fut: Fut, func: F)
    where
        Fut: 'static + Future,
        F: 'static + FnOnce(&mut Scope<'_>, Fut::Output),
    {
        self.use_effect(FutureEffect::new(fut, func))
    }

    pub fn use_stream<S, F>(&mut self, stream: S, func: F)
    where
        S: 'static + Stream,
        F: 'static + FnMut(&mut Scope<'_>, S::Item),
    {
        self.use_effect(StreamEffect::new(stream, func))
    }

    /// Spawns the effect inside the given scope.
    ///
    /// The effect is aborted when the node is unmounted.
    pub fn use_effect<E>(&mut self, effect: E)
    where
        E: 'static + for<'x> Effect<Scope<'x>>,
    {
        // lift App => Scope
        let effect = MapContextScope { id: self.id, effect };

        let handle = self.spawner.spawn(effect);

        if let Some(node) = self.nodes.get_mut(self.id) {
            node.tasks.push(handle);
        }
    }

    /// Runs `func` when the node is unmounted
    pub fn on_cleanup(&mut self, func: impl 'static + FnOnce() + Send + Sync) -> &mut Self {
        if let Some(node) = self.nodes.get_mut(self.id) {
            node.on_cleanup.push(Box::new(func));
        }
        self
    }

    /// Listens to events of type `E` which are sent to this node or any of its ancestors
    pub fn on_event<E: 'static>(
        &mut self,
        handler: impl 'static + EventHandler<E> + Send + Sync,
    ) -> &mut Self {
        if let Some(node) = self.nodes.get_mut(self.id) {
            node.insert_handler::<E>(Box::new(handler));
        }
        self
    }

    /// Dispatches an event to the subtree rooted at `target`
    pub fn send_event<E: 'static>(&mut self, target: NodeId, event: &E) -> EventState {
        self.nodes.send_event(target, event)
    }

    /// Publishes a context value to this node and all its descendants
    pub fn provide_context<T>(&mut self, key: ContextKey<T>, value: T) -> &mut Self
    where
        T: 'static + Send + Sync,
    {
        if let Some(node) = self.nodes.get_mut(self.id) {
            node.insert_context(key, value);
        }
        self
    }

    pub fn remove_context<T: 'static>(&mut self, key: ContextKey<T>) -> Option<T> {
        self.nodes.get_mut(self.id)?.remove_context(key)
    }

    /// Returns the nearest provided context value, searching from this node towards the root
    pub fn get_context<T: 'static>(&self, key: ContextKey<T>) -> Option<&T> {
        self.nodes.find_context(self.id, key)
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        if let Some(node) = self.nodes.get_mut(self.id) {
            node.set_name(name);
        }
        self
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        if let Some(node) = self.nodes.get_mut(self.id) {
            node.set_text(text);
        }
        self
    }

    /// Mounts a widget as a new child of this node
    pub fn attach<W: Widget>(&mut self, widget: W) -> NodeId {
        let mut child_scope = Scope::spawn(self.nodes, self.spawner, Some(self.id));
        let id = child_scope.id();

        widget.mount(&mut child_scope);
        id
    }

    /// Unmounts a node and all of its descendants
    pub fn detach(&mut self, id: NodeId) {
        self.nodes.despawn(id)
    }

    /// Unmounts every child of this node
    pub fn detach_children(&mut self) {
        let children = self
            .nodes
            .get(self.id)
            .map(|v| v.children().to_vec())
            .unwrap_or_default();

        for child in children {
            self.nodes.despawn(child);
        }
    }

    /// Returns the node id
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the underlying node for the scope
    pub fn node(&self) -> Option<&Node> {
        self.nodes.get(self.id)
    }

    /// Returns the whole tree
    pub fn nodes(&self) -> &Nodes {
        self.nodes
    }
}

/// Lifts a scope local effect to the app.
#[pin_project]
struct MapContextScope<E> {
    #[pin]
    effect: E,
    id: NodeId,
}

impl<E> Effect<App> for MapContextScope<E>
where
    E: for<'x> Effect<Scope<'x>>,
{
    fn poll_effect(self: std::pin::Pin<&mut Self>, app: &mut App, async_cx: &mut Context<'_>) -> Poll<()> {
        let p = self.project();
        let nodes = &mut app.nodes;
        let spawner = &app.spawner;

        if let Some(mut scope) = Scope::reconstruct(nodes, spawner, *p.id) {
            p.effect.poll_effect(&mut scope, async_cx)
        } else {
            Poll::Ready(())
        }
    }
}
