use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt::Write,
};

use slotmap::{new_key_type, SlotMap};

use crate::{
    components::{OnCleanup, Tasks},
    context::ContextKey,
    events::{BoxedEventHandler, EventState},
};

new_key_type! {
    /// Identifies a mounted node in the widget tree
    pub struct NodeId;
}

/// A mounted widget
#[derive(Default)]
pub struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    name: Option<String>,
    text: Option<String>,
    contexts: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    handlers: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    pub(crate) tasks: Tasks,
    pub(crate) on_cleanup: OnCleanup,
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("name", &self.name)
            .field("text", &self.text)
            .field("contexts", &self.contexts.len())
            .finish_non_exhaustive()
    }
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub(crate) fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    pub(crate) fn insert_context<T>(&mut self, key: ContextKey<T>, value: T)
    where
        T: 'static + Send + Sync,
    {
        self.contexts.insert(key.id(), Box::new(value));
    }

    pub(crate) fn remove_context<T: 'static>(&mut self, key: ContextKey<T>) -> Option<T> {
        let value = self.contexts.remove(&key.id())?;
        value.downcast().ok().map(|v| *v)
    }

    fn context<T: 'static>(&self, key: ContextKey<T>) -> Option<&T> {
        self.contexts.get(&key.id())?.downcast_ref()
    }

    pub(crate) fn insert_handler<E: 'static>(&mut self, handler: BoxedEventHandler<E>) {
        self.handlers.insert(TypeId::of::<E>(), Box::new(handler));
    }

    fn handler_mut<E: 'static>(&mut self) -> Option<&mut BoxedEventHandler<E>> {
        self.handlers
            .get_mut(&TypeId::of::<E>())?
            .downcast_mut::<BoxedEventHandler<E>>()
    }
}

/// Arena of all mounted nodes
#[derive(Default, Debug)]
pub struct Nodes {
    inner: SlotMap<NodeId, Node>,
}

impl Nodes {
    pub fn new() -> Self {
        Default::default()
    }

    pub(crate) fn spawn(&mut self, parent: Option<NodeId>) -> NodeId {
        let id = self.inner.insert(Node {
            parent,
            ..Default::default()
        });

        if let Some(parent) = parent.and_then(|v| self.inner.get_mut(v)) {
            parent.children.push(id);
        }

        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.inner.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.inner.get_mut(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.inner.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Removes a node and all its descendants.
    ///
    /// Descendants are unmounted before their parents, and the cleanup of each node runs after its
    /// effects have been aborted.
    pub(crate) fn despawn(&mut self, id: NodeId) {
        let Some(parent) = self.inner.get(id).map(|v| v.parent) else {
            return;
        };

        if let Some(parent) = parent.and_then(|v| self.inner.get_mut(v)) {
            parent.children.retain(|&v| v != id);
        }

        self.despawn_recursive(id);
    }

    fn despawn_recursive(&mut self, id: NodeId) {
        let children = match self.inner.get_mut(id) {
            Some(node) => std::mem::take(&mut node.children),
            None => return,
        };

        for child in children {
            self.despawn_recursive(child);
        }

        if let Some(node) = self.inner.remove(id) {
            tracing::trace!(?id, name = node.name.as_deref(), "Unmounting node");
            // Abort the effects before the cleanup handlers run
            drop(node.tasks);
            drop(node.on_cleanup);
        }
    }

    /// Searches for the nearest context value, starting at `id` and walking towards the root
    pub fn find_context<T: 'static>(&self, id: NodeId, key: ContextKey<T>) -> Option<&T> {
        let mut cursor = Some(id);
        while let Some(node) = cursor.and_then(|v| self.inner.get(v)) {
            if let Some(value) = node.context(key) {
                return Some(value);
            }

            cursor = node.parent;
        }

        None
    }

    /// Returns the first node in the subtree matching `predicate`, in depth-first order
    pub fn find(&self, id: NodeId, mut predicate: impl FnMut(&Node) -> bool) -> Option<NodeId> {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let Some(node) = self.inner.get(id) else {
                continue;
            };

            if predicate(node) {
                return Some(id);
            }

            stack.extend(node.children.iter().rev());
        }

        None
    }

    /// Send an event down the tree, returning `Handled` if the event was handled by any node.
    ///
    /// Shortcuts for the first node which could handle the event, in depth-first order.
    #[tracing::instrument(level = "debug", skip(self, event))]
    pub(crate) fn send_event<E: 'static>(&mut self, id: NodeId, event: &E) -> EventState {
        let Some(node) = self.inner.get_mut(id) else {
            return EventState::Pending;
        };

        if let Some(handler) = node.handler_mut::<E>() {
            if handler.on_event(id, event).is_handled() {
                return EventState::Handled;
            }
        }

        let children = node.children.clone();
        for child in children {
            if self.send_event(child, event).is_handled() {
                return EventState::Handled;
            }
        }

        EventState::Pending
    }

    /// Formats the subtree rooted at `id`, one node per line.
    ///
    /// Nodes without a name or text are transparent and only contribute their children.
    pub fn render_tree(&self, id: NodeId) -> String {
        let mut output = String::new();
        self.render_node(id, 0, &mut output);
        output
    }

    fn render_node(&self, id: NodeId, depth: usize, output: &mut String) {
        let Some(node) = self.inner.get(id) else {
            return;
        };

        let depth = match (&node.name, &node.text) {
            (None, None) => depth,
            (name, text) => {
                let _ = write!(output, "{:indent$}", "", indent = depth * 2);
                if let Some(name) = name {
                    output.push_str(name);
                }
                if let Some(text) = text {
                    if name.is_some() {
                        output.push(' ');
                    }
                    let _ = write!(output, "{text:?}");
                }
                output.push('\n');
                depth + 1
            }
        };

        for &child in &node.children {
            self.render_node(child, depth, output);
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    crate::context! {
        theme: &'static str,
    }

    #[test]
    fn despawn_recursive() {
        let mut nodes = Nodes::new();
        let root = nodes.spawn(None);
        let child = nodes.spawn(Some(root));
        let grandchild = nodes.spawn(Some(child));

        let cleaned = Arc::new(AtomicUsize::new(0));
        for id in [child, grandchild] {
            let cleaned = cleaned.clone();
            nodes
                .get_mut(id)
                .unwrap()
                .on_cleanup
                .push(Box::new(move || {
                    cleaned.fetch_add(1, Ordering::SeqCst);
                }));
        }

        nodes.despawn(child);

        assert_eq!(cleaned.load(Ordering::SeqCst), 2);
        assert!(!nodes.contains(grandchild));
        assert!(nodes.get(root).unwrap().children().is_empty());
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn nearest_context() {
        let mut nodes = Nodes::new();
        let root = nodes.spawn(None);
        let middle = nodes.spawn(Some(root));
        let leaf = nodes.spawn(Some(middle));

        assert_eq!(nodes.find_context(leaf, theme()), None);

        nodes.get_mut(root).unwrap().insert_context(theme(), "light");
        assert_eq!(nodes.find_context(leaf, theme()), Some(&"light"));

        nodes.get_mut(middle).unwrap().insert_context(theme(), "dark");
        assert_eq!(nodes.find_context(leaf, theme()), Some(&"dark"));
        assert_eq!(nodes.find_context(root, theme()), Some(&"light"));

        assert_eq!(
            nodes.get_mut(middle).unwrap().remove_context(theme()),
            Some("dark")
        );
        assert_eq!(nodes.find_context(leaf, theme()), Some(&"light"));
    }

    #[test]
    fn render_tree() {
        let mut nodes = Nodes::new();
        let root = nodes.spawn(None);
        let dialog = nodes.spawn(Some(root));
        nodes.get_mut(dialog).unwrap().set_name("Dialog");
        let text = nodes.spawn(Some(dialog));
        nodes.get_mut(text).unwrap().set_text("Continue?");

        assert_eq!(nodes.render_tree(root), "Dialog\n  \"Continue?\"\n");
    }
}
