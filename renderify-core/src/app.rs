use futures::future::poll_fn;

use crate::{
    effect::{Executor, TaskSpawner},
    events::EventState,
    tree::{NodeId, Nodes},
    Scope, Widget,
};

/// Contains the UI state
///
/// Similar to an Html *Document*
#[derive(Debug)]
pub struct App {
    pub(crate) nodes: Nodes,
    /// Handle allowing spawning of tasks
    pub(crate) spawner: TaskSpawner<App>,
}

impl App {
    pub fn new(spawner: TaskSpawner<App>) -> Self {
        Self {
            nodes: Nodes::new(),
            spawner,
        }
    }

    /// Mounts a widget at the root of a new tree
    pub fn attach_root(&mut self, widget: impl Widget) -> NodeId {
        let mut scope = Scope::spawn(&mut self.nodes, &self.spawner, None);
        let id = scope.id();
        widget.mount(&mut scope);
        id
    }

    /// Mounts a widget as a child of `parent`
    pub fn attach(&mut self, parent: NodeId, widget: impl Widget) -> NodeId {
        let mut scope = Scope::spawn(&mut self.nodes, &self.spawner, Some(parent));
        let id = scope.id();
        widget.mount(&mut scope);
        id
    }

    /// Unmounts the node and all its descendants
    pub fn detach(&mut self, id: NodeId) {
        self.nodes.despawn(id)
    }

    /// Send an event down the tree, returning `Handled` if the event was handled by any node.
    pub fn send_event<E: 'static>(&mut self, id: NodeId, event: &E) -> EventState {
        self.nodes.send_event(id, event)
    }

    pub fn nodes(&self) -> &Nodes {
        &self.nodes
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|v| v.children()).unwrap_or_default()
    }

    pub fn render_tree(&self, id: NodeId) -> String {
        self.nodes.render_tree(id)
    }

    /// Returns the first node in the subtree with the given text, in depth-first order
    pub fn find_text(&self, id: NodeId, text: &str) -> Option<NodeId> {
        self.nodes.find(id, |node| node.text() == Some(text))
    }
}

/// Allows executing the app.
///
/// This allow executing the app, whereas the app only allows modification.
///
/// This is to avoid recursive updating, and enforcing an *ownership* of who can safely update the
/// app, and who can only act upon it.
pub struct AppExecutor {
    app: App,
    executor: Executor<App>,
}

impl std::ops::Deref for AppExecutor {
    type Target = App;

    fn deref(&self) -> &Self::Target {
        &self.app
    }
}

impl std::ops::DerefMut for AppExecutor {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.app
    }
}

impl Default for AppExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl AppExecutor {
    pub fn new() -> Self {
        let executor = Executor::new();
        let app = App::new(executor.spawner());

        Self { app, executor }
    }

    /// Updates the app by executing all pending effects
    pub fn update(&mut self) {
        self.executor.update(&mut self.app)
    }

    /// Waits until there are pending effects and executes them
    pub async fn update_async(&mut self) {
        let Self { app, executor } = self;
        poll_fn(|cx| executor.poll_update(cx, app)).await
    }

    /// Drives the app forever.
    ///
    /// Intended to be raced against the future of an interaction.
    pub async fn run(&mut self) {
        loop {
            self.update_async().await;
        }
    }

    /// Number of effects which have not yet completed
    pub fn task_count(&self) -> usize {
        self.executor.task_count()
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }
}
