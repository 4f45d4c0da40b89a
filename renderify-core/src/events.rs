use crate::tree::NodeId;

#[derive(Default, PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy)]
pub enum EventState {
    #[default]
    Pending,
    Handled,
}

impl EventState {
    /// Returns `true` if the event state is [`Handled`].
    ///
    /// [`Handled`]: EventState::Handled
    #[must_use]
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled)
    }
}

pub trait EventHandler<T> {
    /// Handles an event targeted at the node `id`
    fn on_event(&mut self, id: NodeId, event: &T) -> EventState;
}

impl<F, T> EventHandler<T> for F
where
    F: FnMut(NodeId, &T) -> EventState,
{
    fn on_event(&mut self, id: NodeId, event: &T) -> EventState {
        (self)(id, event)
    }
}

/// Forwards the event out of the tree.
///
/// The event is only considered handled while the receiving side is alive.
impl<T: Clone> EventHandler<T> for flume::Sender<T> {
    fn on_event(&mut self, _: NodeId, event: &T) -> EventState {
        match self.send(event.clone()) {
            Ok(()) => EventState::Handled,
            Err(_) => EventState::Pending,
        }
    }
}

pub type BoxedEventHandler<T> = Box<dyn EventHandler<T> + Send + Sync>;

/// Emitted when a button is pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Click {
    /// The node which was clicked
    pub target: NodeId,
}
