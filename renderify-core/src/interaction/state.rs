use super::Completion;

/// The pending-interaction slot of a host.
///
/// The resolve and reject callbacks live in the same [`Completion`], so they are always present
/// or absent together.
pub enum InteractionState<T, E> {
    Idle,
    Active(Completion<T, E>),
}

impl<T, E> InteractionState<T, E> {
    /// Returns `true` while an interaction is awaiting completion
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    pub fn completion(&self) -> Option<&Completion<T, E>> {
        match self {
            Self::Idle => None,
            Self::Active(v) => Some(v),
        }
    }

    pub(crate) fn take(&mut self) -> Option<Completion<T, E>> {
        match std::mem::replace(self, Self::Idle) {
            Self::Idle => None,
            Self::Active(v) => Some(v),
        }
    }
}

impl<T, E> Default for InteractionState<T, E> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T, E> Clone for InteractionState<T, E> {
    fn clone(&self) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::Active(v) => Self::Active(v.clone()),
        }
    }
}

impl<T, E> std::fmt::Debug for InteractionState<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Active(v) => f.debug_tuple("Active").field(v).finish(),
        }
    }
}
