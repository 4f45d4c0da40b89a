use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("An interaction is already in progress on this host")]
    AlreadyInProgress,
    #[error("No interaction is in progress")]
    NotInProgress,
    #[error("The interaction host is not mounted. Wait for the next render before triggering")]
    NotMounted,
    #[error("The interaction host was unmounted before the interaction settled")]
    HostUnmounted,
    #[error("No active interaction encloses this widget")]
    NoActiveInteraction,
}

pub type Result<T> = std::result::Result<T, Error>;
