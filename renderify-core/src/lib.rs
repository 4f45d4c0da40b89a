mod app;
mod components;
pub mod context;
pub mod effect;
mod error;
pub mod events;
pub mod interaction;
mod scope;
pub mod signal;
pub mod tree;
pub mod widget;

pub use app::*;
pub use error::Error;
pub use interaction::{
    use_response, Completion, HostController, HostHandle, Interaction, InteractionHost,
    Requestor, Response,
};
pub use scope::*;
pub use widget::Widget;
