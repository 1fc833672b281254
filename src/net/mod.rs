//! Network layer: binding the service socket.

pub mod listener;

pub use listener::{bind, ListenerError};
