//! TCP listener lifecycle and the handler boundary.

pub mod handler;
pub mod listener;

pub use handler::{Handler, HandlerError};
pub use listener::{Server, ServerError};
