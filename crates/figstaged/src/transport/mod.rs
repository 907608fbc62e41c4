//! Socket transport for figure producers.
//!
//! The listener binds the configured endpoint and accepts connections on a
//! background worker, one at a time. Each connection is handed to a
//! [`ConnectionHandler`]; the daemon's handler is [`SessionReceiver`], which
//! reassembles framed figures and forwards completed sessions to the stage.

mod errors;
mod handler;
mod listener;
mod receiver;
#[cfg(test)]
mod test_utils;

pub use self::errors::ListenerError;
pub use self::handler::{ConnectionHandler, ConnectionStream};
pub use self::listener::{ListenerHandle, SocketListener};
pub use self::receiver::{ReceiverSettings, SessionReceiver};
#[cfg(test)]
pub(crate) use self::test_utils::CountingHandler;

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
