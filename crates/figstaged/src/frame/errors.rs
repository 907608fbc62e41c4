//! Errors that abort a framing session.

use std::io;

use thiserror::Error;

use super::Phase;

/// Failures that end a session and discard every message it accepted.
///
/// A message whose end marker does not match is not an error: it is
/// reported as a [`FrameEvent::Discarded`](super::FrameEvent::Discarded) and
/// the session continues.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The poll budget ran out while waiting for bytes.
    #[error("timed out waiting for the {phase}")]
    Timeout {
        /// Phase that starved.
        phase: Phase,
    },
    /// The length prefix announced an empty body.
    #[error("length prefix announced an empty body")]
    ZeroLength,
    /// Reading from or writing to the connection failed.
    #[error("connection failed: {source}")]
    Connection {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The peer closed the connection part way through a message.
    #[error("connection closed while waiting for the {phase}")]
    Closed {
        /// Phase that was interrupted.
        phase: Phase,
    },
}

impl From<io::Error> for FrameError {
    fn from(source: io::Error) -> Self {
        Self::Connection { source }
    }
}
