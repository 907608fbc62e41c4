//! Failures of the figure receiver socket.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Why the receiver could not bind, start or stop.
///
/// Errors with a Unix socket path carry it already rendered for display.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("could not look up receiver host {host}:{port}: {source}")]
    Resolve {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("receiver host {host}:{port} has no addresses")]
    ResolveEmpty { host: String, port: u16 },
    #[error("receiver could not bind {addr}: {source}")]
    BindTcp {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[cfg(not(unix))]
    #[error("{endpoint} needs Unix domain sockets, which this platform lacks")]
    UnsupportedUnix { endpoint: String },
    #[cfg(unix)]
    #[error("receiver could not bind {path}: {source}")]
    BindUnix {
        path: String,
        #[source]
        source: io::Error,
    },
    /// Another receiver answered on the path.
    #[cfg(unix)]
    #[error("{path} is held by a running receiver")]
    UnixInUse { path: String },
    #[cfg(unix)]
    #[error("{path} exists and is not a socket")]
    UnixNotSocket { path: String },
    #[cfg(unix)]
    #[error("could not inspect {path}: {source}")]
    UnixMetadata {
        path: String,
        #[source]
        source: io::Error,
    },
    /// Probing the existing socket failed for a reason other than a refusal.
    #[cfg(unix)]
    #[error("could not probe existing socket {path}: {source}")]
    UnixConnect {
        path: String,
        #[source]
        source: io::Error,
    },
    #[cfg(unix)]
    #[error("could not remove stale socket {path}: {source}")]
    UnixCleanup {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("receiver socket refused non-blocking mode: {source}")]
    NonBlocking {
        #[source]
        source: io::Error,
    },
    #[error("receiver worker could not be spawned: {source}")]
    Spawn {
        #[source]
        source: io::Error,
    },
    #[error("receiver worker panicked")]
    ThreadPanic,
}
