//! Accepted producer connections and the trait that serves them.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::sync::atomic::AtomicBool;

#[cfg(unix)]
use std::os::unix::net::UnixStream;

/// One producer connection, over TCP or a Unix domain socket.
#[derive(Debug)]
pub enum ConnectionStream {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

/// Forwards a method call to whichever socket the stream wraps.
macro_rules! on_socket {
    ($stream:expr, $socket:ident => $call:expr) => {
        match $stream {
            ConnectionStream::Tcp($socket) => $call,
            #[cfg(unix)]
            ConnectionStream::Unix($socket) => $call,
        }
    };
}

impl ConnectionStream {
    /// Reads return `WouldBlock` instead of waiting when `nonblocking` is set.
    pub fn set_nonblocking(&self, nonblocking: bool) -> io::Result<()> {
        on_socket!(self, socket => socket.set_nonblocking(nonblocking))
    }

    /// Producer label used in log fields.
    #[must_use]
    pub fn peer(&self) -> String {
        match self {
            Self::Tcp(socket) => socket
                .peer_addr()
                .map_or_else(|_| "tcp://unknown".to_owned(), |addr| format!("tcp://{addr}")),
            #[cfg(unix)]
            Self::Unix(_) => "unix".to_owned(),
        }
    }
}

impl Read for ConnectionStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        on_socket!(self, socket => socket.read(buf))
    }
}

impl Write for ConnectionStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        on_socket!(self, socket => socket.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        on_socket!(self, socket => socket.flush())
    }
}

/// Serves accepted connections on the receiver worker.
///
/// The worker accepts nothing else until `handle` returns, so a handler owns
/// the socket for the whole session. It should return promptly once
/// `shutdown` is set.
pub trait ConnectionHandler: Send + Sync + 'static {
    /// Runs one connection to completion.
    fn handle(&self, stream: ConnectionStream, shutdown: &AtomicBool);
}
