//! Socket listener that feeds accepted figure connections to a handler.

use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use figstage_config::SocketEndpoint;
use tracing::{debug, info, warn};

use super::{ConnectionHandler, ConnectionStream, LISTENER_TARGET, ListenerError};

#[cfg(unix)]
use std::os::unix::net::UnixListener;

/// Sleep between accept attempts while no client is waiting.
const IDLE_WAIT: Duration = Duration::from_millis(25);
/// Sleep after a failed accept.
const FAILURE_WAIT: Duration = Duration::from_millis(150);
const WORKER_NAME: &str = "figure-receiver";

/// Bound socket waiting to be started.
#[derive(Debug)]
pub struct SocketListener {
    endpoint: SocketEndpoint,
    acceptor: Acceptor,
}

/// The OS listener behind a [`SocketListener`].
#[derive(Debug)]
enum Acceptor {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(UnixListener),
}

impl Acceptor {
    fn open(endpoint: &SocketEndpoint) -> Result<Self, ListenerError> {
        match endpoint {
            SocketEndpoint::Tcp { host, port } => open_tcp(host, *port).map(Self::Tcp),
            #[cfg(unix)]
            SocketEndpoint::Unix { path } => unix::open(path.as_std_path()).map(Self::Unix),
            #[cfg(not(unix))]
            SocketEndpoint::Unix { .. } => Err(ListenerError::UnsupportedUnix {
                endpoint: endpoint.to_string(),
            }),
        }
    }

    fn make_nonblocking(&self) -> io::Result<()> {
        match self {
            Self::Tcp(inner) => inner.set_nonblocking(true),
            #[cfg(unix)]
            Self::Unix(inner) => inner.set_nonblocking(true),
        }
    }

    /// `Ok(None)` when nobody is waiting to connect.
    fn next_client(&self) -> io::Result<Option<ConnectionStream>> {
        let accepted = match self {
            Self::Tcp(inner) => inner
                .accept()
                .map(|(stream, _)| ConnectionStream::Tcp(stream)),
            #[cfg(unix)]
            Self::Unix(inner) => inner
                .accept()
                .map(|(stream, _)| ConnectionStream::Unix(stream)),
        };
        match accepted {
            Ok(stream) => Ok(Some(stream)),
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(error) => Err(error),
        }
    }
}

impl SocketListener {
    /// Binds `endpoint`, replacing a stale Unix socket file if needed.
    pub fn bind(endpoint: &SocketEndpoint) -> Result<Self, ListenerError> {
        let acceptor = Acceptor::open(endpoint)?;
        Ok(Self {
            endpoint: endpoint.clone(),
            acceptor,
        })
    }

    /// Bound TCP address; `None` for Unix sockets.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.acceptor {
            Acceptor::Tcp(inner) => inner.local_addr().ok(),
            #[cfg(unix)]
            Acceptor::Unix(_) => None,
        }
    }

    /// Moves the listener onto its worker thread and starts accepting.
    pub fn start(
        self,
        handler: Arc<dyn ConnectionHandler>,
    ) -> Result<ListenerHandle, ListenerError> {
        if let Err(source) = self.acceptor.make_nonblocking() {
            self.release_socket_file();
            return Err(ListenerError::NonBlocking { source });
        }
        let stop = Arc::new(AtomicBool::new(false));
        let worker_stop = Arc::clone(&stop);
        let worker = thread::Builder::new()
            .name(WORKER_NAME.to_owned())
            .spawn(move || self.serve(&worker_stop, handler.as_ref()))
            .map_err(|source| ListenerError::Spawn { source })?;
        Ok(ListenerHandle {
            stop,
            worker: Some(worker),
        })
    }

    /// Serves one client at a time until `stop` is raised.
    fn serve(self, stop: &AtomicBool, handler: &dyn ConnectionHandler) {
        info!(
            target: LISTENER_TARGET,
            endpoint = %self.endpoint,
            "figure receiver listening"
        );
        let mut reported = None::<io::ErrorKind>;
        while !stop.load(Ordering::SeqCst) {
            let wait = match self.acceptor.next_client() {
                Ok(Some(stream)) => {
                    reported = None;
                    handler.handle(stream, stop);
                    debug!(target: LISTENER_TARGET, "client done, receiver idle");
                    continue;
                }
                Ok(None) => IDLE_WAIT,
                Err(error) => {
                    // Repeated failures of one kind are logged once.
                    if reported.replace(error.kind()) != Some(error.kind()) {
                        warn!(
                            target: LISTENER_TARGET,
                            error = %error,
                            "receiver could not accept a client"
                        );
                    }
                    FAILURE_WAIT
                }
            };
            thread::sleep(wait);
        }
        self.release_socket_file();
        info!(target: LISTENER_TARGET, "figure receiver stopped");
    }

    fn release_socket_file(&self) {
        #[cfg(unix)]
        if let Some(path) = self.endpoint.unix_path() {
            unix::remove_quietly(path.as_std_path());
        }
    }
}

/// Owner of the running receiver thread.
///
/// Dropping the handle asks the worker to stop but does not wait for it.
#[derive(Debug)]
pub struct ListenerHandle {
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl ListenerHandle {
    /// Asks the worker to stop after the current poll.
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Waits for the worker to exit.
    pub fn join(mut self) -> Result<(), ListenerError> {
        self.worker
            .take()
            .map_or(Ok(()), |worker| worker.join().map_err(|_| ListenerError::ThreadPanic))
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn open_tcp(host: &str, port: u16) -> Result<TcpListener, ListenerError> {
    let addr = (host, port)
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            host: host.to_owned(),
            port,
            source,
        })?
        .next()
        .ok_or_else(|| ListenerError::ResolveEmpty {
            host: host.to_owned(),
            port,
        })?;
    TcpListener::bind(addr).map_err(|source| ListenerError::BindTcp { addr, source })
}

#[cfg(unix)]
mod unix {
    use std::fs;
    use std::io::ErrorKind;
    use std::os::unix::fs::FileTypeExt;
    use std::os::unix::net::{UnixListener, UnixStream};
    use std::path::Path;

    use tracing::{debug, warn};

    use super::{LISTENER_TARGET, ListenerError};

    /// Binds `path` after clearing a socket file left behind by a dead receiver.
    pub(super) fn open(path: &Path) -> Result<UnixListener, ListenerError> {
        let label = path.display().to_string();
        match fs::symlink_metadata(path) {
            Ok(metadata) if !metadata.file_type().is_socket() => {
                return Err(ListenerError::UnixNotSocket { path: label });
            }
            Ok(_) => reclaim(path, &label)?,
            Err(error) if error.kind() == ErrorKind::NotFound => {}
            Err(source) => return Err(ListenerError::UnixMetadata { path: label, source }),
        }
        UnixListener::bind(path).map_err(|source| ListenerError::BindUnix { path: label, source })
    }

    /// A socket nobody answers on is stale; one that answers belongs to a
    /// live receiver and is left alone.
    fn reclaim(path: &Path, label: &str) -> Result<(), ListenerError> {
        match UnixStream::connect(path) {
            Ok(_) => Err(ListenerError::UnixInUse {
                path: label.to_owned(),
            }),
            Err(error)
                if matches!(error.kind(), ErrorKind::ConnectionRefused | ErrorKind::NotFound) =>
            {
                debug!(target: LISTENER_TARGET, path = label, "removing stale receiver socket");
                fs::remove_file(path).map_err(|source| ListenerError::UnixCleanup {
                    path: label.to_owned(),
                    source,
                })
            }
            Err(source) => Err(ListenerError::UnixConnect {
                path: label.to_owned(),
                source,
            }),
        }
    }

    pub(super) fn remove_quietly(path: &Path) {
        if let Err(error) = fs::remove_file(path)
            && error.kind() != ErrorKind::NotFound
        {
            warn!(
                target: LISTENER_TARGET,
                error = %error,
                path = %path.display(),
                "receiver socket file was left behind"
            );
        }
    }
}
