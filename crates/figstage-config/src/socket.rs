use std::fmt;
use std::fs::DirBuilder;
use std::io;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Where the figure receiver listens.
///
/// Environment variables and flags spell it as a URL (`tcp://host:port`,
/// `unix:///path`); configuration files may also use a table tagged with
/// `transport`. Serialising always produces the table.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(try_from = "EndpointRepr", tag = "transport", rename_all = "snake_case")]
pub enum SocketEndpoint {
    Unix { path: Utf8PathBuf },
    Tcp { host: String, port: u16 },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EndpointRepr {
    Url(String),
    Table(TaggedEndpoint),
}

#[derive(Deserialize)]
#[serde(tag = "transport", rename_all = "snake_case")]
enum TaggedEndpoint {
    Unix { path: Utf8PathBuf },
    Tcp { host: String, port: u16 },
}

impl TryFrom<EndpointRepr> for SocketEndpoint {
    type Error = SocketParseError;

    fn try_from(repr: EndpointRepr) -> Result<Self, Self::Error> {
        match repr {
            EndpointRepr::Url(text) => text.parse(),
            EndpointRepr::Table(TaggedEndpoint::Unix { path }) => Ok(Self::Unix { path }),
            EndpointRepr::Table(TaggedEndpoint::Tcp { host, port }) => Ok(Self::Tcp { host, port }),
        }
    }
}

impl SocketEndpoint {
    /// Endpoint at a Unix socket path.
    #[must_use]
    pub fn unix(path: impl Into<Utf8PathBuf>) -> Self {
        Self::Unix { path: path.into() }
    }

    /// Endpoint at a TCP host and port. Port 0 asks the OS for a free port.
    #[must_use]
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp {
            host: host.into(),
            port,
        }
    }

    #[must_use]
    pub fn unix_path(&self) -> Option<&Utf8Path> {
        if let Self::Unix { path } = self {
            Some(path.as_path())
        } else {
            None
        }
    }

    /// Ensures the directory holding a Unix socket exists and is private to
    /// the daemon user. A no-op for TCP.
    pub fn prepare_filesystem(&self) -> Result<(), SocketPreparationError> {
        let Some(socket) = self.unix_path() else {
            return Ok(());
        };
        let directory = socket
            .parent()
            .filter(|dir| !dir.as_str().is_empty())
            .ok_or_else(|| SocketPreparationError::MissingParent {
                path: socket.to_owned(),
            })?;
        create_private_dir(directory).map_err(|source| SocketPreparationError::CreateDirectory {
            path: directory.to_owned(),
            source,
        })
    }
}

fn create_private_dir(directory: &Utf8Path) -> io::Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    std::os::unix::fs::DirBuilderExt::mode(&mut builder, 0o700);
    builder.create(directory)
}

impl fmt::Display for SocketEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp { host, port } => write!(f, "tcp://{host}:{port}"),
            Self::Unix { path } => write!(f, "unix://{path}"),
        }
    }
}

impl FromStr for SocketEndpoint {
    type Err = SocketParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let url = Url::parse(input)?;
        let missing = |what| SocketParseError::Incomplete {
            what,
            input: input.to_owned(),
        };
        match url.scheme() {
            "tcp" => {
                let host = url.host_str().ok_or_else(|| missing("host"))?;
                let port = url.port().ok_or_else(|| missing("port"))?;
                Ok(Self::tcp(host, port))
            }
            "unix" if matches!(url.path(), "" | "/") => Err(missing("socket path")),
            "unix" => Ok(Self::unix(url.path())),
            scheme => Err(SocketParseError::UnsupportedScheme(scheme.to_owned())),
        }
    }
}

/// Why a `tcp://` or `unix://` string was rejected.
#[derive(Debug, Error)]
pub enum SocketParseError {
    #[error("`{0}` endpoints are not supported; use tcp:// or unix://")]
    UnsupportedScheme(String),
    #[error("endpoint `{input}` has no {what}")]
    Incomplete { what: &'static str, input: String },
    #[error(transparent)]
    Url(#[from] url::ParseError),
}

/// Failure to create the directory a Unix socket lives in.
#[derive(Debug, Error)]
pub enum SocketPreparationError {
    #[error("unix socket `{path}` is not inside a directory")]
    MissingParent { path: Utf8PathBuf },
    #[error("could not create socket directory `{path}`: {source}")]
    CreateDirectory {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}
