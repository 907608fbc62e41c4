use crate::logging::LogFormat;
use crate::socket::SocketEndpoint;

/// Port the figure producer connects to by default.
pub const DEFAULT_TCP_PORT: u16 = 21241;

/// Default log filter expression used by the daemon.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Suspension between non-blocking polls, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Polls without progress tolerated in each read phase.
pub const DEFAULT_TIMEOUT_POLLS: u32 = 100;

/// Upper bound on one body read from the connection.
pub const DEFAULT_RECEIVE_CHUNK_BYTES: usize = 1 << 15;

/// Fractional spacing left between placed figures.
pub const DEFAULT_SPACING_MARGIN: f64 = 0.1;

/// Figure pixels per native placement unit.
pub const DEFAULT_PIXELS_PER_UNIT: f64 = 1000.0;

/// Viewer height in native units.
pub const DEFAULT_VIEWER_HEIGHT: f64 = 1.6;

/// Distance between the viewer and the layout origin below it.
pub const LAYOUT_ORIGIN_DROP: f64 = 0.4;

/// Default log filter expression used by the daemon.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub(crate) fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the daemon.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Loopback TCP endpoint the producer expects.
#[must_use]
pub fn default_socket_endpoint() -> SocketEndpoint {
    SocketEndpoint::tcp("127.0.0.1", DEFAULT_TCP_PORT)
}
