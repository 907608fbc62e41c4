//! Shared configuration for the figstage daemon.
//!
//! Configuration is layered by [`ortho_config`]: built-in defaults, then a
//! configuration file, then `FIGSTAGE_*` environment variables, then
//! command-line flags. The resulting [`Config`] drives the socket receiver,
//! the frame assembler's poll budget, telemetry, and the placement engine.

mod defaults;
mod layout;
mod logging;
mod socket;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_PIXELS_PER_UNIT, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_RECEIVE_CHUNK_BYTES, DEFAULT_SPACING_MARGIN, DEFAULT_TCP_PORT, DEFAULT_TIMEOUT_POLLS,
    DEFAULT_VIEWER_HEIGHT, LAYOUT_ORIGIN_DROP, default_log_filter, default_log_format,
    default_socket_endpoint,
};
pub use ortho_config::{OrthoConfig, OrthoError};

pub use layout::{LayoutStrategy, RearrangeScope};
pub use logging::{LogFormat, LogFormatParseError};
pub use socket::{SocketEndpoint, SocketParseError, SocketPreparationError};

/// Resolved daemon configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "FIGSTAGE")]
pub struct Config {
    /// Endpoint the figure receiver listens on.
    #[ortho_config(default = defaults::default_socket_endpoint())]
    pub listen_socket: SocketEndpoint,
    /// `tracing` filter expression.
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Output format for telemetry.
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
    /// Milliseconds to suspend between non-blocking polls.
    #[ortho_config(default = DEFAULT_POLL_INTERVAL_MS)]
    pub poll_interval_ms: u64,
    /// Polls without progress tolerated in one read phase.
    #[ortho_config(default = DEFAULT_TIMEOUT_POLLS)]
    pub timeout_polls: u32,
    /// Upper bound on a single body read.
    #[ortho_config(default = DEFAULT_RECEIVE_CHUNK_BYTES)]
    pub receive_chunk_bytes: usize,
    /// Placement strategy used by rearrangement passes.
    #[ortho_config(default = LayoutStrategy::Grid)]
    pub layout_strategy: LayoutStrategy,
    /// Which scenes a rearrangement pass re-places.
    #[ortho_config(default = RearrangeScope::All)]
    pub rearrange_scope: RearrangeScope,
    /// Fractional inflation of a candidate box during collision tests.
    #[ortho_config(default = DEFAULT_SPACING_MARGIN)]
    pub spacing_margin: f64,
    /// Figure pixels per native placement unit.
    #[ortho_config(default = DEFAULT_PIXELS_PER_UNIT)]
    pub pixels_per_unit: f64,
    /// Height of the viewer in native units.
    #[ortho_config(default = DEFAULT_VIEWER_HEIGHT)]
    pub viewer_height: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_socket: default_socket_endpoint(),
            log_filter: defaults::default_log_filter_string(),
            log_format: default_log_format(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            timeout_polls: DEFAULT_TIMEOUT_POLLS,
            receive_chunk_bytes: DEFAULT_RECEIVE_CHUNK_BYTES,
            layout_strategy: LayoutStrategy::Grid,
            rearrange_scope: RearrangeScope::All,
            spacing_margin: DEFAULT_SPACING_MARGIN,
            pixels_per_unit: DEFAULT_PIXELS_PER_UNIT,
            viewer_height: DEFAULT_VIEWER_HEIGHT,
        }
    }
}

impl Config {
    /// Endpoint the receiver binds.
    #[must_use]
    pub fn listen_socket(&self) -> &SocketEndpoint {
        &self.listen_socket
    }

    /// Log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Telemetry output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Suspension between polls as a [`Duration`].
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Poll budget per read phase.
    #[must_use]
    pub fn timeout_polls(&self) -> u32 {
        self.timeout_polls
    }

    /// Maximum bytes per body read, never below one.
    #[must_use]
    pub fn receive_chunk_bytes(&self) -> usize {
        self.receive_chunk_bytes.max(1)
    }

    /// Placement strategy selector.
    #[must_use]
    pub fn layout_strategy(&self) -> LayoutStrategy {
        self.layout_strategy
    }

    /// Rearrangement scope.
    #[must_use]
    pub fn rearrange_scope(&self) -> RearrangeScope {
        self.rearrange_scope
    }

    /// Collision spacing margin.
    #[must_use]
    pub fn spacing_margin(&self) -> f64 {
        self.spacing_margin
    }

    /// Figure scale in pixels per native unit.
    #[must_use]
    pub fn pixels_per_unit(&self) -> f64 {
        self.pixels_per_unit
    }

    /// Origin of the placement search space in native units.
    ///
    /// The origin sits [`LAYOUT_ORIGIN_DROP`] below the viewer.
    #[must_use]
    pub fn layout_origin(&self) -> [f64; 3] {
        [0.0, self.viewer_height - LAYOUT_ORIGIN_DROP, 0.0]
    }
}
