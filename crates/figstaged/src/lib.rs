//! Receiving daemon for figstage.
//!
//! `figstaged` accepts figure documents from producer processes over a
//! socket, decodes each into a scene graph, resolves every node's geometry
//! into native space and places the finished scenes so they never overlap.
//!
//! The daemon is split across two threads. The transport worker owns the
//! socket: it reassembles framed messages with [`frame::FrameAssembler`],
//! acknowledges each one and forwards completed sessions over a channel.
//! The main thread owns the [`Stage`], which ticks at the configured poll
//! interval. Each tick decodes newly received sessions, retries resolution
//! of pending scenes and advances the current rearrangement pass by one
//! placement, so no tick ever blocks on a slow producer or a long search.
//!
//! Lifecycle events flow through a [`StageReporter`]. The default
//! [`StructuredStageReporter`] writes them as `tracing` events.

mod arrange;
mod bootstrap;
pub mod frame;
mod process;
mod registry;
mod reporter;
mod stage;
pub mod telemetry;
mod transport;

pub use arrange::{ArrangeCoordinator, ArrangeStep};
pub use bootstrap::{BootstrapError, ConfigLoader, Daemon, SystemConfigLoader, bootstrap_with};
pub use process::{
    LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_daemon, run_daemon_with,
};
pub use registry::{PARK_POSITION, SceneEntry, SceneId, SceneRegistry};
pub use reporter::{StageReporter, StructuredStageReporter};
pub use stage::{Stage, TickSummary};
pub use telemetry::TelemetryError;
pub use transport::{
    ConnectionHandler, ConnectionStream, ListenerError, ListenerHandle, ReceiverSettings,
    SessionReceiver, SocketListener,
};

#[cfg(test)]
mod tests;
