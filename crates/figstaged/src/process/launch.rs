//! Supervises daemon launch sequencing and the stage loop.

use std::sync::{Arc, mpsc};
use std::thread;

use tracing::info;

use crate::StructuredStageReporter;
use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::reporter::StageReporter;
use crate::stage::Stage;
use crate::transport::{SessionReceiver, SocketListener};

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Runs the daemon using the production collaborators.
pub fn run_daemon() -> Result<(), LaunchError> {
    let shutdown = SystemShutdownSignal::install()?;
    let reporter = Arc::new(StructuredStageReporter::new());
    run_daemon_with(&SystemConfigLoader, reporter, &shutdown)
}

/// Runs the daemon with injected collaborators until `shutdown` fires.
///
/// The receiver runs on its own worker and hands completed sessions to the
/// stage over a channel. This thread owns the stage and ticks it once per
/// configured poll interval.
pub fn run_daemon_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn StageReporter>,
    shutdown: &dyn ShutdownSignal,
) -> Result<(), LaunchError> {
    let daemon = bootstrap_with(loader, reporter)?;
    let config = daemon.config();
    let listener = SocketListener::bind(config.listen_socket())?;

    let (sender, sessions) = mpsc::channel();
    let receiver = SessionReceiver::new(config, sender, daemon.reporter());
    let listener_handle = listener.start(Arc::new(receiver))?;
    let mut stage = Stage::new(config, sessions, daemon.reporter());
    info!(
        target: PROCESS_TARGET,
        endpoint = %config.listen_socket(),
        strategy = stage.coordinator().strategy_name(),
        "stage ready"
    );

    let interval = config.poll_interval();
    while !shutdown.requested() {
        stage.tick();
        thread::sleep(interval);
    }

    listener_handle.shutdown();
    listener_handle.join()?;
    info!(
        target: PROCESS_TARGET,
        scenes = stage.registry().len(),
        "shutdown sequence completed"
    );
    Ok(())
}
