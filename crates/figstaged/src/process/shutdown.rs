//! Termination signals as a pollable flag.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::flag;
use thiserror::Error;
use tracing::info;

use super::PROCESS_TARGET;

const TERMINATING: [i32; 4] = [SIGTERM, SIGINT, SIGQUIT, SIGHUP];

/// Tells the stage loop when to stop.
///
/// Polled between ticks, so `requested` must not block.
pub trait ShutdownSignal: Send + Sync {
    fn requested(&self) -> bool;
}

#[derive(Debug, Error)]
pub enum ShutdownError {
    #[error("could not register termination signal handlers: {source}")]
    Install {
        #[source]
        source: io::Error,
    },
}

/// Raised by SIGTERM, SIGINT, SIGQUIT or SIGHUP.
#[derive(Debug, Clone)]
pub struct SystemShutdownSignal {
    raised: Arc<AtomicBool>,
    announced: Arc<AtomicBool>,
}

impl SystemShutdownSignal {
    /// Registers the flag with every terminating signal.
    pub fn install() -> Result<Self, ShutdownError> {
        let raised = Arc::new(AtomicBool::new(false));
        TERMINATING
            .iter()
            .try_for_each(|&signal| flag::register(signal, Arc::clone(&raised)).map(drop))
            .map_err(|source| ShutdownError::Install { source })?;
        Ok(Self {
            raised,
            announced: Arc::new(AtomicBool::new(false)),
        })
    }
}

impl ShutdownSignal for SystemShutdownSignal {
    fn requested(&self) -> bool {
        if !self.raised.load(Ordering::SeqCst) {
            return false;
        }
        if !self.announced.swap(true, Ordering::SeqCst) {
            info!(target: PROCESS_TARGET, "termination signal received, stopping");
        }
        true
    }
}
