//! Start-up sequence run before the receiver binds.

use std::sync::Arc;

use ortho_config::OrthoError;
use thiserror::Error;

use figstage_config::{Config, OrthoConfig, SocketPreparationError};

use crate::reporter::StageReporter;
use crate::telemetry::{self, TelemetryError};

/// Source of the daemon configuration.
pub trait ConfigLoader: Send + Sync {
    /// Resolves the configuration from its layers.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Reads configuration from defaults, files, environment and arguments.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Why the daemon could not start.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("configuration could not be loaded: {source}")]
    Configuration {
        #[from]
        source: Arc<OrthoError>,
    },
    #[error("logging could not be set up: {source}")]
    Telemetry {
        #[from]
        source: TelemetryError,
    },
    #[error("receiver socket directory could not be prepared: {source}")]
    Socket {
        #[from]
        source: SocketPreparationError,
    },
}

/// A configured daemon that has not yet bound its socket.
pub struct Daemon {
    config: Config,
    reporter: Arc<dyn StageReporter>,
}

impl Daemon {
    /// The resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Reporter shared by the receiver and the stage.
    #[must_use]
    pub fn reporter(&self) -> Arc<dyn StageReporter> {
        Arc::clone(&self.reporter)
    }
}

/// Loads configuration, installs logging and readies the socket directory.
///
/// `reporter` hears about the attempt and about its outcome, whichever step
/// fails.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn StageReporter>,
) -> Result<Daemon, BootstrapError> {
    reporter.bootstrap_starting();
    match configure(loader) {
        Ok(config) => {
            reporter.bootstrap_succeeded(&config);
            Ok(Daemon { config, reporter })
        }
        Err(error) => {
            reporter.bootstrap_failed(&error);
            Err(error)
        }
    }
}

fn configure(loader: &dyn ConfigLoader) -> Result<Config, BootstrapError> {
    let config = loader.load()?;
    telemetry::initialise(&config)?;
    config.listen_socket().prepare_filesystem()?;
    Ok(config)
}
