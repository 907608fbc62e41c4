//! Process-wide `tracing` subscriber.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::subscriber::{self, SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, time::UtcTime};

use figstage_config::{Config, LogFormat};

static INSTALLED: OnceCell<()> = OnceCell::new();

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("log filter `{filter}` is not valid: {reason}")]
    Filter { filter: String, reason: String },
    #[error("another global subscriber is already installed: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Installs the stderr subscriber described by `config`.
///
/// Only the first successful call has an effect. A bad filter keeps failing
/// until a call with a valid one succeeds.
pub fn initialise(config: &Config) -> Result<(), TelemetryError> {
    INSTALLED.get_or_try_init(|| install(config)).copied()
}

fn install(config: &Config) -> Result<(), TelemetryError> {
    let filter = parse_filter(config.log_filter())?;
    let base = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_thread_names(true)
        .with_timer(UtcTime::rfc_3339());
    match config.log_format() {
        LogFormat::Json => subscriber::set_global_default(base.json().flatten_event(true).finish()),
        LogFormat::Compact => subscriber::set_global_default(base.compact().finish()),
    }?;
    Ok(())
}

fn parse_filter(directives: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directives).map_err(|error| TelemetryError::Filter {
        filter: directives.to_owned(),
        reason: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("figstaged=loudest")]
    #[case("figstaged::stage=verbose")]
    fn rejects_malformed_filter(#[case] directives: &str) {
        let error = parse_filter(directives).expect_err("filter should be rejected");
        assert!(matches!(error, TelemetryError::Filter { filter, .. } if filter == directives));
    }

    #[rstest]
    fn accepts_target_directives() {
        parse_filter("info,figstaged::stage=debug").expect("filter should parse");
    }
}
