//! Connection handler that turns framed figures into stage sessions.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::task::Poll;
use std::thread;
use std::time::Duration;

use figstage_config::Config;
use tracing::{debug, warn};

use super::{ConnectionHandler, ConnectionStream, LISTENER_TARGET};
use crate::frame::{FrameAssembler, FrameEvent, Session, StreamSource};
use crate::reporter::StageReporter;

/// Tunables for one receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverSettings {
    /// Consecutive starved polls tolerated before a session times out.
    pub timeout_polls: u32,
    /// Largest number of bytes read per poll.
    pub chunk: usize,
    /// Delay between polls while waiting for data.
    pub poll_interval: Duration,
}

impl ReceiverSettings {
    /// Reads the receiver tunables from configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout_polls: config.timeout_polls(),
            chunk: config.receive_chunk_bytes(),
            poll_interval: config.poll_interval(),
        }
    }
}

/// Reassembles each connection into a [`Session`] and hands it to the stage.
///
/// A connection carries exactly one session. Sessions that end cleanly are
/// forwarded when they hold at least one message; aborted sessions are
/// dropped whole.
pub struct SessionReceiver {
    settings: ReceiverSettings,
    sessions: Sender<Session>,
    reporter: Arc<dyn StageReporter>,
}

impl SessionReceiver {
    /// Builds a receiver from configuration.
    #[must_use]
    pub fn new(
        config: &Config,
        sessions: Sender<Session>,
        reporter: Arc<dyn StageReporter>,
    ) -> Self {
        Self::with_settings(ReceiverSettings::from_config(config), sessions, reporter)
    }

    /// Builds a receiver with explicit settings.
    #[must_use]
    pub fn with_settings(
        settings: ReceiverSettings,
        sessions: Sender<Session>,
        reporter: Arc<dyn StageReporter>,
    ) -> Self {
        Self {
            settings,
            sessions,
            reporter,
        }
    }

    fn forward_events(&self, assembler: &mut FrameAssembler) {
        for event in assembler.take_events() {
            match event {
                FrameEvent::Accepted { length } => {
                    debug!(target: LISTENER_TARGET, length, "message acknowledged");
                }
                FrameEvent::Discarded { reason } => self.reporter.message_discarded(reason),
            }
        }
    }
}

impl ConnectionHandler for SessionReceiver {
    fn handle(&self, stream: ConnectionStream, shutdown: &AtomicBool) {
        let peer = stream.peer();
        if let Err(error) = stream.set_nonblocking(true) {
            warn!(
                target: LISTENER_TARGET,
                peer = %peer,
                error = %error,
                "failed to switch connection to non-blocking mode"
            );
            return;
        }
        self.reporter.session_accepted(&peer);

        let mut source = StreamSource::new(stream, self.settings.chunk);
        let mut assembler = FrameAssembler::new(self.settings.timeout_polls, self.settings.chunk);
        let outcome = loop {
            if shutdown.load(Ordering::SeqCst) {
                debug!(
                    target: LISTENER_TARGET,
                    peer = %peer,
                    phase = %assembler.phase(),
                    "shutdown requested, dropping session"
                );
                return;
            }
            let poll = assembler.poll(&mut source);
            self.forward_events(&mut assembler);
            match poll {
                Poll::Ready(outcome) => break outcome,
                Poll::Pending => thread::sleep(self.settings.poll_interval),
            }
        };

        match outcome {
            Ok(session) => {
                self.reporter.session_completed(session.len());
                if session.is_empty() {
                    return;
                }
                if self.sessions.send(session).is_err() {
                    warn!(
                        target: LISTENER_TARGET,
                        peer = %peer,
                        "stage stopped before the session could be delivered"
                    );
                }
            }
            Err(error) => self.reporter.session_aborted(&error),
        }
    }
}
