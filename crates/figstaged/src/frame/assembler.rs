//! State machine that reassembles framed messages.

use std::fmt;
use std::mem;
use std::task::Poll;

use tracing::{debug, warn};

use super::{
    ACK_TOKEN, END_MARKER, FRAME_TARGET, FrameError, FrameSource, LENGTH_PREFIX_BYTES,
    START_MARKER,
};

/// Position of the assembler within the current message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Scanning for the start marker.
    AwaitingStart,
    /// Reading the body length.
    AwaitingLength,
    /// Reading the body.
    AwaitingBody,
    /// Reading the end marker.
    AwaitingEnd,
    /// A message was acknowledged; deciding whether another follows.
    Acked,
}

impl fmt::Display for Phase {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::AwaitingStart => "start marker",
            Self::AwaitingLength => "length prefix",
            Self::AwaitingBody => "message body",
            Self::AwaitingEnd => "end marker",
            Self::Acked => "next message",
        };
        formatter.write_str(label)
    }
}

/// Why a framed message was dropped without ending the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// The bytes after the body were not the end marker.
    EndMarkerMismatch,
    /// The body was not valid UTF-8.
    InvalidUtf8,
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndMarkerMismatch => formatter.write_str("end marker mismatch"),
            Self::InvalidUtf8 => formatter.write_str("body is not valid UTF-8"),
        }
    }
}

/// Per-message outcomes observed while a session is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    /// A message was acknowledged.
    Accepted {
        /// Body length in bytes.
        length: usize,
    },
    /// A message was dropped and scanning resumed.
    Discarded {
        /// Cause of the drop.
        reason: DiscardReason,
    },
}

/// Message bodies accepted during one connection, in receipt order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    bodies: Vec<String>,
}

impl Session {
    /// Builds a session from already accepted bodies.
    #[must_use]
    pub fn new(bodies: Vec<String>) -> Self {
        Self { bodies }
    }

    /// Accepted bodies.
    #[must_use]
    pub fn bodies(&self) -> &[String] {
        &self.bodies
    }

    /// Number of accepted messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Returns `true` when the session accepted nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Consumes the session, yielding its bodies.
    #[must_use]
    pub fn into_bodies(self) -> Vec<String> {
        self.bodies
    }
}

/// Outcome of one step of work within a poll.
enum Step {
    /// Bytes were consumed or the phase changed.
    Progress,
    /// The current phase needs more bytes than are available.
    Starved,
    /// The session is over.
    Finished,
}

/// Outcome of topping up the fixed-width scratch buffer.
enum Fill {
    Full,
    Partial,
    Starved,
    Closed,
}

/// Reassembles framed messages from a [`FrameSource`].
///
/// Every phase shares one budget of polls without progress. Consuming any
/// byte resets the count; exceeding the budget aborts the session.
#[derive(Debug)]
pub struct FrameAssembler {
    phase: Phase,
    budget: u32,
    chunk: usize,
    idle_polls: u32,
    scratch: Vec<u8>,
    expected: usize,
    body: Vec<u8>,
    accepted: Vec<String>,
    events: Vec<FrameEvent>,
}

impl FrameAssembler {
    /// Creates an assembler tolerating `budget` starved polls per phase and
    /// reading bodies in chunks of at most `chunk` bytes.
    #[must_use]
    pub fn new(budget: u32, chunk: usize) -> Self {
        Self {
            phase: Phase::AwaitingStart,
            budget,
            chunk: chunk.max(1),
            idle_polls: 0,
            scratch: Vec::with_capacity(START_MARKER.len()),
            expected: 0,
            body: Vec::new(),
            accepted: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Consecutive polls that made no progress in the current phase.
    #[must_use]
    pub fn idle_polls(&self) -> u32 {
        self.idle_polls
    }

    /// Removes and returns the events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<FrameEvent> {
        mem::take(&mut self.events)
    }

    /// Advances the session as far as the available bytes allow.
    ///
    /// Returns [`Poll::Pending`] when the current phase is short of bytes;
    /// the caller should suspend before polling again. After returning
    /// [`Poll::Ready`] the assembler is back at [`Phase::AwaitingStart`]
    /// with an empty session.
    pub fn poll<S>(&mut self, source: &mut S) -> Poll<Result<Session, FrameError>>
    where
        S: FrameSource + ?Sized,
    {
        loop {
            let step = match self.phase {
                Phase::AwaitingStart => self.scan_start(source),
                Phase::AwaitingLength => self.read_length(source),
                Phase::AwaitingBody => self.read_body(source),
                Phase::AwaitingEnd => self.read_end(source),
                Phase::Acked => self.after_ack(source),
            };
            match step {
                Ok(Step::Progress) => self.idle_polls = 0,
                Ok(Step::Starved) => return self.starve(),
                Ok(Step::Finished) => return Poll::Ready(Ok(self.finish())),
                Err(error) => {
                    self.reset();
                    return Poll::Ready(Err(error));
                }
            }
        }
    }

    fn starve(&mut self) -> Poll<Result<Session, FrameError>> {
        self.idle_polls = self.idle_polls.saturating_add(1);
        if self.idle_polls <= self.budget {
            return Poll::Pending;
        }
        let phase = self.phase;
        warn!(
            target: FRAME_TARGET,
            %phase,
            polls = self.idle_polls,
            discarded = self.accepted.len(),
            "framing timed out"
        );
        self.reset();
        Poll::Ready(Err(FrameError::Timeout { phase }))
    }

    fn finish(&mut self) -> Session {
        let session = Session::new(mem::take(&mut self.accepted));
        self.reset();
        session
    }

    fn reset(&mut self) {
        self.phase = Phase::AwaitingStart;
        self.idle_polls = 0;
        self.scratch.clear();
        self.expected = 0;
        self.body = Vec::new();
        self.accepted.clear();
    }

    fn enter(&mut self, phase: Phase) {
        self.scratch.clear();
        self.phase = phase;
    }

    /// Tops the scratch buffer up to `width` bytes, reading only when the
    /// whole remainder is available.
    fn fill<S>(&mut self, source: &mut S, width: usize) -> Result<Fill, FrameError>
    where
        S: FrameSource + ?Sized,
    {
        let have = self.scratch.len();
        let missing = width.saturating_sub(have);
        if missing == 0 {
            return Ok(Fill::Full);
        }
        let available = source.available()?;
        if available.bytes < missing {
            return Ok(if available.closed {
                Fill::Closed
            } else {
                Fill::Starved
            });
        }
        self.scratch.resize(width, 0);
        let read = match self.scratch.get_mut(have..) {
            Some(tail) => source.receive(tail)?,
            None => 0,
        };
        self.scratch.truncate(have + read);
        Ok(match read {
            0 => Fill::Starved,
            _ if self.scratch.len() == width => Fill::Full,
            _ => Fill::Partial,
        })
    }

    fn scan_start<S>(&mut self, source: &mut S) -> Result<Step, FrameError>
    where
        S: FrameSource + ?Sized,
    {
        match self.fill(source, START_MARKER.len())? {
            Fill::Closed => Ok(Step::Finished),
            Fill::Starved => Ok(Step::Starved),
            Fill::Partial => Ok(Step::Progress),
            Fill::Full if self.scratch == START_MARKER => {
                debug!(target: FRAME_TARGET, "start marker matched");
                self.enter(Phase::AwaitingLength);
                Ok(Step::Progress)
            }
            Fill::Full => {
                self.scratch.remove(0);
                Ok(Step::Progress)
            }
        }
    }

    fn read_length<S>(&mut self, source: &mut S) -> Result<Step, FrameError>
    where
        S: FrameSource + ?Sized,
    {
        match self.fill(source, LENGTH_PREFIX_BYTES)? {
            Fill::Closed => Err(FrameError::Closed { phase: self.phase }),
            Fill::Starved => Ok(Step::Starved),
            Fill::Partial => Ok(Step::Progress),
            Fill::Full => {
                let mut prefix = [0_u8; LENGTH_PREFIX_BYTES];
                prefix.copy_from_slice(&self.scratch);
                // Producers write the prefix in little-endian order.
                let length = u32::from_le_bytes(prefix);
                if length == 0 {
                    return Err(FrameError::ZeroLength);
                }
                self.expected = usize::try_from(length).unwrap_or(usize::MAX);
                debug!(target: FRAME_TARGET, length, "reading message body");
                self.body = Vec::with_capacity(self.expected.min(self.chunk));
                self.enter(Phase::AwaitingBody);
                Ok(Step::Progress)
            }
        }
    }

    fn read_body<S>(&mut self, source: &mut S) -> Result<Step, FrameError>
    where
        S: FrameSource + ?Sized,
    {
        let have = self.body.len();
        let missing = self.expected.saturating_sub(have);
        if missing == 0 {
            self.enter(Phase::AwaitingEnd);
            return Ok(Step::Progress);
        }
        let available = source.available()?;
        if available.bytes == 0 {
            if available.closed {
                return Err(FrameError::Closed { phase: self.phase });
            }
            return Ok(Step::Starved);
        }
        let take = missing.min(available.bytes).min(self.chunk);
        self.body.resize(have + take, 0);
        let read = match self.body.get_mut(have..) {
            Some(tail) => source.receive(tail)?,
            None => 0,
        };
        self.body.truncate(have + read);
        if read == 0 {
            return Ok(Step::Starved);
        }
        if self.body.len() == self.expected {
            self.enter(Phase::AwaitingEnd);
        }
        Ok(Step::Progress)
    }

    fn read_end<S>(&mut self, source: &mut S) -> Result<Step, FrameError>
    where
        S: FrameSource + ?Sized,
    {
        match self.fill(source, END_MARKER.len())? {
            Fill::Closed => Err(FrameError::Closed { phase: self.phase }),
            Fill::Starved => Ok(Step::Starved),
            Fill::Partial => Ok(Step::Progress),
            Fill::Full if self.scratch == END_MARKER => self.accept(source),
            Fill::Full => {
                warn!(
                    target: FRAME_TARGET,
                    received = %String::from_utf8_lossy(&self.scratch),
                    "end marker mismatch, discarding message"
                );
                self.discard(DiscardReason::EndMarkerMismatch);
                Ok(Step::Progress)
            }
        }
    }

    fn accept<S>(&mut self, source: &mut S) -> Result<Step, FrameError>
    where
        S: FrameSource + ?Sized,
    {
        let body = mem::take(&mut self.body);
        let Ok(text) = String::from_utf8(body) else {
            warn!(target: FRAME_TARGET, "message body is not UTF-8, discarding message");
            self.discard(DiscardReason::InvalidUtf8);
            return Ok(Step::Progress);
        };
        source.acknowledge(ACK_TOKEN)?;
        let length = text.len();
        debug!(target: FRAME_TARGET, length, "message acknowledged");
        self.accepted.push(text);
        self.events.push(FrameEvent::Accepted { length });
        self.enter(Phase::Acked);
        Ok(Step::Progress)
    }

    fn discard(&mut self, reason: DiscardReason) {
        self.body = Vec::new();
        self.expected = 0;
        self.events.push(FrameEvent::Discarded { reason });
        self.enter(Phase::AwaitingStart);
    }

    fn after_ack<S>(&mut self, source: &mut S) -> Result<Step, FrameError>
    where
        S: FrameSource + ?Sized,
    {
        if source.available()?.bytes == 0 {
            return Ok(Step::Finished);
        }
        self.enter(Phase::AwaitingStart);
        Ok(Step::Progress)
    }
}
