//! Byte sources the assembler reads from.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::thread;

use super::{END_MARKER, LENGTH_PREFIX_BYTES, START_MARKER};

/// The assembler reads each marker and the length prefix only once all of it
/// is buffered, so read-ahead never drops below the widest of them.
const MIN_READ_AHEAD: usize = max_width(START_MARKER.len(), END_MARKER.len(), LENGTH_PREFIX_BYTES);

const fn max_width(first: usize, second: usize, third: usize) -> usize {
    let widest = if first > second { first } else { second };
    if widest > third { widest } else { third }
}

/// Bytes ready to be received without blocking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    /// Bytes [`FrameSource::receive`] can return right now.
    pub bytes: usize,
    /// `true` once the peer has closed; no further bytes will arrive.
    pub closed: bool,
}

impl Availability {
    /// More bytes may still arrive.
    #[must_use]
    pub const fn open(bytes: usize) -> Self {
        Self {
            bytes,
            closed: false,
        }
    }

    /// Only `bytes` remain before the end of the stream.
    #[must_use]
    pub const fn closed(bytes: usize) -> Self {
        Self {
            bytes,
            closed: true,
        }
    }
}

/// Non-blocking access to one connection.
pub trait FrameSource {
    /// Reports how many bytes [`FrameSource::receive`] can return right now.
    fn available(&mut self) -> io::Result<Availability>;

    /// Copies up to `buffer.len()` available bytes into `buffer`.
    ///
    /// Never blocks; returns the number of bytes copied.
    fn receive(&mut self, buffer: &mut [u8]) -> io::Result<usize>;

    /// Writes an acknowledgement token back to the peer.
    fn acknowledge(&mut self, token: &[u8]) -> io::Result<()>;
}

impl<T: FrameSource + ?Sized> FrameSource for &mut T {
    fn available(&mut self) -> io::Result<Availability> {
        (**self).available()
    }

    fn receive(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        (**self).receive(buffer)
    }

    fn acknowledge(&mut self, token: &[u8]) -> io::Result<()> {
        (**self).acknowledge(token)
    }
}

/// [`FrameSource`] over a stream switched to non-blocking mode.
///
/// Sockets offer no portable "bytes available" query, so the source reads
/// ahead into its own buffer, at most `read_ahead` bytes per availability
/// check. Read-ahead is raised to the widest frame marker when smaller.
#[derive(Debug)]
pub struct StreamSource<S> {
    stream: S,
    buffered: VecDeque<u8>,
    scratch: Vec<u8>,
    closed: bool,
}

impl<S> StreamSource<S> {
    /// Wraps a non-blocking stream.
    pub fn new(stream: S, read_ahead: usize) -> Self {
        Self {
            stream,
            buffered: VecDeque::new(),
            scratch: vec![0; read_ahead.max(MIN_READ_AHEAD)],
            closed: false,
        }
    }

    /// Returns the wrapped stream, dropping any unread bytes.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read + Write> StreamSource<S> {
    fn fill(&mut self) -> io::Result<()> {
        if self.closed || self.buffered.len() >= self.scratch.len() {
            return Ok(());
        }
        loop {
            match self.stream.read(&mut self.scratch) {
                Ok(0) => {
                    self.closed = true;
                    return Ok(());
                }
                Ok(read) => {
                    self.buffered
                        .extend(self.scratch.iter().take(read).copied());
                    return Ok(());
                }
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(error) => return Err(error),
            }
        }
    }
}

impl<S: Read + Write> FrameSource for StreamSource<S> {
    fn available(&mut self) -> io::Result<Availability> {
        self.fill()?;
        Ok(Availability {
            bytes: self.buffered.len(),
            closed: self.closed,
        })
    }

    fn receive(&mut self, buffer: &mut [u8]) -> io::Result<usize> {
        let count = buffer.len().min(self.buffered.len());
        for (slot, byte) in buffer.iter_mut().zip(self.buffered.drain(..count)) {
            *slot = byte;
        }
        Ok(count)
    }

    fn acknowledge(&mut self, token: &[u8]) -> io::Result<()> {
        let mut remaining = token;
        while !remaining.is_empty() {
            match self.stream.write(remaining) {
                Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
                Ok(written) => remaining = remaining.get(written..).unwrap_or_default(),
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => thread::yield_now(),
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(error) => return Err(error),
            }
        }
        loop {
            match self.stream.flush() {
                Ok(()) => return Ok(()),
                Err(error) if error.kind() == io::ErrorKind::WouldBlock => thread::yield_now(),
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {}
                Err(error) => return Err(error),
            }
        }
    }
}
