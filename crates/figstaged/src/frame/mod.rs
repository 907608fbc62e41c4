//! Message framing on a figure connection.
//!
//! A producer frames each figure document as
//!
//! ```text
//! "StartOfFigure" | u32 body length (little endian) | body | "EndOfFigure"
//! ```
//!
//! and waits for the receiver to answer `ack`. [`FrameAssembler`] recovers
//! the bodies from a [`FrameSource`] without ever blocking: each call to
//! [`FrameAssembler::poll`] consumes what is available and returns
//! [`Poll::Pending`](std::task::Poll::Pending) when a phase needs more bytes.

mod assembler;
mod errors;
mod source;

pub use self::assembler::{DiscardReason, FrameAssembler, FrameEvent, Phase, Session};
pub use self::errors::FrameError;
pub use self::source::{Availability, FrameSource, StreamSource};

/// Literal that opens every message.
pub const START_MARKER: &[u8] = b"StartOfFigure";
/// Literal that closes every message.
pub const END_MARKER: &[u8] = b"EndOfFigure";
/// Token written back after each accepted message.
pub const ACK_TOKEN: &[u8] = b"ack";
/// Width of the body length prefix.
pub const LENGTH_PREFIX_BYTES: usize = 4;

const FRAME_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::frame");
