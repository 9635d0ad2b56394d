//! Error types for segbytes.
//!
//! Error handling follows two rules:
//!
//! - Structural misuse (bad index, bad range, ragged length) surfaces as a
//!   typed [`SequenceError`] result from the synchronous accessor that was
//!   misused. Nothing in this crate panics on caller input.
//! - I/O failures ([`ReadError`]) are only ever delivered through a reader's
//!   completion callback. They occur on an asynchronous path with no caller
//!   frame to unwind into, so they are data, never panics.
//!
//! No error is retried internally; retry policy belongs to the caller.

use thiserror::Error;

/// Structural errors from [`ByteSequence`](crate::ByteSequence) and
/// [`TypedView`](crate::TypedView) accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// An index was outside `[0, len)`.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// The length of the sequence or view.
        len: usize,
    },

    /// Slice bounds were outside `[0, len]`, or `end < start`.
    #[error("range {start}..{end} out of bounds for length {len}")]
    RangeOutOfBounds {
        /// Requested start of the range.
        start: usize,
        /// Requested end of the range.
        end: usize,
        /// The length of the sequence or view.
        len: usize,
    },

    /// A byte length was not a whole multiple of the element width, and the
    /// strict (non-splitting) constructor was used.
    #[error("{len} bytes is not a whole number of {width}-byte elements")]
    PartialData {
        /// The byte length of the sequence.
        len: usize,
        /// The element width in bytes.
        width: usize,
    },
}

/// Failures delivered through a [`SequentialReader`](crate::SequentialReader)
/// completion callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReadError {
    /// The read was abandoned because the cancellation token fired.
    #[error("read cancelled by the user")]
    UserCancelled,

    /// The channel was already closed, or reported closure mid-read.
    #[error("channel is closed")]
    Closed,

    /// A read was issued while another read on the same reader was still in
    /// flight.
    #[error("a read is already in flight on this reader")]
    Busy,

    /// An opaque lower-level I/O failure surfaced by the channel.
    #[error("channel error (code {0})")]
    Channel(i32),
}
