//! Segbytes: segmented immutable byte buffers with typed views and chunked readers.
//!
//! # Overview
//!
//! A byte stream rarely arrives in one piece. Segbytes represents a byte
//! string as a concatenation of independently-owned memory regions and
//! keeps every structural operation free of copying:
//!
//! - [`Region`]: one contiguous, refcounted span of bytes with a disposal
//!   policy chosen at construction (copy, take-ownership, static, owner
//!   drop, custom callback)
//! - [`ByteSequence`]: the persistent, immutable sequence built from
//!   regions; zero-copy slice and concat, cross-boundary access, lazy
//!   restartable iteration
//! - [`TypedView`]: a read-only reinterpretation of a sequence as
//!   fixed-width unsigned elements (`u8`/`u16`/`u32`/`u64`), with explicit
//!   handling of trailing partial data
//! - [`SequentialReader`]: a callback-driven chunked reader that folds
//!   partial-element carry-over between channel deliveries
//! - [`ReadChannel`]: an adapter from any `std::io::Read` source to the
//!   chunked delivery shape
//!
//! # Example
//!
//! ```
//! use segbytes::{ReadChannel, SequentialReader};
//!
//! // Six bytes arriving in uneven chunks still decode as three u16s.
//! let stream: &[u8] = &[1, 0, 2, 0, 3, 0];
//! let channel = ReadChannel::with_chunk_size(stream, 5);
//! let mut reader: SequentialReader<u16, _> = SequentialReader::new(channel);
//!
//! let mut values = Vec::new();
//! reader.read_until_end(|outcome| {
//!     values.extend(outcome.unwrap().iter());
//! });
//! assert_eq!(values, [1, 2, 3]);
//! ```
//!
//! # Concurrency
//!
//! [`ByteSequence`] and [`TypedView`] are immutable values: clones share
//! storage and concurrent readers need no synchronization. A
//! [`SequentialReader`] allows one read in flight at a time and reports
//! [`ReadError::Busy`](crate::ReadError::Busy) on violations.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

pub mod cancel;
pub mod error;
pub mod reader;
pub mod region;
pub mod sequence;
pub mod test_utils;
pub mod typed;

pub use cancel::CancelToken;
pub use error::{ReadError, SequenceError};
pub use reader::{Channel, Chunk, ReadChannel, SequentialReader};
pub use region::Region;
pub use sequence::ByteSequence;
pub use typed::{Element, TypedView};
