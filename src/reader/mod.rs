//! Chunked channel reading with partial-element carry-over.
//!
//! A [`Channel`] is the external I/O primitive (file descriptor, socket,
//! pipe): it delivers raw byte chunks through a callback shaped like the
//! POSIX convention (completion flag, optional bytes, numeric error code).
//! A [`SequentialReader`] sits on top of one channel and turns those raw
//! deliveries into whole-element [`TypedView`](crate::TypedView)s, carrying
//! the 0..width-1 leftover bytes between deliveries so no element is ever
//! lost at a chunk boundary.
//!
//! # Delivery convention
//!
//! [`SequentialReader::read_until_end`] invokes its completion once per
//! arriving chunk; a final empty `Ok` view marks exhaustion. Callers loop
//! or accumulate. An empty `Ok` view is therefore always end-of-stream:
//! `read` keeps pulling from the channel until it has at least one whole
//! element, the channel finishes, or an error/cancellation intervenes.

mod channel;
mod read_channel;
mod sequential;

pub use channel::{Channel, Chunk};
pub use read_channel::ReadChannel;
pub use sequential::SequentialReader;
