//! The inbound channel contract.

use crate::region::Region;

/// One delivery from a channel's chunked read.
///
/// Mirrors the POSIX-style delivery shape: `error_code == 0` means success,
/// `ECANCELED` means the channel was closed underneath the read, and any
/// other code is an opaque I/O failure.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// True when this is the last delivery of the read (end of stream or
    /// terminal error).
    pub is_final: bool,
    /// Raw bytes delivered, if any. A final chunk with no bytes signals
    /// a clean end of stream.
    pub bytes: Option<Region>,
    /// POSIX-style status code; `0` is success.
    pub error_code: i32,
}

impl Chunk {
    /// An intermediate data delivery.
    #[must_use]
    pub fn data(region: Region) -> Self {
        Chunk {
            is_final: false,
            bytes: Some(region),
            error_code: 0,
        }
    }

    /// A clean end-of-stream marker.
    #[must_use]
    pub fn end() -> Self {
        Chunk {
            is_final: true,
            bytes: None,
            error_code: 0,
        }
    }

    /// A terminal failure with a POSIX-style code.
    #[must_use]
    pub fn error(code: i32) -> Self {
        Chunk {
            is_final: true,
            bytes: None,
            error_code: code,
        }
    }
}

/// An external byte source delivering data in bounded chunks.
///
/// Implementations wrap a platform I/O primitive. One `chunked_read` call
/// may invoke `on_chunk` several times; the last invocation has
/// [`Chunk::is_final`] set or a nonzero [`Chunk::error_code`]. The channel
/// must invoke `on_chunk` at least once per `chunked_read` call.
pub trait Channel {
    /// Read up to `max_bytes` bytes, delivering them through `on_chunk`.
    fn chunked_read(&mut self, max_bytes: usize, on_chunk: &mut dyn FnMut(Chunk));

    /// Release the underlying resource. Called exactly once by the owning
    /// reader.
    fn close(&mut self);
}
