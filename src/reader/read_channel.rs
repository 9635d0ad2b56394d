//! Channel adapter over any `std::io::Read` source.

use super::{Channel, Chunk};
use crate::region::Region;
use std::io::{ErrorKind, Read};
use tracing::trace;

/// Default upper bound on a single delivery.
const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Adapts a blocking byte source (file, pipe, socket) to the chunked
/// delivery shape.
///
/// Each `chunked_read` performs one read of at most
/// `min(max_bytes, chunk_size)` bytes and delivers it as a single chunk;
/// end-of-file becomes a final empty chunk, and I/O errors surface through
/// their raw OS code. Closing drops the source, which releases the
/// underlying descriptor.
///
/// # Examples
///
/// ```
/// use segbytes::{ReadChannel, SequentialReader};
///
/// let source: &[u8] = &[1, 0, 2, 0];
/// let mut reader: SequentialReader<u16, _> =
///     SequentialReader::new(ReadChannel::new(source));
/// reader.read(None, |outcome| {
///     let view = outcome.unwrap();
///     assert_eq!(view.iter().collect::<Vec<u16>>(), [1, 2]);
/// });
/// ```
pub struct ReadChannel<R: Read> {
    source: Option<R>,
    chunk_size: usize,
    at_end: bool,
}

impl<R: Read> ReadChannel<R> {
    /// Wrap `source` with the default chunk size.
    #[must_use]
    pub fn new(source: R) -> Self {
        Self::with_chunk_size(source, DEFAULT_CHUNK_SIZE)
    }

    /// Wrap `source`, bounding each delivery to `chunk_size` bytes.
    ///
    /// A zero `chunk_size` is treated as 1.
    #[must_use]
    pub fn with_chunk_size(source: R, chunk_size: usize) -> Self {
        ReadChannel {
            source: Some(source),
            chunk_size: chunk_size.max(1),
            at_end: false,
        }
    }
}

impl<R: Read> Channel for ReadChannel<R> {
    fn chunked_read(&mut self, max_bytes: usize, on_chunk: &mut dyn FnMut(Chunk)) {
        let Some(source) = self.source.as_mut() else {
            on_chunk(Chunk::error(libc::ECANCELED));
            return;
        };
        if self.at_end || max_bytes == 0 {
            on_chunk(Chunk::end());
            return;
        }

        let want = max_bytes.min(self.chunk_size);
        let mut buf = vec![0u8; want];
        loop {
            match source.read(&mut buf) {
                Ok(0) => {
                    self.at_end = true;
                    trace!("source reached end of stream");
                    on_chunk(Chunk::end());
                    return;
                }
                Ok(n) => {
                    buf.truncate(n);
                    trace!(len = n, "source chunk delivered");
                    on_chunk(Chunk::data(Region::from_vec(buf)));
                    return;
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => {
                    let code = err.raw_os_error().unwrap_or(libc::EIO);
                    on_chunk(Chunk::error(code));
                    return;
                }
            }
        }
    }

    fn close(&mut self) {
        // Dropping the source releases the descriptor.
        self.source = None;
    }
}
