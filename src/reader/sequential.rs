//! The asynchronous chunked reader.

use super::{Channel, Chunk};
use crate::cancel::CancelToken;
use crate::error::ReadError;
use crate::sequence::ByteSequence;
use crate::typed::{Element, TypedView};
use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Closed,
    Cancelled,
}

/// Turns raw channel deliveries into whole-element [`TypedView`]s.
///
/// On each delivery the reader concatenates the previously carried partial
/// bytes with the new chunk, splits off the whole-element view, stores the
/// new remainder (0 to `WIDTH - 1` bytes) for the next delivery, and hands
/// the view to the completion.
///
/// # Single-flight
///
/// One read may be in flight per reader at a time. The invariant is
/// enforced by an atomic guard: a violating `read` reports
/// [`ReadError::Busy`] through its completion instead of corrupting the
/// carried state.
///
/// # Cancellation
///
/// Cooperative: the [`CancelToken`] is polled at the top of each delivery,
/// not force-preemptively. Once cancellation is observed the reader still
/// runs the channel's close path, exactly once, so the descriptor is not
/// leaked. `Cancelled` is terminal.
///
/// # Failure semantics
///
/// Channel errors are surfaced once through the completion and never
/// retried internally; bytes gathered before the error are retained as
/// carry-over so a caller-driven retry loses nothing.
pub struct SequentialReader<T: Element, C: Channel> {
    channel: C,
    leftover: ByteSequence,
    token: Option<CancelToken>,
    in_flight: AtomicBool,
    state: State,
    channel_closed: bool,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Element, C: Channel> SequentialReader<T, C> {
    /// Bind a reader to `channel`.
    #[must_use]
    pub fn new(channel: C) -> Self {
        SequentialReader {
            channel,
            leftover: ByteSequence::new(),
            token: None,
            in_flight: AtomicBool::new(false),
            state: State::Idle,
            channel_closed: false,
            _marker: std::marker::PhantomData,
        }
    }

    /// Bind a reader to `channel` with a cancellation/progress token.
    #[must_use]
    pub fn with_token(channel: C, token: CancelToken) -> Self {
        let mut reader = Self::new(channel);
        reader.token = Some(token);
        reader
    }

    /// The partial bytes carried from the previous delivery.
    ///
    /// Always shorter than one element width.
    #[must_use]
    pub fn leftover(&self) -> &ByteSequence {
        &self.leftover
    }

    /// Request up to `max_elements` whole elements (unbounded if `None`).
    ///
    /// The completion is invoked exactly once per call. An empty `Ok` view
    /// signals end-of-stream: the reader keeps pulling chunks within one
    /// call until it has at least one whole element or the channel reports
    /// completion. A channel that delivers nothing without marking the
    /// stream final is treated as exhausted.
    pub fn read<F>(&mut self, max_elements: Option<usize>, completion: F)
    where
        F: FnOnce(Result<TypedView<T>, ReadError>),
    {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            completion(Err(ReadError::Busy));
            return;
        }
        let outcome = self.read_in_flight(max_elements);
        self.in_flight.store(false, Ordering::Release);
        completion(outcome);
    }

    /// Read until the stream is exhausted.
    ///
    /// Per-chunk convention: the completion fires once for every arriving
    /// chunk, and a final empty `Ok` view marks exhaustion. On an error the
    /// completion fires once with it and the loop stops.
    pub fn read_until_end<F>(&mut self, mut completion: F)
    where
        F: FnMut(Result<TypedView<T>, ReadError>),
    {
        loop {
            let mut stop = false;
            self.read(None, |outcome| {
                stop = match &outcome {
                    Ok(view) => view.is_empty(),
                    Err(_) => true,
                };
                completion(outcome);
            });
            if stop {
                break;
            }
        }
    }

    /// Release the channel. The close path runs at most once across
    /// `close`, cancellation, and drop.
    pub fn close(&mut self) {
        self.close_channel();
        self.state = State::Closed;
    }

    fn read_in_flight(&mut self, max_elements: Option<usize>) -> Result<TypedView<T>, ReadError> {
        match self.state {
            State::Closed => return Err(ReadError::Closed),
            State::Cancelled => return Err(ReadError::UserCancelled),
            State::Idle => {}
        }
        if self.token.as_ref().is_some_and(CancelToken::is_cancelled) {
            self.observe_cancellation();
            return Err(ReadError::UserCancelled);
        }
        if max_elements == Some(0) {
            return Ok(TypedView::empty());
        }

        let budget = max_elements.map_or(usize::MAX, |n| n.saturating_mul(T::WIDTH));
        let mut gathered = mem::take(&mut self.leftover);

        loop {
            let mut cancelled = false;
            let mut error_code: Option<i32> = None;
            let mut finished = false;
            let mut received = 0usize;
            let want = budget.saturating_sub(gathered.len()).max(1);

            {
                let token = self.token.clone();
                self.channel.chunked_read(want, &mut |chunk: Chunk| {
                    if cancelled || error_code.is_some() {
                        return;
                    }
                    if token.as_ref().is_some_and(CancelToken::is_cancelled) {
                        cancelled = true;
                        return;
                    }
                    if chunk.error_code != 0 {
                        error_code = Some(chunk.error_code);
                        return;
                    }
                    if let Some(region) = chunk.bytes {
                        let len = region.len();
                        trace!(len, is_final = chunk.is_final, "chunk received");
                        gathered.append(&ByteSequence::from_region(region));
                        received += len;
                        if let Some(token) = &token {
                            token.add_delivered(len as u64);
                        }
                    } else {
                        trace!(is_final = chunk.is_final, "empty chunk received");
                    }
                    if chunk.is_final {
                        finished = true;
                    }
                });
            }

            if cancelled {
                debug!("read observed cancellation; closing channel");
                self.leftover = gathered;
                self.observe_cancellation();
                return Err(ReadError::UserCancelled);
            }
            if let Some(code) = error_code {
                self.leftover = gathered;
                debug!(code, "channel error surfaced to completion");
                return Err(if code == libc::ECANCELED {
                    ReadError::Closed
                } else {
                    ReadError::Channel(code)
                });
            }
            if finished || gathered.len() >= T::WIDTH || received == 0 {
                let (view, rest) = TypedView::split_partial(gathered);
                trace!(
                    elements = view.len(),
                    carried = rest.len(),
                    finished,
                    "delivery assembled"
                );
                self.leftover = rest;
                return Ok(view);
            }
        }
    }

    fn observe_cancellation(&mut self) {
        self.state = State::Cancelled;
        self.close_channel();
    }

    fn close_channel(&mut self) {
        if !self.channel_closed {
            self.channel_closed = true;
            self.channel.close();
            debug!("channel closed");
        }
    }
}

impl<T: Element, C: Channel> Drop for SequentialReader<T, C> {
    fn drop(&mut self) {
        self.close_channel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ScriptedChannel;

    fn init_test(name: &str) {
        crate::test_utils::init_test_logging();
        crate::test_phase!(name);
    }

    fn collect_read<T: Element, C: Channel>(
        reader: &mut SequentialReader<T, C>,
        max: Option<usize>,
    ) -> Result<TypedView<T>, ReadError> {
        let mut slot = None;
        reader.read(max, |outcome| slot = Some(outcome));
        slot.unwrap()
    }

    #[test]
    fn delivery_splits_whole_elements() {
        init_test("delivery_splits_whole_elements");
        let channel = ScriptedChannel::new(vec![
            vec![Chunk::data(crate::Region::from_static(b"1234567"))],
            vec![Chunk::data(crate::Region::from_static(b"8")), Chunk::end()],
        ]);
        let mut reader: SequentialReader<u32, _> = SequentialReader::new(channel);

        let first = collect_read(&mut reader, None).unwrap();
        crate::assert_with_log!(first.len() == 1, "first elements", 1, first.len());
        let carried = reader.leftover().len();
        crate::assert_with_log!(carried == 3, "carried bytes", 3, carried);

        let second = collect_read(&mut reader, None).unwrap();
        crate::assert_with_log!(second.len() == 1, "second elements", 1, second.len());
        let carried = reader.leftover().len();
        crate::assert_with_log!(carried == 0, "no leftover at end", 0, carried);
        crate::test_complete!("delivery_splits_whole_elements");
    }

    #[test]
    fn read_keeps_pulling_until_one_whole_element() {
        init_test("read_keeps_pulling_until_one_whole_element");
        // Single-byte deliveries: a u32 needs four chunked reads before the
        // completion can see a non-empty view.
        let channel = ScriptedChannel::new(vec![
            vec![Chunk::data(crate::Region::from_static(b"a"))],
            vec![Chunk::data(crate::Region::from_static(b"b"))],
            vec![Chunk::data(crate::Region::from_static(b"c"))],
            vec![Chunk::data(crate::Region::from_static(b"d"))],
        ]);
        let mut reader: SequentialReader<u32, _> = SequentialReader::new(channel);
        let view = collect_read(&mut reader, None).unwrap();
        crate::assert_with_log!(view.len() == 1, "one element", 1, view.len());
        let value = view.get(0).unwrap();
        let expected = u32::from_le_bytes(*b"abcd");
        crate::assert_with_log!(value == expected, "value", expected, value);
        crate::test_complete!("read_keeps_pulling_until_one_whole_element");
    }

    #[test]
    fn empty_final_delivery_signals_end() {
        init_test("empty_final_delivery_signals_end");
        let channel = ScriptedChannel::new(vec![vec![Chunk::end()]]);
        let mut reader: SequentialReader<u16, _> = SequentialReader::new(channel);
        let view = collect_read(&mut reader, None).unwrap();
        crate::assert_with_log!(view.is_empty(), "empty view", true, view.is_empty());
        crate::test_complete!("empty_final_delivery_signals_end");
    }

    #[test]
    fn cancellation_closes_channel_exactly_once() {
        init_test("cancellation_closes_channel_exactly_once");
        let channel = ScriptedChannel::new(vec![vec![Chunk::data(
            crate::Region::from_static(b"abcd"),
        )]]);
        let closes = channel.close_count();
        let token = CancelToken::new();
        token.cancel();

        let mut reader: SequentialReader<u16, _> = SequentialReader::with_token(channel, token);
        let err = collect_read(&mut reader, None).unwrap_err();
        crate::assert_with_log!(
            err == ReadError::UserCancelled,
            "cancelled",
            ReadError::UserCancelled,
            err
        );

        // A later read stays cancelled; drop must not close again.
        let err = collect_read(&mut reader, None).unwrap_err();
        crate::assert_with_log!(
            err == ReadError::UserCancelled,
            "terminal",
            ReadError::UserCancelled,
            err
        );
        drop(reader);
        let count = closes.load(std::sync::atomic::Ordering::SeqCst);
        crate::assert_with_log!(count == 1, "close count", 1, count);
        crate::test_complete!("cancellation_closes_channel_exactly_once");
    }

    #[test]
    fn cancellation_mid_stream_is_observed_at_delivery() {
        init_test("cancellation_mid_stream_is_observed_at_delivery");
        let token = CancelToken::new();
        let tripwire = token.clone();
        let channel = ScriptedChannel::new(vec![vec![Chunk::data(crate::Region::from_static(
            b"abcd",
        ))]])
        .on_read(move || tripwire.cancel());
        let mut reader: SequentialReader<u16, _> = SequentialReader::with_token(channel, token);
        let err = collect_read(&mut reader, None).unwrap_err();
        crate::assert_with_log!(
            err == ReadError::UserCancelled,
            "cancelled mid-stream",
            ReadError::UserCancelled,
            err
        );
        crate::test_complete!("cancellation_mid_stream_is_observed_at_delivery");
    }

    #[test]
    fn channel_error_maps_codes() {
        init_test("channel_error_maps_codes");
        let channel = ScriptedChannel::new(vec![vec![Chunk::error(libc::EIO)]]);
        let mut reader: SequentialReader<u16, _> = SequentialReader::new(channel);
        let err = collect_read(&mut reader, None).unwrap_err();
        crate::assert_with_log!(
            err == ReadError::Channel(libc::EIO),
            "io error",
            ReadError::Channel(libc::EIO),
            err
        );

        let channel = ScriptedChannel::new(vec![vec![Chunk::error(libc::ECANCELED)]]);
        let mut reader: SequentialReader<u16, _> = SequentialReader::new(channel);
        let err = collect_read(&mut reader, None).unwrap_err();
        crate::assert_with_log!(err == ReadError::Closed, "ecanceled", ReadError::Closed, err);
        crate::test_complete!("channel_error_maps_codes");
    }

    #[test]
    fn read_after_close_reports_closed() {
        init_test("read_after_close_reports_closed");
        let channel = ScriptedChannel::new(vec![]);
        let closes = channel.close_count();
        let mut reader: SequentialReader<u16, _> = SequentialReader::new(channel);
        reader.close();
        let err = collect_read(&mut reader, None).unwrap_err();
        crate::assert_with_log!(err == ReadError::Closed, "closed", ReadError::Closed, err);
        drop(reader);
        let count = closes.load(std::sync::atomic::Ordering::SeqCst);
        crate::assert_with_log!(count == 1, "close once", 1, count);
        crate::test_complete!("read_after_close_reports_closed");
    }

    #[test]
    fn busy_guard_rejects_overlapping_read() {
        init_test("busy_guard_rejects_overlapping_read");
        let channel = ScriptedChannel::new(vec![]);
        let mut reader: SequentialReader<u16, _> = SequentialReader::new(channel);
        reader.in_flight.store(true, Ordering::SeqCst);
        let err = collect_read(&mut reader, None).unwrap_err();
        crate::assert_with_log!(err == ReadError::Busy, "busy", ReadError::Busy, err);
        reader.in_flight.store(false, Ordering::SeqCst);
        crate::test_complete!("busy_guard_rejects_overlapping_read");
    }

    #[test]
    fn zero_element_read_is_immediate() {
        init_test("zero_element_read_is_immediate");
        let channel = ScriptedChannel::new(vec![vec![Chunk::data(crate::Region::from_static(
            b"ab",
        ))]]);
        let reads = channel.read_count();
        let mut reader: SequentialReader<u16, _> = SequentialReader::new(channel);
        let view = collect_read(&mut reader, Some(0)).unwrap();
        crate::assert_with_log!(view.is_empty(), "empty", true, view.is_empty());
        let count = reads.load(std::sync::atomic::Ordering::SeqCst);
        crate::assert_with_log!(count == 0, "channel untouched", 0, count);
        crate::test_complete!("zero_element_read_is_immediate");
    }

    #[test]
    fn progress_accumulates_on_token() {
        init_test("progress_accumulates_on_token");
        let channel = ScriptedChannel::new(vec![vec![
            Chunk::data(crate::Region::from_static(b"abcd")),
            Chunk::end(),
        ]]);
        let token = CancelToken::new();
        let mut reader: SequentialReader<u16, _> =
            SequentialReader::with_token(channel, token.clone());
        let view = collect_read(&mut reader, None).unwrap();
        crate::assert_with_log!(view.len() == 2, "elements", 2, view.len());
        let delivered = token.delivered();
        crate::assert_with_log!(delivered == 4, "progress", 4, delivered);
        crate::test_complete!("progress_accumulates_on_token");
    }
}
