//! Test utilities for segbytes.
//!
//! This module provides shared helpers for unit and integration tests:
//! - Consistent tracing-based logging initialization
//! - Phase/section macros for readable test output
//! - Assertion macros that log expected/actual before asserting
//! - A scripted channel for driving readers deterministically
//!
//! # Example
//! ```
//! use segbytes::test_utils::init_test_logging;
//!
//! fn my_test() {
//!     init_test_logging();
//!     // test code
//! }
//! ```

use crate::reader::{Channel, Chunk};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

static INIT_LOGGING: Once = Once::new();

/// Initialize test logging with trace-level output.
///
/// Safe to call multiple times; only initializes once.
pub fn init_test_logging() {
    init_test_logging_with_level(tracing::Level::TRACE);
}

/// Initialize test logging with a custom level.
///
/// The first call wins; later calls are no-ops.
pub fn init_test_logging_with_level(level: tracing::Level) {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_test_writer()
            .with_file(true)
            .with_line_number(true)
            .with_target(true)
            .with_ansi(false)
            .try_init();
    });
}

/// Log a test phase transition with a visual separator.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(phase = %$name, "========================================");
        tracing::info!(phase = %$name, "TEST PHASE: {}", $name);
        tracing::info!(phase = %$name, "========================================");
    };
}

/// Log a section within a test phase.
#[macro_export]
macro_rules! test_section {
    ($name:expr) => {
        tracing::debug!(section = %$name, "--- {} ---", $name);
    };
}

/// Log test completion with summary.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(test = %$name, "test completed successfully: {}", $name);
    };
    ($name:expr, $($key:ident = $value:expr),* $(,)?) => {
        tracing::info!(
            test = %$name,
            $($key = %$value,)*
            "test completed successfully: {}",
            $name
        );
    };
}

/// Log before assertions for context.
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $msg:expr, $expected:expr, $actual:expr) => {
        tracing::debug!(
            expected = ?$expected,
            actual = ?$actual,
            "Asserting: {}",
            $msg
        );
        assert!($cond, "{}: expected {:?}, got {:?}", $msg, $expected, $actual);
    };
}

/// A channel that replays a pre-written script of deliveries.
///
/// Each `chunked_read` call consumes the next batch of chunks; once the
/// script is exhausted the channel keeps reporting a clean end of stream.
/// Read and close calls are counted through shared handles so tests can
/// assert on them after the reader is dropped.
pub struct ScriptedChannel {
    script: VecDeque<Vec<Chunk>>,
    reads: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
    on_read: Option<Box<dyn FnMut() + Send>>,
}

impl ScriptedChannel {
    /// Create a channel that replays `batches`, one batch per read.
    #[must_use]
    pub fn new(batches: Vec<Vec<Chunk>>) -> Self {
        ScriptedChannel {
            script: batches.into(),
            reads: Arc::new(AtomicUsize::new(0)),
            closes: Arc::new(AtomicUsize::new(0)),
            on_read: None,
        }
    }

    /// Run `hook` at the start of every `chunked_read`, before any chunk is
    /// delivered. Used to trip cancellation mid-stream.
    #[must_use]
    pub fn on_read<F>(mut self, hook: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on_read = Some(Box::new(hook));
        self
    }

    /// Shared counter of `chunked_read` calls.
    #[must_use]
    pub fn read_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.reads)
    }

    /// Shared counter of `close` calls.
    #[must_use]
    pub fn close_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.closes)
    }
}

impl Channel for ScriptedChannel {
    fn chunked_read(&mut self, _max_bytes: usize, on_chunk: &mut dyn FnMut(Chunk)) {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(hook) = self.on_read.as_mut() {
            hook();
        }
        match self.script.pop_front() {
            Some(batch) => {
                for chunk in batch {
                    on_chunk(chunk);
                }
            }
            None => on_chunk(Chunk::end()),
        }
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}
