//! Cooperative cancellation and progress accounting for reads.
//!
//! A [`CancelToken`] is a cheap, clonable handle shared between the party
//! that may abandon a read and the [`SequentialReader`](crate::SequentialReader)
//! performing it. Cancellation is cooperative: the reader polls the token at
//! the top of each chunk delivery and, once it observes the flag, surfaces
//! [`ReadError::UserCancelled`](crate::ReadError::UserCancelled) and still
//! runs the channel's close path so the underlying descriptor is not leaked.
//!
//! The token also accumulates delivered-byte progress so callers can observe
//! throughput while a stream drains.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct TokenState {
    cancelled: AtomicBool,
    delivered: AtomicU64,
}

/// Shared cancellation flag and progress counter.
///
/// Clones share state: cancelling through any clone is observed by all.
///
/// # Examples
///
/// ```
/// use segbytes::CancelToken;
///
/// let token = CancelToken::new();
/// let observer = token.clone();
/// assert!(!observer.is_cancelled());
/// token.cancel();
/// assert!(observer.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    state: Arc<TokenState>,
}

impl CancelToken {
    /// Create a fresh, uncancelled token with zero recorded progress.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::Release);
    }

    /// Returns true once [`cancel`](Self::cancel) has been called on any
    /// clone of this token.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::Acquire)
    }

    /// Record `bytes` of delivered progress.
    pub fn add_delivered(&self, bytes: u64) {
        self.state.delivered.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Total bytes delivered through readers holding this token.
    #[must_use]
    pub fn delivered(&self) -> u64 {
        self.state.delivered.load(Ordering::Relaxed)
    }
}
