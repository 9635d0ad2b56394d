//! Independently-owned, read-only byte regions.
//!
//! A [`Region`] is the leaf chunk a [`ByteSequence`](crate::ByteSequence) is
//! built from: one contiguous span of bytes with a single owner and a
//! disposal policy that runs exactly once when the last reference drops.
//!
//! # Ownership policies
//!
//! | Constructor | Policy |
//! |---|---|
//! | [`Region::copy_from_slice`] | copy the bytes into a fresh allocation |
//! | [`Region::from_vec`] | take ownership; the `Vec` is freed on disposal |
//! | [`Region::from_static`] | borrow static memory; disposal is a no-op |
//! | [`Region::from_owner`] | keep an arbitrary owner alive; its `Drop` is the disposal (covers memory maps, pooled buffers) |
//! | [`Region::with_disposal`] | like `from_owner`, plus a callback run once on the final drop |
//!
//! Reference counting is atomic (`Arc`), so regions may be shared freely
//! across threads. Once constructed, a region's bytes are never mutated
//! through this API.

use std::fmt;
use std::sync::Arc;

/// Read access to a region's backing bytes, abstracted over the owner.
trait ByteOwner: Send + Sync {
    fn as_bytes(&self) -> &[u8];
}

impl<O> ByteOwner for O
where
    O: AsRef<[u8]> + Send + Sync,
{
    fn as_bytes(&self) -> &[u8] {
        self.as_ref()
    }
}

/// Owner wrapper that runs a callback exactly once when dropped.
struct WithDisposal<O, F: FnOnce() + Send> {
    owner: O,
    dispose: Option<F>,
}

impl<O, F> AsRef<[u8]> for WithDisposal<O, F>
where
    O: AsRef<[u8]>,
    F: FnOnce() + Send,
{
    fn as_ref(&self) -> &[u8] {
        self.owner.as_ref()
    }
}

impl<O, F: FnOnce() + Send> Drop for WithDisposal<O, F> {
    fn drop(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

enum Storage {
    /// Static data; disposal is a no-op.
    Static(&'static [u8]),
    /// Bytes owned directly by the region.
    Owned(Vec<u8>),
    /// Bytes kept alive by an arbitrary owner; its `Drop` is the disposal.
    Owner(Box<dyn ByteOwner>),
}

impl Storage {
    fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Static(s) => s,
            Self::Owned(vec) => vec,
            Self::Owner(owner) => owner.as_bytes(),
        }
    }
}

/// An opaque, independently-owned contiguous span of bytes.
///
/// Cloning a `Region` is O(1): it shares the backing storage via an atomic
/// reference count. The disposal policy chosen at construction runs exactly
/// once, when the last clone drops.
///
/// # Examples
///
/// ```
/// use segbytes::Region;
///
/// let region = Region::from_vec(vec![1, 2, 3]);
/// assert_eq!(region.len(), 3);
/// assert_eq!(region.as_slice(), &[1, 2, 3]);
/// ```
#[derive(Clone)]
pub struct Region {
    storage: Arc<Storage>,
}

impl Region {
    /// Copy `bytes` into a newly allocated region.
    #[must_use]
    pub fn copy_from_slice(bytes: &[u8]) -> Self {
        Self::from_vec(bytes.to_vec())
    }

    /// Take ownership of `bytes`; the allocation is freed on disposal.
    #[must_use]
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Region {
            storage: Arc::new(Storage::Owned(bytes)),
        }
    }

    /// Borrow static memory. Disposal is a no-op.
    #[must_use]
    pub fn from_static(bytes: &'static [u8]) -> Self {
        Region {
            storage: Arc::new(Storage::Static(bytes)),
        }
    }

    /// Wrap bytes kept alive by `owner`.
    ///
    /// The owner's `Drop` impl is the disposal policy: a memory-map object
    /// unmaps its range, a pooled buffer returns itself to its pool. The
    /// owner must yield the same bytes for the region's whole lifetime.
    ///
    /// # Examples
    ///
    /// ```
    /// use segbytes::Region;
    /// use std::sync::Arc;
    ///
    /// // Keep a shared allocation alive without copying it.
    /// let backing: Arc<[u8]> = Arc::from(&b"shared"[..]);
    /// let region = Region::from_owner(backing);
    /// assert_eq!(region.as_slice(), b"shared");
    /// ```
    #[must_use]
    pub fn from_owner<O>(owner: O) -> Self
    where
        O: AsRef<[u8]> + Send + Sync + 'static,
    {
        Region {
            storage: Arc::new(Storage::Owner(Box::new(owner))),
        }
    }

    /// Wrap bytes kept alive by `owner`, running `dispose` exactly once when
    /// the last reference to the region drops.
    ///
    /// # Examples
    ///
    /// ```
    /// use segbytes::Region;
    /// use std::sync::atomic::{AtomicBool, Ordering};
    /// use std::sync::Arc;
    ///
    /// let disposed = Arc::new(AtomicBool::new(false));
    /// let flag = Arc::clone(&disposed);
    /// let region = Region::with_disposal(vec![1, 2, 3], move || {
    ///     flag.store(true, Ordering::SeqCst);
    /// });
    /// let alias = region.clone();
    /// drop(region);
    /// assert!(!disposed.load(Ordering::SeqCst));
    /// drop(alias);
    /// assert!(disposed.load(Ordering::SeqCst));
    /// ```
    #[must_use]
    pub fn with_disposal<O, F>(owner: O, dispose: F) -> Self
    where
        O: AsRef<[u8]> + Send + Sync + 'static,
        F: FnOnce() + Send + Sync + 'static,
    {
        Self::from_owner(WithDisposal {
            owner,
            dispose: Some(dispose),
        })
    }

    /// Returns the number of bytes in the region.
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.as_bytes().len()
    }

    /// Returns true if the region holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the region's bytes. Valid for the region's lifetime.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        self.storage.as_bytes()
    }
}

impl From<Vec<u8>> for Region {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_vec(bytes)
    }
}

impl From<&'static [u8]> for Region {
    fn from(bytes: &'static [u8]) -> Self {
        Self::from_static(bytes)
    }
}

impl AsRef<[u8]> for Region {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region").field("len", &self.len()).finish()
    }
}
