//! The typed reinterpretation of a byte sequence.

use super::{Element, Elements};
use crate::error::SequenceError;
use crate::sequence::ByteSequence;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Range;

/// A read-only view of a [`ByteSequence`] as fixed-width unsigned elements.
///
/// The view never copies bytes at construction. Element access gathers the
/// element's window (possibly spanning region boundaries) into an 8-byte
/// stack scratch and decodes it little-endian.
///
/// Invariant: the backing byte length is always a whole multiple of
/// [`T::WIDTH`](Element::WIDTH).
///
/// # Examples
///
/// ```
/// use segbytes::{ByteSequence, TypedView};
///
/// let bytes = ByteSequence::from(vec![0x01, 0x00, 0x02, 0x00]);
/// let view: TypedView<u16> = TypedView::new(bytes).unwrap();
/// assert_eq!(view.len(), 2);
/// assert_eq!(view.get(1).unwrap(), 2);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct TypedView<T: Element> {
    bytes: ByteSequence,
    _marker: PhantomData<T>,
}

impl<T: Element> Default for TypedView<T> {
    fn default() -> Self {
        TypedView {
            bytes: ByteSequence::new(),
            _marker: PhantomData,
        }
    }
}

impl<T: Element> TypedView<T> {
    /// Strict constructor: succeeds iff the byte length is a whole multiple
    /// of the element width.
    ///
    /// # Errors
    ///
    /// [`SequenceError::PartialData`] when trailing bytes would be left
    /// over. Use [`split_partial`](Self::split_partial) to handle ragged
    /// tails explicitly.
    pub fn new(bytes: ByteSequence) -> Result<Self, SequenceError> {
        if bytes.len() % T::WIDTH != 0 {
            return Err(SequenceError::PartialData {
                len: bytes.len(),
                width: T::WIDTH,
            });
        }
        Ok(TypedView {
            bytes,
            _marker: PhantomData,
        })
    }

    /// Splitting constructor: always succeeds, returning the whole-element
    /// view plus the trailing partial bytes (0 to `WIDTH - 1` of them).
    ///
    /// The split is structural: both halves share the input's regions.
    #[must_use]
    pub fn split_partial(bytes: ByteSequence) -> (Self, ByteSequence) {
        let whole = bytes.len() - bytes.len() % T::WIDTH;
        let (head, tail) = match (bytes.slice(0..whole), bytes.slice(whole..bytes.len())) {
            (Ok(head), Ok(tail)) => (head, tail),
            // Bounds are derived from len, so slicing cannot fail.
            _ => unreachable!("split bounds derived from sequence length"),
        };
        (
            TypedView {
                bytes: head,
                _marker: PhantomData,
            },
            tail,
        )
    }

    /// The empty view.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of whole elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len() / T::WIDTH
    }

    /// Returns true if the view holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The element at `index`.
    ///
    /// Assembles the `WIDTH` bytes at byte offset `index * WIDTH`, reading
    /// across region boundaries as needed.
    ///
    /// # Errors
    ///
    /// [`SequenceError::IndexOutOfRange`] if `index >= len`.
    pub fn get(&self, index: usize) -> Result<T, SequenceError> {
        if index >= self.len() {
            return Err(SequenceError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        let mut scratch = [0u8; 8];
        self.bytes
            .copy_to_slice(index * T::WIDTH, &mut scratch[..T::WIDTH])?;
        Ok(T::from_le_slice(&scratch[..T::WIDTH]))
    }

    /// The sub-view covering elements `[range.start, range.end)`.
    ///
    /// Delegates to a byte-unit slice of the backing sequence; zero-copy.
    ///
    /// # Errors
    ///
    /// [`SequenceError::RangeOutOfBounds`] (in element units) if the range
    /// is invalid.
    pub fn slice(&self, range: Range<usize>) -> Result<Self, SequenceError> {
        if range.end < range.start || range.end > self.len() {
            return Err(SequenceError::RangeOutOfBounds {
                start: range.start,
                end: range.end,
                len: self.len(),
            });
        }
        let bytes = self
            .bytes
            .slice(range.start * T::WIDTH..range.end * T::WIDTH)?;
        Ok(TypedView {
            bytes,
            _marker: PhantomData,
        })
    }

    /// A new view holding self's elements followed by `other`'s.
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        TypedView {
            bytes: self.bytes.concat(&other.bytes),
            _marker: PhantomData,
        }
    }

    /// In-place value update equivalent to `*self = self.concat(other)`.
    pub fn extend(&mut self, other: &Self) {
        self.bytes.append(&other.bytes);
    }

    /// A lazy, finite, restartable iterator over elements.
    ///
    /// Assembles each element incrementally from the underlying byte
    /// iterator, so elements split across region boundaries decode
    /// correctly.
    #[must_use]
    pub fn iter(&self) -> Elements<'_, T> {
        Elements::new(self.bytes.iter())
    }

    /// Borrow the backing byte sequence.
    #[must_use]
    pub fn as_bytes(&self) -> &ByteSequence {
        &self.bytes
    }

    /// Consume the view, returning the backing byte sequence.
    #[must_use]
    pub fn into_bytes(self) -> ByteSequence {
        self.bytes
    }
}

impl<'a, T: Element> IntoIterator for &'a TypedView<T> {
    type Item = T;
    type IntoIter = Elements<'a, T>;

    fn into_iter(self) -> Elements<'a, T> {
        self.iter()
    }
}

impl<T: Element> fmt::Debug for TypedView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedView")
            .field("len", &self.len())
            .field("width", &T::WIDTH)
            .finish()
    }
}
