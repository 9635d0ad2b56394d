//! Element iteration over a typed view.

use super::Element;
use crate::sequence;
use std::iter::FusedIterator;
use std::marker::PhantomData;

/// Lazy iterator over the elements of a [`TypedView`](crate::TypedView).
///
/// Created by [`TypedView::iter`](crate::TypedView::iter). Pulls bytes from
/// the sequence's region-spanning byte iterator and assembles each element
/// in a fixed stack scratch, so an element whose bytes are split across two
/// or more regions decodes the same as a contiguous one.
#[derive(Clone)]
pub struct Elements<'a, T: Element> {
    bytes: sequence::Iter<'a>,
    _marker: PhantomData<T>,
}

impl<'a, T: Element> Elements<'a, T> {
    pub(super) fn new(bytes: sequence::Iter<'a>) -> Self {
        Elements {
            bytes,
            _marker: PhantomData,
        }
    }
}

impl<T: Element> Iterator for Elements<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let mut scratch = [0u8; 8];
        // The view invariant guarantees the byte count is a whole multiple
        // of WIDTH, so exhaustion can only happen on an element boundary.
        scratch[0] = self.bytes.next()?;
        for slot in scratch.iter_mut().take(T::WIDTH).skip(1) {
            *slot = self.bytes.next()?;
        }
        Some(T::from_le_slice(&scratch[..T::WIDTH]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bytes.len() / T::WIDTH;
        (remaining, Some(remaining))
    }
}

impl<T: Element> ExactSizeIterator for Elements<'_, T> {}
impl<T: Element> FusedIterator for Elements<'_, T> {}
