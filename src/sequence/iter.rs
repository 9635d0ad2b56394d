//! Byte iteration over a segmented sequence.

use super::byte_sequence::{ByteSequence, Entry};
use std::iter::FusedIterator;

/// Lazy iterator over the individual bytes of a [`ByteSequence`].
///
/// Created by [`ByteSequence::iter`]. Holds an outer cursor over the
/// constituent regions and an inner cursor into the current region's bytes;
/// advancing across a region boundary is seamless.
#[derive(Clone)]
pub struct Iter<'a> {
    entries: std::slice::Iter<'a, Entry>,
    current: std::slice::Iter<'a, u8>,
    remaining: usize,
}

impl<'a> Iter<'a> {
    pub(super) fn new(sequence: &'a ByteSequence) -> Self {
        Iter {
            entries: sequence.entry_slice().iter(),
            current: [].iter(),
            remaining: sequence.len(),
        }
    }
}

impl Iterator for Iter<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if let Some(&byte) = self.current.next() {
            self.remaining -= 1;
            return Some(byte);
        }
        loop {
            let entry = self.entries.next()?;
            self.current = entry.as_slice().iter();
            if let Some(&byte) = self.current.next() {
                self.remaining -= 1;
                return Some(byte);
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}
impl FusedIterator for Iter<'_> {}
