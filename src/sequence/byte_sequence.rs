//! The segmented immutable byte buffer.

use super::Iter;
use crate::error::SequenceError;
use crate::region::Region;
use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, AddAssign, Range};

/// Inline capacity for the entry table. Streams assembled chunk by chunk
/// rarely hold more than a handful of live regions at once.
type Entries = SmallVec<[Entry; 4]>;

/// One constituent window: a region plus the sub-span of it this sequence
/// uses. Trimming at a slice boundary adjusts `offset`/`len` and never
/// copies bytes.
#[derive(Clone)]
pub(super) struct Entry {
    region: Region,
    offset: usize,
    len: usize,
}

impl Entry {
    pub(super) fn as_slice(&self) -> &[u8] {
        &self.region.as_slice()[self.offset..self.offset + self.len]
    }
}

/// An immutable sequence of bytes built by concatenating regions.
///
/// `ByteSequence` is a persistent value type: [`concat`](Self::concat) and
/// [`slice`](Self::slice) produce new sequences that share region storage
/// with their inputs, and [`append`](Self::append) updates only the value it
/// is called on, never aliased clones.
///
/// Equality and hashing are defined on byte content, not on how the
/// content happens to be segmented.
///
/// # Examples
///
/// ```
/// use segbytes::{ByteSequence, Region};
///
/// let head = ByteSequence::from_region(Region::from_static(b"hel"));
/// let tail = ByteSequence::from_region(Region::from_static(b"lo"));
/// let joined = head.concat(&tail);
///
/// assert_eq!(joined.len(), 5);
/// assert_eq!(joined.to_vec(), b"hello");
/// assert_eq!(joined, ByteSequence::from(b"hello".to_vec()));
/// ```
#[derive(Clone, Default)]
pub struct ByteSequence {
    entries: Entries,
    len: usize,
}

impl ByteSequence {
    /// Create an empty sequence. No allocation occurs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap exactly one region. An empty region yields the empty sequence.
    #[must_use]
    pub fn from_region(region: Region) -> Self {
        let len = region.len();
        if len == 0 {
            return Self::new();
        }
        let mut entries = Entries::new();
        entries.push(Entry {
            region,
            offset: 0,
            len,
        });
        ByteSequence { entries, len }
    }

    /// Total number of bytes. O(1), derived from the stored total.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the sequence holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of constituent regions.
    #[must_use]
    pub fn region_count(&self) -> usize {
        self.entries.len()
    }

    /// The byte at `index`.
    ///
    /// Scans region boundaries to find the owning region, then indexes into
    /// its view directly. Boundaries are half-open: an index that falls
    /// exactly where one region ends belongs to the next.
    ///
    /// # Errors
    ///
    /// [`SequenceError::IndexOutOfRange`] if `index >= len`.
    pub fn byte_at(&self, index: usize) -> Result<u8, SequenceError> {
        if index >= self.len {
            return Err(SequenceError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        let mut start = 0;
        for entry in &self.entries {
            let end = start + entry.len;
            if index < end {
                return Ok(entry.as_slice()[index - start]);
            }
            start = end;
        }
        unreachable!("index {index} within bounds but not covered by any entry");
    }

    /// The sub-sequence covering `[range.start, range.end)`.
    ///
    /// Trims the leading and trailing regions rather than copying bytes;
    /// `range.end == range.start` yields the empty sequence.
    ///
    /// # Errors
    ///
    /// [`SequenceError::RangeOutOfBounds`] if `range.end < range.start` or
    /// `range.end > len`.
    pub fn slice(&self, range: Range<usize>) -> Result<ByteSequence, SequenceError> {
        if range.end < range.start || range.end > self.len {
            return Err(SequenceError::RangeOutOfBounds {
                start: range.start,
                end: range.end,
                len: self.len,
            });
        }

        let mut entries = Entries::new();
        let mut skip = range.start;
        let mut take = range.end - range.start;
        for entry in &self.entries {
            if take == 0 {
                break;
            }
            if skip >= entry.len {
                skip -= entry.len;
                continue;
            }
            let window = (entry.len - skip).min(take);
            entries.push(Entry {
                region: entry.region.clone(),
                offset: entry.offset + skip,
                len: window,
            });
            take -= window;
            skip = 0;
        }

        Ok(ByteSequence {
            entries,
            len: range.end - range.start,
        })
    }

    /// A new sequence holding self's bytes followed by `other`'s.
    ///
    /// Structural: appends region lists without copying payload bytes.
    #[must_use]
    pub fn concat(&self, other: &ByteSequence) -> ByteSequence {
        let mut entries = self.entries.clone();
        entries.extend(other.entries.iter().cloned());
        ByteSequence {
            entries,
            len: self.len + other.len,
        }
    }

    /// In-place value update equivalent to `*self = self.concat(other)`.
    ///
    /// Aliased clones of `self` are unaffected.
    pub fn append(&mut self, other: &ByteSequence) {
        self.entries.extend(other.entries.iter().cloned());
        self.len += other.len;
    }

    /// The constituent region covering global `index`, as a single-region
    /// sequence sharing storage, together with the half-open byte range it
    /// occupies in the whole sequence.
    ///
    /// # Errors
    ///
    /// [`SequenceError::IndexOutOfRange`] if `index >= len`.
    pub fn region_at(&self, index: usize) -> Result<(ByteSequence, Range<usize>), SequenceError> {
        if index >= self.len {
            return Err(SequenceError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        let mut start = 0;
        for entry in &self.entries {
            let end = start + entry.len;
            if index < end {
                let mut entries = Entries::new();
                entries.push(entry.clone());
                let len = entry.len;
                return Ok((ByteSequence { entries, len }, start..end));
            }
            start = end;
        }
        unreachable!("index {index} within bounds but not covered by any entry");
    }

    /// Visit constituent regions left to right.
    ///
    /// Each call receives the region's global byte range and a read view of
    /// its bytes. Returning `false` stops the traversal; the return value
    /// reports whether the traversal ran to completion.
    pub fn for_each_region<F>(&self, mut visit: F) -> bool
    where
        F: FnMut(Range<usize>, &[u8]) -> bool,
    {
        let mut start = 0;
        for entry in &self.entries {
            let end = start + entry.len;
            if !visit(start..end, entry.as_slice()) {
                return false;
            }
            start = end;
        }
        true
    }

    /// Copy `dst.len()` bytes starting at `offset` into `dst`.
    ///
    /// This is the one operation element decoding relies on: it gathers a
    /// window that may span several regions into one contiguous buffer.
    ///
    /// # Errors
    ///
    /// [`SequenceError::RangeOutOfBounds`] if `offset + dst.len() > len`.
    pub fn copy_to_slice(&self, offset: usize, dst: &mut [u8]) -> Result<(), SequenceError> {
        let end = offset.saturating_add(dst.len());
        if end > self.len {
            return Err(SequenceError::RangeOutOfBounds {
                start: offset,
                end,
                len: self.len,
            });
        }

        let mut filled = 0;
        let mut skip = offset;
        for entry in &self.entries {
            if filled == dst.len() {
                break;
            }
            if skip >= entry.len {
                skip -= entry.len;
                continue;
            }
            let chunk = &entry.as_slice()[skip..];
            let take = chunk.len().min(dst.len() - filled);
            dst[filled..filled + take].copy_from_slice(&chunk[..take]);
            filled += take;
            skip = 0;
        }
        Ok(())
    }

    /// Map the whole sequence into one contiguous read-only view and invoke
    /// `body` with it.
    ///
    /// Borrows the single region directly when there is at most one;
    /// otherwise merges into a scratch copy, which makes this potentially
    /// expensive. The view is scoped to the call and cannot escape it.
    pub fn with_contiguous<F, R>(&self, body: F) -> R
    where
        F: FnOnce(&[u8]) -> R,
    {
        match self.entries.as_slice() {
            [] => body(&[]),
            [single] => body(single.as_slice()),
            _ => body(&self.to_vec()),
        }
    }

    /// [`with_contiguous`](Self::with_contiguous) over a sub-range only.
    ///
    /// # Errors
    ///
    /// [`SequenceError::RangeOutOfBounds`] if the range is invalid.
    pub fn with_contiguous_subrange<F, R>(
        &self,
        range: Range<usize>,
        body: F,
    ) -> Result<R, SequenceError>
    where
        F: FnOnce(&[u8]) -> R,
    {
        Ok(self.slice(range)?.with_contiguous(body))
    }

    /// Copy the whole sequence into a fresh `Vec`.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len);
        self.for_each_region(|_, chunk| {
            out.extend_from_slice(chunk);
            true
        });
        out
    }

    /// A lazy, finite, restartable iterator over individual bytes.
    ///
    /// Each call starts a fresh traversal; the sequence is immutable, so
    /// multiple concurrent iterations are safe.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }

    pub(super) fn entry_slice(&self) -> &[Entry] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a ByteSequence {
    type Item = u8;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl From<Region> for ByteSequence {
    fn from(region: Region) -> Self {
        Self::from_region(region)
    }
}

impl From<Vec<u8>> for ByteSequence {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_region(Region::from_vec(bytes))
    }
}

impl From<&'static [u8]> for ByteSequence {
    fn from(bytes: &'static [u8]) -> Self {
        Self::from_region(Region::from_static(bytes))
    }
}

impl Add for ByteSequence {
    type Output = ByteSequence;

    fn add(mut self, rhs: ByteSequence) -> ByteSequence {
        self.append(&rhs);
        self
    }
}

impl AddAssign for ByteSequence {
    fn add_assign(&mut self, rhs: ByteSequence) {
        self.append(&rhs);
    }
}

impl PartialEq for ByteSequence {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl Eq for ByteSequence {}

impl Hash for ByteSequence {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Byte-at-a-time so the hash is independent of segmentation.
        state.write_usize(self.len);
        for byte in self {
            state.write_u8(byte);
        }
    }
}

impl fmt::Debug for ByteSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteSequence")
            .field("len", &self.len)
            .field("regions", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_test(name: &str) {
        crate::test_utils::init_test_logging();
        crate::test_phase!(name);
    }

    fn segmented(chunks: &[&'static [u8]]) -> ByteSequence {
        let mut seq = ByteSequence::new();
        for chunk in chunks {
            seq.append(&ByteSequence::from_region(Region::from_static(chunk)));
        }
        seq
    }

    #[test]
    fn empty_sequence() {
        init_test("empty_sequence");
        let seq = ByteSequence::new();
        crate::assert_with_log!(seq.is_empty(), "is_empty", true, seq.is_empty());
        crate::assert_with_log!(seq.len() == 0, "len", 0, seq.len());
        crate::test_complete!("empty_sequence");
    }

    #[test]
    fn byte_at_crosses_boundaries() {
        init_test("byte_at_crosses_boundaries");
        let seq = segmented(&[b"abc", b"de", b"f"]);
        let expected = b"abcdef";
        for (i, want) in expected.iter().enumerate() {
            let got = seq.byte_at(i).unwrap();
            crate::assert_with_log!(got == *want, "byte", *want, got);
        }
        let err = seq.byte_at(6).unwrap_err();
        crate::assert_with_log!(
            err == SequenceError::IndexOutOfRange { index: 6, len: 6 },
            "out of range",
            SequenceError::IndexOutOfRange { index: 6, len: 6 },
            err
        );
        crate::test_complete!("byte_at_crosses_boundaries");
    }

    #[test]
    fn slice_round_trip() {
        init_test("slice_round_trip");
        let seq = segmented(&[b"0123", b"4567", b"89"]);
        let sub = seq.slice(2..9).unwrap();
        crate::assert_with_log!(sub.len() == 7, "slice len", 7, sub.len());
        for i in 0..sub.len() {
            let a = sub.byte_at(i).unwrap();
            let b = seq.byte_at(2 + i).unwrap();
            crate::assert_with_log!(a == b, "slice byte matches parent", b, a);
        }
        crate::test_complete!("slice_round_trip");
    }

    #[test]
    fn slice_is_zero_copy() {
        init_test("slice_is_zero_copy");
        let seq = segmented(&[b"0123", b"4567"]);
        // Interior slice keeps both trimmed regions, no merge.
        let sub = seq.slice(2..6).unwrap();
        crate::assert_with_log!(sub.region_count() == 2, "regions", 2, sub.region_count());
        let bytes = sub.to_vec();
        crate::assert_with_log!(bytes == b"2345", "bytes", b"2345", bytes);
        crate::test_complete!("slice_is_zero_copy");
    }

    #[test]
    fn slice_empty_and_invalid() {
        init_test("slice_empty_and_invalid");
        let seq = segmented(&[b"abc"]);
        let empty = seq.slice(1..1).unwrap();
        crate::assert_with_log!(empty.is_empty(), "empty slice", true, empty.is_empty());

        let err = seq.slice(0..4).unwrap_err();
        crate::assert_with_log!(
            matches!(err, SequenceError::RangeOutOfBounds { end: 4, .. }),
            "end past len",
            "RangeOutOfBounds",
            err
        );
        #[allow(clippy::reversed_empty_ranges)]
        let err = seq.slice(2..1).unwrap_err();
        crate::assert_with_log!(
            matches!(err, SequenceError::RangeOutOfBounds { .. }),
            "reversed range",
            "RangeOutOfBounds",
            err
        );
        crate::test_complete!("slice_empty_and_invalid");
    }

    #[test]
    fn concat_identity() {
        init_test("concat_identity");
        let seq = segmented(&[b"abc", b"def"]);
        let empty = ByteSequence::new();
        let left = empty.concat(&seq);
        let right = seq.concat(&empty);
        crate::assert_with_log!(left == seq, "empty.concat(s)", true, left == seq);
        crate::assert_with_log!(right == seq, "s.concat(empty)", true, right == seq);
        crate::test_complete!("concat_identity");
    }

    #[test]
    fn concat_associativity_of_content() {
        init_test("concat_associativity_of_content");
        let a = segmented(&[b"ab"]);
        let b = segmented(&[b"cde"]);
        let c = segmented(&[b"f"]);
        let left = a.concat(&b).concat(&c);
        let right = a.concat(&b.concat(&c));
        crate::assert_with_log!(left == right, "associativity", true, left == right);
        crate::test_complete!("concat_associativity_of_content");
    }

    #[test]
    fn append_has_value_semantics() {
        init_test("append_has_value_semantics");
        let mut seq = segmented(&[b"abc"]);
        let alias = seq.clone();
        seq.append(&segmented(&[b"def"]));
        crate::assert_with_log!(seq.len() == 6, "appended len", 6, seq.len());
        crate::assert_with_log!(alias.len() == 3, "alias untouched", 3, alias.len());
        crate::test_complete!("append_has_value_semantics");
    }

    #[test]
    fn region_at_respects_half_open_boundaries() {
        init_test("region_at_respects_half_open_boundaries");
        let seq = segmented(&[b"abc", b"de"]);
        // Index 3 sits exactly on the 3/2 boundary: it belongs to region B.
        let (region, range) = seq.region_at(3).unwrap();
        crate::assert_with_log!(range == (3..5), "range", 3..5, range);
        let bytes = region.to_vec();
        crate::assert_with_log!(bytes == b"de", "bytes", b"de", bytes);

        let (region, range) = seq.region_at(2).unwrap();
        crate::assert_with_log!(range == (0..3), "range", 0..3, range);
        let bytes = region.to_vec();
        crate::assert_with_log!(bytes == b"abc", "bytes", b"abc", bytes);
        crate::test_complete!("region_at_respects_half_open_boundaries");
    }

    #[test]
    fn for_each_region_early_exit() {
        init_test("for_each_region_early_exit");
        let seq = segmented(&[b"ab", b"cd", b"ef"]);
        let mut visited = Vec::new();
        let completed = seq.for_each_region(|range, chunk| {
            visited.push((range, chunk.to_vec()));
            visited.len() < 2
        });
        crate::assert_with_log!(!completed, "stopped early", false, completed);
        crate::assert_with_log!(visited.len() == 2, "visit count", 2, visited.len());
        crate::assert_with_log!(
            visited[1].0 == (2..4),
            "second range",
            2..4,
            visited[1].0
        );
        crate::test_complete!("for_each_region_early_exit");
    }

    #[test]
    fn copy_to_slice_spans_regions() {
        init_test("copy_to_slice_spans_regions");
        let seq = segmented(&[b"012", b"345", b"678"]);
        let mut window = [0u8; 5];
        seq.copy_to_slice(2, &mut window).unwrap();
        crate::assert_with_log!(&window == b"23456", "window", b"23456", window);

        let mut too_far = [0u8; 4];
        let err = seq.copy_to_slice(7, &mut too_far).unwrap_err();
        crate::assert_with_log!(
            matches!(err, SequenceError::RangeOutOfBounds { .. }),
            "out of bounds copy",
            "RangeOutOfBounds",
            err
        );
        crate::test_complete!("copy_to_slice_spans_regions");
    }

    #[test]
    fn with_contiguous_borrows_single_region() {
        init_test("with_contiguous_borrows_single_region");
        let single = segmented(&[b"only"]);
        let len = single.with_contiguous(<[u8]>::len);
        crate::assert_with_log!(len == 4, "single len", 4, len);

        let multi = segmented(&[b"ab", b"cd"]);
        let merged = multi.with_contiguous(<[u8]>::to_vec);
        crate::assert_with_log!(merged == b"abcd", "merged", b"abcd", merged);

        let sub = multi.with_contiguous_subrange(1..3, <[u8]>::to_vec).unwrap();
        crate::assert_with_log!(sub == b"bc", "subrange", b"bc", sub);
        crate::test_complete!("with_contiguous_borrows_single_region");
    }

    #[test]
    fn equality_ignores_segmentation() {
        init_test("equality_ignores_segmentation");
        let chunked = segmented(&[b"ab", b"cd", b"e"]);
        let flat = segmented(&[b"abcde"]);
        crate::assert_with_log!(chunked == flat, "content equality", true, chunked == flat);

        let different = segmented(&[b"abcdf"]);
        crate::assert_with_log!(chunked != different, "inequality", true, chunked != different);
        crate::test_complete!("equality_ignores_segmentation");
    }

    #[test]
    fn hash_matches_equality() {
        init_test("hash_matches_equality");
        use std::collections::hash_map::DefaultHasher;

        let hash_of = |seq: &ByteSequence| {
            let mut hasher = DefaultHasher::new();
            seq.hash(&mut hasher);
            hasher.finish()
        };
        let chunked = segmented(&[b"ab", b"cd"]);
        let flat = segmented(&[b"abcd"]);
        let h1 = hash_of(&chunked);
        let h2 = hash_of(&flat);
        crate::assert_with_log!(h1 == h2, "hashes agree", h2, h1);
        crate::test_complete!("hash_matches_equality");
    }

    #[test]
    fn operators_concatenate() {
        init_test("operators_concatenate");
        let a = segmented(&[b"ab"]);
        let b = segmented(&[b"cd"]);
        let joined = a.clone() + b.clone();
        crate::assert_with_log!(joined.to_vec() == b"abcd", "add", b"abcd", joined.to_vec());

        let mut acc = a;
        acc += b;
        crate::assert_with_log!(acc == joined, "add_assign", true, acc == joined);
        crate::test_complete!("operators_concatenate");
    }

    #[test]
    fn empty_region_collapses() {
        init_test("empty_region_collapses");
        let seq = ByteSequence::from_region(Region::from_vec(Vec::new()));
        crate::assert_with_log!(seq.region_count() == 0, "regions", 0, seq.region_count());
        crate::test_complete!("empty_region_collapses");
    }
}
