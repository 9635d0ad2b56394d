//! Persistent, structurally-shared byte sequences.
//!
//! A [`ByteSequence`] concatenates independently-owned
//! [`Region`](crate::Region)s into one immutable logical byte string.
//! Concatenation and slicing are structural: they share region storage and
//! never copy payload bytes. The only copying operations are the explicit
//! escape hatches ([`ByteSequence::with_contiguous`],
//! [`ByteSequence::to_vec`], [`ByteSequence::copy_to_slice`]).
//!
//! Sequences are plain values: cloning shares storage, and no operation
//! mutates a region, so concurrent readers may iterate the same sequence
//! from multiple threads without synchronization.

mod byte_sequence;
mod iter;

pub use byte_sequence::ByteSequence;
pub use iter::Iter;
