//! Fixed-width element views over byte sequences.
//!
//! A [`TypedView`] reinterprets a [`ByteSequence`](crate::ByteSequence) as a
//! sequence of fixed-width unsigned-integer elements without copying it.
//! Element access assembles a little-endian value through a small stack
//! scratch buffer; this is the only point that copies, and only when an
//! element's bytes straddle a region boundary.
//!
//! The type invariant is that the backing byte length is always a whole
//! multiple of the element width. Construction either enforces that
//! strictly ([`TypedView::new`], failing with `PartialData`) or splits the
//! ragged tail off explicitly ([`TypedView::split_partial`]), at the
//! caller's choice.

mod element;
mod iter;
mod view;

pub use element::Element;
pub use iter::Elements;
pub use view::TypedView;
