//! The fixed-width unsigned element alphabet.

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
    impl Sealed for u64 {}
}

/// A fixed-width unsigned integer a [`TypedView`](crate::TypedView) can
/// decode. Implemented for `u8`, `u16`, `u32`, and `u64`; sealed.
pub trait Element: sealed::Sealed + Copy + Eq + std::fmt::Debug + Send + Sync + 'static {
    /// Width of one element in bytes.
    const WIDTH: usize;

    /// Decode one element from exactly [`WIDTH`](Self::WIDTH) little-endian
    /// bytes.
    fn from_le_slice(bytes: &[u8]) -> Self;
}

impl Element for u8 {
    const WIDTH: usize = 1;

    fn from_le_slice(bytes: &[u8]) -> Self {
        bytes[0]
    }
}

impl Element for u16 {
    const WIDTH: usize = 2;

    fn from_le_slice(bytes: &[u8]) -> Self {
        let mut buf = [0u8; 2];
        buf.copy_from_slice(bytes);
        Self::from_le_bytes(buf)
    }
}

impl Element for u32 {
    const WIDTH: usize = 4;

    fn from_le_slice(bytes: &[u8]) -> Self {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(bytes);
        Self::from_le_bytes(buf)
    }
}

impl Element for u64 {
    const WIDTH: usize = 8;

    fn from_le_slice(bytes: &[u8]) -> Self {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(bytes);
        Self::from_le_bytes(buf)
    }
}
