//! Fixed-width record values
//!
//! A record travels as its raw in-memory bytes. No endianness normalization
//! is applied: host and device must agree on the layout.

use std::fmt::Debug;

/// Packed LED color as used by WS2811 controllers (0xWWRRGGBB)
pub type LedColor = u32;

/// A fixed-width value that can be mirrored byte-for-byte
pub trait Record: Copy + Default + PartialEq + Debug + Send + 'static {
    /// Width of one record in bytes
    const SIZE: usize;

    /// Append the native-endian bytes of this record
    fn write_ne(&self, out: &mut Vec<u8>);

    /// Read a record from the first `SIZE` bytes of `bytes`
    ///
    /// Callers guarantee `bytes.len() >= SIZE`.
    fn read_ne(bytes: &[u8]) -> Self;
}

macro_rules! impl_record {
    ($($t:ty),* $(,)?) => {
        $(
            impl Record for $t {
                const SIZE: usize = std::mem::size_of::<$t>();

                #[inline]
                fn write_ne(&self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_ne_bytes());
                }

                #[inline]
                fn read_ne(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$t>()];
                    raw.copy_from_slice(&bytes[..Self::SIZE]);
                    <$t>::from_ne_bytes(raw)
                }
            }
        )*
    };
}

impl_record!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);
