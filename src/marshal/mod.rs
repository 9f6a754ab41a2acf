//! Marshalled (fixed-wire-size) element encoding
//!
//! Raw reads and writes copy a value's in-memory layout byte for byte. The
//! marshalled encoding instead moves values through an explicit wire form
//! whose size may differ from the in-memory size; the canonical case is
//! [`FixedText`], an owned string stored inline as a NUL-padded byte field.
//! The per-type wire size is resolved through [`resolver`], which caches it
//! for the lifetime of the process.

pub mod resolver;

use crate::core::types::{MemoryError, MemoryResult};
use std::fmt;
use std::mem;

/// Fixed-wire-size encode/decode for the marshalled memory operations.
///
/// `wire_size` may be expensive to compute; callers go through
/// [`resolver::marshalled_size_of`], which resolves it once per type.
/// `unmarshal` always produces a fresh value, never a reference into the
/// input buffer.
///
/// Composite types marshal field by field:
///
/// ```
/// use memview::{FixedText, Marshal, MemoryResult};
///
/// struct Player {
///     id: u32,
///     name: FixedText<8>,
/// }
///
/// impl Marshal for Player {
///     fn wire_size() -> usize {
///         u32::wire_size() + FixedText::<8>::wire_size()
///     }
///
///     fn marshal(&self, out: &mut [u8]) -> MemoryResult<()> {
///         self.id.marshal(&mut out[..4])?;
///         self.name.marshal(&mut out[4..])
///     }
///
///     fn unmarshal(bytes: &[u8]) -> MemoryResult<Self> {
///         Ok(Player {
///             id: u32::unmarshal(&bytes[..4])?,
///             name: FixedText::unmarshal(&bytes[4..])?,
///         })
///     }
/// }
///
/// let player = Player { id: 7, name: FixedText::new("Ada")? };
/// let mut wire = vec![0u8; Player::wire_size()];
/// player.marshal(&mut wire)?;
/// let decoded = Player::unmarshal(&wire)?;
/// assert_eq!(decoded.id, 7);
/// assert_eq!(decoded.name.as_str(), "Ada");
/// # Ok::<(), memview::MemoryError>(())
/// ```
pub trait Marshal: Sized + 'static {
    /// Size of the wire form in bytes.
    fn wire_size() -> usize;

    /// Encodes `self` into the first [`wire_size`](Marshal::wire_size) bytes
    /// of `out`.
    fn marshal(&self, out: &mut [u8]) -> MemoryResult<()>;

    /// Decodes a fresh value from the first
    /// [`wire_size`](Marshal::wire_size) bytes of `bytes`.
    fn unmarshal(bytes: &[u8]) -> MemoryResult<Self>;
}

macro_rules! impl_marshal_numeric {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Marshal for $ty {
                fn wire_size() -> usize {
                    mem::size_of::<$ty>()
                }

                fn marshal(&self, out: &mut [u8]) -> MemoryResult<()> {
                    let size = mem::size_of::<$ty>();
                    if out.len() < size {
                        return Err(MemoryError::BufferTooSmall {
                            expected: size,
                            actual: out.len(),
                        });
                    }
                    out[..size].copy_from_slice(&self.to_ne_bytes());
                    Ok(())
                }

                fn unmarshal(bytes: &[u8]) -> MemoryResult<Self> {
                    let size = mem::size_of::<$ty>();
                    if bytes.len() < size {
                        return Err(MemoryError::BufferTooSmall {
                            expected: size,
                            actual: bytes.len(),
                        });
                    }
                    let mut raw = [0u8; mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..size]);
                    Ok(<$ty>::from_ne_bytes(raw))
                }
            }
        )*
    };
}

// Wire form of the numeric primitives is their native byte layout, so the
// raw and marshalled encodings agree for them.
impl_marshal_numeric!(u8, i8, u16, i16, u32, i32, u64, i64, usize, isize, f32, f64);

impl Marshal for bool {
    fn wire_size() -> usize {
        1
    }

    fn marshal(&self, out: &mut [u8]) -> MemoryResult<()> {
        if out.is_empty() {
            return Err(MemoryError::BufferTooSmall {
                expected: 1,
                actual: 0,
            });
        }
        out[0] = *self as u8;
        Ok(())
    }

    fn unmarshal(bytes: &[u8]) -> MemoryResult<Self> {
        if bytes.is_empty() {
            return Err(MemoryError::BufferTooSmall {
                expected: 1,
                actual: 0,
            });
        }
        Ok(bytes[0] != 0)
    }
}

/// An owned string with an `N`-byte NUL-padded UTF-8 wire form.
///
/// In memory this is an ordinary heap-backed string; on the wire it occupies
/// exactly `N` bytes, padded with NULs. Its marshalled size therefore differs
/// from its raw size, which is what makes a view's encoding flag observable.
/// Construction rejects text longer than `N` bytes; nothing is silently
/// truncated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FixedText<const N: usize> {
    text: String,
}

impl<const N: usize> FixedText<N> {
    /// Creates a fixed text field, failing if `text` exceeds `N` bytes.
    pub fn new(text: impl Into<String>) -> MemoryResult<Self> {
        let text = text.into();
        if text.len() > N {
            return Err(MemoryError::marshal_failed::<Self>(format!(
                "text is {} bytes but the field holds {}",
                text.len(),
                N
            )));
        }
        Ok(FixedText { text })
    }

    /// The contained text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Length of the contained text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the contained text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Maximum capacity of the field in bytes.
    pub const fn capacity() -> usize {
        N
    }

    /// Consumes the field, returning the contained string.
    pub fn into_string(self) -> String {
        self.text
    }
}

impl<const N: usize> fmt::Display for FixedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl<const N: usize> AsRef<str> for FixedText<N> {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl<const N: usize> PartialEq<&str> for FixedText<N> {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

impl<const N: usize> Marshal for FixedText<N> {
    fn wire_size() -> usize {
        N
    }

    fn marshal(&self, out: &mut [u8]) -> MemoryResult<()> {
        if out.len() < N {
            return Err(MemoryError::BufferTooSmall {
                expected: N,
                actual: out.len(),
            });
        }
        let out = &mut out[..N];
        out.fill(0);
        out[..self.text.len()].copy_from_slice(self.text.as_bytes());
        Ok(())
    }

    fn unmarshal(bytes: &[u8]) -> MemoryResult<Self> {
        if bytes.len() < N {
            return Err(MemoryError::BufferTooSmall {
                expected: N,
                actual: bytes.len(),
            });
        }
        let bytes = &bytes[..N];
        let len = bytes.iter().position(|&b| b == 0).unwrap_or(N);
        let text = std::str::from_utf8(&bytes[..len])
            .map_err(|err| MemoryError::marshal_failed::<Self>(err.to_string()))?
            .to_string();
        Ok(FixedText { text })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_round_trip() {
        let value: u32 = 0xDEAD_BEEF;
        let mut wire = [0u8; 4];
        value.marshal(&mut wire).unwrap();
        assert_eq!(u32::unmarshal(&wire).unwrap(), value);

        let value: f64 = -1234.5;
        let mut wire = [0u8; 8];
        value.marshal(&mut wire).unwrap();
        assert_eq!(f64::unmarshal(&wire).unwrap(), value);
    }

    #[test]
    fn test_numeric_short_buffer() {
        let mut wire = [0u8; 2];
        let err = 7u32.marshal(&mut wire).unwrap_err();
        assert!(matches!(
            err,
            MemoryError::BufferTooSmall {
                expected: 4,
                actual: 2
            }
        ));

        let err = u32::unmarshal(&wire).unwrap_err();
        assert!(matches!(err, MemoryError::BufferTooSmall { .. }));
    }

    #[test]
    fn test_bool_wire_form() {
        let mut wire = [0u8; 1];
        true.marshal(&mut wire).unwrap();
        assert_eq!(wire[0], 1);
        assert!(bool::unmarshal(&wire).unwrap());

        false.marshal(&mut wire).unwrap();
        assert!(!bool::unmarshal(&wire).unwrap());

        // Any nonzero byte decodes as true
        assert!(bool::unmarshal(&[0xFF]).unwrap());
    }

    #[test]
    fn test_fixed_text_construction() {
        let text = FixedText::<8>::new("hello").unwrap();
        assert_eq!(text.as_str(), "hello");
        assert_eq!(text.len(), 5);
        assert!(!text.is_empty());
        assert_eq!(FixedText::<8>::capacity(), 8);

        // Exactly N bytes is allowed
        assert!(FixedText::<8>::new("12345678").is_ok());

        let err = FixedText::<8>::new("too long for field").unwrap_err();
        assert!(matches!(err, MemoryError::MarshalFailed { .. }));
    }

    #[test]
    fn test_fixed_text_wire_form_is_nul_padded() {
        let text = FixedText::<8>::new("abc").unwrap();
        let mut wire = [0xFFu8; 8];
        text.marshal(&mut wire).unwrap();
        assert_eq!(&wire, b"abc\0\0\0\0\0");
    }

    #[test]
    fn test_fixed_text_round_trip() {
        let text = FixedText::<16>::new("round trip").unwrap();
        let mut wire = [0u8; 16];
        text.marshal(&mut wire).unwrap();

        let decoded = FixedText::<16>::unmarshal(&wire).unwrap();
        assert_eq!(decoded, text);
        assert_eq!(decoded, "round trip");
    }

    #[test]
    fn test_fixed_text_unmarshal_full_width() {
        // No NUL terminator when the text fills the field
        let decoded = FixedText::<4>::unmarshal(b"full").unwrap();
        assert_eq!(decoded.as_str(), "full");
    }

    #[test]
    fn test_fixed_text_unmarshal_invalid_utf8() {
        let err = FixedText::<4>::unmarshal(&[0xC3, 0x28, 0x00, 0x00]).unwrap_err();
        match err {
            MemoryError::MarshalFailed { type_name, .. } => {
                assert!(type_name.contains("FixedText"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_fixed_text_display() {
        let text = FixedText::<8>::new("show").unwrap();
        assert_eq!(format!("{}", text), "show");
        assert_eq!(text.clone().into_string(), "show");
    }
}
