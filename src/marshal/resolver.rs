//! Element size resolution with a per-type cache
//!
//! Every view consults this module to compute element offsets. The raw size
//! of a type is a compile-time constant; the marshalled size is resolved
//! through [`Marshal::wire_size`] once per type and cached, because wire-size
//! resolution may be expensive for composite types. A cached size never
//! changes for the lifetime of the process.

use super::Marshal;
use lazy_static::lazy_static;
use std::any::TypeId;
use std::collections::HashMap;
use std::mem;
use std::sync::RwLock;

lazy_static! {
    static ref MARSHALLED_SIZES: RwLock<HashMap<TypeId, usize>> = RwLock::new(HashMap::new());
}

/// In-memory size of `T`, used by the raw/blittable encoding.
pub const fn raw_size_of<T>() -> usize {
    mem::size_of::<T>()
}

/// Wire size of `T`, resolved once per type and cached.
pub fn marshalled_size_of<T: Marshal>() -> usize {
    let key = TypeId::of::<T>();
    if let Some(&size) = MARSHALLED_SIZES.read().unwrap().get(&key) {
        return size;
    }
    let size = T::wire_size();
    let mut sizes = MARSHALLED_SIZES.write().unwrap();
    // First insertion wins; the cached size for a type never changes.
    *sizes.entry(key).or_insert(size)
}

/// Element size of `T` under the encoding selected by `marshalled`.
pub fn element_size_of<T: Marshal>(marshalled: bool) -> usize {
    if marshalled {
        marshalled_size_of::<T>()
    } else {
        raw_size_of::<T>()
    }
}

/// Number of types with a cached marshalled size.
pub fn cached_type_count() -> usize {
    MARSHALLED_SIZES.read().unwrap().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marshal::FixedText;
    use crate::MemoryResult;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_raw_size() {
        assert_eq!(raw_size_of::<u32>(), 4);
        assert_eq!(raw_size_of::<u64>(), 8);
        assert_eq!(raw_size_of::<FixedText<16>>(), mem::size_of::<String>());
    }

    #[test]
    fn test_marshalled_size_differs_from_raw() {
        assert_eq!(marshalled_size_of::<FixedText<16>>(), 16);
        assert_ne!(
            marshalled_size_of::<FixedText<16>>(),
            raw_size_of::<FixedText<16>>()
        );
    }

    #[test]
    fn test_element_size_follows_encoding_flag() {
        assert_eq!(element_size_of::<u32>(false), 4);
        assert_eq!(element_size_of::<u32>(true), 4);

        assert_eq!(element_size_of::<FixedText<32>>(true), 32);
        assert_eq!(
            element_size_of::<FixedText<32>>(false),
            mem::size_of::<String>()
        );
    }

    #[test]
    fn test_wire_size_resolved_once_per_type() {
        static WIRE_SIZE_CALLS: AtomicUsize = AtomicUsize::new(0);

        struct Counted;

        impl Marshal for Counted {
            fn wire_size() -> usize {
                WIRE_SIZE_CALLS.fetch_add(1, Ordering::SeqCst);
                12
            }

            fn marshal(&self, _out: &mut [u8]) -> MemoryResult<()> {
                Ok(())
            }

            fn unmarshal(_bytes: &[u8]) -> MemoryResult<Self> {
                Ok(Counted)
            }
        }

        assert_eq!(marshalled_size_of::<Counted>(), 12);
        assert_eq!(marshalled_size_of::<Counted>(), 12);
        assert_eq!(marshalled_size_of::<Counted>(), 12);
        assert_eq!(WIRE_SIZE_CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cache_registers_resolved_types() {
        let _ = marshalled_size_of::<FixedText<31>>();
        assert!(cached_type_count() >= 1);
    }
}
