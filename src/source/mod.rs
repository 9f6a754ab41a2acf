//! Memory source capabilities and their backends
//!
//! A *source* is any type implementing the capability traits below: transfer
//! ([`MemoryReadWrite`]), allocation ([`MemoryAllocate`]) and protection
//! ([`MemoryProtect`]). Two backends are provided: [`LocalMemory`] for the
//! calling process's own address space and [`ProcessMemory`] for an external
//! process reached through OS syscalls. Every failure is surfaced
//! synchronously to the caller with the address, size and platform error code
//! attached; this layer never retries and never degrades (a marshalled
//! operation is never silently performed raw, an external source never falls
//! back to the local one).

pub mod guard;
pub mod local;
pub mod process;

pub use guard::{AllocationGuard, ProtectionGuard};
pub use local::LocalMemory;
pub use process::ProcessMemory;

use crate::core::types::{Address, MemoryAllocation, MemoryProtection, MemoryResult};
use crate::marshal::{resolver, Marshal};
use std::mem;
use std::mem::MaybeUninit;
use std::slice;

/// Marshalled transfers at or below this size stage through a stack buffer;
/// larger ones take a heap allocation to bound stack usage.
pub const MARSHAL_STACK_BUFFER: usize = 1024;

/// Byte transfer in and out of an address space.
///
/// `read_raw`/`write_raw` move exactly `buffer.len()` bytes; a partial
/// transfer is reported as a failure, and empty buffers short-circuit without
/// touching the backend. The provided typed operations layer the two element
/// encodings on top: `read`/`write` copy the in-memory layout of `T`
/// directly, `read_marshalled`/`write_marshalled` stage the wire form of `T`
/// through a scratch buffer.
pub trait MemoryReadWrite {
    /// Copies `buffer.len()` bytes from `address` into `buffer`.
    fn read_raw(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<()>;

    /// Copies all of `data` to `address`.
    fn write_raw(&self, address: Address, data: &[u8]) -> MemoryResult<()>;

    /// Reads a value of `T` from its raw in-memory layout at `address`.
    ///
    /// `T` must be a plain-data type: fixed layout, no references or heap
    /// handles, and every bit pattern valid. In practice this means the
    /// numeric primitives and `#[repr(C)]` aggregates of them. No heap
    /// allocation occurs during the call.
    fn read<T: Copy>(&self, address: Address) -> MemoryResult<T>
    where
        Self: Sized,
    {
        let mut value = MaybeUninit::<T>::uninit();
        // Safety: the buffer spans exactly the size_of::<T>() bytes of
        // `value`, which read_raw fills completely or fails.
        unsafe {
            let buffer =
                slice::from_raw_parts_mut(value.as_mut_ptr() as *mut u8, mem::size_of::<T>());
            self.read_raw(address, buffer)?;
            Ok(value.assume_init())
        }
    }

    /// Writes the raw in-memory layout of `value` to `address`.
    ///
    /// The same plain-data constraint as [`read`](MemoryReadWrite::read)
    /// applies.
    fn write<T: Copy>(&self, address: Address, value: &T) -> MemoryResult<()>
    where
        Self: Sized,
    {
        // Safety: any initialized T is readable as size_of::<T>() bytes.
        let data = unsafe {
            slice::from_raw_parts(value as *const T as *const u8, mem::size_of::<T>())
        };
        self.write_raw(address, data)
    }

    /// Reads a value of `T` from its wire form at `address`.
    fn read_marshalled<T: Marshal>(&self, address: Address) -> MemoryResult<T>
    where
        Self: Sized,
    {
        let size = resolver::marshalled_size_of::<T>();
        if size <= MARSHAL_STACK_BUFFER {
            let mut scratch = [0u8; MARSHAL_STACK_BUFFER];
            let buffer = &mut scratch[..size];
            self.read_raw(address, buffer)?;
            T::unmarshal(buffer)
        } else {
            let mut buffer = vec![0u8; size];
            self.read_raw(address, &mut buffer)?;
            T::unmarshal(&buffer)
        }
    }

    /// Writes the wire form of `value` to `address`.
    fn write_marshalled<T: Marshal>(&self, address: Address, value: &T) -> MemoryResult<()>
    where
        Self: Sized,
    {
        let size = resolver::marshalled_size_of::<T>();
        if size <= MARSHAL_STACK_BUFFER {
            let mut scratch = [0u8; MARSHAL_STACK_BUFFER];
            let buffer = &mut scratch[..size];
            value.marshal(buffer)?;
            self.write_raw(address, buffer)
        } else {
            let mut buffer = vec![0u8; size];
            value.marshal(&mut buffer)?;
            self.write_raw(address, &buffer)
        }
    }
}

/// Page-backed allocation in an address space.
pub trait MemoryAllocate {
    /// Commits `length` bytes of fresh page-backed memory, readable,
    /// writable and executable by default.
    fn allocate(&self, length: usize) -> MemoryResult<MemoryAllocation>;

    /// Releases an allocation produced by this source (or one addressing the
    /// same process), reporting whether the OS call succeeded.
    fn free(&self, allocation: MemoryAllocation) -> bool;
}

/// Protection changes on an address space.
pub trait MemoryProtect {
    /// Changes the protection of `size` bytes at `address` to the native
    /// protection bits `protection`, returning the previous native bits.
    ///
    /// Bits pass through this layer opaquely: `PAGE_*` values on Windows,
    /// `PROT_*` values on POSIX. POSIX cannot report the prior protection of
    /// a range, so there the returned "previous" value is the requested
    /// bits. That is a documented platform limitation, not an error.
    fn change_protection_raw(
        &self,
        address: Address,
        size: usize,
        protection: u32,
    ) -> MemoryResult<u32>;

    /// Changes protection using the portable [`MemoryProtection`] vocabulary.
    fn change_protection(
        &self,
        address: Address,
        size: usize,
        protection: MemoryProtection,
    ) -> MemoryResult<u32> {
        self.change_protection_raw(address, size, protection.to_native())
    }

    /// Runs `op` under a temporary protection change, restoring the previous
    /// protection on every exit path.
    ///
    /// An error from `op` is propagated after the restore has been attempted
    /// on the unwind path; a restore failure after a successful `op` is
    /// reported distinctly as
    /// [`RestoreFailed`](crate::core::types::MemoryError::RestoreFailed).
    fn with_protection<R, F>(
        &self,
        address: Address,
        size: usize,
        protection: MemoryProtection,
        op: F,
    ) -> MemoryResult<R>
    where
        Self: Sized,
        F: FnOnce() -> MemoryResult<R>,
    {
        let guard = ProtectionGuard::new(self, address, size, protection)?;
        let result = op()?;
        guard.restore()?;
        Ok(result)
    }
}

/// Write access to memory that may not currently be writable.
pub trait ProtectedWrite: MemoryReadWrite + MemoryProtect {
    /// Writes `value` under a temporary read-write protection change,
    /// restoring the previous protection afterwards.
    fn write_protected<T: Copy>(&self, address: Address, value: &T) -> MemoryResult<()>
    where
        Self: Sized,
    {
        self.with_protection(
            address,
            mem::size_of::<T>(),
            MemoryProtection::ReadWrite,
            || self.write(address, value),
        )
    }
}

impl<S: MemoryReadWrite + MemoryProtect> ProtectedWrite for S {}

// Capability impls for references keep views copyable while borrowing a
// stateful source such as ProcessMemory.

impl<S: MemoryReadWrite + ?Sized> MemoryReadWrite for &S {
    fn read_raw(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<()> {
        (**self).read_raw(address, buffer)
    }

    fn write_raw(&self, address: Address, data: &[u8]) -> MemoryResult<()> {
        (**self).write_raw(address, data)
    }
}

impl<S: MemoryAllocate + ?Sized> MemoryAllocate for &S {
    fn allocate(&self, length: usize) -> MemoryResult<MemoryAllocation> {
        (**self).allocate(length)
    }

    fn free(&self, allocation: MemoryAllocation) -> bool {
        (**self).free(allocation)
    }
}

impl<S: MemoryProtect + ?Sized> MemoryProtect for &S {
    fn change_protection_raw(
        &self,
        address: Address,
        size: usize,
        protection: u32,
    ) -> MemoryResult<u32> {
        (**self).change_protection_raw(address, size, protection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::MemoryError;
    use crate::marshal::FixedText;
    use std::cell::RefCell;

    /// In-memory source backed by a byte vector; no FFI needed.
    struct VecSource {
        base: usize,
        bytes: RefCell<Vec<u8>>,
    }

    impl VecSource {
        fn new(base: usize, length: usize) -> Self {
            VecSource {
                base,
                bytes: RefCell::new(vec![0u8; length]),
            }
        }

        fn range(&self, address: Address, length: usize) -> Option<std::ops::Range<usize>> {
            let start = address.as_usize().checked_sub(self.base)?;
            let end = start.checked_add(length)?;
            if end <= self.bytes.borrow().len() {
                Some(start..end)
            } else {
                None
            }
        }
    }

    impl MemoryReadWrite for VecSource {
        fn read_raw(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<()> {
            if buffer.is_empty() {
                return Ok(());
            }
            let range = self
                .range(address, buffer.len())
                .ok_or_else(|| MemoryError::read_failed(address, buffer.len()))?;
            buffer.copy_from_slice(&self.bytes.borrow()[range]);
            Ok(())
        }

        fn write_raw(&self, address: Address, data: &[u8]) -> MemoryResult<()> {
            if data.is_empty() {
                return Ok(());
            }
            let range = self
                .range(address, data.len())
                .ok_or_else(|| MemoryError::write_failed(address, data.len()))?;
            self.bytes.borrow_mut()[range].copy_from_slice(data);
            Ok(())
        }
    }

    #[test]
    fn test_typed_round_trip() {
        let source = VecSource::new(0x1000, 64);
        let address = Address::new(0x1000);

        source.write(address, &0x1122_3344u32).unwrap();
        assert_eq!(source.read::<u32>(address).unwrap(), 0x1122_3344);

        source.write(address, &-7.5f64).unwrap();
        assert_eq!(source.read::<f64>(address).unwrap(), -7.5);
    }

    #[test]
    fn test_typed_round_trip_repr_c_struct() {
        #[repr(C)]
        #[derive(Debug, Clone, Copy, PartialEq)]
        struct Pair {
            a: u32,
            b: u64,
        }

        let source = VecSource::new(0x1000, 64);
        let address = Address::new(0x1010);
        let pair = Pair { a: 3, b: 4 };

        source.write(address, &pair).unwrap();
        assert_eq!(source.read::<Pair>(address).unwrap(), pair);
    }

    #[test]
    fn test_read_failure_carries_address_and_size() {
        let source = VecSource::new(0x1000, 16);
        let err = source.read::<u64>(Address::new(0x100C)).unwrap_err();
        match err {
            MemoryError::ReadFailed { address, size, .. } => {
                assert_eq!(address, Address::new(0x100C));
                assert_eq!(size, 8);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_marshalled_round_trip_stack_path() {
        let source = VecSource::new(0x2000, 64);
        let address = Address::new(0x2000);

        let text = FixedText::<16>::new("staged").unwrap();
        source.write_marshalled(address, &text).unwrap();

        // The wire form occupies 16 bytes regardless of the string's heap form
        let mut wire = [0u8; 16];
        source.read_raw(address, &mut wire).unwrap();
        assert_eq!(&wire[..7], b"staged\0");

        let decoded: FixedText<16> = source.read_marshalled(address).unwrap();
        assert_eq!(decoded, text);
    }

    #[test]
    fn test_marshalled_round_trip_heap_path() {
        // Wire size above MARSHAL_STACK_BUFFER exercises the heap staging path
        let source = VecSource::new(0x3000, 2 * MARSHAL_STACK_BUFFER);
        let address = Address::new(0x3000);

        let text = FixedText::<2048>::new("big field").unwrap();
        source.write_marshalled(address, &text).unwrap();
        let decoded: FixedText<2048> = source.read_marshalled(address).unwrap();
        assert_eq!(decoded, text);
    }

    #[test]
    fn test_marshalled_decode_is_fresh() {
        let source = VecSource::new(0x4000, 32);
        let address = Address::new(0x4000);

        let original = FixedText::<16>::new("fresh").unwrap();
        source.write_marshalled(address, &original).unwrap();
        let decoded: FixedText<16> = source.read_marshalled(address).unwrap();

        assert_eq!(decoded, original);
        // Same contents, distinct backing storage
        assert_ne!(decoded.as_str().as_ptr(), original.as_str().as_ptr());
    }

    #[test]
    fn test_empty_transfers_short_circuit() {
        let source = VecSource::new(0x5000, 8);
        // Out-of-range address, but a zero-length transfer never reaches the
        // backend's bounds check
        assert!(source.read_raw(Address::null(), &mut []).is_ok());
        assert!(source.write_raw(Address::null(), &[]).is_ok());
    }

    #[test]
    fn test_reference_source_delegates() {
        let source = VecSource::new(0x6000, 16);
        let by_ref = &source;

        by_ref.write(Address::new(0x6000), &99u32).unwrap();
        assert_eq!(source.read::<u32>(Address::new(0x6000)).unwrap(), 99);
    }
}
