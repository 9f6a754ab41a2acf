//! RAII guards tying allocations and protection changes to a scope

use super::{MemoryAllocate, MemoryProtect};
use crate::core::types::{Address, MemoryAllocation, MemoryError, MemoryProtection, MemoryResult};
use std::fmt;
use std::ops::Deref;
use tracing::warn;

/// Scope-bound ownership of an allocation.
///
/// The region is released through the owning source when the guard drops,
/// so early returns and panics cannot leak it. Call [`free`](Self::free) to
/// release explicitly and observe the backend's answer; a failed release on
/// the drop path is logged and swallowed.
pub struct AllocationGuard<'a, S: MemoryAllocate + ?Sized> {
    source: &'a S,
    allocation: Option<MemoryAllocation>,
}

impl<'a, S: MemoryAllocate + ?Sized> AllocationGuard<'a, S> {
    /// Allocates `length` bytes from `source` and guards the result.
    pub fn allocate(source: &'a S, length: usize) -> MemoryResult<Self> {
        let allocation = source.allocate(length)?;
        Ok(AllocationGuard {
            source,
            allocation: Some(allocation),
        })
    }

    /// Guards an allocation already obtained from `source`.
    pub fn new(source: &'a S, allocation: MemoryAllocation) -> Self {
        AllocationGuard {
            source,
            allocation: Some(allocation),
        }
    }

    /// Releases the region now, reporting whether the backend accepted it.
    pub fn free(mut self) -> bool {
        match self.allocation.take() {
            Some(allocation) => self.source.free(allocation),
            None => false,
        }
    }
}

impl<S: MemoryAllocate + ?Sized> Deref for AllocationGuard<'_, S> {
    type Target = MemoryAllocation;

    fn deref(&self) -> &Self::Target {
        // Invariant: `allocation` is only taken by `free` and `drop`, both of
        // which consume the guard.
        self.allocation
            .as_ref()
            .expect("allocation present until the guard is consumed")
    }
}

impl<S: MemoryAllocate + ?Sized> Drop for AllocationGuard<'_, S> {
    fn drop(&mut self) {
        if let Some(allocation) = self.allocation.take() {
            let address = allocation.address();
            if !self.source.free(allocation) {
                warn!("failed to free allocation at {} on drop", address);
            }
        }
    }
}

impl<S: MemoryAllocate + ?Sized> fmt::Debug for AllocationGuard<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllocationGuard")
            .field("allocation", &self.allocation)
            .finish()
    }
}

/// Scope-bound protection change.
///
/// Construction applies the requested protection and records the bits to put
/// back. The restore runs on drop, or through [`restore`](Self::restore)
/// when the caller wants to see the outcome; there a failure is reported as
/// [`RestoreFailed`](MemoryError::RestoreFailed) so it cannot be confused
/// with the initial change failing. On the drop path a failed restore is
/// logged and swallowed.
///
/// The recorded bits come from the backend, which on POSIX local memory are
/// the requested bits rather than the true prior ones. Callers that know the
/// real prior protection can pin it with
/// [`with_previous`](Self::with_previous).
pub struct ProtectionGuard<'a, S: MemoryProtect + ?Sized> {
    source: &'a S,
    address: Address,
    size: usize,
    previous: u32,
    restored: bool,
}

impl<'a, S: MemoryProtect + ?Sized> ProtectionGuard<'a, S> {
    /// Applies `protection` to the range and arms the restore.
    pub fn new(
        source: &'a S,
        address: Address,
        size: usize,
        protection: MemoryProtection,
    ) -> MemoryResult<Self> {
        Self::new_raw(source, address, size, protection.to_native())
    }

    /// Applies raw platform protection bits to the range and arms the restore.
    pub fn new_raw(
        source: &'a S,
        address: Address,
        size: usize,
        protection: u32,
    ) -> MemoryResult<Self> {
        let previous = source.change_protection_raw(address, size, protection)?;
        Ok(ProtectionGuard {
            source,
            address,
            size,
            previous,
            restored: false,
        })
    }

    /// Applies `protection` but restores to `previous` instead of whatever
    /// the backend reported.
    pub fn with_previous(
        source: &'a S,
        address: Address,
        size: usize,
        protection: MemoryProtection,
        previous: MemoryProtection,
    ) -> MemoryResult<Self> {
        let mut guard = Self::new(source, address, size, protection)?;
        guard.previous = previous.to_native();
        Ok(guard)
    }

    /// Start of the guarded range.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Length of the guarded range in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The platform protection bits the restore will apply.
    pub fn previous(&self) -> u32 {
        self.previous
    }

    /// Restores the recorded protection now.
    pub fn restore(mut self) -> MemoryResult<()> {
        self.restored = true;
        match self
            .source
            .change_protection_raw(self.address, self.size, self.previous)
        {
            Ok(_) => Ok(()),
            Err(MemoryError::ProtectionFailed {
                address,
                size,
                protection,
                source,
            }) => Err(MemoryError::RestoreFailed {
                address,
                size,
                protection,
                source,
            }),
            Err(other) => Err(other),
        }
    }
}

impl<S: MemoryProtect + ?Sized> Drop for ProtectionGuard<'_, S> {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(error) =
            self.source
                .change_protection_raw(self.address, self.size, self.previous)
        {
            warn!(
                "failed to restore protection at {} on drop: {}",
                self.address, error
            );
        }
    }
}

impl<S: MemoryProtect + ?Sized> fmt::Debug for ProtectionGuard<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtectionGuard")
            .field("address", &self.address)
            .field("size", &self.size)
            .field("previous", &self.previous)
            .field("restored", &self.restored)
            .finish()
    }
}
