//! In-process memory source with direct dereference transfers

use super::{MemoryAllocate, MemoryProtect, MemoryReadWrite};
use crate::core::types::{Address, MemoryAllocation, MemoryProtection, MemoryResult};
use crate::os;
use std::ptr;
use tracing::{debug, warn};

/// The calling process's own address space.
///
/// Reads and writes are direct dereferences with no syscalls and no
/// allocation. The address range is a caller-supplied precondition: it must
/// be mapped with the required access, because an invalid address faults at
/// the hardware level instead of returning an error. Allocation goes through
/// the OS virtual-memory allocator rather than the heap allocator, so every
/// allocation is separately page-backed and safe to reprotect (heap pages
/// may be shared between unrelated allocations).
///
/// `LocalMemory` is a zero-sized value and the documented default source for
/// views constructed without an explicit one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalMemory;

impl MemoryReadWrite for LocalMemory {
    fn read_raw(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<()> {
        if buffer.is_empty() {
            return Ok(());
        }
        // Safety: the caller guarantees `address` points to at least buffer.len()
        // bytes of readable memory in this process.
        unsafe {
            ptr::copy_nonoverlapping(address.as_ptr::<u8>(), buffer.as_mut_ptr(), buffer.len());
        }
        Ok(())
    }

    fn write_raw(&self, address: Address, data: &[u8]) -> MemoryResult<()> {
        if data.is_empty() {
            return Ok(());
        }
        // Safety: the caller guarantees `address` points to at least data.len()
        // bytes of writable memory in this process.
        unsafe {
            ptr::copy_nonoverlapping(data.as_ptr(), address.as_mut_ptr::<u8>(), data.len());
        }
        Ok(())
    }
}

impl MemoryAllocate for LocalMemory {
    fn allocate(&self, length: usize) -> MemoryResult<MemoryAllocation> {
        let protection = MemoryProtection::ReadWriteExecute.to_native();

        #[cfg(windows)]
        let address = os::windows::virtual_alloc(length, protection)?;
        #[cfg(unix)]
        let address = os::linux::mmap_anonymous(length, protection)?;

        debug!("allocated {} bytes at {}", length, address);
        Ok(MemoryAllocation::new(address, length))
    }

    fn free(&self, allocation: MemoryAllocation) -> bool {
        #[cfg(windows)]
        let released = os::windows::virtual_free(allocation.address());
        #[cfg(unix)]
        let released = os::linux::munmap(allocation.address(), allocation.len());

        if released {
            debug!("freed {}", allocation);
        } else {
            warn!("failed to free {}", allocation);
        }
        released
    }
}

impl MemoryProtect for LocalMemory {
    #[cfg(windows)]
    fn change_protection_raw(
        &self,
        address: Address,
        size: usize,
        protection: u32,
    ) -> MemoryResult<u32> {
        let previous = os::windows::virtual_protect(address, size, protection)?;
        debug!(
            "protection at {} ({} bytes): {:#x} -> {:#x}",
            address, size, previous, protection
        );
        Ok(previous)
    }

    /// POSIX note: the change is applied with page granularity (`mprotect`
    /// requires page-aligned ranges, so the range is widened to page
    /// boundaries), and the returned "previous" value is the requested bits
    /// because `mprotect` has no query for the prior protection.
    #[cfg(unix)]
    fn change_protection_raw(
        &self,
        address: Address,
        size: usize,
        protection: u32,
    ) -> MemoryResult<u32> {
        let page = os::linux::page_size();
        let start = address.align_down(page);
        let end = address.offset(size as isize).align_up(page);
        os::linux::mprotect(start, end.as_usize() - start.as_usize(), protection)?;
        debug!(
            "protection at {} ({} bytes): -> {:#x}",
            address, size, protection
        );
        Ok(protection)
    }
}
