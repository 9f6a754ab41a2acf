//! External process memory source addressed by a process handle

use super::{MemoryAllocate, MemoryProtect, MemoryReadWrite};
use crate::core::types::{Address, MemoryAllocation, MemoryResult, ProcessId};
use crate::process::ProcessHandle;
use std::fmt;

#[cfg(windows)]
use crate::core::types::MemoryProtection;
#[cfg(unix)]
use crate::core::types::MemoryError;
#[cfg(any(windows, unix))]
use crate::os;
#[cfg(windows)]
use tracing::debug;
#[cfg(unix)]
use tracing::warn;

/// The address space of another process, reached through OS syscalls.
///
/// Every operation is addressed by the handle captured at construction and
/// can fail with the platform error of the underlying syscall: invalid
/// handle, insufficient privilege, or an address not mapped in the target.
/// A target that has exited is not detected proactively; the next operation
/// simply fails with a read or write error.
///
/// On Windows, transfers use `ReadProcessMemory`/`WriteProcessMemory` and
/// allocation/protection use the `Virtual*Ex` family. On Linux, transfers
/// use `process_vm_readv`/`process_vm_writev`; allocation and protection in
/// another process have no portable primitive and fail with
/// [`UnsupportedPlatform`](crate::core::types::MemoryError::UnsupportedPlatform).
pub struct ProcessMemory {
    handle: ProcessHandle,
}

impl ProcessMemory {
    /// Opens a process for reading and writing its memory.
    pub fn open(pid: ProcessId) -> MemoryResult<Self> {
        #[cfg(windows)]
        let handle = ProcessHandle::open_for_read_write(pid)?;
        #[cfg(unix)]
        let handle = ProcessHandle::open(pid)?;
        Ok(ProcessMemory { handle })
    }

    /// Opens a process for reading its memory only.
    pub fn open_for_read(pid: ProcessId) -> MemoryResult<Self> {
        #[cfg(windows)]
        let handle = ProcessHandle::open_for_read(pid)?;
        #[cfg(unix)]
        let handle = ProcessHandle::open(pid)?;
        Ok(ProcessMemory { handle })
    }

    /// Wraps an already-opened process handle.
    pub fn from_handle(handle: ProcessHandle) -> Self {
        ProcessMemory { handle }
    }

    /// The target process id.
    pub fn pid(&self) -> ProcessId {
        self.handle.pid()
    }

    /// The underlying process handle.
    pub fn handle(&self) -> &ProcessHandle {
        &self.handle
    }
}

impl MemoryReadWrite for ProcessMemory {
    fn read_raw(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<()> {
        if buffer.is_empty() {
            return Ok(());
        }
        #[cfg(windows)]
        {
            let raw = self.handle.raw_checked()?;
            // Safety: raw_checked rejects null handles; the handle was opened
            // with VM_READ access.
            unsafe { os::windows::read_process_memory(raw, address, buffer) }
        }
        #[cfg(unix)]
        {
            os::linux::process_vm_read(self.handle.pid(), address, buffer)
        }
    }

    fn write_raw(&self, address: Address, data: &[u8]) -> MemoryResult<()> {
        if data.is_empty() {
            return Ok(());
        }
        #[cfg(windows)]
        {
            let raw = self.handle.raw_checked()?;
            // Safety: raw_checked rejects null handles; the handle was opened
            // with VM_WRITE | VM_OPERATION access.
            unsafe { os::windows::write_process_memory(raw, address, data) }
        }
        #[cfg(unix)]
        {
            os::linux::process_vm_write(self.handle.pid(), address, data)
        }
    }
}

impl MemoryAllocate for ProcessMemory {
    #[cfg(windows)]
    fn allocate(&self, length: usize) -> MemoryResult<MemoryAllocation> {
        let raw = self.handle.raw_checked()?;
        let protection = MemoryProtection::ReadWriteExecute.to_native();
        // Safety: raw_checked rejects null handles.
        let address = unsafe { os::windows::virtual_alloc_ex(raw, length, protection)? };
        debug!(
            "allocated {} bytes at {} in process {}",
            length,
            address,
            self.pid()
        );
        Ok(MemoryAllocation::new(address, length))
    }

    #[cfg(unix)]
    fn allocate(&self, _length: usize) -> MemoryResult<MemoryAllocation> {
        Err(MemoryError::UnsupportedPlatform {
            operation: "allocation in an external process",
        })
    }

    #[cfg(windows)]
    fn free(&self, allocation: MemoryAllocation) -> bool {
        match self.handle.raw_checked() {
            // Safety: raw_checked rejects null handles.
            Ok(raw) => unsafe { os::windows::virtual_free_ex(raw, allocation.address()) },
            Err(_) => false,
        }
    }

    #[cfg(unix)]
    fn free(&self, allocation: MemoryAllocation) -> bool {
        warn!(
            "cannot free {} in process {}: external allocation is not supported on this platform",
            allocation,
            self.pid()
        );
        false
    }
}

impl MemoryProtect for ProcessMemory {
    #[cfg(windows)]
    fn change_protection_raw(
        &self,
        address: Address,
        size: usize,
        protection: u32,
    ) -> MemoryResult<u32> {
        let raw = self.handle.raw_checked()?;
        // Safety: raw_checked rejects null handles.
        let previous = unsafe { os::windows::virtual_protect_ex(raw, address, size, protection)? };
        debug!(
            "protection at {} ({} bytes) in process {}: {:#x} -> {:#x}",
            address,
            size,
            self.pid(),
            previous,
            protection
        );
        Ok(previous)
    }

    #[cfg(unix)]
    fn change_protection_raw(
        &self,
        _address: Address,
        _size: usize,
        _protection: u32,
    ) -> MemoryResult<u32> {
        Err(MemoryError::UnsupportedPlatform {
            operation: "protection change in an external process",
        })
    }
}

impl fmt::Debug for ProcessMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessMemory")
            .field("pid", &self.pid())
            .finish()
    }
}
