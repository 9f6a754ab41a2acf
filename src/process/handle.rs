//! Process handle with RAII semantics

use crate::core::types::{MemoryResult, ProcessId};
use crate::os;
use std::fmt;

#[cfg(windows)]
use crate::core::types::MemoryError;
#[cfg(windows)]
use std::ptr;
#[cfg(windows)]
use tracing::warn;
#[cfg(windows)]
use winapi::um::winnt::HANDLE;

/// Owned Windows HANDLE, closed on drop.
#[cfg(windows)]
struct Handle {
    handle: HANDLE,
}

#[cfg(windows)]
impl Handle {
    fn new(handle: HANDLE) -> Self {
        Handle { handle }
    }

    #[cfg(test)]
    fn null() -> Self {
        Handle {
            handle: ptr::null_mut(),
        }
    }

    fn is_null(&self) -> bool {
        self.handle.is_null()
    }

    fn raw(&self) -> HANDLE {
        self.handle
    }
}

#[cfg(windows)]
impl Drop for Handle {
    fn drop(&mut self) {
        // Safety: the handle came from OpenProcess (or is null, which
        // close_handle accepts) and is dropped exactly once.
        if let Err(error) = unsafe { os::windows::close_handle(self.handle) } {
            warn!("failed to close process handle: {}", error);
        }
    }
}

// HANDLEs are process-local kernel object references, usable from any thread.
#[cfg(windows)]
unsafe impl Send for Handle {}
#[cfg(windows)]
unsafe impl Sync for Handle {}

/// Access rights requested when opening a process.
#[cfg(windows)]
#[derive(Debug, Clone, Copy)]
pub struct ProcessAccess {
    value: u32,
}

#[cfg(windows)]
impl ProcessAccess {
    /// All possible access rights
    pub const ALL_ACCESS: Self = Self { value: 0x1FFFFF };
    /// Query information access
    pub const QUERY_INFORMATION: Self = Self { value: 0x0400 };
    /// Read memory access
    pub const VM_READ: Self = Self { value: 0x0010 };
    /// Write memory access
    pub const VM_WRITE: Self = Self { value: 0x0020 };
    /// Allocate, free and protect memory
    pub const VM_OPERATION: Self = Self { value: 0x0008 };

    /// Combine access rights
    pub fn combine(rights: &[Self]) -> Self {
        let mut value = 0;
        for right in rights {
            value |= right.value;
        }
        Self { value }
    }

    /// Get raw value
    pub fn value(&self) -> u32 {
        self.value
    }
}

/// An opened target process.
///
/// On Windows this owns an OS handle carrying the access rights it was
/// opened with; the handle closes on drop. Opening fails with
/// [`ProcessNotFound`](crate::core::types::MemoryError::ProcessNotFound)
/// when no such process exists or access is denied.
#[cfg(windows)]
pub struct ProcessHandle {
    handle: Handle,
    pid: ProcessId,
    access: ProcessAccess,
}

#[cfg(windows)]
impl ProcessHandle {
    /// Open a process with specified access rights
    pub fn open(pid: ProcessId, access: ProcessAccess) -> MemoryResult<Self> {
        let raw_handle = os::windows::open_process(pid, access.value())?;
        Ok(ProcessHandle {
            handle: Handle::new(raw_handle),
            pid,
            access,
        })
    }

    /// Open a process with all access rights
    pub fn open_all_access(pid: ProcessId) -> MemoryResult<Self> {
        Self::open(pid, ProcessAccess::ALL_ACCESS)
    }

    /// Open a process for reading memory
    pub fn open_for_read(pid: ProcessId) -> MemoryResult<Self> {
        Self::open(
            pid,
            ProcessAccess::combine(&[ProcessAccess::QUERY_INFORMATION, ProcessAccess::VM_READ]),
        )
    }

    /// Open a process for reading and writing memory
    pub fn open_for_read_write(pid: ProcessId) -> MemoryResult<Self> {
        Self::open(
            pid,
            ProcessAccess::combine(&[
                ProcessAccess::QUERY_INFORMATION,
                ProcessAccess::VM_READ,
                ProcessAccess::VM_WRITE,
                ProcessAccess::VM_OPERATION,
            ]),
        )
    }

    /// Get the process ID
    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Get the access rights the handle was opened with
    pub fn access(&self) -> ProcessAccess {
        self.access
    }

    /// Check if the handle is valid
    pub fn is_valid(&self) -> bool {
        !self.handle.is_null()
    }

    /// Get the raw handle
    ///
    /// # Safety
    /// The returned handle is only valid as long as this ProcessHandle exists
    pub unsafe fn raw(&self) -> HANDLE {
        self.handle.raw()
    }

    /// The raw handle, or [`InvalidHandle`](MemoryError::InvalidHandle) when
    /// it is null.
    pub(crate) fn raw_checked(&self) -> MemoryResult<HANDLE> {
        if self.handle.is_null() {
            return Err(MemoryError::InvalidHandle {
                reason: "process handle is null",
            });
        }
        Ok(self.handle.raw())
    }
}

#[cfg(windows)]
impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid)
            .field("valid", &self.is_valid())
            .field("access", &format!("0x{:X}", self.access.value()))
            .finish()
    }
}

/// An opened target process.
///
/// Linux has no handle object for another process's memory; the pid itself
/// addresses every `process_vm_readv`/`process_vm_writev` call. Opening
/// probes that the process exists with
/// [`ProcessNotFound`](crate::core::types::MemoryError::ProcessNotFound) on
/// failure; permission to actually transfer memory is decided per call by
/// the kernel's ptrace access rules.
#[cfg(unix)]
pub struct ProcessHandle {
    pid: ProcessId,
}

#[cfg(unix)]
impl ProcessHandle {
    /// Open a process, verifying it currently exists
    pub fn open(pid: ProcessId) -> MemoryResult<Self> {
        if !os::linux::process_alive(pid) {
            return Err(crate::core::types::MemoryError::ProcessNotFound { pid });
        }
        Ok(ProcessHandle { pid })
    }

    /// Get the process ID
    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Check if the process still exists, probing it afresh
    pub fn is_valid(&self) -> bool {
        os::linux::process_alive(self.pid)
    }
}

#[cfg(unix)]
impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid)
            .finish()
    }
}

impl fmt::Display for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProcessHandle(pid={})", self.pid())
    }
}
