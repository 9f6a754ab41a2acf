//! Kernel32 bindings for process and virtual memory operations

use crate::core::types::{Address, MemoryError, MemoryResult};
use std::io;
use std::ptr;
use winapi::shared::minwindef::{DWORD, FALSE, LPVOID};
use winapi::um::handleapi::CloseHandle;
use winapi::um::memoryapi::{
    ReadProcessMemory, VirtualAlloc, VirtualAllocEx, VirtualFree, VirtualFreeEx, VirtualProtect,
    VirtualProtectEx, WriteProcessMemory,
};
use winapi::um::processthreadsapi::OpenProcess;
use winapi::um::winnt::{HANDLE, MEM_COMMIT, MEM_RELEASE, MEM_RESERVE};

/// Safe wrapper for OpenProcess.
pub fn open_process(pid: u32, desired_access: u32) -> MemoryResult<HANDLE> {
    unsafe {
        let handle = OpenProcess(desired_access, FALSE, pid);
        if handle.is_null() {
            Err(MemoryError::ProcessNotFound { pid })
        } else {
            Ok(handle)
        }
    }
}

/// Safe wrapper for CloseHandle.
///
/// # Safety
/// The handle must be a valid Windows handle or null.
pub unsafe fn close_handle(handle: HANDLE) -> MemoryResult<()> {
    if handle.is_null() {
        return Ok(());
    }

    if CloseHandle(handle) == FALSE {
        Err(MemoryError::InvalidHandle {
            reason: "CloseHandle failed",
        })
    } else {
        Ok(())
    }
}

/// Reads exactly `buffer.len()` bytes of `handle`'s address space at `address`.
///
/// # Safety
/// The handle must be a valid process handle with `PROCESS_VM_READ` access.
pub unsafe fn read_process_memory(
    handle: HANDLE,
    address: Address,
    buffer: &mut [u8],
) -> MemoryResult<()> {
    let mut bytes_read = 0usize;

    let result = ReadProcessMemory(
        handle,
        address.as_usize() as LPVOID,
        buffer.as_mut_ptr() as LPVOID,
        buffer.len(),
        &mut bytes_read,
    );

    if result == FALSE {
        return Err(MemoryError::read_failed(address, buffer.len()));
    }
    if bytes_read != buffer.len() {
        return Err(MemoryError::read_failed_with(
            address,
            buffer.len(),
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("short read: {} of {} bytes", bytes_read, buffer.len()),
            ),
        ));
    }
    Ok(())
}

/// Writes all of `data` into `handle`'s address space at `address`.
///
/// # Safety
/// The handle must be a valid process handle with `PROCESS_VM_WRITE` and
/// `PROCESS_VM_OPERATION` access.
pub unsafe fn write_process_memory(
    handle: HANDLE,
    address: Address,
    data: &[u8],
) -> MemoryResult<()> {
    let mut bytes_written = 0usize;

    let result = WriteProcessMemory(
        handle,
        address.as_usize() as LPVOID,
        data.as_ptr() as LPVOID,
        data.len(),
        &mut bytes_written,
    );

    if result == FALSE {
        return Err(MemoryError::write_failed(address, data.len()));
    }
    if bytes_written != data.len() {
        return Err(MemoryError::write_failed_with(
            address,
            data.len(),
            io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short write: {} of {} bytes", bytes_written, data.len()),
            ),
        ));
    }
    Ok(())
}

/// Commits `length` bytes of fresh page-backed memory in the calling process.
pub fn virtual_alloc(length: usize, protection: u32) -> MemoryResult<Address> {
    unsafe {
        let base = VirtualAlloc(
            ptr::null_mut(),
            length,
            MEM_COMMIT | MEM_RESERVE,
            protection as DWORD,
        );
        if base.is_null() {
            Err(MemoryError::allocation_failed(length))
        } else {
            Ok(Address::new(base as usize))
        }
    }
}

/// Commits `length` bytes of fresh page-backed memory in another process.
///
/// # Safety
/// The handle must be a valid process handle with `PROCESS_VM_OPERATION`
/// access.
pub unsafe fn virtual_alloc_ex(
    handle: HANDLE,
    length: usize,
    protection: u32,
) -> MemoryResult<Address> {
    let base = VirtualAllocEx(
        handle,
        ptr::null_mut(),
        length,
        MEM_COMMIT | MEM_RESERVE,
        protection as DWORD,
    );
    if base.is_null() {
        Err(MemoryError::allocation_failed(length))
    } else {
        Ok(Address::new(base as usize))
    }
}

/// Releases a region previously committed by [`virtual_alloc`].
pub fn virtual_free(address: Address) -> bool {
    unsafe { VirtualFree(address.as_usize() as LPVOID, 0, MEM_RELEASE) != FALSE }
}

/// Releases a region previously committed by [`virtual_alloc_ex`].
///
/// # Safety
/// The handle must be a valid process handle with `PROCESS_VM_OPERATION`
/// access.
pub unsafe fn virtual_free_ex(handle: HANDLE, address: Address) -> bool {
    VirtualFreeEx(handle, address.as_usize() as LPVOID, 0, MEM_RELEASE) != FALSE
}

/// Changes protection of `size` bytes at `address` in the calling process,
/// returning the previous protection bits.
pub fn virtual_protect(address: Address, size: usize, protection: u32) -> MemoryResult<u32> {
    unsafe {
        let mut old_protection: DWORD = 0;
        let result = VirtualProtect(
            address.as_usize() as LPVOID,
            size,
            protection as DWORD,
            &mut old_protection,
        );
        if result == FALSE {
            Err(MemoryError::protection_failed(address, size, protection))
        } else {
            Ok(old_protection)
        }
    }
}

/// Changes protection of `size` bytes at `address` in another process,
/// returning the previous protection bits.
///
/// # Safety
/// The handle must be a valid process handle with `PROCESS_VM_OPERATION`
/// access.
pub unsafe fn virtual_protect_ex(
    handle: HANDLE,
    address: Address,
    size: usize,
    protection: u32,
) -> MemoryResult<u32> {
    let mut old_protection: DWORD = 0;
    let result = VirtualProtectEx(
        handle,
        address.as_usize() as LPVOID,
        size,
        protection as DWORD,
        &mut old_protection,
    );
    if result == FALSE {
        Err(MemoryError::protection_failed(address, size, protection))
    } else {
        Ok(old_protection)
    }
}
