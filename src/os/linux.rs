//! libc bindings for process and virtual memory operations

use crate::core::types::{Address, MemoryError, MemoryResult};
use std::io;
use std::ptr;

/// Reads exactly `buffer.len()` bytes of process `pid`'s address space at
/// `address` via `process_vm_readv`.
///
/// Permission follows the kernel's ptrace access rules: the calling process
/// may always read itself and, under the default Yama policy, its own
/// descendants.
pub fn process_vm_read(pid: u32, address: Address, buffer: &mut [u8]) -> MemoryResult<()> {
    let local = libc::iovec {
        iov_base: buffer.as_mut_ptr() as *mut libc::c_void,
        iov_len: buffer.len(),
    };
    let remote = libc::iovec {
        iov_base: address.as_usize() as *mut libc::c_void,
        iov_len: buffer.len(),
    };

    let transferred =
        unsafe { libc::process_vm_readv(pid as libc::pid_t, &local, 1, &remote, 1, 0) };

    if transferred < 0 {
        return Err(MemoryError::read_failed(address, buffer.len()));
    }
    if transferred as usize != buffer.len() {
        return Err(MemoryError::read_failed_with(
            address,
            buffer.len(),
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("short read: {} of {} bytes", transferred, buffer.len()),
            ),
        ));
    }
    Ok(())
}

/// Writes all of `data` into process `pid`'s address space at `address` via
/// `process_vm_writev`.
pub fn process_vm_write(pid: u32, address: Address, data: &[u8]) -> MemoryResult<()> {
    let local = libc::iovec {
        iov_base: data.as_ptr() as *mut libc::c_void,
        iov_len: data.len(),
    };
    let remote = libc::iovec {
        iov_base: address.as_usize() as *mut libc::c_void,
        iov_len: data.len(),
    };

    let transferred =
        unsafe { libc::process_vm_writev(pid as libc::pid_t, &local, 1, &remote, 1, 0) };

    if transferred < 0 {
        return Err(MemoryError::write_failed(address, data.len()));
    }
    if transferred as usize != data.len() {
        return Err(MemoryError::write_failed_with(
            address,
            data.len(),
            io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short write: {} of {} bytes", transferred, data.len()),
            ),
        ));
    }
    Ok(())
}

/// Maps `length` bytes of fresh anonymous page-backed memory in the calling
/// process.
pub fn mmap_anonymous(length: usize, protection: u32) -> MemoryResult<Address> {
    let base = unsafe {
        libc::mmap(
            ptr::null_mut(),
            length,
            protection as libc::c_int,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
            -1,
            0,
        )
    };
    if base == libc::MAP_FAILED {
        Err(MemoryError::allocation_failed(length))
    } else {
        Ok(Address::new(base as usize))
    }
}

/// Unmaps a region previously produced by [`mmap_anonymous`].
///
/// Preconditions: `address`/`length` must describe a live mapping owned by
/// the caller; unmapping memory still referenced elsewhere invalidates those
/// references.
pub fn munmap(address: Address, length: usize) -> bool {
    unsafe { libc::munmap(address.as_usize() as *mut libc::c_void, length) == 0 }
}

/// Changes protection of `size` bytes at `address` in the calling process.
///
/// `address` must be page-aligned; `mprotect` reports nothing about the prior
/// protection, so callers needing the old value must track it themselves
/// (see [`MemoryProtect::change_protection_raw`] for the consequences).
///
/// [`MemoryProtect::change_protection_raw`]: crate::source::MemoryProtect::change_protection_raw
pub fn mprotect(address: Address, size: usize, protection: u32) -> MemoryResult<()> {
    let result = unsafe {
        libc::mprotect(
            address.as_usize() as *mut libc::c_void,
            size,
            protection as libc::c_int,
        )
    };
    if result != 0 {
        Err(MemoryError::protection_failed(address, size, protection))
    } else {
        Ok(())
    }
}

/// Whether a process with the given pid currently exists.
///
/// Uses `kill(pid, 0)`; a live process owned by another user reports `EPERM`,
/// which still means "exists". Pid 0 names the caller's process group rather
/// than a process and reports not-alive, as do pids that do not fit `pid_t`.
pub fn process_alive(pid: u32) -> bool {
    if pid == 0 || pid > i32::MAX as u32 {
        return false;
    }
    let result = unsafe { libc::kill(pid as libc::pid_t, 0) };
    result == 0 || io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

/// The system page size in bytes.
pub fn page_size() -> usize {
    unsafe { libc::sysconf(libc::_SC_PAGESIZE) as usize }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::MemoryProtection;

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_mmap_mprotect_munmap_cycle() {
        let rw = MemoryProtection::ReadWrite.to_native();
        let address = mmap_anonymous(4096, rw).expect("mmap failed");
        assert!(!address.is_null());
        assert!(address.is_aligned(page_size()));

        mprotect(address, 4096, MemoryProtection::Read.to_native()).expect("mprotect failed");
        mprotect(address, 4096, rw).expect("mprotect restore failed");

        assert!(munmap(address, 4096));
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_mmap_failure_carries_length() {
        let err = mmap_anonymous(usize::MAX & !0xFFF, 0).unwrap_err();
        match err {
            MemoryError::AllocationFailed { length, .. } => {
                assert_eq!(length, usize::MAX & !0xFFF);
                assert!(err.os_error_code().is_some());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_process_vm_read_own_process() {
        let value: u64 = 0x1122_3344_5566_7788;
        let mut buffer = [0u8; 8];
        process_vm_read(
            std::process::id(),
            Address::from(&value as *const u64 as usize),
            &mut buffer,
        )
        .expect("process_vm_readv on own process failed");
        assert_eq!(u64::from_ne_bytes(buffer), value);
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_process_vm_read_bad_address() {
        let mut buffer = [0u8; 8];
        let err = process_vm_read(std::process::id(), Address::new(0x10), &mut buffer)
            .expect_err("read of unmapped page succeeded");
        assert!(matches!(err, MemoryError::ReadFailed { size: 8, .. }));
    }

    #[test]
    #[cfg_attr(miri, ignore = "FFI not supported in Miri")]
    fn test_process_alive() {
        assert!(process_alive(std::process::id()));
        // pid 1 always exists even though we cannot signal it
        assert!(process_alive(1));
        assert!(!process_alive(0));
    }
}
