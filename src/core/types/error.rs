//! Custom error types for memview

use super::address::Address;
use std::io;
use thiserror::Error;

/// Main error type for memory operations.
///
/// Every failing syscall surfaces here synchronously with the address, the
/// requested size and the platform error code (via the wrapped
/// [`io::Error`]). Nothing is retried and nothing degrades silently; retry
/// policy, if any, belongs to the caller.
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Invalid memory address: {0}")]
    InvalidAddress(String),

    #[error("Failed to read {size} bytes at {address}: {source}")]
    ReadFailed {
        address: Address,
        size: usize,
        source: io::Error,
    },

    #[error("Failed to write {size} bytes at {address}: {source}")]
    WriteFailed {
        address: Address,
        size: usize,
        source: io::Error,
    },

    #[error("Failed to allocate {length} bytes: {source}")]
    AllocationFailed { length: usize, source: io::Error },

    #[error("Failed to change protection to {protection:#x} for {size} bytes at {address}: {source}")]
    ProtectionFailed {
        address: Address,
        size: usize,
        protection: u32,
        source: io::Error,
    },

    #[error("Failed to restore protection to {protection:#x} for {size} bytes at {address}: {source}")]
    RestoreFailed {
        address: Address,
        size: usize,
        protection: u32,
        source: io::Error,
    },

    #[error("{operation} is not supported on this platform")]
    UnsupportedPlatform { operation: &'static str },

    #[error("Process not found: {pid}")]
    ProcessNotFound { pid: u32 },

    #[error("Invalid process handle: {reason}")]
    InvalidHandle { reason: &'static str },

    #[error("Index {index} out of bounds for view of {count} elements")]
    OutOfBounds { index: usize, count: usize },

    #[error("Buffer too small: expected {expected}, got {actual}")]
    BufferTooSmall { expected: usize, actual: usize },

    #[error("Failed to marshal {type_name}: {reason}")]
    MarshalFailed {
        type_name: &'static str,
        reason: String,
    },
}

/// Result type alias for memory operations.
pub type MemoryResult<T> = Result<T, MemoryError>;

impl MemoryError {
    /// Creates a read failed error carrying the calling thread's last OS error.
    pub fn read_failed(address: Address, size: usize) -> Self {
        MemoryError::ReadFailed {
            address,
            size,
            source: io::Error::last_os_error(),
        }
    }

    /// Creates a read failed error from an explicit source.
    pub fn read_failed_with(address: Address, size: usize, source: io::Error) -> Self {
        MemoryError::ReadFailed {
            address,
            size,
            source,
        }
    }

    /// Creates a write failed error carrying the calling thread's last OS error.
    pub fn write_failed(address: Address, size: usize) -> Self {
        MemoryError::WriteFailed {
            address,
            size,
            source: io::Error::last_os_error(),
        }
    }

    /// Creates a write failed error from an explicit source.
    pub fn write_failed_with(address: Address, size: usize, source: io::Error) -> Self {
        MemoryError::WriteFailed {
            address,
            size,
            source,
        }
    }

    /// Creates an allocation failed error carrying the last OS error.
    pub fn allocation_failed(length: usize) -> Self {
        MemoryError::AllocationFailed {
            length,
            source: io::Error::last_os_error(),
        }
    }

    /// Creates a protection change failed error carrying the last OS error.
    pub fn protection_failed(address: Address, size: usize, protection: u32) -> Self {
        MemoryError::ProtectionFailed {
            address,
            size,
            protection,
            source: io::Error::last_os_error(),
        }
    }

    /// Creates a marshalling error for type `T`.
    pub fn marshal_failed<T>(reason: String) -> Self {
        MemoryError::MarshalFailed {
            type_name: std::any::type_name::<T>(),
            reason,
        }
    }

    /// The platform error code carried by this error, if any.
    pub fn os_error_code(&self) -> Option<i32> {
        match self {
            MemoryError::ReadFailed { source, .. }
            | MemoryError::WriteFailed { source, .. }
            | MemoryError::AllocationFailed { source, .. }
            | MemoryError::ProtectionFailed { source, .. }
            | MemoryError::RestoreFailed { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }
}
