//! Target process identification
//!
//! A [`ProcessHandle`] names the process a [`ProcessMemory`] source operates
//! on. On Windows it owns the kernel handle; on Linux it is the verified pid.
//!
//! [`ProcessMemory`]: crate::source::ProcessMemory

pub mod handle;

pub use handle::ProcessHandle;

#[cfg(windows)]
pub use handle::ProcessAccess;
