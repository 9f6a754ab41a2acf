//! Raw OS bindings for memory and process syscalls
//!
//! Provides thin wrappers around the platform primitives the backends are
//! built on. All unsafe FFI calls are contained within this module; every
//! wrapper validates the syscall result and maps failures onto
//! [`MemoryError`](crate::core::types::MemoryError) with the failing address,
//! size and platform error code attached.

#[cfg(unix)]
pub mod linux;
#[cfg(windows)]
pub mod windows;
