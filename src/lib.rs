//! Uniform typed access to local and external process memory
//!
//! Capability traits ([`MemoryReadWrite`], [`MemoryAllocate`],
//! [`MemoryProtect`]) abstract over where bytes live; [`LocalMemory`] and
//! [`ProcessMemory`] are the two backends. Typed views ([`Ptr`],
//! [`FixedArrayPtr`] and friends) route all element access through a
//! capability, in either the raw or the marshalled encoding.

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod core;
pub mod marshal;
pub mod os;
pub mod process;
pub mod ptr;
pub mod source;

// Re-export main types from core module
pub use core::types::{
    Address, MemoryAllocation, MemoryError, MemoryProtection, MemoryResult, ProcessId, Size,
};

// Re-export core directly for full access
pub use core::*;

pub use marshal::{FixedText, Marshal};
pub use process::ProcessHandle;
pub use ptr::{ArrayPtr, ElementSize, FixedArrayPtr, MarshalledFixedArrayPtr, MarshalledPtr, Ptr};
pub use source::{
    AllocationGuard, LocalMemory, MemoryAllocate, MemoryProtect, MemoryReadWrite, ProcessMemory,
    ProtectedWrite, ProtectionGuard,
};

#[cfg(windows)]
pub use process::ProcessAccess;
