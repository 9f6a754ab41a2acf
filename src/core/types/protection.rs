//! Portable memory protection levels and their native bit mappings

use serde::{Deserialize, Serialize};
use std::fmt;

/// Portable protection level for a memory region.
///
/// The capability layer itself forwards native protection bits opaquely
/// ([`change_protection_raw`] takes a `u32`); this enum is the small portable
/// vocabulary mapped onto the platform's `PAGE_*` / `PROT_*` constants by
/// [`to_native`]. Native flag combinations outside this vocabulary (guard
/// pages, write-copy, ...) are still expressible through the raw call.
///
/// [`change_protection_raw`]: crate::source::MemoryProtect::change_protection_raw
/// [`to_native`]: MemoryProtection::to_native
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemoryProtection {
    /// Read-only access.
    Read,
    /// Read and write access.
    ReadWrite,
    /// Read, write and execute access.
    ReadWriteExecute,
    /// All access revoked.
    NoAccess,
}

impl MemoryProtection {
    /// Maps the portable level to the native Windows `PAGE_*` constant.
    #[cfg(windows)]
    pub const fn to_native(self) -> u32 {
        use winapi::um::winnt::{
            PAGE_EXECUTE_READWRITE, PAGE_NOACCESS, PAGE_READONLY, PAGE_READWRITE,
        };
        match self {
            MemoryProtection::Read => PAGE_READONLY,
            MemoryProtection::ReadWrite => PAGE_READWRITE,
            MemoryProtection::ReadWriteExecute => PAGE_EXECUTE_READWRITE,
            MemoryProtection::NoAccess => PAGE_NOACCESS,
        }
    }

    /// Maps the portable level to the native POSIX `PROT_*` bits.
    #[cfg(unix)]
    pub const fn to_native(self) -> u32 {
        match self {
            MemoryProtection::Read => libc::PROT_READ as u32,
            MemoryProtection::ReadWrite => (libc::PROT_READ | libc::PROT_WRITE) as u32,
            MemoryProtection::ReadWriteExecute => {
                (libc::PROT_READ | libc::PROT_WRITE | libc::PROT_EXEC) as u32
            }
            MemoryProtection::NoAccess => libc::PROT_NONE as u32,
        }
    }

    /// Whether this level allows reading.
    pub const fn is_readable(&self) -> bool {
        !matches!(self, MemoryProtection::NoAccess)
    }

    /// Whether this level allows writing.
    pub const fn is_writable(&self) -> bool {
        matches!(
            self,
            MemoryProtection::ReadWrite | MemoryProtection::ReadWriteExecute
        )
    }

    /// Whether this level allows execution.
    pub const fn is_executable(&self) -> bool {
        matches!(self, MemoryProtection::ReadWriteExecute)
    }
}

impl fmt::Display for MemoryProtection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MemoryProtection::Read => "R",
            MemoryProtection::ReadWrite => "RW",
            MemoryProtection::ReadWriteExecute => "RWX",
            MemoryProtection::NoAccess => "NONE",
        };
        write!(f, "{}", name)
    }
}
