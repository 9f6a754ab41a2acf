//! Allocation record produced by the allocate capability

use super::address::Address;
use serde::Serialize;
use std::fmt;

/// A region of memory obtained from [`MemoryAllocate::allocate`].
///
/// The record is deliberately neither `Copy` nor `Clone`: `free` consumes it
/// by value, so handing the same allocation to `free` twice is a compile
/// error rather than undefined behavior at the OS level. It must be released
/// on the backend that produced it (or one addressing the same process).
///
/// ```compile_fail
/// use memview::{LocalMemory, MemoryAllocate};
///
/// let local = LocalMemory;
/// let allocation = local.allocate(4096).unwrap();
/// local.free(allocation);
/// local.free(allocation); // use of moved value
/// ```
///
/// [`MemoryAllocate::allocate`]: crate::source::MemoryAllocate::allocate
#[derive(Debug, Serialize)]
pub struct MemoryAllocation {
    address: Address,
    length: usize,
}

impl MemoryAllocation {
    /// Creates an allocation record. Only backends construct these.
    pub(crate) fn new(address: Address, length: usize) -> Self {
        MemoryAllocation { address, length }
    }

    /// Base address of the region.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Length of the region in bytes.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Whether the region is zero-length.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Address one past the end of the region.
    pub fn end(&self) -> Address {
        self.address.offset(self.length as isize)
    }

    /// Whether `address` falls inside the region.
    pub fn contains(&self, address: Address) -> bool {
        address >= self.address && address < self.end()
    }
}

impl fmt::Display for MemoryAllocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.address, self.length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_accessors() {
        let alloc = MemoryAllocation::new(Address::new(0x10000), 256);
        assert_eq!(alloc.address(), Address::new(0x10000));
        assert_eq!(alloc.len(), 256);
        assert!(!alloc.is_empty());
        assert_eq!(alloc.end(), Address::new(0x10100));
    }

    #[test]
    fn test_allocation_contains() {
        let alloc = MemoryAllocation::new(Address::new(0x10000), 256);
        assert!(alloc.contains(Address::new(0x10000)));
        assert!(alloc.contains(Address::new(0x100FF)));
        assert!(!alloc.contains(Address::new(0x10100)));
        assert!(!alloc.contains(Address::new(0xFFFF)));
    }

    #[test]
    fn test_allocation_display() {
        let alloc = MemoryAllocation::new(Address::new(0x2000), 64);
        assert_eq!(format!("{}", alloc), "0x0000000000002000 (64 bytes)");
    }

    #[test]
    fn test_allocation_serializes_for_logging() {
        let alloc = MemoryAllocation::new(Address::new(0x3000), 128);
        let json = serde_json::to_string(&alloc).unwrap();
        assert!(json.contains("\"length\":128"));
    }
}
