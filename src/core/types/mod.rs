//! Core type definitions for memview
//!
//! This module contains the fundamental types used throughout the crate:
//! the address wrapper, allocation records, portable protection levels and
//! the error taxonomy.

mod address;
mod allocation;
mod error;
mod protection;

// Re-export all public types
pub use address::Address;
pub use allocation::MemoryAllocation;
pub use error::{MemoryError, MemoryResult};
pub use protection::MemoryProtection;

// Common type aliases
pub type ProcessId = u32;
pub type Size = usize;
