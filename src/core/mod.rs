//! Core module containing fundamental types for memview
//!
//! This module provides the foundational building blocks used throughout
//! the crate: address handling, allocation records, protection levels and
//! error types.

pub mod types;

// Re-export commonly used types for convenience
pub use types::{Address, MemoryAllocation, MemoryError, MemoryProtection, MemoryResult};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

// Platform verification at compile time
#[cfg(not(any(windows, target_os = "linux")))]
compile_error!("memview only supports Windows and Linux");

#[cfg(not(target_pointer_width = "64"))]
compile_error!("memview requires 64-bit architecture");
