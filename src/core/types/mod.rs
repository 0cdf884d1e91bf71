//! Core type definitions for memprobe
//!
//! Foundational types used throughout the crate: address ranges, tagged
//! scalar values and the error taxonomy.

mod address;
mod error;
mod value;

// Re-export all public types
pub use address::AddressRange;
pub use error::{MemoryError, MemoryResult};
pub use value::{ScalarKind, ScalarValue};

// Common type aliases
pub type ProcessId = u32;

/// A target address expressed relative to the main module's load address.
///
/// Offsets rather than absolute addresses are the public currency of the
/// scanner so that candidate sets stay meaningful when ASLR relocates the
/// module between attach sessions.
pub type Offset = u64;
