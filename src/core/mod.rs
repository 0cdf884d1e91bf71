//! Core module containing the fundamental types for memprobe

pub mod types;

// Re-export commonly used types for convenience
pub use types::{AddressRange, MemoryError, MemoryResult, Offset, ScalarKind, ScalarValue};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
