//! memprobe: an interactive typed memory scanner for live Windows processes
//!
//! Attach to a target by naming one of its top-level windows, then drive a
//! cheat-scanner workflow from the REPL: find every address holding a typed
//! value, narrow the candidate set as the target mutates, dump typed values
//! at an offset, and walk candidate pointer chains backwards from an address
//! of interest.
//!
//! The scan core is platform-independent and works against the
//! [`memory::MemorySource`] trait; only the attach path and the Win32
//! bindings are Windows-only.

pub mod config;
pub mod core;
pub mod memory;
pub mod repl;

#[cfg(windows)]
pub mod process;
#[cfg(windows)]
pub mod windows;

// Re-export the main types
pub use crate::core::types::{
    AddressRange, MemoryError, MemoryResult, Offset, ScalarKind, ScalarValue,
};
pub use crate::memory::{
    MemorySource, PointerMap, PointerReverseIndex, Protection, RawReader, ScanEngine,
};

#[cfg(windows)]
pub use crate::process::Session;
