//! Windows API layer
//!
//! Safe wrappers around the Win32 functions the scanner needs: window
//! lookup, process opening, memory reads, region queries and module
//! enumeration. All unsafe FFI calls are contained within this module.

pub mod bindings;
pub mod types;
pub mod utils;

pub use types::Handle;
