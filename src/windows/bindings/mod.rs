//! Windows API bindings
//!
//! Low-level FFI bindings to Windows system libraries. Every unsafe call is
//! wrapped one function at a time.

pub mod kernel32;
pub mod psapi;
pub mod user32;
