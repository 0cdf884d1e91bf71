//! Safe HANDLE wrapper with automatic cleanup

use crate::windows::bindings::kernel32;
use std::ptr;
use winapi::um::winnt::HANDLE;

/// Owning wrapper around a Windows HANDLE.
///
/// The handle is closed exactly once when the wrapper drops; moves transfer
/// ownership, and the wrapper is deliberately not `Clone`, so two owners can
/// never observe the same live handle.
pub struct Handle {
    handle: HANDLE,
}

impl Handle {
    pub fn new(handle: HANDLE) -> Self {
        Handle { handle }
    }

    pub fn null() -> Self {
        Handle {
            handle: ptr::null_mut(),
        }
    }

    pub fn is_null(&self) -> bool {
        self.handle.is_null()
    }

    /// The raw handle, valid only while this wrapper lives.
    pub fn raw(&self) -> HANDLE {
        self.handle
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            // Ignore errors on cleanup
            unsafe {
                let _ = kernel32::close_handle(self.handle);
            }
        }
    }
}

// Safe because HANDLEs are process-local kernel object references
unsafe impl Send for Handle {}
