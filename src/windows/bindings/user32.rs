//! User32.dll bindings for window lookup

use crate::core::types::{MemoryError, MemoryResult};
use crate::windows::utils::string_to_wide;
use std::ptr;
use winapi::shared::windef::HWND;
use winapi::um::winuser::{FindWindowW, GetWindowThreadProcessId};

/// Finds a top-level window whose title matches `title` exactly.
pub fn find_window_by_title(title: &str) -> MemoryResult<HWND> {
    let wide_title = string_to_wide(title);

    let window = unsafe { FindWindowW(ptr::null(), wide_title.as_ptr()) };
    if window.is_null() {
        Err(MemoryError::ProcessNotFound(title.to_string()))
    } else {
        Ok(window)
    }
}

/// The id of the process owning `window`.
///
/// # Safety
/// The window handle must be valid
pub unsafe fn window_process_id(window: HWND) -> MemoryResult<u32> {
    let mut pid = 0u32;
    GetWindowThreadProcessId(window, &mut pid);

    if pid == 0 {
        Err(MemoryError::WindowsApi(
            "GetWindowThreadProcessId returned no process".to_string(),
        ))
    } else {
        Ok(pid)
    }
}
