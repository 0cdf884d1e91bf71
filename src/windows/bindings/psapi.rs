//! PSAPI.dll bindings for module enumeration

use crate::core::types::{MemoryError, MemoryResult};
use crate::windows::utils::wide_to_string;
use std::mem;
use winapi::shared::minwindef::{FALSE, HMODULE, MAX_PATH};
use winapi::um::psapi::{
    EnumProcessModules, GetModuleBaseNameW, GetModuleInformation, MODULEINFO,
};
use winapi::um::winnt::HANDLE;

/// Safe wrapper for EnumProcessModules
///
/// # Safety
/// The handle must be a valid process handle
pub unsafe fn enum_process_modules(handle: HANDLE) -> MemoryResult<Vec<HMODULE>> {
    let mut modules = vec![std::ptr::null_mut(); 1024];
    let mut bytes_needed = 0u32;

    let result = EnumProcessModules(
        handle,
        modules.as_mut_ptr(),
        (modules.len() * mem::size_of::<HMODULE>()) as u32,
        &mut bytes_needed,
    );

    if result == FALSE {
        return Err(MemoryError::WindowsApi(
            "Failed to enumerate process modules".to_string(),
        ));
    }

    let count = bytes_needed as usize / mem::size_of::<HMODULE>();
    modules.truncate(count);

    Ok(modules)
}

/// Safe wrapper for GetModuleBaseNameW. Passing a null module returns the
/// base name of the process's main executable.
///
/// # Safety
/// The handle must be a valid process handle
pub unsafe fn get_module_base_name(handle: HANDLE, module: HMODULE) -> MemoryResult<String> {
    let mut base_name = [0u16; MAX_PATH];
    let name_len = GetModuleBaseNameW(
        handle,
        module,
        base_name.as_mut_ptr(),
        MAX_PATH as u32,
    );

    if name_len == 0 {
        return Err(MemoryError::WindowsApi(
            "Failed to get module base name".to_string(),
        ));
    }

    Ok(wide_to_string(&base_name[..name_len as usize]))
}

/// Safe wrapper for GetModuleInformation
///
/// # Safety
/// The handle must be a valid process handle and module must belong to it
pub unsafe fn get_module_information(handle: HANDLE, module: HMODULE) -> MemoryResult<MODULEINFO> {
    let mut info = MODULEINFO {
        lpBaseOfDll: std::ptr::null_mut(),
        SizeOfImage: 0,
        EntryPoint: std::ptr::null_mut(),
    };

    let result = GetModuleInformation(
        handle,
        module,
        &mut info,
        mem::size_of::<MODULEINFO>() as u32,
    );

    if result == FALSE {
        return Err(MemoryError::WindowsApi(
            "Failed to get module information".to_string(),
        ));
    }

    Ok(info)
}
