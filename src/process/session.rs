//! One-shot attachment to a target process by window title

use crate::core::types::{AddressRange, MemoryError, MemoryResult, ProcessId};
use crate::memory::regions::walk;
use crate::memory::{MemorySource, Protection};
use crate::windows::bindings::{kernel32, psapi, user32};
use crate::windows::types::Handle;
use std::ptr;
use tracing::{debug, info};
use winapi::um::winnt::{
    PROCESSOR_ARCHITECTURE_AMD64, PROCESSOR_ARCHITECTURE_ARM64, PROCESSOR_ARCHITECTURE_IA64,
    PROCESS_QUERY_INFORMATION, PROCESS_VM_READ,
};

/// An attached target process.
///
/// Owns the OS handle for its whole lifetime: the session is not clonable,
/// moves transfer sole ownership, and the handle is released exactly once on
/// every exit path. The read-only region set is captured here and never
/// refreshed; writable regions are re-queried per scan.
pub struct Session {
    process_name: String,
    process_id: ProcessId,
    handle: Handle,
    is_64_bit: bool,
    module_base: u64,
    readonly_regions: Vec<AddressRange>,
}

impl Session {
    /// Attaches to the process owning the top-level window whose title
    /// matches `window_title` exactly.
    pub fn attach(window_title: &str) -> MemoryResult<Self> {
        let window = user32::find_window_by_title(window_title)?;
        let process_id = unsafe { user32::window_process_id(window) }?;

        let raw = kernel32::open_process(
            process_id,
            PROCESS_VM_READ | PROCESS_QUERY_INFORMATION,
        )?;
        let handle = Handle::new(raw);

        // A null module names the main executable.
        let process_name =
            unsafe { psapi::get_module_base_name(handle.raw(), ptr::null_mut()) }?;

        let is_64_bit = determine_bitness(&handle)?;
        let module_base = find_module_base(&handle, &process_name)?;
        let readonly_regions = walk::committed_regions(&handle, Protection::ReadOnly);

        info!(
            pid = process_id,
            is_64_bit,
            readonly_regions = readonly_regions.len(),
            "attached to {} (module base 0x{:x})",
            process_name,
            module_base
        );

        Ok(Session {
            process_name,
            process_id,
            handle,
            is_64_bit,
            module_base,
            readonly_regions,
        })
    }

    pub fn process_name(&self) -> &str {
        &self.process_name
    }

    pub fn process_id(&self) -> ProcessId {
        self.process_id
    }
}

impl MemorySource for Session {
    fn is_64_bit(&self) -> bool {
        self.is_64_bit
    }

    fn module_base(&self) -> u64 {
        self.module_base
    }

    fn read_into(&self, address: u64, buf: &mut [u8]) -> bool {
        unsafe { kernel32::read_process_memory(self.handle.raw(), address, buf) }
    }

    fn cached_readonly_regions(&self) -> Vec<AddressRange> {
        self.readonly_regions.clone()
    }

    fn query_regions(&self, protection: Protection) -> Vec<AddressRange> {
        let regions = walk::committed_regions(&self.handle, protection);
        debug!(?protection, count = regions.len(), "region walk");
        regions
    }
}

/// The target is 64-bit unless it runs under WOW64 emulation; a native
/// process inherits the OS architecture.
fn determine_bitness(handle: &Handle) -> MemoryResult<bool> {
    if unsafe { kernel32::is_wow64_process(handle.raw()) }? {
        return Ok(false);
    }

    let architecture = kernel32::native_processor_architecture();
    Ok(matches!(
        architecture,
        PROCESSOR_ARCHITECTURE_AMD64 | PROCESSOR_ARCHITECTURE_ARM64 | PROCESSOR_ARCHITECTURE_IA64
    ))
}

/// The load address of the module whose base name matches the process name.
fn find_module_base(handle: &Handle, process_name: &str) -> MemoryResult<u64> {
    let modules = unsafe { psapi::enum_process_modules(handle.raw()) }?;

    for module in modules {
        let name = match unsafe { psapi::get_module_base_name(handle.raw(), module) } {
            Ok(name) => name,
            Err(_) => continue,
        };

        if name.eq_ignore_ascii_case(process_name) {
            let info = unsafe { psapi::get_module_information(handle.raw(), module) }?;
            return Ok(info.lpBaseOfDll as usize as u64);
        }
    }

    Err(MemoryError::BaseAddressNotFound(process_name.to_string()))
}
