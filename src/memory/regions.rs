//! Protection classes and the committed-region walk

use serde::{Deserialize, Serialize};

/// The two protection classes a scan distinguishes.
///
/// The region walk filters on an exact protection match, so a
/// `PAGE_EXECUTE_READ` page is neither read-only nor read/write for scanning
/// purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protection {
    ReadOnly,
    ReadWrite,
}

#[cfg(windows)]
impl Protection {
    /// The Win32 protection constant this class filters on.
    pub(crate) fn win32_protect(&self) -> u32 {
        use winapi::um::winnt::{PAGE_READONLY, PAGE_READWRITE};

        match self {
            Protection::ReadOnly => PAGE_READONLY,
            Protection::ReadWrite => PAGE_READWRITE,
        }
    }
}

#[cfg(windows)]
pub(crate) mod walk {
    //! `VirtualQueryEx` traversal of a foreign address space.

    use super::Protection;
    use crate::core::types::AddressRange;
    use crate::windows::bindings::kernel32;
    use crate::windows::types::Handle;
    use winapi::um::winnt::MEM_COMMIT;

    /// Walks the target's virtual address space in ascending order and
    /// collects every committed region whose protection exactly matches
    /// `protection`. Traversal advances by each region's reported size;
    /// unmapped and guard regions fall through the filter.
    pub fn committed_regions(handle: &Handle, protection: Protection) -> Vec<AddressRange> {
        let mut regions = Vec::new();
        let mut address: u64 = 0;

        while let Ok(mbi) = unsafe { kernel32::virtual_query_ex(handle.raw(), address) } {
            let base = mbi.BaseAddress as usize as u64;
            let size = mbi.RegionSize;

            if mbi.State == MEM_COMMIT && mbi.Protect == protection.win32_protect() {
                regions.push(AddressRange::new(base, size));
            }

            address = base + size as u64;
        }

        regions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protection_roundtrip() {
        let json = serde_json::to_string(&Protection::ReadOnly).unwrap();
        assert_eq!(json, "\"readonly\"");
        let back: Protection = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Protection::ReadOnly);
    }

    #[cfg(windows)]
    #[test]
    fn test_win32_protect_values() {
        assert_eq!(Protection::ReadOnly.win32_protect(), 0x02);
        assert_eq!(Protection::ReadWrite.win32_protect(), 0x04);
    }
}
