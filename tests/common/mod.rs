//! Synthetic target process for integration tests
//!
//! A `MockTarget` maps byte-backed regions at fixed absolute addresses and
//! implements `MemorySource` over them, so the whole scan workflow runs
//! against deterministic memory. Regions use interior mutability: tests
//! mutate the "target" between commands exactly the way a live process
//! would.

// Each test binary pulls in the subset of helpers it needs.
#![allow(dead_code)]

use memprobe::{AddressRange, MemorySource, Protection};
use std::sync::Mutex;

pub const MODULE_BASE: u64 = 0x0040_0000;

pub struct MockRegion {
    protection: Protection,
    range: AddressRange,
    bytes: Mutex<Vec<u8>>,
    readable: bool,
}

pub struct MockTarget {
    is_64_bit: bool,
    module_base: u64,
    regions: Vec<MockRegion>,
}

impl MockTarget {
    /// A 64-bit target whose main module loads at [`MODULE_BASE`].
    pub fn new() -> Self {
        MockTarget {
            is_64_bit: true,
            module_base: MODULE_BASE,
            regions: Vec::new(),
        }
    }

    pub fn new_32_bit() -> Self {
        MockTarget {
            is_64_bit: false,
            module_base: MODULE_BASE,
            regions: Vec::new(),
        }
    }

    pub fn with_region(mut self, protection: Protection, base: u64, size: usize) -> Self {
        self.regions.push(MockRegion {
            protection,
            range: AddressRange::new(base, size),
            bytes: Mutex::new(vec![0u8; size]),
            readable: true,
        });
        self
    }

    /// A region the walk reports but every read of which fails, the way a
    /// page can vanish between enumeration and read on a live target.
    pub fn with_unreadable_region(mut self, protection: Protection, base: u64, size: usize) -> Self {
        self.regions.push(MockRegion {
            protection,
            range: AddressRange::new(base, size),
            bytes: Mutex::new(vec![0u8; size]),
            readable: false,
        });
        self
    }

    /// A single read/write region covering `size` bytes from the module
    /// base, which is all most scenarios need.
    pub fn with_memory(size: usize) -> Self {
        MockTarget::new().with_region(Protection::ReadWrite, MODULE_BASE, size)
    }

    /// Writes into whichever region holds `address`.
    pub fn write_absolute(&self, address: u64, data: &[u8]) {
        for region in &self.regions {
            if region.range.contains(address) {
                let start = (address - region.range.start()) as usize;
                let mut bytes = region.bytes.lock().unwrap();
                bytes[start..start + data.len()].copy_from_slice(data);
                return;
            }
        }
        panic!("no region maps address 0x{:x}", address);
    }

    /// Writes at a module-relative offset.
    pub fn write(&self, offset: u64, data: &[u8]) {
        self.write_absolute(self.module_base.wrapping_add(offset), data);
    }

    /// Writes a pointer-width value at a module-relative offset.
    pub fn write_pointer(&self, offset: u64, target: u64) {
        if self.is_64_bit {
            self.write(offset, &target.to_le_bytes());
        } else {
            self.write(offset, &(target as u32).to_le_bytes());
        }
    }
}

impl MemorySource for MockTarget {
    fn is_64_bit(&self) -> bool {
        self.is_64_bit
    }

    fn module_base(&self) -> u64 {
        self.module_base
    }

    fn read_into(&self, address: u64, buf: &mut [u8]) -> bool {
        for region in &self.regions {
            if !region.range.contains(address) {
                continue;
            }
            if !region.readable {
                return false;
            }
            let start = (address - region.range.start()) as usize;
            let end = start + buf.len();
            let bytes = region.bytes.lock().unwrap();
            if end > bytes.len() {
                // Reads never span regions; a run off the end is a short
                // read and therefore a failure.
                return false;
            }
            buf.copy_from_slice(&bytes[start..end]);
            return true;
        }
        false
    }

    fn cached_readonly_regions(&self) -> Vec<AddressRange> {
        self.regions
            .iter()
            .filter(|region| region.protection == Protection::ReadOnly)
            .map(|region| region.range)
            .collect()
    }

    fn query_regions(&self, protection: Protection) -> Vec<AddressRange> {
        self.regions
            .iter()
            .filter(|region| region.protection == protection)
            .map(|region| region.range)
            .collect()
    }
}
